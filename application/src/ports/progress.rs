//! Progress notification port
//!
//! Defines the sink a reasoning run publishes [`ProgressEvent`]s into. The
//! engine is written once against [`ProgressSink`]; batch, console and
//! streaming callers differ only in the sink they pass.

use council_domain::ProgressEvent;
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Receiver of progress events
///
/// Events arrive in publication order. Implementations must not block.
pub trait ProgressSink: Send + Sync {
    fn publish(&self, event: ProgressEvent);
}

/// No-op sink for when progress reporting is not needed
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn publish(&self, _event: ProgressEvent) {}
}

/// Sink that keeps every event in memory
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events published so far
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProgressSink for CollectingSink {
    fn publish(&self, event: ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Sink that forwards events into an unbounded channel
///
/// A dropped receiver is not an error: the run keeps going and later
/// events are discarded.
#[derive(Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelSink {
    /// Create a sink together with its receiving end
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl ProgressSink for ChannelSink {
    fn publish(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }
}

/// A sink that delegates to multiple inner sinks.
///
/// Uses borrowed references so owned and borrowed sinks compose without
/// wrapper types, e.g. a console reporter next to a collecting sink.
pub struct CompositeSink<'a> {
    delegates: Vec<&'a dyn ProgressSink>,
}

impl<'a> CompositeSink<'a> {
    pub fn new(delegates: Vec<&'a dyn ProgressSink>) -> Self {
        Self { delegates }
    }
}

impl ProgressSink for CompositeSink<'_> {
    fn publish(&self, event: ProgressEvent) {
        if let Some((last, rest)) = self.delegates.split_last() {
            for delegate in rest {
                delegate.publish(event.clone());
            }
            last.publish(event);
        }
    }
}

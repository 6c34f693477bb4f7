//! Stream Reasoning use case
//!
//! Decouples accepting a request from observing its progress. A request is
//! registered first and receives a session id; the first subscriber to
//! attach with that id starts the run and receives its events. Sessions
//! are consumed exactly once, and unconsumed sessions are swept after the
//! TTL.
//!
//! The attaching side owns the request deadline: on expiry it emits a
//! terminal `error` event and reports the stages that had already closed.

use crate::ports::progress::{ChannelSink, CompositeSink, ProgressSink};
use crate::use_cases::run_reasoning::{RunReasoningError, RunReasoningUseCase};
use chrono::{DateTime, Utc};
use council_domain::{ProgressEvent, ReasoningInput, ReasoningRequest, ReasoningResult, Stage};
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A registered request waiting for its subscriber
#[derive(Debug, Clone)]
pub struct StreamingSession {
    pub id: String,
    pub request: ReasoningRequest,
    pub created_at: DateTime<Utc>,
    created: Instant,
}

impl StreamingSession {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.created.elapsed() >= ttl
    }
}

/// Session id → pending session
///
/// The only state shared across requests. Each key is inserted once and
/// removed once, by whichever of [`take`](Self::take) and
/// [`sweep`](Self::sweep) gets to it first.
#[derive(Debug)]
pub struct SessionRegistry {
    ttl: Duration,
    sessions: Mutex<HashMap<String, StreamingSession>>,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, StreamingSession>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register `request` and return its session id
    pub fn register(&self, request: ReasoningRequest) -> String {
        let id = Uuid::new_v4().to_string();
        let session = StreamingSession {
            id: id.clone(),
            request,
            created_at: Utc::now(),
            created: Instant::now(),
        };
        self.lock().insert(id.clone(), session);
        info!("Registered streaming session {}", id);
        id
    }

    /// Consume a session. Expired sessions are removed and not returned.
    pub fn take(&self, id: &str) -> Option<StreamingSession> {
        let session = self.lock().remove(id)?;
        if session.is_expired(self.ttl) {
            debug!("Session {} expired before it was attached", id);
            return None;
        }
        info!("Consumed streaming session {}", id);
        Some(session)
    }

    /// Remove every expired session and return how many were removed
    pub fn sweep(&self) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(self.ttl));
        let removed = before - sessions.len();
        if removed > 0 {
            info!("Swept {} expired streaming sessions", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sweep every `interval` until `token` is cancelled
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        interval: Duration,
        token: CancellationToken,
    ) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        registry.sweep();
                    }
                }
            }
            debug!("Session sweeper stopped");
        })
    }
}

/// How a streamed run ended
#[derive(Debug, Clone, PartialEq)]
pub enum StreamOutcome {
    Completed(Box<ReasoningResult>),
    /// The request deadline expired; only the stages listed had closed
    DeadlineExceeded { closed_stages: Vec<Stage> },
}

impl StreamOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, StreamOutcome::Completed(_))
    }
}

/// Events of one attached session
pub struct EventStream {
    rx: mpsc::UnboundedReceiver<ProgressEvent>,
}

impl EventStream {
    /// Next event, or `None` once the run has published its last event
    pub async fn recv(&mut self) -> Option<ProgressEvent> {
        self.rx.recv().await
    }
}

impl Stream for EventStream {
    type Item = ProgressEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// An attached session: its event stream and the running task
pub struct Subscription {
    pub session_id: String,
    pub events: EventStream,
    pub outcome: JoinHandle<StreamOutcome>,
}

/// Records stages as they close, for partial results after a deadline
#[derive(Default)]
struct ClosedStages {
    stages: Mutex<Vec<Stage>>,
}

impl ClosedStages {
    fn take(&self) -> Vec<Stage> {
        self.stages
            .lock()
            .map(|mut stages| std::mem::take(&mut *stages))
            .unwrap_or_default()
    }
}

impl ProgressSink for ClosedStages {
    fn publish(&self, event: ProgressEvent) {
        if let ProgressEvent::StageComplete { stage_data, .. } = event
            && let Ok(mut stages) = self.stages.lock()
        {
            stages.push(stage_data);
        }
    }
}

/// Use case for push-delivered reasoning runs
pub struct StreamReasoningUseCase {
    engine: Arc<RunReasoningUseCase>,
    sessions: Arc<SessionRegistry>,
}

impl StreamReasoningUseCase {
    pub fn new(engine: Arc<RunReasoningUseCase>) -> Self {
        let sessions = Arc::new(SessionRegistry::new(engine.config().session_ttl));
        Self { engine, sessions }
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Start the periodic sweep of unconsumed sessions
    pub fn spawn_sweeper(&self, token: CancellationToken) -> JoinHandle<()> {
        self.sessions
            .spawn_sweeper(self.engine.config().sweep_interval, token)
    }

    /// Validate `input` and register it; nothing runs until [`attach`](Self::attach).
    pub fn register(&self, input: ReasoningInput) -> Result<String, RunReasoningError> {
        let request = self.engine.validate(input)?;
        Ok(self.sessions.register(request))
    }

    /// Consume session `id` and start its run.
    pub fn attach(&self, id: &str) -> Result<Subscription, RunReasoningError> {
        let session = self
            .sessions
            .take(id)
            .ok_or_else(|| RunReasoningError::SessionNotFound(id.to_string()))?;

        let (channel, rx) = ChannelSink::channel();
        let engine = Arc::clone(&self.engine);
        let deadline = engine.config().request_deadline;
        let session_id = session.id.clone();

        let outcome = tokio::spawn(async move {
            let closed = ClosedStages::default();
            let sink = CompositeSink::new(vec![&channel, &closed]);
            let run = engine.run_accepted(&session.request, &sink, session.created);

            match tokio::time::timeout(deadline, run).await {
                Ok(result) => StreamOutcome::Completed(Box::new(result)),
                Err(_) => {
                    warn!(
                        "Session {} exceeded the request deadline of {:?}",
                        session.id, deadline
                    );
                    channel.publish(ProgressEvent::Error {
                        message: RunReasoningError::DeadlineExceeded(deadline).to_string(),
                    });
                    StreamOutcome::DeadlineExceeded {
                        closed_stages: closed.take(),
                    }
                }
            }
        });

        Ok(Subscription {
            session_id,
            events: EventStream { rx },
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::ports::model_gateway::GatewayRegistry;
    use crate::testing::FakeGateway;
    use council_domain::ParticipantId;
    use futures::StreamExt;

    fn input(names: &[&str]) -> ReasoningInput {
        ReasoningInput::new(
            "Is remote work beneficial?",
            names.iter().map(|n| n.to_string()).collect(),
            "debate",
        )
    }

    fn use_case(gateway: FakeGateway, config: EngineConfig) -> StreamReasoningUseCase {
        let registry =
            GatewayRegistry::new().with(ParticipantId::new("a").unwrap(), Arc::new(gateway));
        StreamReasoningUseCase::new(Arc::new(RunReasoningUseCase::new(registry, config)))
    }

    #[tokio::test]
    async fn test_attached_session_streams_until_complete() {
        let streaming = use_case(FakeGateway::answering("a"), EngineConfig::default());
        let id = streaming.register(input(&["a"])).unwrap();
        assert_eq!(streaming.sessions().len(), 1);

        let subscription = streaming.attach(&id).unwrap();
        assert!(streaming.sessions().is_empty());

        let events: Vec<ProgressEvent> = subscription.events.collect().await;
        assert_eq!(events.first().map(|e| e.wire_name()), Some("stage_start"));
        assert_eq!(events.last().map(|e| e.wire_name()), Some("complete"));

        let outcome = subscription.outcome.await.unwrap();
        assert!(outcome.is_completed());
    }

    #[tokio::test]
    async fn test_session_is_consumed_once() {
        let streaming = use_case(FakeGateway::answering("a"), EngineConfig::default());
        let id = streaming.register(input(&["a"])).unwrap();

        let _first = streaming.attach(&id).unwrap();
        let second = streaming.attach(&id);

        assert!(matches!(second, Err(RunReasoningError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn test_register_validates() {
        let streaming = use_case(FakeGateway::answering("a"), EngineConfig::default());
        let err = streaming.register(input(&["a", "zed"])).unwrap_err();
        assert_eq!(err.code(), "MODEL_UNAVAILABLE");
        assert!(streaming.sessions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_sessions_are_not_attachable_and_are_swept() {
        let streaming = use_case(FakeGateway::answering("a"), EngineConfig::default());
        let stale = streaming.register(input(&["a"])).unwrap();
        let also_stale = streaming.register(input(&["a"])).unwrap();

        tokio::time::advance(Duration::from_secs(901)).await;
        let fresh = streaming.register(input(&["a"])).unwrap();

        assert!(matches!(
            streaming.attach(&stale),
            Err(RunReasoningError::SessionNotFound(_))
        ));
        assert_eq!(streaming.sessions().sweep(), 1);
        assert_eq!(streaming.sessions().len(), 1);
        assert!(streaming.sessions().take(&also_stale).is_none());
        assert!(streaming.sessions().take(&fresh).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_runs_until_cancelled() {
        let streaming = use_case(FakeGateway::answering("a"), EngineConfig::default());
        streaming.register(input(&["a"])).unwrap();
        let token = CancellationToken::new();
        let sweeper = streaming.spawn_sweeper(token.clone());

        tokio::time::sleep(Duration::from_secs(961)).await;
        assert!(streaming.sessions().is_empty());

        token.cancel();
        sweeper.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_emits_error_and_keeps_closed_stages() {
        let streaming = use_case(
            FakeGateway::answering("a").with_delay(Duration::from_secs(30)),
            EngineConfig::default().with_request_deadline(Duration::from_secs(45)),
        );
        let id = streaming.register(input(&["a"])).unwrap();
        let subscription = streaming.attach(&id).unwrap();

        let events: Vec<ProgressEvent> = subscription.events.collect().await;
        let outcome = subscription.outcome.await.unwrap();

        assert_eq!(events.last().map(|e| e.wire_name()), Some("error"));
        assert!(!events.iter().any(|e| e.wire_name() == "complete"));
        match outcome {
            StreamOutcome::DeadlineExceeded { closed_stages } => {
                assert_eq!(closed_stages.len(), 1);
                assert_eq!(closed_stages[0].number, 1);
            }
            other => panic!("expected deadline, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dropped_subscriber_does_not_stop_the_run() {
        let streaming = use_case(FakeGateway::answering("a"), EngineConfig::default());
        let id = streaming.register(input(&["a"])).unwrap();
        let Subscription {
            events, outcome, ..
        } = streaming.attach(&id).unwrap();

        drop(events);

        assert!(outcome.await.unwrap().is_completed());
    }
}

//! Stage executor
//!
//! Runs one [`StageSpec`] against its participant subset and closes the
//! resulting [`Stage`]. Parallel stages fan out over a [`JoinSet`];
//! sequential and single stages invoke one participant at a time in list
//! order. Every invocation resolves to exactly one [`ParticipantResponse`]:
//! gateway errors, missing gateways and panicked tasks all become failure
//! placeholders instead of propagating.

use crate::ports::model_gateway::{GatewayRegistry, ModelGateway};
use crate::ports::progress::ProgressSink;
use crate::use_cases::resilience::ResilienceLayer;
use council_domain::{
    GenerationOptions, OpenStage, ParticipantId, ParticipantResponse, ProgressEvent, Stage,
    StageSpec,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Completed-unit counter behind the progress percentage.
///
/// One unit per participant invocation plus one for the summary. Reported
/// values are floored and stay at or below 99 until [`finish`](Self::finish).
#[derive(Debug)]
pub struct ProgressTracker {
    total: usize,
    done: AtomicUsize,
}

impl ProgressTracker {
    pub fn new(total_units: usize) -> Self {
        Self {
            total: total_units.max(1),
            done: AtomicUsize::new(0),
        }
    }

    /// Current percentage
    pub fn current(&self) -> u8 {
        self.percent(self.done.load(Ordering::SeqCst))
    }

    /// Mark one unit done and return the new percentage
    pub fn advance(&self) -> u8 {
        let done = self.done.fetch_add(1, Ordering::SeqCst) + 1;
        self.percent(done)
    }

    /// The final percentage, reported only with the complete result
    pub fn finish(&self) -> u8 {
        self.done.store(self.total, Ordering::SeqCst);
        100
    }

    fn percent(&self, done: usize) -> u8 {
        let pct = done.min(self.total) * 100 / self.total;
        pct.min(99) as u8
    }
}

/// Executes stages for one request
pub struct StageExecutor<'a> {
    registry: &'a GatewayRegistry,
    resilience: &'a ResilienceLayer,
    options: &'a GenerationOptions,
    sink: &'a dyn ProgressSink,
    tracker: &'a ProgressTracker,
}

impl<'a> StageExecutor<'a> {
    pub fn new(
        registry: &'a GatewayRegistry,
        resilience: &'a ResilienceLayer,
        options: &'a GenerationOptions,
        sink: &'a dyn ProgressSink,
        tracker: &'a ProgressTracker,
    ) -> Self {
        Self {
            registry,
            resilience,
            options,
            sink,
            tracker,
        }
    }

    /// Run `spec`, building each participant's prompt with `prompt_for`.
    ///
    /// Returns once every invocation has resolved.
    pub async fn execute<P>(&self, spec: &StageSpec, prompt_for: P) -> Stage
    where
        P: Fn(&ParticipantId) -> String,
    {
        let mut open = OpenStage::open(spec);

        if spec.mode.is_concurrent() {
            self.run_parallel(&mut open, &prompt_for).await;
        } else {
            self.run_sequential(&mut open, &prompt_for).await;
        }

        let stage = open.close();
        info!(
            "Stage {} ({}) closed: {} responses, {} failed",
            stage.number,
            stage.title,
            stage.responses.len(),
            stage.failed_count()
        );
        stage
    }

    async fn run_parallel<P>(&self, open: &mut OpenStage, prompt_for: &P)
    where
        P: Fn(&ParticipantId) -> String,
    {
        let stage = open.spec().number;
        let participants = open.spec().participants.clone();
        let mut join_set = JoinSet::new();
        let mut task_owner = HashMap::new();

        for participant in participants {
            let prompt = prompt_for(&participant);
            self.publish_invoked(stage, &participant);

            let gateway = self.registry.get(&participant);
            let resilience = self.resilience.clone();
            let options = self.options.clone();
            let owner = participant.clone();

            let handle = join_set.spawn(async move {
                invoke(participant, gateway, prompt, options, resilience).await
            });
            task_owner.insert(handle.id(), owner);
        }

        while let Some(joined) = join_set.join_next_with_id().await {
            let response = match joined {
                Ok((_, response)) => response,
                Err(e) => {
                    warn!("Task join error: {}", e);
                    let Some(participant) = task_owner.get(&e.id()).cloned() else {
                        continue;
                    };
                    ParticipantResponse::failure(
                        participant,
                        format!("invocation task failed: {}", e),
                        std::time::Duration::ZERO,
                    )
                }
            };
            self.resolve(open, response);
        }
    }

    async fn run_sequential<P>(&self, open: &mut OpenStage, prompt_for: &P)
    where
        P: Fn(&ParticipantId) -> String,
    {
        let stage = open.spec().number;
        let participants = open.spec().participants.clone();

        for participant in participants {
            let prompt = prompt_for(&participant);
            self.publish_invoked(stage, &participant);

            let gateway = self.registry.get(&participant);
            let response = invoke(
                participant,
                gateway,
                prompt,
                self.options.clone(),
                self.resilience.clone(),
            )
            .await;
            self.resolve(open, response);
        }
    }

    fn publish_invoked(&self, stage: usize, participant: &ParticipantId) {
        debug!("Stage {}: invoking {}", stage, participant);
        self.sink.publish(ProgressEvent::ParticipantInvoked {
            stage,
            participant: participant.clone(),
            progress: self.tracker.current(),
        });
    }

    fn resolve(&self, open: &mut OpenStage, response: ParticipantResponse) {
        let stage = open.spec().number;
        let participant = response.participant.clone();
        if !open.record(response.clone()) {
            warn!("Stage {}: discarding duplicate response from {}", stage, participant);
            return;
        }
        self.sink.publish(ProgressEvent::ParticipantResolved {
            stage,
            participant,
            progress: self.tracker.advance(),
            response,
        });
    }
}

/// One participant invocation, converted into a response record
pub(crate) async fn invoke(
    participant: ParticipantId,
    gateway: Option<Arc<dyn ModelGateway>>,
    prompt: String,
    options: GenerationOptions,
    resilience: ResilienceLayer,
) -> ParticipantResponse {
    let started = Instant::now();
    let Some(gateway) = gateway else {
        warn!("No gateway registered for {}", participant);
        return ParticipantResponse::failure(participant, "no gateway registered", started.elapsed());
    };

    let result = resilience
        .call(participant.as_str(), || gateway.invoke(&prompt, &options))
        .await;

    match result {
        Ok(completion) => {
            debug!("{} responded in {:?}", participant, started.elapsed());
            ParticipantResponse::success(
                participant,
                completion.content,
                completion.usage,
                started.elapsed(),
            )
            .with_model(completion.model)
            .with_confidence(completion.confidence)
        }
        Err(e) => {
            warn!("{} failed: {}", participant, e);
            ParticipantResponse::failure(participant, e.to_string(), started.elapsed())
        }
    }
}

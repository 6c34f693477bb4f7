//! Run Reasoning use case
//!
//! The topology coordinator: validates a request, resolves its strategy to
//! a [`StagePlan`], drives the stage executor through the plan strictly in
//! order, and closes the run with a summary. The same engine serves batch
//! and streaming callers; they differ only in the [`ProgressSink`] passed.

use crate::config::EngineConfig;
use crate::ports::model_gateway::GatewayRegistry;
use crate::ports::persona::{NoPersona, PersonaDecorator};
use crate::ports::progress::{NoProgress, ProgressSink};
use crate::use_cases::prompting::StagePrompter;
use crate::use_cases::resilience::ResilienceLayer;
use crate::use_cases::stage_executor::{ProgressTracker, StageExecutor};
use crate::use_cases::synthesize::SummarySynthesizer;
use chrono::{DateTime, Utc};
use council_domain::{
    DomainError, ParticipantId, ProgressEvent, ReasoningInput, ReasoningRequest, ReasoningResult,
    StagePlan, Strategy,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{info, warn};

/// Request-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunReasoningError {
    #[error("Invalid request: {0}")]
    Validation(#[from] DomainError),

    #[error("Participant '{0}' is not available")]
    ModelUnavailable(String),

    #[error("Request did not complete within {0:?}")]
    DeadlineExceeded(Duration),

    #[error("Streaming session '{0}' not found or expired")]
    SessionNotFound(String),
}

impl RunReasoningError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            RunReasoningError::Validation(_) => "VALIDATION_ERROR",
            RunReasoningError::ModelUnavailable(_) => "MODEL_UNAVAILABLE",
            RunReasoningError::DeadlineExceeded(_) => "DEADLINE_EXCEEDED",
            RunReasoningError::SessionNotFound(_) => "SESSION_NOT_FOUND",
        }
    }

    /// HTTP-style status class
    pub fn status(&self) -> u16 {
        match self {
            RunReasoningError::Validation(_) | RunReasoningError::ModelUnavailable(_) => 400,
            RunReasoningError::DeadlineExceeded(_) => 504,
            RunReasoningError::SessionNotFound(_) => 404,
        }
    }
}

/// Batch outbound envelope
#[derive(Debug, Clone, Serialize)]
pub struct ReasoningResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ReasoningResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    pub timestamp: DateTime<Utc>,
}

impl From<Result<ReasoningResult, RunReasoningError>> for ReasoningResponse {
    fn from(result: Result<ReasoningResult, RunReasoningError>) -> Self {
        match result {
            Ok(data) => Self {
                success: true,
                data: Some(data),
                error: None,
                code: None,
                timestamp: Utc::now(),
            },
            Err(e) => Self {
                success: false,
                data: None,
                error: Some(e.to_string()),
                code: Some(e.code()),
                timestamp: Utc::now(),
            },
        }
    }
}

/// Use case for running a multi-participant reasoning request
pub struct RunReasoningUseCase {
    registry: GatewayRegistry,
    config: EngineConfig,
    persona: Arc<dyn PersonaDecorator>,
}

impl RunReasoningUseCase {
    pub fn new(registry: GatewayRegistry, config: EngineConfig) -> Self {
        Self {
            registry,
            config,
            persona: Arc::new(NoPersona),
        }
    }

    pub fn with_persona_decorator(mut self, persona: Arc<dyn PersonaDecorator>) -> Self {
        self.persona = persona;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &GatewayRegistry {
        &self.registry
    }

    /// Ordered stage specifications for `strategy` over `participants`
    pub fn plan(strategy: Strategy, participants: &[ParticipantId]) -> StagePlan {
        StagePlan::new(strategy, participants)
    }

    /// Accept `input`, or reject it before any invocation.
    ///
    /// Shape errors are `VALIDATION_ERROR`; participants without a gateway,
    /// or whose gateway reports itself unavailable, are `MODEL_UNAVAILABLE`.
    pub fn validate(&self, input: ReasoningInput) -> Result<ReasoningRequest, RunReasoningError> {
        let request = ReasoningRequest::try_from(input)?;
        for participant in request.participants() {
            let available = self
                .registry
                .get(participant)
                .is_some_and(|gateway| gateway.is_available());
            if !available {
                return Err(RunReasoningError::ModelUnavailable(participant.to_string()));
            }
        }
        Ok(request)
    }

    /// Validate and run without progress reporting, bounded by the request deadline
    pub async fn execute(&self, input: ReasoningInput) -> Result<ReasoningResult, RunReasoningError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Validate and run, publishing progress into `sink`, bounded by the request deadline.
    ///
    /// A run that misses the deadline yields `DEADLINE_EXCEEDED`, never a
    /// partial result, and `sink` receives a terminal error event.
    pub async fn execute_with_progress(
        &self,
        input: ReasoningInput,
        sink: &dyn ProgressSink,
    ) -> Result<ReasoningResult, RunReasoningError> {
        let accepted = Instant::now();
        let request = self.validate(input)?;
        let deadline = self.config.request_deadline;

        match tokio::time::timeout(deadline, self.run_accepted(&request, sink, accepted)).await {
            Ok(result) => Ok(result),
            Err(_) => {
                warn!("Request deadline of {:?} exceeded", deadline);
                let error = RunReasoningError::DeadlineExceeded(deadline);
                sink.publish(ProgressEvent::Error {
                    message: error.to_string(),
                });
                Err(error)
            }
        }
    }

    /// Run an accepted request to completion.
    ///
    /// Never fails: per-participant failures are recorded as placeholder
    /// responses and a failed summary is replaced by the fallback text.
    pub async fn run(&self, request: &ReasoningRequest, sink: &dyn ProgressSink) -> ReasoningResult {
        self.run_accepted(request, sink, Instant::now()).await
    }

    /// [`run`](Self::run), with the duration measured from `accepted`
    pub async fn run_accepted(
        &self,
        request: &ReasoningRequest,
        sink: &dyn ProgressSink,
        accepted: Instant,
    ) -> ReasoningResult {
        let timestamp = Utc::now();
        let plan = request.plan();
        info!(
            "Starting {} reasoning ({} topology) with {} participants ({} stages)",
            request.strategy(),
            request.strategy().topology(),
            request.participants().len(),
            plan.len()
        );

        let tracker = ProgressTracker::new(plan.invocation_count() + 1);
        let resilience =
            ResilienceLayer::new(self.config.invocation_timeout, self.config.retry.clone());
        let prompter = StagePrompter::new(request, &self.config.compaction, self.persona.as_ref());
        let executor = StageExecutor::new(
            &self.registry,
            &resilience,
            request.options(),
            sink,
            &tracker,
        );

        let mut stages = Vec::with_capacity(plan.len());
        for spec in plan.stages() {
            info!("Stage {}: {}", spec.number, spec.title);
            sink.publish(ProgressEvent::StageStart {
                stage: spec.number,
                title: spec.title.clone(),
                progress: tracker.current(),
            });

            let stage = executor
                .execute(spec, |participant| {
                    prompter.prompt_for(spec, participant, &stages)
                })
                .await;

            sink.publish(ProgressEvent::StageComplete {
                stage: stage.number,
                progress: tracker.current(),
                stage_data: stage.clone(),
            });
            stages.push(stage);
        }

        let summary = SummarySynthesizer::new(&self.registry, &resilience)
            .synthesize(request, &prompter, &stages)
            .await;
        tracker.advance();

        let result = ReasoningResult {
            question: request.question().content().to_string(),
            participants: request.participants().to_vec(),
            strategy: request.strategy(),
            stages,
            summary,
            timestamp,
            duration_ms: u64::try_from(accepted.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        info!(
            "Reasoning complete: {} responses in {}ms",
            result.response_count(),
            result.duration_ms
        );

        sink.publish(ProgressEvent::ResultComplete {
            progress: tracker.finish(),
            data: Box::new(result.clone()),
        });
        result
    }
}

//! Orchestration value objects - the records a reasoning run produces.
//!
//! - [`ParticipantResponse`] - one participant's output in one stage (or a failure placeholder)
//! - [`Stage`] - a closed round of invocations
//! - [`OpenStage`] - a stage still collecting responses
//! - [`ReasoningResult`] - the complete transcript plus closing summary

use crate::core::participant::ParticipantId;
use crate::orchestration::entities::{ExecutionMode, StageSpec};
use crate::orchestration::strategy::Strategy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Content of a response whose invocation failed
pub const FAILURE_PLACEHOLDER: &str = "[error] This participant could not respond in this stage.";

/// Token counters reported by a gateway
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl std::ops::Add for TokenUsage {
    type Output = TokenUsage;

    fn add(self, rhs: Self) -> Self::Output {
        TokenUsage {
            prompt_tokens: self.prompt_tokens.saturating_add(rhs.prompt_tokens),
            completion_tokens: self.completion_tokens.saturating_add(rhs.completion_tokens),
            total_tokens: self.total_tokens.saturating_add(rhs.total_tokens),
        }
    }
}

/// One participant's contribution to one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantResponse {
    pub participant: ParticipantId,
    /// Response text, or [`FAILURE_PLACEHOLDER`] when the invocation failed
    pub content: String,
    pub usage: TokenUsage,
    pub timestamp: DateTime<Utc>,
    /// Wall-clock time of the invocation, retries included
    pub latency_ms: u64,
    pub success: bool,
    /// Failure detail, for diagnostics only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Provider-reported model name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Provider-reported confidence, passed through unchanged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl ParticipantResponse {
    /// Creates a successful response.
    pub fn success(
        participant: ParticipantId,
        content: impl Into<String>,
        usage: TokenUsage,
        latency: Duration,
    ) -> Self {
        Self {
            participant,
            content: content.into(),
            usage,
            timestamp: Utc::now(),
            latency_ms: duration_ms(latency),
            success: true,
            error: None,
            model: None,
            confidence: None,
        }
    }

    /// Creates the placeholder recorded when an invocation failed.
    ///
    /// Content is always [`FAILURE_PLACEHOLDER`] and usage is zero.
    pub fn failure(participant: ParticipantId, error: impl Into<String>, latency: Duration) -> Self {
        Self {
            participant,
            content: FAILURE_PLACEHOLDER.to_string(),
            usage: TokenUsage::default(),
            timestamp: Utc::now(),
            latency_ms: duration_ms(latency),
            success: false,
            error: Some(error.into()),
            model: None,
            confidence: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_confidence(mut self, confidence: Option<f32>) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

/// A closed stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub number: usize,
    pub title: String,
    pub description: String,
    pub mode: ExecutionMode,
    /// Exactly one response per invoked participant, in invocation order
    pub responses: Vec<ParticipantResponse>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl Stage {
    pub fn response_for(&self, participant: &ParticipantId) -> Option<&ParticipantResponse> {
        self.responses.iter().find(|r| &r.participant == participant)
    }

    pub fn failed_count(&self) -> usize {
        self.responses.iter().filter(|r| !r.success).count()
    }

    pub fn usage(&self) -> TokenUsage {
        self.responses
            .iter()
            .fold(TokenUsage::default(), |acc, r| acc + r.usage)
    }
}

/// A stage that is still collecting responses
#[derive(Debug)]
pub struct OpenStage {
    spec: StageSpec,
    started_at: DateTime<Utc>,
    started: Instant,
    responses: Vec<ParticipantResponse>,
}

impl OpenStage {
    pub fn open(spec: &StageSpec) -> Self {
        Self {
            spec: spec.clone(),
            started_at: Utc::now(),
            started: Instant::now(),
            responses: Vec::with_capacity(spec.participants.len()),
        }
    }

    pub fn spec(&self) -> &StageSpec {
        &self.spec
    }

    /// Record a response.
    ///
    /// Returns `false` (and records nothing) if the participant is not part of
    /// this stage or already has a response.
    pub fn record(&mut self, response: ParticipantResponse) -> bool {
        let invited = self.spec.participants.contains(&response.participant);
        let duplicate = self
            .responses
            .iter()
            .any(|r| r.participant == response.participant);
        if !invited || duplicate {
            return false;
        }
        self.responses.push(response);
        true
    }

    /// Responses recorded so far, in arrival order
    pub fn responses(&self) -> &[ParticipantResponse] {
        &self.responses
    }

    /// Participants that have not resolved yet, in plan order
    pub fn pending(&self) -> Vec<ParticipantId> {
        self.spec
            .participants
            .iter()
            .filter(|p| !self.responses.iter().any(|r| &r.participant == *p))
            .cloned()
            .collect()
    }

    /// Close the stage.
    ///
    /// Any participant still pending gets a failure placeholder, so the
    /// closed stage always covers its whole participant subset.
    pub fn close(mut self) -> Stage {
        for participant in self.pending() {
            self.responses.push(ParticipantResponse::failure(
                participant,
                "no response was recorded",
                Duration::ZERO,
            ));
        }

        let order = &self.spec.participants;
        self.responses.sort_by_key(|r| {
            order
                .iter()
                .position(|p| p == &r.participant)
                .unwrap_or(usize::MAX)
        });

        Stage {
            number: self.spec.number,
            title: self.spec.title,
            description: self.spec.description,
            mode: self.spec.mode,
            responses: self.responses,
            started_at: self.started_at,
            ended_at: Utc::now(),
            duration_ms: duration_ms(self.started.elapsed()),
        }
    }
}

/// Complete result of a reasoning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningResult {
    pub question: String,
    pub participants: Vec<ParticipantId>,
    pub strategy: Strategy,
    pub stages: Vec<Stage>,
    /// Closing synthesis, or the fallback text when synthesis failed
    pub summary: String,
    pub timestamp: DateTime<Utc>,
    /// Wall-clock from request acceptance to summary completion
    pub duration_ms: u64,
}

impl ReasoningResult {
    pub fn stage(&self, number: usize) -> Option<&Stage> {
        self.stages.iter().find(|s| s.number == number)
    }

    pub fn total_usage(&self) -> TokenUsage {
        self.stages
            .iter()
            .fold(TokenUsage::default(), |acc, s| acc + s.usage())
    }

    pub fn response_count(&self) -> usize {
        self.stages.iter().map(|s| s.responses.len()).sum()
    }
}

pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

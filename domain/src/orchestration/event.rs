//! Progress events published while a reasoning run executes.
//!
//! Events are append-only and strictly ordered per request:
//!
//! ```text
//! stage_start(1) → participant_invoked* → participant_resolved* → stage_complete(1)
//! stage_start(2) → ...                                          → stage_complete(N)
//! result_complete
//! ```
//!
//! `error` is only ever emitted by the owner of a streaming subscription,
//! as the terminal event of a run that did not complete.

use crate::core::participant::ParticipantId;
use crate::orchestration::value_objects::{ParticipantResponse, ReasoningResult, Stage};
use serde::{Deserialize, Serialize};

/// A single progress event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    StageStart {
        stage: usize,
        title: String,
        progress: u8,
    },
    ParticipantInvoked {
        stage: usize,
        participant: ParticipantId,
        progress: u8,
    },
    ParticipantResolved {
        stage: usize,
        participant: ParticipantId,
        progress: u8,
        response: ParticipantResponse,
    },
    StageComplete {
        stage: usize,
        progress: u8,
        stage_data: Stage,
    },
    ResultComplete {
        progress: u8,
        data: Box<ReasoningResult>,
    },
    Error {
        message: String,
    },
}

impl ProgressEvent {
    /// Stage number the event belongs to, if any
    pub fn stage(&self) -> Option<usize> {
        match self {
            ProgressEvent::StageStart { stage, .. }
            | ProgressEvent::ParticipantInvoked { stage, .. }
            | ProgressEvent::ParticipantResolved { stage, .. }
            | ProgressEvent::StageComplete { stage, .. } => Some(*stage),
            ProgressEvent::ResultComplete { .. } | ProgressEvent::Error { .. } => None,
        }
    }

    /// Progress percentage carried by the event, if any
    pub fn progress(&self) -> Option<u8> {
        match self {
            ProgressEvent::StageStart { progress, .. }
            | ProgressEvent::ParticipantInvoked { progress, .. }
            | ProgressEvent::ParticipantResolved { progress, .. }
            | ProgressEvent::StageComplete { progress, .. }
            | ProgressEvent::ResultComplete { progress, .. } => Some(*progress),
            ProgressEvent::Error { .. } => None,
        }
    }

    /// Whether no further events follow this one
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProgressEvent::ResultComplete { .. } | ProgressEvent::Error { .. }
        )
    }

    /// Name of the event on the streaming wire
    pub fn wire_name(&self) -> &'static str {
        match self {
            ProgressEvent::StageStart { .. } => "stage_start",
            ProgressEvent::ParticipantInvoked { .. } => "model_start",
            ProgressEvent::ParticipantResolved { response, .. } if response.success => {
                "model_complete"
            }
            ProgressEvent::ParticipantResolved { .. } => "model_error",
            ProgressEvent::StageComplete { .. } => "stage_complete",
            ProgressEvent::ResultComplete { .. } => "complete",
            ProgressEvent::Error { .. } => "error",
        }
    }

    /// Payload of the event on the streaming wire
    pub fn wire_payload(&self) -> serde_json::Value {
        use serde_json::json;

        match self {
            ProgressEvent::StageStart {
                stage,
                title,
                progress,
            } => json!({ "stage": stage, "title": title, "progress": progress }),
            ProgressEvent::ParticipantInvoked {
                stage,
                participant,
                progress,
            } => json!({ "stage": stage, "model": participant, "progress": progress }),
            ProgressEvent::ParticipantResolved {
                stage,
                participant,
                progress,
                response,
            } => {
                let mut payload = json!({
                    "stage": stage,
                    "model": participant,
                    "progress": progress,
                    "response": response,
                });
                if let Some(error) = &response.error {
                    payload["error"] = json!(error);
                }
                payload
            }
            ProgressEvent::StageComplete {
                stage,
                progress,
                stage_data,
            } => json!({ "stage": stage, "stageData": stage_data, "progress": progress }),
            ProgressEvent::ResultComplete { progress, data } => {
                json!({ "data": data, "progress": progress })
            }
            ProgressEvent::Error { message } => json!({ "message": message }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestration::value_objects::TokenUsage;
    use std::time::Duration;

    fn participant() -> ParticipantId {
        ParticipantId::new("openai").unwrap()
    }

    #[test]
    fn test_resolved_wire_name_depends_on_outcome() {
        let ok = ProgressEvent::ParticipantResolved {
            stage: 1,
            participant: participant(),
            progress: 20,
            response: ParticipantResponse::success(
                participant(),
                "answer",
                TokenUsage::default(),
                Duration::ZERO,
            ),
        };
        let failed = ProgressEvent::ParticipantResolved {
            stage: 1,
            participant: participant(),
            progress: 40,
            response: ParticipantResponse::failure(participant(), "rate limited", Duration::ZERO),
        };

        assert_eq!(ok.wire_name(), "model_complete");
        assert_eq!(failed.wire_name(), "model_error");
        assert_eq!(failed.wire_payload()["error"], "rate limited");
        assert_eq!(failed.wire_payload()["model"], "openai");
    }

    #[test]
    fn test_stage_and_terminal_accessors() {
        let start = ProgressEvent::StageStart {
            stage: 2,
            title: "Rebuttals".to_string(),
            progress: 33,
        };
        assert_eq!(start.stage(), Some(2));
        assert_eq!(start.progress(), Some(33));
        assert!(!start.is_terminal());

        let error = ProgressEvent::Error {
            message: "deadline exceeded".to_string(),
        };
        assert!(error.is_terminal());
        assert_eq!(error.stage(), None);
        assert_eq!(error.wire_payload()["message"], "deadline exceeded");
    }

    #[test]
    fn test_serde_tag() {
        let event = ProgressEvent::ParticipantInvoked {
            stage: 1,
            participant: participant(),
            progress: 0,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "participant_invoked");
        assert_eq!(json["participant"], "openai");
    }
}

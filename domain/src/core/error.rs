//! Domain error types

use thiserror::Error;

/// Domain-level validation errors
///
/// Every variant describes a request that is rejected before any
/// participant is invoked.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Question cannot be empty")]
    EmptyQuestion,

    #[error("Question is too long ({len} characters, maximum {max})")]
    QuestionTooLong { len: usize, max: usize },

    #[error("At least one participant is required")]
    NoParticipants,

    #[error("Too many participants ({count}, maximum {max})")]
    TooManyParticipants { count: usize, max: usize },

    #[error("Participant listed more than once: {0}")]
    DuplicateParticipant(String),

    #[error("Invalid participant identity: {0}")]
    InvalidParticipant(String),

    #[error("Unknown strategy: {0} (expected debate, memory, report, or relay)")]
    UnknownStrategy(String),

    #[error("Invalid option {field}: {reason}")]
    InvalidOption { field: &'static str, reason: String },
}

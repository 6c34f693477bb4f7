//! Domain layer for llm-council
//!
//! This crate contains the core reasoning concepts, records, and
//! deterministic algorithms. It has no dependencies on infrastructure or
//! presentation concerns, and performs no I/O.
//!
//! # Core Concepts
//!
//! ## Strategies
//!
//! A [`Strategy`] is one of four fixed communication topologies:
//!
//! - **Debate** (complete graph): everyone sees everyone's earlier responses
//! - **Memory** (bus): everyone reads a compacted shared pool
//! - **Report** (star): peripherals report to a center, whose guidance flows back
//! - **Relay** (ring): each participant sees only its predecessor, then all verify
//!
//! ## Stages
//!
//! A strategy expands into a [`StagePlan`]; running a [`StageSpec`] yields a
//! closed [`Stage`] with exactly one [`ParticipantResponse`] per invoked
//! participant. Failures are recorded as placeholder responses, never omitted.
//!
//! ## Compaction
//!
//! [`CompactionPolicy`] bounds how much earlier text is folded into later
//! prompts, independently of participant count and stage depth.

pub mod compaction;
pub mod config;
pub mod core;
pub mod orchestration;
pub mod prompt;

// Re-export commonly used types
pub use compaction::{CompactedPool, CompactionPolicy, TRUNCATION_MARKER, compact};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::{
    error::DomainError,
    participant::ParticipantId,
    question::{MAX_QUESTION_CHARS, Question},
};
pub use orchestration::{
    entities::{ExecutionMode, StageKind, StagePlan, StageSpec},
    event::ProgressEvent,
    request::{GenerationOptions, MAX_PARTICIPANTS, ReasoningInput, ReasoningRequest},
    strategy::Strategy,
    value_objects::{
        FAILURE_PLACEHOLDER, OpenStage, ParticipantResponse, ReasoningResult, Stage, TokenUsage,
    },
};
pub use prompt::PromptTemplate;

//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod prompting;
pub mod resilience;
pub mod run_reasoning;
pub mod stage_executor;
pub mod stream_reasoning;
pub mod synthesize;

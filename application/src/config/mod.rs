//! Application-level configuration.
//!
//! - [`EngineConfig`]: timeouts, deadlines and the compaction policy of a run
//! - [`RetryPolicy`]: exponential backoff for transient gateway errors

pub mod engine;

pub use engine::{EngineConfig, RetryPolicy};

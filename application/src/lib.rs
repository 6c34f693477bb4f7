//! Application layer for llm-council
//!
//! This crate contains use cases, port definitions, and engine configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::{EngineConfig, RetryPolicy};
pub use ports::{
    model_gateway::{Completion, GatewayError, GatewayRegistry, ModelGateway},
    persona::{NoPersona, PersonaDecorator, RolePrefix},
    progress::{ChannelSink, CollectingSink, CompositeSink, NoProgress, ProgressSink},
};
pub use use_cases::resilience::ResilienceLayer;
pub use use_cases::run_reasoning::{ReasoningResponse, RunReasoningError, RunReasoningUseCase};
pub use use_cases::stream_reasoning::{
    EventStream, SessionRegistry, StreamOutcome, StreamReasoningUseCase, StreamingSession,
    Subscription,
};
pub use use_cases::synthesize::SUMMARY_FALLBACK;

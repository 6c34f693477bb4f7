//! Model Gateway port
//!
//! Defines the interface for invoking one model-backed participant, and the
//! registry through which the engine finds a participant's gateway.

use async_trait::async_trait;
use council_domain::{GenerationOptions, ParticipantId, TokenUsage};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during a gateway invocation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Model not available: {0}")]
    Unavailable(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl GatewayError {
    /// Whether a retry may succeed.
    ///
    /// Timeouts, rate limits, network failures and 5xx-class errors are
    /// transient; everything else fails the same way on every attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::Timeout(_)
                | GatewayError::RateLimited(_)
                | GatewayError::Network(_)
                | GatewayError::Server { .. }
        )
    }
}

/// A successful invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Model that produced the content, as reported by the provider
    pub model: String,
    pub content: String,
    pub usage: TokenUsage,
    /// Time the provider took to answer
    pub latency: Duration,
    /// Optional provider-reported confidence in [0, 1]
    pub confidence: Option<f32>,
}

impl Completion {
    pub fn new(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            content: content.into(),
            usage: TokenUsage::default(),
            latency: Duration::ZERO,
            confidence: None,
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_confidence(mut self, confidence: Option<f32>) -> Self {
        self.confidence = confidence;
        self
    }
}

/// Gateway to one participant's model
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Send a prompt and wait for the complete response
    async fn invoke(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<Completion, GatewayError>;

    /// Whether the gateway is configured well enough to be invoked
    fn is_available(&self) -> bool;

    /// Probe the backend. Defaults to [`is_available`](Self::is_available).
    async fn health_check(&self) -> bool {
        self.is_available()
    }
}

/// Participant → gateway map, constructed by the caller and passed in
#[derive(Clone, Default)]
pub struct GatewayRegistry {
    gateways: HashMap<ParticipantId, Arc<dyn ModelGateway>>,
}

impl GatewayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the gateway of `participant`
    pub fn register(&mut self, participant: ParticipantId, gateway: Arc<dyn ModelGateway>) {
        self.gateways.insert(participant, gateway);
    }

    pub fn with(mut self, participant: ParticipantId, gateway: Arc<dyn ModelGateway>) -> Self {
        self.register(participant, gateway);
        self
    }

    pub fn get(&self, participant: &ParticipantId) -> Option<Arc<dyn ModelGateway>> {
        self.gateways.get(participant).cloned()
    }

    pub fn contains(&self, participant: &ParticipantId) -> bool {
        self.gateways.contains_key(participant)
    }

    /// Registered participants, sorted
    pub fn participants(&self) -> Vec<ParticipantId> {
        let mut ids: Vec<_> = self.gateways.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.gateways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gateways.is_empty()
    }
}

impl std::fmt::Debug for GatewayRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayRegistry")
            .field("participants", &self.participants())
            .finish()
    }
}

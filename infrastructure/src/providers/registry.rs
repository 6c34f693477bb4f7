//! Gateway registry factory
//!
//! Builds the [`GatewayRegistry`] the engine is constructed with: one
//! gateway per provider of the fixed set, configured from the
//! `[providers.<name>]` tables.

use super::ProviderKind;
use super::echo::EchoGateway;
use super::http_gateway::HttpGateway;
use crate::config::FileConfig;
use council_application::ports::model_gateway::GatewayRegistry;
use council_domain::DomainError;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Identity(#[from] DomainError),
}

/// Builds gateways for every provider
#[derive(Debug, Clone, Copy, Default)]
pub struct GatewayFactory {
    /// Answer with [`EchoGateway`]s instead of calling providers
    pub dry_run: bool,
}

impl GatewayFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn build(&self, config: &FileConfig) -> Result<GatewayRegistry, ProviderError> {
        let mut registry = GatewayRegistry::new();

        if self.dry_run {
            for kind in ProviderKind::ALL {
                registry.register(kind.participant_id()?, Arc::new(EchoGateway::new(kind.as_str())));
            }
            return Ok(registry);
        }

        // Per-attempt timeouts are enforced by the engine; this only bounds
        // connection setup.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("llm-council/", env!("CARGO_PKG_VERSION")))
            .build()?;

        for kind in ProviderKind::ALL {
            let settings = config.provider(kind).resolve(kind);
            debug!(
                "Provider {}: model={}, base_url={}, key={}",
                kind,
                settings.model,
                settings.base_url,
                if settings.api_key.is_some() { "set" } else { "missing" }
            );
            registry.register(
                kind.participant_id()?,
                Arc::new(HttpGateway::new(client.clone(), settings)),
            );
        }

        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{GenerationOptions, ParticipantId};

    #[tokio::test]
    async fn test_dry_run_registers_echo_for_every_provider() {
        let registry = GatewayFactory::new()
            .dry_run(true)
            .build(&FileConfig::default())
            .unwrap();

        assert_eq!(registry.len(), ProviderKind::ALL.len());
        let gateway = registry.get(&ParticipantId::new("grok").unwrap()).unwrap();
        assert!(gateway.is_available());
        let completion = gateway.invoke("Hello", &GenerationOptions::default()).await.unwrap();
        assert!(completion.content.starts_with("[grok] Hello"));
    }

    #[test]
    fn test_live_registry_covers_provider_set() {
        let registry = GatewayFactory::new().build(&FileConfig::default()).unwrap();
        let names: Vec<String> = registry
            .participants()
            .iter()
            .map(|p| p.as_str().to_string())
            .collect();

        let mut expected = ProviderKind::names();
        expected.sort();
        assert_eq!(names, expected);
    }
}

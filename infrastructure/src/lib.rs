//! Infrastructure layer for llm-council
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: provider gateways over HTTP, the offline
//! echo gateway, and configuration file loading.

pub mod config;
pub mod providers;

// Re-export commonly used types
pub use config::{ConfigLoader, ConfigValidationError, FileConfig, FileOutputConfig};
pub use providers::{
    ProviderKind,
    echo::EchoGateway,
    http_gateway::{HttpGateway, ProviderSettings},
    registry::{GatewayFactory, ProviderError},
};

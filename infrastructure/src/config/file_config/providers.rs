//! Provider configuration from TOML (`[providers.<name>]` tables)

use crate::providers::ProviderKind;
use crate::providers::http_gateway::{ProviderSettings, read_key};
use serde::{Deserialize, Serialize};

/// Overrides for one provider; unset fields keep the provider's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    pub model: Option<String>,
    pub base_url: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
}

impl FileProviderConfig {
    pub fn api_key_env(&self, kind: ProviderKind) -> String {
        self.api_key_env
            .clone()
            .unwrap_or_else(|| kind.default_api_key_env().to_string())
    }

    /// Resolve connection settings, reading the key from the environment
    pub fn resolve(&self, kind: ProviderKind) -> ProviderSettings {
        self.resolve_with(kind, read_key)
    }

    pub(crate) fn resolve_with(
        &self,
        kind: ProviderKind,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ProviderSettings {
        ProviderSettings {
            kind,
            model: self
                .model
                .clone()
                .unwrap_or_else(|| kind.default_model().to_string()),
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| kind.default_base_url().to_string()),
            api_key: lookup(&self.api_key_env(kind)),
        }
    }
}

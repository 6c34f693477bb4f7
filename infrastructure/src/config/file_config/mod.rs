//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod defaults;
mod engine;
mod output;
mod providers;

pub use defaults::FileDefaultsConfig;
pub use engine::{FileEngineConfig, FileRetryConfig};
pub use output::FileOutputConfig;
pub use providers::FileProviderConfig;

use crate::providers::ProviderKind;
use council_application::config::EngineConfig;
use council_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Configuration that cannot be used
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid configuration:\n  {}", format_issues(.0))]
    Invalid(Vec<ConfigIssue>),
}

fn format_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("\n  ")
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Timeouts, retries and compaction
    pub engine: FileEngineConfig,
    /// Participants and strategy when none are given
    pub defaults: FileDefaultsConfig,
    /// Per-provider overrides keyed by participant name
    pub providers: BTreeMap<String, FileProviderConfig>,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks engine durations, retry and compaction parameters, the default
    /// participants and strategy, and that every `[providers.*]` table names
    /// a provider of the fixed set.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.engine.validate();

        issues.extend(self.defaults.parse_participants().1);
        issues.extend(self.defaults.parse_strategy().1);

        for name in self.providers.keys() {
            if name.parse::<ProviderKind>().is_err() {
                issues.push(ConfigIssue::warning(ConfigIssueCode::InvalidEnumValue {
                    field: "providers".to_string(),
                    value: name.clone(),
                    valid_values: ProviderKind::names(),
                }));
            }
        }

        issues
    }

    /// Validate and fail on any error-severity issue.
    ///
    /// Returns the remaining warnings for the caller to log.
    pub fn check(&self) -> Result<Vec<ConfigIssue>, ConfigValidationError> {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            self.validate().into_iter().partition(|i| i.is_error());
        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(ConfigValidationError::Invalid(errors))
        }
    }

    pub fn to_engine_config(&self) -> EngineConfig {
        self.engine.to_engine_config()
    }

    /// Overrides for `kind`, or the provider defaults
    pub fn provider(&self, kind: ProviderKind) -> FileProviderConfig {
        self.providers
            .get(kind.as_str())
            .cloned()
            .unwrap_or_default()
    }
}

//! Engine configuration from TOML (`[engine]` section)

use council_application::config::{EngineConfig, RetryPolicy};
use council_domain::{CompactionPolicy, ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry settings (`[engine.retry]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub factor: f64,
    pub max_delay_ms: u64,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_retries: policy.max_retries,
            base_delay_ms: policy.base_delay.as_millis() as u64,
            factor: policy.factor,
            max_delay_ms: policy.max_delay.as_millis() as u64,
        }
    }
}

impl FileRetryConfig {
    pub fn to_retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.base_delay_ms),
            factor: self.factor,
            max_delay: Duration::from_millis(self.max_delay_ms),
        }
    }
}

/// Raw engine configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    /// Per-call hard timeout
    pub invocation_timeout_secs: u64,
    /// Request-level overall deadline
    pub request_deadline_secs: u64,
    pub session_ttl_secs: u64,
    pub sweep_interval_secs: u64,
    pub retry: FileRetryConfig,
    pub compaction: CompactionPolicy,
}

impl Default for FileEngineConfig {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            invocation_timeout_secs: engine.invocation_timeout.as_secs(),
            request_deadline_secs: engine.request_deadline.as_secs(),
            session_ttl_secs: engine.session_ttl.as_secs(),
            sweep_interval_secs: engine.sweep_interval.as_secs(),
            retry: FileRetryConfig::default(),
            compaction: CompactionPolicy::default(),
        }
    }
}

impl FileEngineConfig {
    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_invocation_timeout(Duration::from_secs(self.invocation_timeout_secs))
            .with_request_deadline(Duration::from_secs(self.request_deadline_secs))
            .with_session_ttl(Duration::from_secs(self.session_ttl_secs))
            .with_sweep_interval(Duration::from_secs(self.sweep_interval_secs))
            .with_retry(self.retry.to_retry_policy())
            .with_compaction(self.compaction.clone())
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        for (field, value) in [
            ("engine.invocation_timeout_secs", self.invocation_timeout_secs),
            ("engine.request_deadline_secs", self.request_deadline_secs),
            ("engine.session_ttl_secs", self.session_ttl_secs),
            ("engine.sweep_interval_secs", self.sweep_interval_secs),
        ] {
            if value == 0 {
                issues.push(ConfigIssue::error(ConfigIssueCode::ZeroDuration {
                    field: field.to_string(),
                }));
            }
        }

        if self.retry.factor < 1.0 || !self.retry.factor.is_finite() {
            issues.push(ConfigIssue::error(ConfigIssueCode::OutOfRange {
                field: "engine.retry.factor".to_string(),
                value: self.retry.factor.to_string(),
                expected: ">= 1.0".to_string(),
            }));
        }
        if self.retry.max_delay_ms < self.retry.base_delay_ms {
            issues.push(ConfigIssue::warning(ConfigIssueCode::OutOfRange {
                field: "engine.retry.max_delay_ms".to_string(),
                value: self.retry.max_delay_ms.to_string(),
                expected: format!(">= base_delay_ms ({})", self.retry.base_delay_ms),
            }));
        }

        issues.extend(compaction_issues(&self.compaction));
        issues
    }
}

fn compaction_issues(policy: &CompactionPolicy) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    let mut ratios_in_range = true;
    for (field, ratio) in [
        ("engine.compaction.head_ratio", policy.head_ratio),
        ("engine.compaction.tail_ratio", policy.tail_ratio),
    ] {
        if !(0.0..=1.0).contains(&ratio) {
            ratios_in_range = false;
            issues.push(ConfigIssue::error(ConfigIssueCode::OutOfRange {
                field: field.to_string(),
                value: ratio.to_string(),
                expected: "0.0..=1.0".to_string(),
            }));
        }
    }
    if ratios_in_range && policy.head_ratio + policy.tail_ratio > 1.0 {
        issues.push(ConfigIssue::error(ConfigIssueCode::RatiosExceedBudget {
            head: policy.head_ratio.to_string(),
            tail: policy.tail_ratio.to_string(),
        }));
    }

    for (field, chars) in [
        ("engine.compaction.per_response_chars", policy.per_response_chars),
        ("engine.compaction.stage_budget_chars", policy.stage_budget_chars),
        ("engine.compaction.digest_chars", policy.digest_chars),
    ] {
        if chars == 0 {
            issues.push(ConfigIssue::error(ConfigIssueCode::OutOfRange {
                field: field.to_string(),
                value: "0".to_string(),
                expected: ">= 1".to_string(),
            }));
        }
    }

    if policy.digest_chars > policy.per_response_chars {
        issues.push(ConfigIssue::warning(ConfigIssueCode::OutOfRange {
            field: "engine.compaction.digest_chars".to_string(),
            value: policy.digest_chars.to_string(),
            expected: format!("<= per_response_chars ({})", policy.per_response_chars),
        }));
    }

    issues
}

//! Engine parameters: timeouts, retries and compaction.
//!
//! [`EngineConfig`] groups the static parameters that control a reasoning
//! run in [`RunReasoningUseCase`](crate::use_cases::run_reasoning::RunReasoningUseCase).
//! The infrastructure layer builds one from the file configuration.

use council_domain::CompactionPolicy;
use std::time::Duration;

/// Exponential backoff for retryable gateway errors.
///
/// The delay before retry `n` (1-based) is `base_delay * factor^(n-1)`,
/// capped at `max_delay`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `0` disables retrying.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub factor: f64,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
            factor: 2.0,
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Delay before retry number `retry` (1-based). Non-decreasing in `retry`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(63) as i32;
        let factor = self.factor.max(1.0).powi(exponent);
        let millis = self.base_delay.as_millis() as f64 * factor;
        let cap = self.max_delay.as_millis() as f64;
        Duration::from_millis(millis.min(cap).max(0.0) as u64)
    }
}

/// Reasoning engine parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Bound on one gateway attempt
    pub invocation_timeout: Duration,
    pub retry: RetryPolicy,
    pub compaction: CompactionPolicy,
    /// Bound on a whole run, summary included
    pub request_deadline: Duration,
    /// Lifetime of a registered streaming session that was never attached
    pub session_ttl: Duration,
    /// Period of the expired-session sweep
    pub sweep_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            invocation_timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
            compaction: CompactionPolicy::default(),
            request_deadline: Duration::from_secs(600),
            session_ttl: Duration::from_secs(900),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl EngineConfig {
    // ==================== Builder Methods ====================

    pub fn with_invocation_timeout(mut self, timeout: Duration) -> Self {
        self.invocation_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_compaction(mut self, compaction: CompactionPolicy) -> Self {
        self.compaction = compaction;
        self
    }

    pub fn with_request_deadline(mut self, deadline: Duration) -> Self {
        self.request_deadline = deadline;
        self
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = EngineConfig::default();
        assert_eq!(config.invocation_timeout, Duration::from_secs(60));
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.session_ttl, Duration::from_secs(900));
        assert_eq!(config.compaction.per_response_chars, 1500);
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(10), Duration::from_secs(8));

        let mut previous = Duration::ZERO;
        for retry in 1..40 {
            let delay = policy.delay_for(retry);
            assert!(delay >= previous);
            previous = delay;
        }
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::default()
            .with_invocation_timeout(Duration::from_secs(5))
            .with_retry(RetryPolicy::none());
        assert_eq!(config.invocation_timeout, Duration::from_secs(5));
        assert_eq!(config.retry.max_retries, 0);
    }
}

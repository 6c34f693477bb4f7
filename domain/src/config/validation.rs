//! Structured configuration issues.
//!
//! Configuration loaders report problems as [`ConfigIssue`]s instead of
//! failing on the first one, so every problem can be shown at once.
//!
//! # Examples
//!
//! ```
//! use council_domain::config::validation::{ConfigIssue, ConfigIssueCode, Severity};
//!
//! let issue = ConfigIssue::error(ConfigIssueCode::ZeroDuration {
//!     field: "engine.invocation_timeout_secs".to_string(),
//! });
//! assert_eq!(issue.severity, Severity::Error);
//! assert!(issue.message.contains("invocation_timeout_secs"));
//! ```

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A duration that must be positive is zero.
    ZeroDuration { field: String },
    /// A numeric value is outside its allowed range.
    OutOfRange { field: String, value: String, expected: String },
    /// The head and tail compaction ratios leave no room for the marker.
    RatiosExceedBudget { head: String, tail: String },
    /// A participant name is malformed.
    InvalidParticipant { field: String, value: String },
    /// A participant has no provider configuration.
    UnknownParticipant { field: String, value: String },
    /// A value does not name a known variant.
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode) -> Self {
        Self::new(Severity::Error, code)
    }

    pub fn warning(code: ConfigIssueCode) -> Self {
        Self::new(Severity::Warning, code)
    }

    fn new(severity: Severity, code: ConfigIssueCode) -> Self {
        let message = match &code {
            ConfigIssueCode::ZeroDuration { field } => format!("{} must be greater than zero", field),
            ConfigIssueCode::OutOfRange {
                field,
                value,
                expected,
            } => format!("{} = {} is out of range (expected {})", field, value, expected),
            ConfigIssueCode::RatiosExceedBudget { head, tail } => format!(
                "compaction head_ratio ({}) + tail_ratio ({}) must not exceed 1.0",
                head, tail
            ),
            ConfigIssueCode::InvalidParticipant { field, value } => {
                format!("{} contains an invalid participant name '{}'", field, value)
            }
            ConfigIssueCode::UnknownParticipant { field, value } => format!(
                "{} names '{}', which is not a configured provider",
                field, value
            ),
            ConfigIssueCode::InvalidEnumValue {
                field,
                value,
                valid_values,
            } => format!(
                "{} = '{}' is not valid (expected one of: {})",
                field,
                value,
                valid_values.join(", ")
            ),
        };
        Self {
            severity,
            code,
            message,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_value_message_lists_options() {
        let issue = ConfigIssue::warning(ConfigIssueCode::InvalidEnumValue {
            field: "defaults.strategy".to_string(),
            value: "mesh".to_string(),
            valid_values: vec!["debate".to_string(), "relay".to_string()],
        });
        assert!(!issue.is_error());
        assert_eq!(
            issue.to_string(),
            "warning: defaults.strategy = 'mesh' is not valid (expected one of: debate, relay)"
        );
    }

    #[test]
    fn test_unknown_participant_is_reported_by_name() {
        let issue = ConfigIssue::error(ConfigIssueCode::UnknownParticipant {
            field: "defaults.participants".to_string(),
            value: "llama".to_string(),
        });
        assert!(issue.is_error());
        assert!(issue.message.contains("'llama'"));
    }
}

//! Request defaults from TOML (`[defaults]` section)

use crate::providers::ProviderKind;
use council_domain::{ConfigIssue, ConfigIssueCode, ParticipantId, Strategy};
use serde::{Deserialize, Serialize};

/// Participants and strategy used when the command line names none
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDefaultsConfig {
    pub participants: Vec<String>,
    pub strategy: String,
}

impl Default for FileDefaultsConfig {
    fn default() -> Self {
        Self {
            participants: vec![
                ProviderKind::OpenAi.as_str().to_string(),
                ProviderKind::Anthropic.as_str().to_string(),
            ],
            strategy: Strategy::default().as_str().to_string(),
        }
    }
}

impl FileDefaultsConfig {
    /// Parse the default participant list, skipping entries that fail.
    pub fn parse_participants(&self) -> (Vec<ParticipantId>, Vec<ConfigIssue>) {
        let field = "defaults.participants";
        let mut participants = Vec::new();
        let mut issues = Vec::new();

        if self.participants.is_empty() {
            issues.push(ConfigIssue::error(ConfigIssueCode::OutOfRange {
                field: field.to_string(),
                value: "[]".to_string(),
                expected: "at least one participant".to_string(),
            }));
        }

        for raw in &self.participants {
            let id = match raw.parse::<ParticipantId>() {
                Ok(id) => id,
                Err(_) => {
                    issues.push(ConfigIssue::error(ConfigIssueCode::InvalidParticipant {
                        field: field.to_string(),
                        value: raw.clone(),
                    }));
                    continue;
                }
            };
            if id.as_str().parse::<ProviderKind>().is_err() {
                issues.push(ConfigIssue::error(ConfigIssueCode::UnknownParticipant {
                    field: field.to_string(),
                    value: raw.clone(),
                }));
                continue;
            }
            participants.push(id);
        }

        (participants, issues)
    }

    /// Parse the default strategy, falling back to debate.
    pub fn parse_strategy(&self) -> (Strategy, Vec<ConfigIssue>) {
        match self.strategy.parse::<Strategy>() {
            Ok(strategy) => (strategy, vec![]),
            Err(_) => {
                let issue = ConfigIssue::warning(ConfigIssueCode::InvalidEnumValue {
                    field: "defaults.strategy".to_string(),
                    value: self.strategy.clone(),
                    valid_values: Strategy::ALL.iter().map(|s| s.as_str().to_string()).collect(),
                });
                (Strategy::default(), vec![issue])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse_cleanly() {
        let config = FileDefaultsConfig::default();
        let (participants, issues) = config.parse_participants();
        assert!(issues.is_empty());
        assert_eq!(participants.len(), 2);
        assert_eq!(config.parse_strategy().0, Strategy::Debate);
    }

    #[test]
    fn test_topology_alias_is_accepted() {
        let config: FileDefaultsConfig = toml::from_str(r#"strategy = "Ring""#).unwrap();
        let (strategy, issues) = config.parse_strategy();
        assert_eq!(strategy, Strategy::Relay);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_unknown_strategy_falls_back_with_warning() {
        let config = FileDefaultsConfig {
            strategy: "mesh".to_string(),
            ..Default::default()
        };
        let (strategy, issues) = config.parse_strategy();
        assert_eq!(strategy, Strategy::Debate);
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error());
    }

    #[test]
    fn test_bad_participants_are_reported() {
        let config = FileDefaultsConfig {
            participants: vec![
                "gemini".to_string(),
                "not valid!".to_string(),
                "llama".to_string(),
            ],
            ..Default::default()
        };
        let (participants, issues) = config.parse_participants();
        assert_eq!(participants.len(), 1);
        assert_eq!(participants[0].as_str(), "gemini");
        assert!(matches!(issues[0].code, ConfigIssueCode::InvalidParticipant { .. }));
        assert!(matches!(issues[1].code, ConfigIssueCode::UnknownParticipant { .. }));
    }

    #[test]
    fn test_empty_participants_is_error() {
        let config = FileDefaultsConfig {
            participants: vec![],
            ..Default::default()
        };
        let (_, issues) = config.parse_participants();
        assert!(issues[0].is_error());
    }
}

//! Participant identity value object

use crate::core::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Maximum length of a participant identity
pub const MAX_PARTICIPANT_ID_LEN: usize = 64;

/// Stable identity of one model-backed participant (Value Object)
///
/// Identities are lowercase ASCII made of letters, digits, `.`, `_` and `-`,
/// e.g. `openai`, `anthropic`, `local.llama-3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Validate and create a participant identity
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        let valid = !id.is_empty()
            && id.len() <= MAX_PARTICIPANT_ID_LEN
            && id
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'));

        if valid {
            Ok(Self(id))
        } else {
            Err(DomainError::InvalidParticipant(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ParticipantId {
    type Err = DomainError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::new(s.trim().to_ascii_lowercase())
    }
}

impl Serialize for ParticipantId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ParticipantId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identities() {
        assert!(ParticipantId::new("openai").is_ok());
        assert!(ParticipantId::new("local.llama-3_8b").is_ok());
    }

    #[test]
    fn test_invalid_identities() {
        assert!(ParticipantId::new("").is_err());
        assert!(ParticipantId::new("Open AI").is_err());
        assert!(ParticipantId::new("a".repeat(MAX_PARTICIPANT_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_from_str_normalizes_case() {
        let id: ParticipantId = " Gemini ".parse().unwrap();
        assert_eq!(id.as_str(), "gemini");
    }

    #[test]
    fn test_serde_as_plain_string() {
        let id = ParticipantId::new("deepseek").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"deepseek\"");
        let back: ParticipantId = serde_json::from_str("\"deepseek\"").unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<ParticipantId>("\"bad id\"").is_err());
    }
}

//! Question value object

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Maximum question length, in characters
pub const MAX_QUESTION_CHARS: usize = 1000;

/// A question to be reasoned about by the participants (Value Object)
///
/// Guaranteed non-blank and at most [`MAX_QUESTION_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Question {
    content: String,
}

impl Question {
    /// Create a validated question.
    pub fn new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::EmptyQuestion);
        }
        let len = content.chars().count();
        if len > MAX_QUESTION_CHARS {
            return Err(DomainError::QuestionTooLong {
                len,
                max: MAX_QUESTION_CHARS,
            });
        }
        Ok(Self { content })
    }

    /// Get the question content
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl TryFrom<&str> for Question {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Question::new(s)
    }
}

impl TryFrom<String> for Question {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Question::new(s)
    }
}

impl<'de> Deserialize<'de> for Question {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Question::new(s).map_err(serde::de::Error::custom)
    }
}

//! Model provider adapters
//!
//! Every provider in the fixed set speaks the OpenAI-compatible
//! chat-completions protocol, so one HTTP gateway serves them all; they
//! differ only in base URL, default model and API-key variable.

pub mod echo;
pub mod http_gateway;
pub mod registry;

use council_domain::{DomainError, ParticipantId};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Gemini,
    DeepSeek,
    Mistral,
    Grok,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 6] = [
        ProviderKind::OpenAi,
        ProviderKind::Anthropic,
        ProviderKind::Gemini,
        ProviderKind::DeepSeek,
        ProviderKind::Mistral,
        ProviderKind::Grok,
    ];

    /// Participant identity of the provider
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Gemini => "gemini",
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::Mistral => "mistral",
            ProviderKind::Grok => "grok",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-4o-mini",
            ProviderKind::Anthropic => "claude-3-5-haiku-latest",
            ProviderKind::Gemini => "gemini-2.0-flash",
            ProviderKind::DeepSeek => "deepseek-chat",
            ProviderKind::Mistral => "mistral-small-latest",
            ProviderKind::Grok => "grok-2-latest",
        }
    }

    /// Base URL of the provider's OpenAI-compatible endpoint
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::Anthropic => "https://api.anthropic.com/v1",
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
            ProviderKind::DeepSeek => "https://api.deepseek.com/v1",
            ProviderKind::Mistral => "https://api.mistral.ai/v1",
            ProviderKind::Grok => "https://api.x.ai/v1",
        }
    }

    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::DeepSeek => "DEEPSEEK_API_KEY",
            ProviderKind::Mistral => "MISTRAL_API_KEY",
            ProviderKind::Grok => "XAI_API_KEY",
        }
    }

    pub fn participant_id(&self) -> Result<ParticipantId, DomainError> {
        ParticipantId::new(self.as_str())
    }

    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(|k| k.as_str().to_string()).collect()
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| format!("unknown provider '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for kind in ProviderKind::ALL {
            assert_eq!(kind.as_str().parse::<ProviderKind>(), Ok(kind));
            assert_eq!(kind.participant_id().unwrap().as_str(), kind.as_str());
        }
        assert_eq!("  OpenAI ".parse::<ProviderKind>(), Ok(ProviderKind::OpenAi));
        assert!("llama".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_base_urls_have_no_trailing_slash() {
        for kind in ProviderKind::ALL {
            assert!(!kind.default_base_url().ends_with('/'));
            assert!(kind.default_base_url().starts_with("https://"));
        }
    }
}

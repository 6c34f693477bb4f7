//! Reasoning request: the validated, immutable input of a run.
//!
//! [`ReasoningInput`] is the raw inbound shape (strings as received);
//! [`ReasoningRequest`] is what the engine accepts after validation.

use crate::core::error::DomainError;
use crate::core::participant::ParticipantId;
use crate::core::question::Question;
use crate::orchestration::entities::StagePlan;
use crate::orchestration::strategy::Strategy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum number of participants in one request
pub const MAX_PARTICIPANTS: usize = 6;
/// Upper bound of `max_tokens`
pub const MAX_TOKENS_LIMIT: u32 = 8192;

/// Per-call tuning passed through to every gateway invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl GenerationOptions {
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(t) = self.temperature
            && !(0.0..=2.0).contains(&t)
        {
            return Err(DomainError::InvalidOption {
                field: "temperature",
                reason: format!("{} is outside 0..=2", t),
            });
        }
        if let Some(m) = self.max_tokens
            && !(1..=MAX_TOKENS_LIMIT).contains(&m)
        {
            return Err(DomainError::InvalidOption {
                field: "maxTokens",
                reason: format!("{} is outside 1..={}", m, MAX_TOKENS_LIMIT),
            });
        }
        if let Some(p) = self.top_p
            && !(0.0..=1.0).contains(&p)
        {
            return Err(DomainError::InvalidOption {
                field: "topP",
                reason: format!("{} is outside 0..=1", p),
            });
        }
        Ok(())
    }
}

/// Raw inbound request, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningInput {
    pub question: String,
    pub participants: Vec<String>,
    pub strategy: String,
    #[serde(default)]
    pub options: Option<GenerationOptions>,
    /// Participant → persona id
    #[serde(default)]
    pub personas: BTreeMap<String, String>,
}

impl ReasoningInput {
    pub fn new(
        question: impl Into<String>,
        participants: Vec<String>,
        strategy: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            participants,
            strategy: strategy.into(),
            options: None,
            personas: BTreeMap::new(),
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_persona(mut self, participant: impl Into<String>, persona: impl Into<String>) -> Self {
        self.personas.insert(participant.into(), persona.into());
        self
    }
}

/// A validated reasoning request (immutable once accepted)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReasoningRequest {
    question: Question,
    participants: Vec<ParticipantId>,
    strategy: Strategy,
    options: GenerationOptions,
    personas: BTreeMap<ParticipantId, String>,
}

impl ReasoningRequest {
    /// Validate participant count and distinctness.
    pub fn new(
        question: Question,
        participants: Vec<ParticipantId>,
        strategy: Strategy,
    ) -> Result<Self, DomainError> {
        if participants.is_empty() {
            return Err(DomainError::NoParticipants);
        }
        if participants.len() > MAX_PARTICIPANTS {
            return Err(DomainError::TooManyParticipants {
                count: participants.len(),
                max: MAX_PARTICIPANTS,
            });
        }
        for (i, p) in participants.iter().enumerate() {
            if participants[..i].contains(p) {
                return Err(DomainError::DuplicateParticipant(p.to_string()));
            }
        }

        Ok(Self {
            question,
            participants,
            strategy,
            options: GenerationOptions::default(),
            personas: BTreeMap::new(),
        })
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Result<Self, DomainError> {
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    /// Attach a persona to a participant of this request.
    pub fn with_persona(
        mut self,
        participant: ParticipantId,
        persona: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if !self.participants.contains(&participant) {
            return Err(DomainError::InvalidParticipant(participant.to_string()));
        }
        self.personas.insert(participant, persona.into());
        Ok(self)
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn participants(&self) -> &[ParticipantId] {
        &self.participants
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    pub fn persona_for(&self, participant: &ParticipantId) -> Option<&str> {
        self.personas.get(participant).map(String::as_str)
    }

    /// Participant that writes the closing summary
    pub fn summarizer(&self) -> &ParticipantId {
        &self.participants[0]
    }

    pub fn plan(&self) -> StagePlan {
        StagePlan::new(self.strategy, &self.participants)
    }
}

impl TryFrom<ReasoningInput> for ReasoningRequest {
    type Error = DomainError;

    fn try_from(input: ReasoningInput) -> Result<Self, Self::Error> {
        let question = Question::new(input.question)?;
        let strategy: Strategy = input.strategy.parse()?;
        let participants = input
            .participants
            .iter()
            .map(|p| p.parse::<ParticipantId>())
            .collect::<Result<Vec<_>, _>>()?;

        let mut request = ReasoningRequest::new(question, participants, strategy)?
            .with_options(input.options.unwrap_or_default())?;
        for (participant, persona) in input.personas {
            request = request.with_persona(participant.parse()?, persona)?;
        }
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(participants: &[&str], strategy: &str) -> ReasoningInput {
        ReasoningInput::new(
            "Is remote work beneficial?",
            participants.iter().map(|p| p.to_string()).collect(),
            strategy,
        )
    }

    #[test]
    fn test_valid_input_is_accepted() {
        let request = ReasoningRequest::try_from(input(&["a", "b"], "debate")).unwrap();
        assert_eq!(request.participants().len(), 2);
        assert_eq!(request.strategy(), Strategy::Debate);
        assert_eq!(request.summarizer().as_str(), "a");
        assert_eq!(request.plan().len(), 3);
    }

    #[test]
    fn test_participant_count_bounds() {
        assert_eq!(
            ReasoningRequest::try_from(input(&[], "debate")),
            Err(DomainError::NoParticipants)
        );
        assert!(matches!(
            ReasoningRequest::try_from(input(&["a", "b", "c", "d", "e", "f", "g"], "debate")),
            Err(DomainError::TooManyParticipants { count: 7, max: 6 })
        ));
    }

    #[test]
    fn test_duplicate_participants_rejected() {
        assert_eq!(
            ReasoningRequest::try_from(input(&["a", "b", "A"], "relay")),
            Err(DomainError::DuplicateParticipant("a".to_string()))
        );
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        assert!(matches!(
            ReasoningRequest::try_from(input(&["a"], "tournament")),
            Err(DomainError::UnknownStrategy(_))
        ));
    }

    #[test]
    fn test_options_are_range_checked() {
        let too_hot = input(&["a"], "debate").with_options(GenerationOptions {
            temperature: Some(2.5),
            ..Default::default()
        });
        assert!(matches!(
            ReasoningRequest::try_from(too_hot),
            Err(DomainError::InvalidOption { field: "temperature", .. })
        ));

        let too_long = input(&["a"], "debate").with_options(GenerationOptions {
            max_tokens: Some(MAX_TOKENS_LIMIT + 1),
            ..Default::default()
        });
        assert!(ReasoningRequest::try_from(too_long).is_err());

        let fine = input(&["a"], "debate").with_options(GenerationOptions {
            temperature: Some(0.7),
            max_tokens: Some(512),
            top_p: Some(0.9),
        });
        assert!(ReasoningRequest::try_from(fine).is_ok());
    }

    #[test]
    fn test_persona_must_name_a_participant() {
        let ok = input(&["a", "b"], "memory").with_persona("b", "skeptic");
        let request = ReasoningRequest::try_from(ok).unwrap();
        let b = ParticipantId::new("b").unwrap();
        assert_eq!(request.persona_for(&b), Some("skeptic"));

        let stranger = input(&["a"], "memory").with_persona("z", "skeptic");
        assert!(ReasoningRequest::try_from(stranger).is_err());
    }

    #[test]
    fn test_input_deserializes_from_wire_json() {
        let json = r#"{
            "question": "Is remote work beneficial?",
            "participants": ["openai", "anthropic"],
            "strategy": "debate",
            "options": {"temperature": 0.5, "maxTokens": 1024}
        }"#;
        let input: ReasoningInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.options.as_ref().unwrap().max_tokens, Some(1024));
        assert!(input.personas.is_empty());
    }
}

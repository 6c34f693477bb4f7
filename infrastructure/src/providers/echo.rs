//! Offline gateway for dry runs

use async_trait::async_trait;
use council_application::ports::model_gateway::{Completion, GatewayError, ModelGateway};
use council_domain::{GenerationOptions, TokenUsage, compact};
use std::time::Duration;

/// Characters of the prompt echoed back in a reply
const ECHO_CHARS: usize = 160;

/// Deterministic gateway that answers without network access.
///
/// The reply names the participant and quotes the head of the prompt, so a
/// dry run shows which context reached which participant.
#[derive(Debug, Clone)]
pub struct EchoGateway {
    name: String,
}

impl EchoGateway {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn reply(&self, prompt: &str) -> String {
        let first_line = prompt.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        format!(
            "[{}] {} ({} prompt chars)",
            self.name,
            compact(first_line.trim(), ECHO_CHARS),
            prompt.chars().count()
        )
    }
}

#[async_trait]
impl ModelGateway for EchoGateway {
    async fn invoke(
        &self,
        prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<Completion, GatewayError> {
        let content = self.reply(prompt);
        let usage = TokenUsage::new(word_count(prompt), word_count(&content));
        Ok(Completion::new(format!("echo-{}", self.name), content)
            .with_usage(usage)
            .with_latency(Duration::ZERO))
    }

    fn is_available(&self) -> bool {
        true
    }
}

fn word_count(text: &str) -> u32 {
    u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX)
}

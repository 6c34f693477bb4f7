//! Summary synthesizer
//!
//! Asks the request's first participant for a closing synthesis over the
//! whole transcript. A failed synthesis is not fatal: the transcript is the
//! primary deliverable, so [`SUMMARY_FALLBACK`] takes the summary's place.

use crate::ports::model_gateway::GatewayRegistry;
use crate::use_cases::prompting::StagePrompter;
use crate::use_cases::resilience::ResilienceLayer;
use crate::use_cases::stage_executor::invoke;
use council_domain::{ReasoningRequest, Stage};
use tracing::{info, warn};

/// Summary text used when the closing synthesis could not be produced
pub const SUMMARY_FALLBACK: &str =
    "Summary unavailable: the closing synthesis could not be generated. The stage transcript is complete.";

pub struct SummarySynthesizer<'a> {
    registry: &'a GatewayRegistry,
    resilience: &'a ResilienceLayer,
}

impl<'a> SummarySynthesizer<'a> {
    pub fn new(registry: &'a GatewayRegistry, resilience: &'a ResilienceLayer) -> Self {
        Self {
            registry,
            resilience,
        }
    }

    pub async fn synthesize(
        &self,
        request: &ReasoningRequest,
        prompter: &StagePrompter<'_>,
        stages: &[Stage],
    ) -> String {
        let summarizer = request.summarizer().clone();
        info!("Synthesizing summary with {}", summarizer);

        let prompt = prompter.summary_prompt(stages);
        let gateway = self.registry.get(&summarizer);
        let response = invoke(
            summarizer,
            gateway,
            prompt,
            request.options().clone(),
            self.resilience.clone(),
        )
        .await;

        if response.success && !response.content.trim().is_empty() {
            response.content
        } else {
            warn!(
                "Summary synthesis failed ({}), using fallback",
                response.error.as_deref().unwrap_or("empty summary")
            );
            SUMMARY_FALLBACK.to_string()
        }
    }
}

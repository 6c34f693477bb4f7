//! Output formatter trait

use council_application::{ReasoningResponse, RunReasoningError};
use council_domain::{OutputFormat, ReasoningResult};

/// Trait for formatting reasoning results
pub trait OutputFormatter {
    /// Every stage and response, then the summary
    fn format(&self, result: &ReasoningResult) -> String;

    /// The response envelope as JSON
    fn format_json(&self, response: &ReasoningResponse) -> String;

    /// Summary only (concise output)
    fn format_summary_only(&self, result: &ReasoningResult) -> String;

    /// Render a successful run in `format`
    fn render(&self, format: OutputFormat, result: ReasoningResult) -> String {
        match format {
            OutputFormat::Full => self.format(&result),
            OutputFormat::Summary => self.format_summary_only(&result),
            OutputFormat::Json => self.format_json(&ReasoningResponse::from(Ok::<_, RunReasoningError>(result))),
        }
    }
}

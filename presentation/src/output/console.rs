//! Console output formatter for reasoning results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use council_application::ReasoningResponse;
use council_domain::{ParticipantResponse, ReasoningResult, Stage};

/// Formats reasoning results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete reasoning result
    pub fn format(result: &ReasoningResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("LLM Council Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Question:".cyan().bold(),
            result.question
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Strategy:".cyan().bold(),
            result.strategy.display_name()
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Participants:".cyan().bold(),
            Self::participant_list(result)
        ));

        for stage in &result.stages {
            output.push_str(&Self::stage(stage));
        }

        output.push_str(&Self::section_header("Summary"));
        output.push_str(&format!("\n{}\n", result.summary));

        let usage = result.total_usage();
        output.push_str(&format!(
            "\n{}\n",
            format!(
                "{} responses, {} tokens, {:.1}s",
                result.response_count(),
                usage.total_tokens,
                result.duration_ms as f64 / 1000.0
            )
            .dimmed()
        ));

        output.push_str(&Self::footer());

        output
    }

    /// Format the response envelope as JSON
    pub fn format_json(response: &ReasoningResponse) -> String {
        serde_json::to_string_pretty(response).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format summary only (concise output)
    pub fn format_summary_only(result: &ReasoningResult) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== LLM Council Conclusion ===".cyan().bold()
        ));

        output.push_str(&format!("{} {}\n\n", "Q:".bold(), result.question));

        output.push_str(&format!(
            "{} {} ({})\n\n",
            "Participants consulted:".dimmed(),
            Self::participant_list(result),
            result.strategy.display_name()
        ));

        output.push_str(&result.summary);
        output.push('\n');

        output
    }

    fn stage(stage: &Stage) -> String {
        let mut output = Self::section_header(&format!("Stage {}: {}", stage.number, stage.title));
        output.push_str(&format!("{}\n", stage.description.dimmed()));
        for response in &stage.responses {
            output.push_str(&Self::response(response));
        }
        output
    }

    fn response(response: &ParticipantResponse) -> String {
        let title = format!("── {} ──", response.participant);
        if response.success {
            format!("\n{}\n{}\n", title.yellow().bold(), response.content)
        } else {
            format!(
                "\n{}\n{} ({})\n",
                title.red().bold(),
                response.content,
                response.error.as_deref().unwrap_or("Unknown")
            )
        }
    }

    fn participant_list(result: &ReasoningResult) -> String {
        result
            .participants
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, result: &ReasoningResult) -> String {
        Self::format(result)
    }

    fn format_json(&self, response: &ReasoningResponse) -> String {
        Self::format_json(response)
    }

    fn format_summary_only(&self, result: &ReasoningResult) -> String {
        Self::format_summary_only(result)
    }
}

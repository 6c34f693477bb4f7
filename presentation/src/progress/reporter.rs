//! Progress reporting for reasoning runs
//!
//! Both reporters draw on stderr so stdout carries only the result.

use colored::Colorize;
use council_application::ports::progress::ProgressSink;
use council_domain::{ParticipantResponse, ProgressEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports progress with a single overall progress bar
pub struct ProgressReporter {
    bar: ProgressBar,
    stage_title: Mutex<String>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(Self::bar_style());
        Self {
            bar,
            stage_title: Mutex::new(String::new()),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .map(|style| style.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
    }

    fn set_progress(&self, progress: u8) {
        // Progress never decreases, but a late event must not rewind the bar
        if u64::from(progress) > self.bar.position() {
            self.bar.set_position(u64::from(progress));
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ProgressReporter {
    fn publish(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::StageStart {
                stage,
                title,
                progress,
            } => {
                self.bar.set_prefix(format!("Stage {}", stage));
                self.bar.set_message(format!("{}...", title));
                if let Ok(mut current) = self.stage_title.lock() {
                    *current = title;
                }
                self.set_progress(progress);
            }
            ProgressEvent::ParticipantInvoked { participant, .. } => {
                self.bar.set_message(format!("{} thinking...", participant));
            }
            ProgressEvent::ParticipantResolved {
                progress, response, ..
            } => {
                self.bar.println(format!("  {}", resolved_line(&response)));
                self.set_progress(progress);
            }
            ProgressEvent::StageComplete {
                stage,
                progress,
                stage_data,
            } => {
                let title = self
                    .stage_title
                    .lock()
                    .map(|t| t.clone())
                    .unwrap_or_default();
                self.bar.println(format!(
                    "{} Stage {}: {} ({}/{} responded)",
                    "->".cyan(),
                    stage,
                    title.bold(),
                    stage_data.responses.len() - stage_data.failed_count(),
                    stage_data.responses.len()
                ));
                self.set_progress(progress);
            }
            ProgressEvent::ResultComplete { .. } => {
                self.bar.set_position(100);
                self.bar.finish_and_clear();
            }
            ProgressEvent::Error { message } => {
                self.bar.abandon_with_message(format!("{}", message.red()));
            }
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressSink for SimpleProgress {
    fn publish(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::StageStart {
                stage,
                title,
                progress,
            } => {
                eprintln!(
                    "{} {} ({}%)",
                    "->".cyan(),
                    format!("Stage {}: {}", stage, title).bold(),
                    progress
                );
            }
            ProgressEvent::ParticipantInvoked { .. } => {}
            ProgressEvent::ParticipantResolved { response, .. } => {
                eprintln!("  {}", resolved_line(&response));
            }
            ProgressEvent::StageComplete { .. } => eprintln!(),
            ProgressEvent::ResultComplete { .. } => {}
            ProgressEvent::Error { message } => eprintln!("{} {}", "x".red(), message),
        }
    }
}

fn resolved_line(response: &ParticipantResponse) -> String {
    if response.success {
        format!(
            "{} {} ({} ms)",
            "v".green(),
            response.participant,
            response.latency_ms
        )
    } else {
        format!(
            "{} {} ({})",
            "x".red(),
            response.participant,
            response.error.as_deref().unwrap_or("failed")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{ParticipantId, TokenUsage};
    use std::time::Duration;

    #[test]
    fn test_resolved_line_names_participant_and_outcome() {
        let id = ParticipantId::new("openai").unwrap();
        let ok = ParticipantResponse::success(
            id.clone(),
            "yes",
            TokenUsage::new(1, 1),
            Duration::from_millis(42),
        );
        let failed = ParticipantResponse::failure(id, "rate limited", Duration::ZERO);

        assert!(resolved_line(&ok).contains("openai (42 ms)"));
        assert!(resolved_line(&failed).contains("openai (rate limited)"));
    }

    #[test]
    fn test_bar_never_rewinds() {
        let reporter = ProgressReporter::new();
        reporter.set_progress(40);
        reporter.set_progress(20);
        assert_eq!(reporter.bar.position(), 40);
    }
}

//! Server-sent-event framing of progress events
//!
//! Each event becomes one frame:
//!
//! ```text
//! event: model_complete
//! data: {"stage":1,"model":"openai","progress":25,...}
//!
//! ```

use council_domain::ProgressEvent;
use std::fmt;

/// One rendered event frame
#[derive(Debug, Clone, PartialEq)]
pub struct SseFrame {
    pub event: &'static str,
    pub data: String,
}

impl From<&ProgressEvent> for SseFrame {
    fn from(event: &ProgressEvent) -> Self {
        Self {
            event: event.wire_name(),
            data: event.wire_payload().to_string(),
        }
    }
}

impl fmt::Display for SseFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "event: {}", self.event)?;
        // A data line must not contain a raw newline
        for line in self.data.lines() {
            writeln!(f, "data: {}", line)?;
        }
        writeln!(f)
    }
}

/// Render `event` as a frame
pub fn sse_frame(event: &ProgressEvent) -> String {
    SseFrame::from(event).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{ParticipantId, ParticipantResponse};
    use std::time::Duration;

    #[test]
    fn test_stage_start_frame() {
        let frame = sse_frame(&ProgressEvent::StageStart {
            stage: 1,
            title: "Opening Statements".to_string(),
            progress: 0,
        });

        let mut lines = frame.lines();
        assert_eq!(lines.next(), Some("event: stage_start"));
        let data = lines.next().unwrap().strip_prefix("data: ").unwrap();
        let payload: serde_json::Value = serde_json::from_str(data).unwrap();
        assert_eq!(payload["stage"], 1);
        assert_eq!(payload["title"], "Opening Statements");
        assert!(frame.ends_with("\n\n"));
    }

    #[test]
    fn test_failed_response_frame_is_model_error() {
        let event = ProgressEvent::ParticipantResolved {
            stage: 2,
            participant: ParticipantId::new("grok").unwrap(),
            progress: 50,
            response: ParticipantResponse::failure(
                ParticipantId::new("grok").unwrap(),
                "timed out",
                Duration::ZERO,
            ),
        };

        let frame = SseFrame::from(&event);
        assert_eq!(frame.event, "model_error");
        assert!(frame.data.contains("\"error\":\"timed out\""));
        assert_eq!(frame.to_string().matches("data: ").count(), 1);
    }

    #[test]
    fn test_error_frame() {
        let frame = sse_frame(&ProgressEvent::Error {
            message: "deadline exceeded".to_string(),
        });
        assert_eq!(
            frame,
            "event: error\ndata: {\"message\":\"deadline exceeded\"}\n\n"
        );
    }
}

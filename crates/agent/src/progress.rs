//! Progress events emitted while a workflow runs with `verbose` enabled.
//!
//! Progress is a presentation channel, separate from `tracing` logs. Sinks
//! only observe; nothing they do can change the run.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::workflow::TerminalReason;

/// One step of a run, as seen from the outside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// The run began.
    Started { run_id: Uuid, max_iterations: u32 },

    /// A new iteration (1-based).
    Iteration { number: u32 },

    /// Raw text returned by the model.
    ModelResponse { text: String },

    /// A tool is about to run.
    ToolCall { tool: String, input: String },

    /// The (possibly truncated) observation a tool produced.
    Observation { preview: String },

    /// The response was unusable and the model was nudged.
    Nudge,

    /// The model call for this iteration timed out.
    Timeout { iteration: u32 },

    /// The run ended.
    Finished {
        reason: TerminalReason,
        iterations: u32,
    },
}

impl ProgressEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::Iteration { .. } => "iteration",
            Self::ModelResponse { .. } => "model_response",
            Self::ToolCall { .. } => "tool_call",
            Self::Observation { .. } => "observation",
            Self::Nudge => "nudge",
            Self::Timeout { .. } => "timeout",
            Self::Finished { .. } => "finished",
        }
    }
}

/// Receives progress events.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: &ProgressEvent);
}

/// Prints a human-readable trace to stderr.
pub struct StderrProgress;

impl StderrProgress {
    fn render(event: &ProgressEvent) -> String {
        let rule = "=".repeat(50);
        match event {
            ProgressEvent::Started { run_id, .. } => {
                format!("\n{rule}\nAGENT STARTING ({run_id})\n{rule}")
            }
            ProgressEvent::Iteration { number } => format!("\n--- Iteration {number} ---"),
            ProgressEvent::ModelResponse { text } => format!("LLM Response:\n{text}"),
            ProgressEvent::ToolCall { tool, input } => format!("\nExecuting: {tool}({input})"),
            ProgressEvent::Observation { preview } => format!("Observation: {preview}"),
            ProgressEvent::Nudge => "(no action or final answer, nudging)".to_string(),
            ProgressEvent::Timeout { iteration } => {
                format!("Model call timed out on iteration {iteration}, retrying")
            }
            ProgressEvent::Finished { reason, iterations } => {
                format!("\n{rule}\nAGENT FINISHED: {reason} after {iterations} iteration(s)\n{rule}")
            }
        }
    }
}

impl ProgressSink for StderrProgress {
    fn emit(&self, event: &ProgressEvent) {
        eprintln!("{}", Self::render(event));
    }
}

/// First `max_chars` characters of `text`, with `...` appended when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization_is_tagged() {
        let json = serde_json::to_string(&ProgressEvent::Iteration { number: 2 }).unwrap();
        assert_eq!(json, r#"{"type":"iteration","number":2}"#);

        let json = serde_json::to_string(&ProgressEvent::Finished {
            reason: TerminalReason::LoopDetected,
            iterations: 3,
        })
        .unwrap();
        assert!(json.contains(r#""reason":"loop_detected""#));
    }

    #[test]
    fn event_type_matches_serde_tag() {
        let events = [
            ProgressEvent::Nudge,
            ProgressEvent::Timeout { iteration: 1 },
            ProgressEvent::ToolCall {
                tool: "t".into(),
                input: "i".into(),
            },
        ];
        for event in events {
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(value["type"], event.event_type());
        }
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        assert_eq!(preview("short", 200), "short");
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("ééééé", 2), "éé...");
        assert_eq!(preview("exact", 5), "exact");
    }

    #[test]
    fn stderr_rendering_names_the_step() {
        let text = StderrProgress::render(&ProgressEvent::Iteration { number: 4 });
        assert_eq!(text, "\n--- Iteration 4 ---");
    }
}

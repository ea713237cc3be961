//! Classifies one block of model output as a final answer, a tool call, or
//! noise.
//!
//! The model writes free text in the `Thought / Action / Action Input`
//! format. Anything it invents after an `Observation:` marker is discarded
//! before classification, since observations come from tools, not from the
//! model.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static FINAL_ANSWER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Final Answer\s*:").expect("static regex"));

static ACTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Action\s*:\s*(\w+)").expect("static regex"));

static ACTION_INPUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Action Input\s*:\s*([^\n]*)").expect("static regex"));

/// Where the model's turn ends. Providers can use it as a stop sequence.
pub const OBSERVATION_MARKER: &str = "Observation:";

/// The meaning of one model response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InterpretedResponse {
    /// The model is done.
    Final { answer: String },

    /// The model wants a tool run.
    Action { tool_name: String, raw_input: String },

    /// Neither marker was found.
    Unparseable,
}

/// Interpret a raw model response. Never fails.
pub fn interpret(response: &str) -> InterpretedResponse {
    let text = match response.find(OBSERVATION_MARKER) {
        Some(pos) => &response[..pos],
        None => response,
    };

    if let Some(m) = FINAL_ANSWER_RE.find(text) {
        return InterpretedResponse::Final {
            answer: text[m.end()..].trim().to_string(),
        };
    }

    if let Some(caps) = ACTION_RE.captures(text) {
        let tool_name = caps[1].to_string();
        let raw_input = ACTION_INPUT_RE
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();
        return InterpretedResponse::Action {
            tool_name,
            raw_input,
        };
    }

    InterpretedResponse::Unparseable
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(tool: &str, input: &str) -> InterpretedResponse {
        InterpretedResponse::Action {
            tool_name: tool.into(),
            raw_input: input.into(),
        }
    }

    #[test]
    fn final_answer_is_trimmed_remainder() {
        let r = interpret("Thought: done.\nFinal Answer:   Tesla is an EV maker.\n\n");
        assert_eq!(
            r,
            InterpretedResponse::Final {
                answer: "Tesla is an EV maker.".into()
            }
        );
    }

    #[test]
    fn final_answer_keeps_multiple_lines() {
        let r = interpret("Final Answer: line one\nline two");
        assert_eq!(
            r,
            InterpretedResponse::Final {
                answer: "line one\nline two".into()
            }
        );
    }

    #[test]
    fn final_answer_wins_over_action() {
        let r = interpret("Action: get_company_info\nAction Input: Tesla\nFinal Answer: ok");
        assert!(matches!(r, InterpretedResponse::Final { .. }));
    }

    #[test]
    fn hallucinated_observation_is_discarded() {
        let r = interpret(
            "Action: get_company_info\nAction Input: Apple\nObservation: made up\nFinal Answer: fake",
        );
        assert_eq!(r, action("get_company_info", "Apple"));
    }

    #[test]
    fn action_with_input() {
        let r = interpret("Thought: look it up\nAction: get_company_info\nAction Input: Apple");
        assert_eq!(r, action("get_company_info", "Apple"));
    }

    #[test]
    fn action_input_stops_at_line_end() {
        let r = interpret("Action: translate_document\nAction Input: {\"document\": \"hi\"}\nmore text");
        assert_eq!(r, action("translate_document", "{\"document\": \"hi\"}"));
    }

    #[test]
    fn action_input_on_next_line() {
        let r = interpret("Action: mock_web_search\nAction Input:\n  Tesla  ");
        assert_eq!(r, action("mock_web_search", "Tesla"));
    }

    #[test]
    fn missing_action_input_defaults_to_empty() {
        assert_eq!(interpret("Action: mock_web_search"), action("mock_web_search", ""));
    }

    #[test]
    fn whitespace_around_colon_is_tolerated() {
        let r = interpret("Action :  get_company_info\nAction Input :Tesla");
        assert_eq!(r, action("get_company_info", "Tesla"));
    }

    #[test]
    fn markers_are_case_sensitive() {
        assert_eq!(interpret("final answer: nope"), InterpretedResponse::Unparseable);
        assert_eq!(interpret("action: get_company_info"), InterpretedResponse::Unparseable);
    }

    #[test]
    fn free_text_is_unparseable() {
        assert_eq!(interpret("I think Tesla is great."), InterpretedResponse::Unparseable);
        assert_eq!(interpret(""), InterpretedResponse::Unparseable);
    }

    #[test]
    fn empty_final_answer_is_still_final() {
        assert_eq!(
            interpret("Final Answer:"),
            InterpretedResponse::Final { answer: String::new() }
        );
    }

    #[test]
    fn action_name_is_word_characters_only() {
        let r = interpret("Action: get_company_info(Tesla)");
        assert_eq!(r, action("get_company_info", ""));
    }
}

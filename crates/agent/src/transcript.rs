//! Per-run scratchpad and action history.
//!
//! Both are owned by exactly one workflow run and dropped when it ends.

use serde::{Deserialize, Serialize};

/// Appended after a response that had neither an action nor a final answer.
pub const NUDGE: &str = "You must use a tool or give Final Answer.";

/// One step of the scratchpad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranscriptEntry {
    /// A tool ran and produced an observation.
    Observation { response: String, observation: String },
    /// The response was unusable and the model was told to try again.
    Nudge { response: String },
}

impl TranscriptEntry {
    fn render(&self) -> String {
        match self {
            Self::Observation {
                response,
                observation,
            } => format!(" {response}\nObservation: {observation}\n\nThought:"),
            Self::Nudge { response } => format!(" {response}\n\n{NUDGE}\nThought:"),
        }
    }
}

/// Append-only record of one run's model responses and what followed them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_observation(&mut self, response: impl Into<String>, observation: impl Into<String>) {
        self.entries.push(TranscriptEntry::Observation {
            response: response.into(),
            observation: observation.into(),
        });
    }

    pub fn push_nudge(&mut self, response: impl Into<String>) {
        self.entries.push(TranscriptEntry::Nudge {
            response: response.into(),
        });
    }

    /// The scratchpad text appended to the base prompt.
    pub fn render(&self) -> String {
        self.entries.iter().map(TranscriptEntry::render).collect()
    }

    /// Tool observations in order. Nudges are not observations.
    pub fn observations(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|e| match e {
            TranscriptEntry::Observation { observation, .. } => Some(observation.as_str()),
            TranscriptEntry::Nudge { .. } => None,
        })
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A tool call as the model wrote it. Two records are the same call when
/// both the tool name and the raw input match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionRecord {
    pub tool_name: String,
    pub raw_input: String,
}

/// The calls made so far in one run.
#[derive(Debug, Clone, Default)]
pub struct ActionHistory {
    records: Vec<ActionRecord>,
}

impl ActionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a call. Returns `false` (and records nothing) if the identical
    /// call was already made.
    pub fn insert(&mut self, record: ActionRecord) -> bool {
        if self.records.contains(&record) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_observations_and_nudges() {
        let mut t = Transcript::new();
        t.push_observation("Action: a\nAction Input: x", "result");
        t.push_nudge("hmm");
        assert_eq!(
            t.render(),
            " Action: a\nAction Input: x\nObservation: result\n\nThought: hmm\n\n\
             You must use a tool or give Final Answer.\nThought:"
        );
    }

    #[test]
    fn nudges_are_not_observations() {
        let mut t = Transcript::new();
        t.push_nudge("noise");
        t.push_observation("r1", "first");
        t.push_nudge("noise");
        t.push_observation("r2", "second");
        assert_eq!(t.observations().collect::<Vec<_>>(), vec!["first", "second"]);
        assert_eq!(t.len(), 4);
    }

    #[test]
    fn empty_transcript_renders_nothing() {
        assert_eq!(Transcript::new().render(), "");
    }

    #[test]
    fn history_rejects_exact_repeats_only() {
        let mut h = ActionHistory::new();
        let call = |tool: &str, input: &str| ActionRecord {
            tool_name: tool.into(),
            raw_input: input.into(),
        };
        assert!(h.insert(call("get_company_info", "Tesla")));
        assert!(h.insert(call("get_company_info", "Apple")));
        assert!(h.insert(call("mock_web_search", "Tesla")));
        assert!(!h.insert(call("get_company_info", "Tesla")));
        assert_eq!(h.len(), 3);
    }
}

//! Shared test helpers for workflow tests.

use async_trait::async_trait;
use dossier_core::error::{ProviderError, ToolError};
use dossier_core::provider::TextGenerator;
use dossier_core::tool::{FieldSpec, ParsedArguments, ScalarCapability, StructuredCapability, ToolRegistry};
use std::sync::Mutex;
use std::time::Duration;

use crate::progress::{ProgressEvent, ProgressSink};

/// A generator that returns a sequence of scripted responses.
///
/// Each call returns the next response. Panics if more calls are made than
/// responses provided, unless built with [`ScriptedGenerator::repeating`].
pub struct ScriptedGenerator {
    responses: Vec<String>,
    repeat_last: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: responses.into_iter().map(String::from).collect(),
            repeat_last: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with the same text.
    pub fn repeating(response: &str) -> Self {
        Self {
            repeat_last: true,
            ..Self::new(vec![response])
        }
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Every prompt received, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let mut prompts = self.prompts.lock().unwrap();
        let index = prompts.len();
        prompts.push(prompt.to_string());

        if self.repeat_last {
            return Ok(self.responses.last().cloned().unwrap_or_default());
        }
        match self.responses.get(index) {
            Some(response) => Ok(response.clone()),
            None => panic!(
                "ScriptedGenerator: no more responses (call #{}, have {})",
                index,
                self.responses.len()
            ),
        }
    }
}

/// A generator whose every call takes `delay` before answering.
pub struct SlowGenerator {
    delay: Duration,
    response: String,
    calls: Mutex<usize>,
}

impl SlowGenerator {
    pub fn new(delay: Duration, response: &str) -> Self {
        Self {
            delay,
            response: response.into(),
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl TextGenerator for SlowGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
        *self.calls.lock().unwrap() += 1;
        tokio::time::sleep(self.delay).await;
        Ok(self.response.clone())
    }
}

/// A generator that always fails with a network error.
pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
        Err(ProviderError::Network("connection refused".into()))
    }
}

/// Collects progress events for inspection.
#[derive(Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingProgress {
    fn emit(&self, event: &ProgressEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// `lookup` answers `record for <input>`.
pub struct LookupTool;

#[async_trait]
impl ScalarCapability for LookupTool {
    fn name(&self) -> &str {
        "lookup"
    }
    fn description(&self) -> &str {
        "Look up a company. Input: name"
    }
    async fn invoke(&self, input: &str) -> Result<serde_json::Value, ToolError> {
        Ok(serde_json::Value::String(format!("record for {input}")))
    }
}

/// `format` renders `<title>: <body>`.
pub struct FormatTool;

#[async_trait]
impl StructuredCapability for FormatTool {
    fn name(&self) -> &str {
        "format"
    }
    fn description(&self) -> &str {
        r#"Format a note. Input JSON: {"title": "t", "body": "b"}"#
    }
    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::required("title"),
            FieldSpec::optional("body", serde_json::json!("")),
        ]
    }
    async fn invoke(&self, arguments: ParsedArguments) -> Result<serde_json::Value, ToolError> {
        let title = arguments["title"].as_str().unwrap_or_default();
        let body = arguments["body"].as_str().unwrap_or_default();
        Ok(serde_json::Value::String(format!("{title}: {body}")))
    }
}

/// Registry with `lookup` (scalar) then `format` (structured).
pub fn test_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register_scalar(LookupTool).unwrap();
    registry.register_structured(FormatTool).unwrap();
    registry
}

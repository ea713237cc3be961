//! Translation tool — delegates to the model service.

use async_trait::async_trait;
use dossier_core::error::ToolError;
use dossier_core::provider::TextGenerator;
use dossier_core::tool::{FieldSpec, ParsedArguments, StructuredCapability};
use std::sync::Arc;
use tracing::debug;

pub struct TranslateTool {
    generator: Arc<dyn TextGenerator>,
}

impl TranslateTool {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

fn translation_prompt(document: &str, target_language: &str) -> String {
    format!(
        "Translate the following document to {target_language}. \
         Only output the translation, nothing else:\n\n{document}"
    )
}

#[async_trait]
impl StructuredCapability for TranslateTool {
    fn name(&self) -> &str {
        "translate_document"
    }

    fn description(&self) -> &str {
        r#"Translate document to target language. Input JSON: {"document": "text", "target_language": "German"}"#
    }

    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::required("document").alias("text"),
            FieldSpec::optional("target_language", serde_json::json!("English")).alias("language"),
        ]
    }

    async fn invoke(&self, arguments: ParsedArguments) -> Result<serde_json::Value, ToolError> {
        let document = arguments
            .get("document")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::MissingField("document".into()))?;
        let language = arguments
            .get("target_language")
            .and_then(|v| v.as_str())
            .unwrap_or("English");

        debug!(language, chars = document.len(), "Translating document");

        let translated = self
            .generator
            .generate(&translation_prompt(document, language))
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: e.to_string(),
            })?;

        Ok(serde_json::Value::String(translated.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_core::error::ProviderError;
    use std::sync::Mutex;

    struct Recorder {
        prompts: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl TextGenerator for Recorder {
        async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.fail {
                return Err(ProviderError::Network("connection reset".into()));
            }
            Ok("  Hallo Welt \n".into())
        }
    }

    fn args(pairs: &[(&str, &str)]) -> ParsedArguments {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::json!(v)))
            .collect()
    }

    #[tokio::test]
    async fn translates_via_generator() {
        let recorder = Arc::new(Recorder {
            prompts: Mutex::new(vec![]),
            fail: false,
        });
        let tool = TranslateTool::new(recorder.clone());
        let out = tool
            .invoke(args(&[("document", "Hello world"), ("target_language", "German")]))
            .await
            .unwrap();
        assert_eq!(out, "Hallo Welt");

        let prompts = recorder.prompts.lock().unwrap();
        assert!(prompts[0].contains("to German"));
        assert!(prompts[0].ends_with("Hello world"));
    }

    #[tokio::test]
    async fn generator_failure_becomes_tool_error() {
        let tool = TranslateTool::new(Arc::new(Recorder {
            prompts: Mutex::new(vec![]),
            fail: true,
        }));
        let err = tool
            .invoke(args(&[("document", "x"), ("target_language", "French")]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn declares_aliases_and_default_language() {
        let tool = TranslateTool::new(Arc::new(Recorder {
            prompts: Mutex::new(vec![]),
            fail: false,
        }));
        let fields = tool.fields();
        assert!(fields[0].is_required());
        assert_eq!(fields[0].keys().collect::<Vec<_>>(), vec!["document", "text"]);
        assert_eq!(fields[1].default, Some(serde_json::json!("English")));
    }
}

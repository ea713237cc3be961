//! Briefing document renderer.

use async_trait::async_trait;
use dossier_core::error::ToolError;
use dossier_core::tool::{FieldSpec, ParsedArguments, StructuredCapability};
use serde_json::Value;

pub struct GenerateDocumentTool;

const SUPPORTED_TEMPLATES: &[&str] = &["briefing"];

#[async_trait]
impl StructuredCapability for GenerateDocumentTool {
    fn name(&self) -> &str {
        "generate_document"
    }

    fn description(&self) -> &str {
        r#"Generate briefing document. Input JSON: {"template": "briefing", "content_dict": {"key": "value"}}"#
    }

    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::optional("template", serde_json::json!("briefing")),
            FieldSpec::optional("content_dict", serde_json::json!({}))
                .alias("content")
                .mapping(),
        ]
    }

    async fn invoke(&self, arguments: ParsedArguments) -> Result<Value, ToolError> {
        let template = arguments
            .get("template")
            .and_then(Value::as_str)
            .unwrap_or("briefing");
        if !SUPPORTED_TEMPLATES.contains(&template) {
            return Err(ToolError::InvalidArguments(format!(
                "Unknown template '{template}'. Supported: {}",
                SUPPORTED_TEMPLATES.join(", ")
            )));
        }

        let empty = serde_json::Map::new();
        let content = arguments
            .get("content_dict")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        Ok(Value::String(render_briefing(content)))
    }
}

/// Render a briefing from a content mapping, preserving key order.
pub fn render_briefing(content: &serde_json::Map<String, Value>) -> String {
    let company = content
        .get("company_name")
        .map(display_value)
        .unwrap_or_else(|| "Unknown".to_string());

    let mut parts = vec![format!("=== COMPANY BRIEFING: {company} ===\n")];
    for (key, value) in content {
        parts.push(format!("{}: {}", title_case(key), display_value(value)));
    }
    parts.push("\n=== END OF BRIEFING ===".to_string());
    parts.join("\n")
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// `risk_category` -> `Risk Category`
fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

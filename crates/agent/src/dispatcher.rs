//! Tool dispatch: turns an interpreted `Action` into an observation string.
//!
//! Dispatch never fails. Every problem (unknown tool, bad arguments, a tool
//! error) becomes an observation beginning with `Error`, which goes back to
//! the model so it can correct itself on the next iteration.

use dossier_core::error::ToolError;
use dossier_core::tool::{Capability, FieldKind, FieldSpec, ParsedArguments, ToolRegistry};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::args::parse_arguments;

pub const PARSE_GUIDANCE: &str = r#"Error: Could not parse input. Use JSON: {"key": "value"}"#;

/// Validates and runs tool calls against a registry.
#[derive(Clone)]
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run `tool_name` with the model's raw input and return the observation.
    pub async fn execute(&self, tool_name: &str, raw_input: &str) -> String {
        let Some(capability) = self.registry.capability(tool_name) else {
            warn!(tool = %tool_name, "Model requested an unknown tool");
            return format!(
                "Error: Tool '{}' not found. Available: {}",
                tool_name,
                self.registry.names().join(", ")
            );
        };

        let outcome = match capability {
            Capability::Scalar(tool) => {
                let input = clean_scalar(raw_input);
                debug!(tool = %tool_name, input, "Dispatching scalar tool");
                tool.invoke(input).await
            }
            Capability::Structured(tool) => {
                let Some(parsed) = parse_arguments(raw_input) else {
                    debug!(tool = %tool_name, raw_input, "Could not parse structured input");
                    return PARSE_GUIDANCE.to_string();
                };
                let arguments = match apply_fields(&tool.fields(), parsed) {
                    Ok(arguments) => arguments,
                    Err(e) => return format!("Error: {e}"),
                };
                debug!(tool = %tool_name, ?arguments, "Dispatching structured tool");
                tool.invoke(arguments).await
            }
        };

        match outcome {
            Ok(value) => stringify(&value),
            Err(e) => {
                warn!(tool = %tool_name, error = %e, "Tool execution failed");
                format!("Error executing {}: {}", tool_name, failure_message(&e))
            }
        }
    }
}

/// Strip surrounding whitespace, then surrounding quotes.
fn clean_scalar(raw: &str) -> &str {
    raw.trim().trim_matches(|c: char| c == '"' || c == '\'')
}

/// Resolve declared fields onto their canonical names.
///
/// For each field the first accepted key present wins; absent optional
/// fields take their default. Fails on the first required field that is
/// missing or blank. Undeclared keys are dropped.
pub fn apply_fields(
    fields: &[FieldSpec],
    mut parsed: ParsedArguments,
) -> Result<ParsedArguments, ToolError> {
    let mut resolved = ParsedArguments::new();

    for field in fields {
        let found = field
            .keys()
            .find_map(|key| parsed.remove(key))
            .filter(|v| !v.is_null());

        let value = match (found, &field.default) {
            (Some(v), _) if field.is_required() && is_blank(&v) => {
                return Err(ToolError::MissingField(field.name.into()));
            }
            (Some(v), _) => coerce(field.kind, v),
            (None, Some(default)) => default.clone(),
            (None, None) => return Err(ToolError::MissingField(field.name.into())),
        };
        resolved.insert(field.name.to_string(), value);
    }

    Ok(resolved)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::String(s) => s.trim().is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn coerce(kind: FieldKind, value: Value) -> Value {
    match (kind, value) {
        (FieldKind::Text, Value::String(s)) => Value::String(s),
        (FieldKind::Text, Value::Number(n)) => Value::String(n.to_string()),
        (FieldKind::Text, Value::Bool(b)) => Value::String(b.to_string()),
        (FieldKind::Text, other) => Value::String(other.to_string()),
        (FieldKind::Mapping, Value::Object(map)) => Value::Object(map),
        (FieldKind::Mapping, Value::String(s)) => {
            Value::Object(parse_arguments(&s).unwrap_or_else(|| info_mapping(Value::String(s))))
        }
        (FieldKind::Mapping, other) => Value::Object(info_mapping(other)),
    }
}

fn info_mapping(value: Value) -> ParsedArguments {
    let mut map = ParsedArguments::new();
    map.insert("info".into(), value);
    map
}

fn failure_message(error: &ToolError) -> String {
    match error {
        ToolError::ExecutionFailed { reason, .. } => reason.clone(),
        ToolError::InvalidArguments(message) => message.clone(),
        ToolError::MissingField(_) | ToolError::NotFound(_) | ToolError::DuplicateTool(_) => {
            error.to_string()
        }
    }
}

/// Strings pass through; everything else is pretty-printed JSON.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dossier_core::tool::{ScalarCapability, StructuredCapability};
    use serde_json::json;
    use std::sync::Mutex;

    struct Echo;

    #[async_trait]
    impl ScalarCapability for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes input"
        }
        async fn invoke(&self, input: &str) -> Result<Value, ToolError> {
            if input == "boom" {
                return Err(ToolError::ExecutionFailed {
                    tool_name: "echo".into(),
                    reason: "exploded".into(),
                });
            }
            Ok(json!(format!("<{input}>")))
        }
    }

    /// Records the arguments it was invoked with.
    #[derive(Default)]
    struct Capture {
        seen: Arc<Mutex<Vec<ParsedArguments>>>,
    }

    #[async_trait]
    impl StructuredCapability for Capture {
        fn name(&self) -> &str {
            "capture"
        }
        fn description(&self) -> &str {
            "Captures arguments"
        }
        fn fields(&self) -> Vec<FieldSpec> {
            vec![
                FieldSpec::required("document").alias("text"),
                FieldSpec::optional("target_language", json!("English")).alias("language"),
                FieldSpec::optional("content_dict", json!({})).alias("content").mapping(),
            ]
        }
        async fn invoke(&self, arguments: ParsedArguments) -> Result<Value, ToolError> {
            self.seen.lock().unwrap().push(arguments.clone());
            Ok(json!({"received": arguments.len()}))
        }
    }

    fn dispatcher() -> (ToolDispatcher, Arc<Mutex<Vec<ParsedArguments>>>) {
        let capture = Capture::default();
        let seen = capture.seen.clone();
        let mut registry = ToolRegistry::new();
        registry.register_scalar(Echo).unwrap();
        registry.register_structured(capture).unwrap();
        (ToolDispatcher::new(Arc::new(registry)), seen)
    }

    #[tokio::test]
    async fn unknown_tool_lists_available_names() {
        let (d, _) = dispatcher();
        assert_eq!(
            d.execute("search_google", "Tesla").await,
            "Error: Tool 'search_google' not found. Available: echo, capture"
        );
    }

    #[tokio::test]
    async fn scalar_input_is_unquoted() {
        let (d, _) = dispatcher();
        assert_eq!(d.execute("echo", "  \"Tesla\"  ").await, "<Tesla>");
        assert_eq!(d.execute("echo", "'Apple'").await, "<Apple>");
    }

    #[tokio::test]
    async fn tool_failure_becomes_observation() {
        let (d, _) = dispatcher();
        assert_eq!(d.execute("echo", "boom").await, "Error executing echo: exploded");
    }

    #[tokio::test]
    async fn unparseable_structured_input_gets_guidance() {
        let (d, seen) = dispatcher();
        assert_eq!(d.execute("capture", "please translate this").await, PARSE_GUIDANCE);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_required_field_skips_invocation() {
        let (d, seen) = dispatcher();
        let obs = d.execute("capture", r#"{"target_language": "German"}"#).await;
        assert_eq!(obs, "Error: Missing 'document' field");
        let obs = d.execute("capture", r#"{"document": "  "}"#).await;
        assert_eq!(obs, "Error: Missing 'document' field");
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn aliases_and_defaults_are_applied() {
        let (d, seen) = dispatcher();
        let obs = d.execute("capture", r#"{"text": "Hello", "extra": 1}"#).await;
        assert_eq!(obs, "{\n  \"received\": 3\n}");

        let args = seen.lock().unwrap()[0].clone();
        assert_eq!(args["document"], json!("Hello"));
        assert_eq!(args["target_language"], json!("English"));
        assert_eq!(args["content_dict"], json!({}));
        assert!(!args.contains_key("extra"));
    }

    #[test]
    fn canonical_key_wins_over_alias() {
        let fields = vec![FieldSpec::required("document").alias("text")];
        let parsed = json!({"text": "alias", "document": "canonical"})
            .as_object()
            .cloned()
            .unwrap();
        let resolved = apply_fields(&fields, parsed).unwrap();
        assert_eq!(resolved["document"], json!("canonical"));
    }

    #[test]
    fn mapping_field_given_as_string_is_reparsed() {
        let fields = vec![FieldSpec::optional("content_dict", json!({})).mapping()];
        let parsed = json!({"content_dict": "{company_name: Tesla}"})
            .as_object()
            .cloned()
            .unwrap();
        let resolved = apply_fields(&fields, parsed).unwrap();
        assert_eq!(resolved["content_dict"], json!({"company_name": "Tesla"}));
    }

    #[test]
    fn mapping_field_falls_back_to_info() {
        let fields = vec![FieldSpec::optional("content_dict", json!({})).mapping()];
        let parsed = json!({"content_dict": "just Tesla"}).as_object().cloned().unwrap();
        let resolved = apply_fields(&fields, parsed).unwrap();
        assert_eq!(resolved["content_dict"], json!({"info": "just Tesla"}));
    }

    #[test]
    fn text_field_stringifies_numbers() {
        let fields = vec![FieldSpec::required("document")];
        let parsed = json!({"document": 42}).as_object().cloned().unwrap();
        assert_eq!(apply_fields(&fields, parsed).unwrap()["document"], json!("42"));
    }

    #[test]
    fn stringify_passes_strings_verbatim() {
        assert_eq!(stringify(&json!("plain")), "plain");
        assert_eq!(stringify(&json!(["a"])), "[\n  \"a\"\n]");
    }
}

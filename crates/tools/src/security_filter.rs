//! Redacts configured sensitive terms from a document before it leaves the
//! agent.

use async_trait::async_trait;
use dossier_config::SecurityConfig;
use dossier_core::error::ToolError;
use dossier_core::tool::ScalarCapability;
use tracing::debug;

pub const REDACTION: &str = "[REDACTED]";
pub const FILTER_BANNER: &str = "[SECURITY FILTERED]";

pub struct SecurityFilterTool {
    sensitive_terms: Vec<String>,
}

impl SecurityFilterTool {
    pub fn new(config: &SecurityConfig) -> Self {
        Self {
            sensitive_terms: config
                .sensitive_terms
                .iter()
                .filter(|t| !t.is_empty())
                .cloned()
                .collect(),
        }
    }

    /// Replace every sensitive term and prepend the filter banner.
    pub fn filter(&self, document: &str) -> String {
        let mut redacted = document.to_string();
        let mut hits = 0usize;
        for term in &self.sensitive_terms {
            hits += redacted.matches(term.as_str()).count();
            redacted = redacted.replace(term.as_str(), REDACTION);
        }
        debug!(hits, "Security filter applied");
        format!("{FILTER_BANNER}\n{redacted}")
    }
}

#[async_trait]
impl ScalarCapability for SecurityFilterTool {
    fn name(&self) -> &str {
        "security_filter"
    }

    fn description(&self) -> &str {
        "Filter sensitive terms from document. Input: document (string)"
    }

    async fn invoke(&self, input: &str) -> Result<serde_json::Value, ToolError> {
        if input.is_empty() {
            return Err(ToolError::InvalidArguments("No document to filter".into()));
        }
        Ok(serde_json::Value::String(self.filter(input)))
    }
}

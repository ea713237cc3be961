//! Web search tool — stub that returns canned headlines.
//!
//! In production this would call a news or search API. The stub returns
//! plausible product and partnership headlines for a company.

use async_trait::async_trait;
use dossier_core::error::ToolError;
use dossier_core::tool::ScalarCapability;

pub struct WebSearchTool;

#[async_trait]
impl ScalarCapability for WebSearchTool {
    fn name(&self) -> &str {
        "mock_web_search"
    }

    fn description(&self) -> &str {
        "Search for public products and partnerships. Input: company_name (string). Example: Tesla"
    }

    async fn invoke(&self, input: &str) -> Result<serde_json::Value, ToolError> {
        if input.is_empty() {
            return Err(ToolError::InvalidArguments("Missing company name".into()));
        }
        Ok(serde_json::json!(search_headlines(input)))
    }
}

/// Headlines for a company name.
pub fn search_headlines(company: &str) -> Vec<String> {
    let canned: &[&str] = match company {
        "Tesla" => &[
            "Tesla announces record Q4 deliveries of 484,000 vehicles",
            "Tesla partners with Panasonic for battery production",
            "Tesla Cybertruck production ramps up at Gigafactory Texas",
            "Tesla expands Supercharger network to 50,000 stations globally",
        ],
        "Apple" => &[
            "Apple launches Vision Pro mixed reality headset",
            "Apple partners with OpenAI for AI features in iOS",
            "Apple reports strong iPhone 15 sales in Q4",
            "Apple expands services revenue to record $85 billion",
        ],
        _ => {
            return vec![
                format!("{company} partners with Company X"),
                format!("{company} launches new product"),
            ];
        }
    };
    canned.iter().map(|s| s.to_string()).collect()
}

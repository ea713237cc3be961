//! `dossier preview` — Run one scalar tool directly, without the model.

use clap::ValueEnum;
use dossier_agent::ToolDispatcher;
use dossier_config::AppConfig;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PreviewTool {
    /// Company record lookup
    Company,
    /// Product and partnership headlines
    Search,
    /// Sensitive-term redaction
    Filter,
}

impl PreviewTool {
    pub fn tool_name(self) -> &'static str {
        match self {
            Self::Company => "get_company_info",
            Self::Search => "mock_web_search",
            Self::Filter => "security_filter",
        }
    }
}

pub async fn run(tool: PreviewTool, input: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let (_, registry) = super::build_runtime(&config)?;

    let observation = ToolDispatcher::new(registry)
        .execute(tool.tool_name(), input)
        .await;
    println!("{observation}");
    Ok(())
}

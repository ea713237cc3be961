pub mod config_cmd;
pub mod preview;
pub mod run;
pub mod tools;

use dossier_agent::OBSERVATION_MARKER;
use dossier_config::AppConfig;
use dossier_core::Result;
use dossier_core::provider::TextGenerator;
use dossier_core::tool::ToolRegistry;
use dossier_providers::ChatGenerator;
use std::sync::Arc;

/// Build the generator and tool registry described by the config.
///
/// No request is sent here, so this works without an API key.
pub fn build_runtime(
    config: &AppConfig,
) -> Result<(Arc<dyn TextGenerator>, Arc<ToolRegistry>)> {
    let provider = dossier_providers::build_from_config(config)?;
    let generator: Arc<dyn TextGenerator> = Arc::new(
        ChatGenerator::from_config(provider, &config.llm).with_stop([OBSERVATION_MARKER]),
    );
    let registry = dossier_tools::default_registry(generator.clone(), &config.security)?;
    tracing::debug!(
        provider = %config.llm.provider,
        model = %config.llm.model,
        tools = registry.len(),
        "Runtime ready"
    );
    Ok((generator, Arc::new(registry)))
}

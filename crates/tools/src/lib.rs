//! Built-in research tools for Dossier.
//!
//! Tools give the agent the ability to gather and shape information about a
//! company: look it up, search for news, translate text, render a briefing,
//! and scrub sensitive terms before the answer goes out.

pub mod company_info;
pub mod generate_document;
pub mod security_filter;
pub mod translate;
pub mod web_search;

use dossier_config::SecurityConfig;
use dossier_core::error::ToolError;
use dossier_core::provider::TextGenerator;
use dossier_core::tool::ToolRegistry;
use std::sync::Arc;

pub use company_info::CompanyInfoTool;
pub use generate_document::GenerateDocumentTool;
pub use security_filter::SecurityFilterTool;
pub use translate::TranslateTool;
pub use web_search::WebSearchTool;

/// Create a registry with every built-in tool, in the order they are
/// described to the model.
///
/// The generator is shared with the translation tool.
pub fn default_registry(
    generator: Arc<dyn TextGenerator>,
    security: &SecurityConfig,
) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register_scalar(CompanyInfoTool)?;
    registry.register_scalar(WebSearchTool)?;
    registry.register_structured(TranslateTool::new(generator))?;
    registry.register_structured(GenerateDocumentTool)?;
    registry.register_scalar(SecurityFilterTool::new(security))?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dossier_core::error::ProviderError;
    use dossier_core::tool::ArgumentMode;

    struct Silent;

    #[async_trait]
    impl TextGenerator for Silent {
        async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
            Ok(String::new())
        }
    }

    #[test]
    fn default_registry_order_and_modes() {
        let registry = default_registry(Arc::new(Silent), &SecurityConfig::default()).unwrap();
        assert_eq!(
            registry.names(),
            vec![
                "get_company_info",
                "mock_web_search",
                "translate_document",
                "generate_document",
                "security_filter",
            ]
        );
        assert_eq!(
            registry.lookup("generate_document").unwrap().argument_mode,
            ArgumentMode::Structured
        );
        assert_eq!(
            registry.lookup("security_filter").unwrap().argument_mode,
            ArgumentMode::Scalar
        );
    }

    #[test]
    fn descriptions_mention_inputs() {
        let registry = default_registry(Arc::new(Silent), &SecurityConfig::default()).unwrap();
        for line in registry.list_descriptions() {
            assert!(line.contains("Input"), "{line}");
        }
    }
}

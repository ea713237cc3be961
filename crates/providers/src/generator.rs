//! Adapts a chat [`Provider`] to the prompt-in, text-out [`TextGenerator`]
//! contract the agent loop and the translation tool use.

use async_trait::async_trait;
use dossier_core::error::ProviderError;
use dossier_core::provider::{Provider, ProviderRequest, TextGenerator};
use std::sync::Arc;
use tracing::debug;

/// Sends each prompt as a single user message to a chat provider.
pub struct ChatGenerator {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    stop: Vec<String>,
}

impl ChatGenerator {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            stop: Vec::new(),
        }
    }

    /// Build a generator from the `[llm]` section of the config.
    pub fn from_config(provider: Arc<dyn Provider>, llm: &dossier_config::LlmConfig) -> Self {
        Self::new(provider, &llm.model)
            .with_temperature(llm.temperature)
            .with_max_tokens(llm.max_tokens)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Ask the backend to stop generating at any of `sequences`.
    pub fn with_stop<I, S>(mut self, sequences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop = sequences.into_iter().map(Into::into).collect();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for ChatGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = ProviderRequest::single_turn(&self.model, prompt)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
            .with_stop(self.stop.clone());

        let response = self.provider.complete(request).await?;

        if let Some(usage) = &response.usage {
            debug!(
                model = %response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Generation finished"
            );
        }

        if response.text().trim().is_empty() {
            return Err(ProviderError::EmptyCompletion);
        }

        Ok(response.message.content)
    }
}

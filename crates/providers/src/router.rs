//! Resolves the configured provider name to a concrete client.

use std::sync::Arc;
use std::time::Duration;

use dossier_config::AppConfig;
use dossier_core::error::ProviderError;
use dossier_core::provider::Provider;
use tracing::info;

use crate::openai_compat::OpenAiCompatProvider;

/// Headroom the HTTP client gets over the workflow's own model deadline, so
/// the workflow timeout is the one that fires.
const HTTP_TIMEOUT_SLACK_SECS: u64 = 5;

/// Well-known chat-completions endpoints.
pub fn endpoint_for(provider: &str) -> Option<&'static str> {
    let url = match provider {
        "huggingface" | "hf" => "https://router.huggingface.co/v1",
        "openai" => "https://api.openai.com/v1",
        "openrouter" => "https://openrouter.ai/api/v1",
        "groq" => "https://api.groq.com/openai/v1",
        "together" => "https://api.together.xyz/v1",
        "ollama" => "http://localhost:11434/v1",
        "vllm" => "http://localhost:8000/v1",
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1",
        _ => return None,
    };
    Some(url)
}

/// Build the provider named by `llm.provider`.
///
/// `llm.api_url` takes precedence over the well-known endpoint, and is
/// required for any name not in [`endpoint_for`].
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let name = config.llm.provider.as_str();
    let base_url = match (&config.llm.api_url, endpoint_for(name)) {
        (Some(url), _) => url.clone(),
        (None, Some(url)) => url.to_string(),
        (None, None) => return Err(ProviderError::NotConfigured(name.to_string())),
    };

    info!(provider = name, base_url = %base_url, "Using model service");

    let timeout = http_timeout(config.llm.request_timeout_secs);
    let api_key = config.api_key.clone().unwrap_or_default();
    let provider = OpenAiCompatProvider::new(name, base_url, api_key).with_timeout(timeout);
    Ok(Arc::new(provider))
}

fn http_timeout(request_timeout_secs: u64) -> Duration {
    Duration::from_secs(request_timeout_secs.saturating_add(HTTP_TIMEOUT_SLACK_SECS))
}

//! Settings for the Dossier agent: model service, loop limits, redaction.
//!
//! Sources, lowest priority first: built-in defaults, `~/.dossier/config.toml`,
//! environment variables. The merged result is checked before use.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Everything `~/.dossier/config.toml` can hold. Every section is optional.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the model service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model service settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Agent loop settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// Redaction settings for the security filter tool
    #[serde(default)]
    pub security: SecurityConfig,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = self.api_key.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("AppConfig")
            .field("api_key", &api_key)
            .field("llm", &self.llm)
            .field("agent", &self.agent)
            .field("security", &self.security)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name: "huggingface", "openai", "openrouter", "ollama", or any
    /// OpenAI-compatible endpoint given via `api_url`
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Override the provider's base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Upper bound on a single model call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_provider() -> String {
    "huggingface".into()
}
fn default_model() -> String {
    "meta-llama/Llama-3.2-3B-Instruct".into()
}
fn default_max_tokens() -> u32 {
    512
}
fn default_temperature() -> f32 {
    0.7
}
fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            api_url: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Hard cap on model calls per workflow run
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Emit human-readable progress while running
    #[serde(default = "default_true")]
    pub verbose: bool,

    /// How much of each observation the progress output shows
    #[serde(default = "default_preview_chars")]
    pub observation_preview_chars: usize,
}

fn default_max_iterations() -> u32 {
    10
}
fn default_true() -> bool {
    true
}
fn default_preview_chars() -> usize {
    200
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            verbose: true,
            observation_preview_chars: default_preview_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Terms replaced with `[REDACTED]` by the security filter
    #[serde(default = "default_sensitive_terms")]
    pub sensitive_terms: Vec<String>,
}

fn default_sensitive_terms() -> Vec<String> {
    vec![
        "Project Falcon".into(),
        "Internal-Only".into(),
        "Confidential".into(),
        "SECRET".into(),
        "CLASSIFIED".into(),
    ]
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            sensitive_terms: default_sensitive_terms(),
        }
    }
}

impl AppConfig {
    /// Load `~/.dossier/config.toml`, then apply environment overrides.
    ///
    /// The API key is taken from the file, else the first of
    /// `DOSSIER_API_KEY`, `HUGGINGFACE_API_KEY`, `HF_TOKEN`, `OPENAI_API_KEY`.
    /// `DOSSIER_PROVIDER`, `DOSSIER_MODEL`, `DOSSIER_API_URL` and
    /// `DOSSIER_MAX_ITERATIONS` override their settings.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read one file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if self.api_key.is_none() {
            self.api_key = lookup("DOSSIER_API_KEY")
                .or_else(|| lookup("HUGGINGFACE_API_KEY"))
                .or_else(|| lookup("HF_TOKEN"))
                .or_else(|| lookup("OPENAI_API_KEY"));
        }

        if let Some(provider) = lookup("DOSSIER_PROVIDER") {
            self.llm.provider = provider;
        }

        if let Some(model) = lookup("DOSSIER_MODEL") {
            self.llm.model = model;
        }

        if let Some(url) = lookup("DOSSIER_API_URL") {
            self.llm.api_url = Some(url);
        }

        if let Some(raw) = lookup("DOSSIER_MAX_ITERATIONS") {
            self.agent.max_iterations = raw.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!(
                    "DOSSIER_MAX_ITERATIONS must be a positive integer, got '{raw}'"
                ))
            })?;
        }

        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs_home().join(".dossier")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let llm = &self.llm;
        ensure(
            (0.0..=2.0).contains(&llm.temperature),
            "llm.temperature must be between 0.0 and 2.0",
        )?;
        ensure(llm.max_tokens >= 1, "llm.max_tokens must be at least 1")?;
        ensure(
            llm.request_timeout_secs >= 1,
            "llm.request_timeout_secs must be at least 1",
        )?;
        ensure(!llm.model.trim().is_empty(), "llm.model must not be empty")?;
        ensure(
            self.agent.max_iterations >= 1,
            "agent.max_iterations must be at least 1",
        )?;

        if self.security.sensitive_terms.iter().all(|t| t.trim().is_empty()) {
            tracing::warn!("security.sensitive_terms is empty; security_filter will redact nothing");
        }
        Ok(())
    }

    /// Local backends (Ollama, vLLM, llama.cpp) run without a key.
    pub fn needs_api_key(&self) -> bool {
        !matches!(self.llm.provider.as_str(), "ollama" | "vllm" | "llamacpp" | "llama.cpp")
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// The defaults rendered as a starter config file.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

fn ensure(ok: bool, message: &str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid(message.to_string()))
    }
}

fn dirs_home() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

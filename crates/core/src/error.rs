//! Error types for the Dossier domain.
//!
//! Only a model-service failure aborts a workflow run. Tool errors never
//! escape the dispatcher: they are rendered into observations the model can
//! read and react to.

use thiserror::Error;

/// The top-level error type for all Dossier operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Model service error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures talking to the model service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("Model service returned HTTP {status_code}: {message}")]
    ApiError { status_code: u16, message: String },

    #[error(
        "Rate limited by model service{}",
        .retry_after_secs.map(|s| format!(", retry after {s}s")).unwrap_or_default()
    )]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Unknown provider '{0}' (set llm.api_url to use a custom endpoint)")]
    NotConfigured(String),

    #[error("Model returned an empty completion")]
    EmptyCompletion,

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures registering or running a tool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("Tool '{0}' is not registered")]
    NotFound(String),

    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),

    /// A required structured field was absent or blank.
    #[error("Missing '{0}' field")]
    MissingField(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("{tool_name} failed: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },
}

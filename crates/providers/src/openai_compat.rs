//! Chat-completions client for OpenAI-compatible endpoints.
//!
//! The Hugging Face inference router, OpenAI, OpenRouter, Ollama and vLLM
//! all accept the same `POST {base}/chat/completions` shape; only the base
//! URL and the key differ.

use async_trait::async_trait;
use dossier_core::error::ProviderError;
use dossier_core::message::Message;
use dossier_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// A provider speaking the OpenAI chat-completions protocol.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: build_client(DEFAULT_TIMEOUT),
        }
    }

    /// Replace the HTTP client with one using `timeout` per request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!("Falling back to default HTTP client: {e}");
            reqwest::Client::new()
        })
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        debug!(provider = %self.name, model = %request.model, "Sending completion request");

        let mut call = self.client.post(self.endpoint()).json(&ChatRequest::from(&request));
        if !self.api_key.is_empty() {
            call = call.bearer_auth(&self.api_key);
        }

        let response = call.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(e.to_string())
            } else {
                ProviderError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        let retry_after = retry_after_secs(response.headers());
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !status.is_success() {
            warn!(provider = %self.name, status = status.as_u16(), "Model service rejected request");
            return Err(status_error(status, retry_after, &body));
        }

        let completion: ChatCompletion = serde_json::from_str(&body)
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        completion.into_response()
    }
}

/// Classify a non-success response.
fn status_error(status: StatusCode, retry_after_secs: Option<u64>, body: &str) -> ProviderError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited { retry_after_secs },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::AuthenticationFailed(error_detail(body))
        }
        _ => ProviderError::ApiError {
            status_code: status.as_u16(),
            message: error_detail(body),
        },
    }
}

/// Only the delay-seconds form of `Retry-After` is understood.
fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Pull the human-readable message out of an error body.
///
/// Hugging Face answers `{"error": "..."}`; OpenAI and OpenRouter answer
/// `{"error": {"message": "..."}}`. Anything else is passed through.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope {
            error: ErrorBody::Text(message) | ErrorBody::Object { message },
        }) => message,
        Err(_) => body.trim().to_string(),
    }
}

// --- wire types ---

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    stop: &'a [String],
}

impl<'a> From<&'a ProviderRequest> for ChatRequest<'a> {
    fn from(request: &'a ProviderRequest) -> Self {
        Self {
            model: &request.model,
            messages: request.messages.iter().map(ChatMessage::from).collect(),
            temperature: request.temperature,
            stream: false,
            max_tokens: request.max_tokens,
            stop: &request.stop,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a Message> for ChatMessage<'a> {
    fn from(message: &'a Message) -> Self {
        Self {
            role: message.role.as_str(),
            content: &message.content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletion {
    fn into_response(self) -> Result<ProviderResponse, ProviderError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedResponse("no choices in completion".into()))?;

        Ok(ProviderResponse {
            message: Message::assistant(choice.message.content.unwrap_or_default()),
            usage: self.usage,
            model: self.model,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Text(String),
    Object { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_core::message::Role;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    #[test]
    fn trailing_slash_is_trimmed() {
        let provider = OpenAiCompatProvider::new("vllm", "http://localhost:8000/v1/", "");
        assert_eq!(provider.base_url(), "http://localhost:8000/v1");
        assert_eq!(provider.endpoint(), "http://localhost:8000/v1/chat/completions");
    }

    #[test]
    fn request_serializes_roles_and_options() {
        let request = ProviderRequest {
            model: "meta-llama/Llama-3.2-3B-Instruct".into(),
            messages: vec![Message::system("rules"), Message::user("hi")],
            temperature: 0.7,
            max_tokens: Some(512),
            stop: vec!["Observation:".into()],
        };
        let body = serde_json::to_value(ChatRequest::from(&request)).unwrap();
        assert_eq!(body["messages"][0], json!({"role": "system", "content": "rules"}));
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["max_tokens"], 512);
        assert_eq!(body["stop"], json!(["Observation:"]));
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn request_omits_unset_options() {
        let request = ProviderRequest::single_turn("m", "hi");
        let body = serde_json::to_value(ChatRequest::from(&request)).unwrap();
        assert!(body.get("max_tokens").is_none());
        assert!(body.get("stop").is_none());
    }

    #[test]
    fn rate_limit_carries_retry_after() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("20"));
        let err = status_error(StatusCode::TOO_MANY_REQUESTS, retry_after_secs(&headers), "");
        assert_eq!(
            err,
            ProviderError::RateLimited {
                retry_after_secs: Some(20)
            }
        );

        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2026 07:28:00 GMT"));
        assert_eq!(retry_after_secs(&headers), None);
    }

    #[test]
    fn auth_failures_keep_service_message() {
        let err = status_error(
            StatusCode::UNAUTHORIZED,
            None,
            r#"{"error": "Invalid credentials in Authorization header"}"#,
        );
        assert_eq!(
            err,
            ProviderError::AuthenticationFailed("Invalid credentials in Authorization header".into())
        );
    }

    #[test]
    fn error_detail_reads_both_envelopes() {
        assert_eq!(error_detail(r#"{"error": "Model is loading"}"#), "Model is loading");
        assert_eq!(
            error_detail(r#"{"error": {"message": "quota exceeded", "type": "insufficient_quota"}}"#),
            "quota exceeded"
        );
        assert_eq!(error_detail("  Bad Gateway\n"), "Bad Gateway");
    }

    #[test]
    fn server_errors_keep_status() {
        let err = status_error(StatusCode::SERVICE_UNAVAILABLE, None, r#"{"error": "overloaded"}"#);
        assert_eq!(
            err,
            ProviderError::ApiError {
                status_code: 503,
                message: "overloaded".into()
            }
        );
    }

    #[test]
    fn completion_becomes_assistant_message() {
        let completion: ChatCompletion = serde_json::from_str(
            r#"{
                "model": "meta-llama/Llama-3.2-3B-Instruct",
                "choices": [{"message": {"role": "assistant", "content": "Thought: ok"}}],
                "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
            }"#,
        )
        .unwrap();
        let response = completion.into_response().unwrap();
        assert_eq!(response.text(), "Thought: ok");
        assert_eq!(response.message.role, Role::Assistant);
        assert_eq!(response.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn null_content_becomes_empty_text() {
        let completion: ChatCompletion =
            serde_json::from_str(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap();
        assert_eq!(completion.into_response().unwrap().text(), "");
    }

    #[test]
    fn missing_choices_is_malformed() {
        let completion: ChatCompletion = serde_json::from_str(r#"{"model": "m"}"#).unwrap();
        assert!(matches!(
            completion.into_response(),
            Err(ProviderError::MalformedResponse(_))
        ));
    }
}

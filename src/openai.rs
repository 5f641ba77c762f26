//! OpenAI-compatible chat-completions client.
//!
//! One blocking request per invocation, no retry. The `ChatCompletion` trait
//! seams the HTTP client away from the prompt logic so tests run against
//! `MockChatClient`.

use serde::{Deserialize, Serialize};

use crate::recommendation::RecommendationError;

/// Hosted endpoint used when no base URL override is given.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Socket timeout matching the original screen's client.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// A single chat turn on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Sampling and length parameters sent with every request.
#[derive(Debug, Clone, Serialize)]
pub struct RequestParams {
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub n: u32,
    pub max_tokens: u32,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
}

/// Anything that can answer a chat-completion request.
///
/// Returns the first candidate's message content, which the service may omit.
pub trait ChatCompletion {
    fn complete(
        &self,
        params: &RequestParams,
        messages: &[ChatMessage],
    ) -> Result<Option<String>, RecommendationError>;
}

// ─── Wire types ───────────────────────────────────────────────────────────────

/// Request body for POST /chat/completions
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    top_p: f64,
    n: u32,
    max_tokens: u32,
    presence_penalty: f64,
    frequency_penalty: f64,
}

/// Response body from POST /chat/completions
#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

// ─── HTTP client ──────────────────────────────────────────────────────────────

/// Blocking HTTP client for an OpenAI-compatible endpoint.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OpenAiClient {
    /// Create a client against `base_url` authenticating with `api_key`.
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
            timeout_secs,
        }
    }

    /// Client from OPENAI_BASE_URL / OPENAI_API_KEY, with hosted defaults.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        Self::new(&base_url, &api_key, DEFAULT_TIMEOUT_SECS)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl ChatCompletion for OpenAiClient {
    fn complete(
        &self,
        params: &RequestParams,
        messages: &[ChatMessage],
    ) -> Result<Option<String>, RecommendationError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionRequest {
            model: &params.model,
            messages,
            temperature: params.temperature,
            top_p: params.top_p,
            n: params.n,
            max_tokens: params.max_tokens,
            presence_penalty: params.presence_penalty,
            frequency_penalty: params.frequency_penalty,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    RecommendationError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    RecommendationError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    RecommendationError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RecommendationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .map_err(|e| RecommendationError::ResponseParsing(e.to_string()))?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content))
    }
}

// ─── Mock client for tests ────────────────────────────────────────────────────

/// Mock chat client — returns a configurable outcome without touching the
/// network.
pub struct MockChatClient {
    outcome: MockOutcome,
}

enum MockOutcome {
    Text(String),
    NoContent,
    Failure,
}

impl MockChatClient {
    pub fn replying(text: &str) -> Self {
        Self {
            outcome: MockOutcome::Text(text.to_string()),
        }
    }

    /// Service answers but the first candidate carries no content.
    pub fn empty() -> Self {
        Self {
            outcome: MockOutcome::NoContent,
        }
    }

    /// Every call fails as if the endpoint were unreachable.
    pub fn failing() -> Self {
        Self {
            outcome: MockOutcome::Failure,
        }
    }
}

impl ChatCompletion for MockChatClient {
    fn complete(
        &self,
        _params: &RequestParams,
        _messages: &[ChatMessage],
    ) -> Result<Option<String>, RecommendationError> {
        match &self.outcome {
            MockOutcome::Text(text) => Ok(Some(text.clone())),
            MockOutcome::NoContent => Ok(None),
            MockOutcome::Failure => {
                Err(RecommendationError::Connection(DEFAULT_API_BASE.to_string()))
            }
        }
    }
}

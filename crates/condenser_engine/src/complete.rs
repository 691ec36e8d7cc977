use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use engine_logging::engine_error;

use crate::config::ApiConfig;

// Sampling configuration sent with every completion call.
pub const TEMPERATURE: f32 = 0.7;
pub const TOP_P: f32 = 0.9;
pub const FREQUENCY_PENALTY: f32 = 0.5;
pub const PRESENCE_PENALTY: f32 = 0.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Network(String),
    #[error("completion service returned {status}: {body}")]
    Http { status: u16, body: String },
    #[error("completion response could not be parsed: {0}")]
    Malformed(String),
    #[error("completion {id} returned no message")]
    EmptyResponse { id: String },
}

/// One prompt triple for a chat completion call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub assistant_prompt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Result of one completion call.
///
/// `text` is `None` exactly when the backend's first choice carried no
/// message; deciding whether that is fatal is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub id: String,
    pub text: Option<String>,
    pub finish_reason: Option<String>,
    pub usage: TokenUsage,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    id: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: TokenUsage,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChoiceMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat-completions endpoint.
///
/// The HTTP session is built lazily on first use; the credential itself is
/// validated much earlier, when [`ApiConfig`] is loaded at startup. Each call
/// is a single attempt: failures are logged with context and returned.
pub struct OpenAiClient {
    config: ApiConfig,
    http: OnceCell<reqwest::Client>,
}

impl OpenAiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            http: OnceCell::new(),
        }
    }

    fn http_client(&self) -> Result<&reqwest::Client, CompletionError> {
        self.http.get_or_try_init(|| {
            reqwest::Client::builder()
                .connect_timeout(self.config.connect_timeout)
                .timeout(self.config.request_timeout)
                .build()
                .map_err(|err| CompletionError::Network(err.to_string()))
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError> {
        let mut messages = vec![
            ChatMessage {
                role: "system",
                content: &request.system_prompt,
            },
            ChatMessage {
                role: "user",
                content: &request.user_prompt,
            },
        ];
        if !request.assistant_prompt.is_empty() {
            messages.push(ChatMessage {
                role: "assistant",
                content: &request.assistant_prompt,
            });
        }
        let body = ChatCompletionBody {
            model: &self.config.model,
            messages,
            temperature: TEMPERATURE,
            top_p: TOP_P,
            frequency_penalty: FREQUENCY_PENALTY,
            presence_penalty: PRESENCE_PENALTY,
        };

        let url = self.endpoint();
        let response = self
            .http_client()?
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                engine_error!("completion request to {} failed: {}", url, err);
                CompletionError::Network(err.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            engine_error!("completion service returned {}: {}", status, body);
            return Err(CompletionError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            engine_error!("failed to decode completion response: {}", err);
            CompletionError::Malformed(err.to_string())
        })?;

        let (text, finish_reason) = match parsed.choices.into_iter().next() {
            Some(choice) => (
                choice.message.and_then(|message| message.content),
                choice.finish_reason,
            ),
            None => (None, None),
        };

        Ok(Completion {
            id: parsed.id,
            text,
            finish_reason,
            usage: parsed.usage,
        })
    }
}

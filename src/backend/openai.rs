//! OpenAI-compatible API backend
//!
//! Implements both model boundaries by calling `/chat/completions` on any
//! OpenAI-compatible endpoint (OpenAI, Ollama, vLLM, LM Studio, etc.).
//! Images travel as `image_url` content parts carrying a data URL.
//!
//! Transient failures (429, 5xx, connect, timeout) are retried here with
//! exponential backoff; the pipeline itself never retries.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ModelSettings;
use crate::error::{Error, Result};
use crate::version::BuildInfo;

use super::{CompletionRequest, GenerationParams, TextModel, VisionModel, VisionRequest};

/// First retry delay; later ones double up to `MAX_BACKOFF`.
const BASE_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Delay before retry number `attempt` (1-based).
pub(crate) fn backoff_delay(attempt: u32) -> Duration {
    let factor = 2u32.checked_pow(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
    BASE_BACKOFF.saturating_mul(factor).min(MAX_BACKOFF)
}

// ─────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────

/// Connection settings for an OpenAI-compatible endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiConfig {
    /// API base URL (e.g., "https://api.openai.com/v1", "http://localhost:11434/v1")
    pub base_url: String,

    /// API key (empty string for local servers like Ollama)
    pub api_key: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum retries on transient errors
    pub max_retries: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            timeout_secs: 60,
            max_retries: 2,
        }
    }
}

impl From<&ModelSettings> for OpenAiConfig {
    fn from(settings: &ModelSettings) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            timeout_secs: settings.timeout_secs,
            max_retries: settings.max_retries,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// OpenAI API types (request/response)
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    total_tokens: u32,
}

// ─────────────────────────────────────────────────────────────────
// OpenAI Backend
// ─────────────────────────────────────────────────────────────────

/// OpenAI-compatible backend serving both vision and text requests
pub struct OpenAiBackend {
    config: OpenAiConfig,
    client: Client,
    total_requests: RwLock<u64>,
    total_tokens: RwLock<u64>,
}

impl OpenAiBackend {
    /// Create a new backend with the given configuration
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(BuildInfo::current().user_agent())
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        info!(base_url = %config.base_url, "OpenAI-compatible backend created");

        Ok(Self {
            config,
            client,
            total_requests: RwLock::new(0),
            total_tokens: RwLock::new(0),
        })
    }

    /// Requests completed successfully so far
    pub fn total_requests(&self) -> u64 {
        *self.total_requests.read()
    }

    /// Tokens reported by the endpoint so far
    pub fn total_tokens(&self) -> u64 {
        *self.total_tokens.read()
    }

    /// Build the authorization header value (if API key is set)
    fn auth_header(&self) -> Option<String> {
        if self.config.api_key.is_empty() {
            None
        } else {
            Some(format!("Bearer {}", self.config.api_key))
        }
    }

    /// Make a chat completion request with retry logic
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        params: &GenerationParams,
    ) -> Result<String> {
        let request_body = ChatCompletionRequest {
            model: params.model.clone(),
            messages,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        let mut last_error: Option<Error> = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff = backoff_delay(attempt);
                debug!(attempt, ?backoff, "Retrying after error");
                tokio::time::sleep(backoff).await;
            }

            let mut req = self.client.post(&url).json(&request_body);
            if let Some(ref auth) = self.auth_header() {
                req = req.header("Authorization", auth);
            }

            let response = match req.send().await {
                Ok(response) => response,
                Err(e) if e.is_timeout() || e.is_connect() => {
                    warn!(attempt, error = %e, "Retryable connection error");
                    last_error = Some(Error::model_request(format!("Connection error: {}", e), true));
                    continue;
                }
                Err(e) => {
                    return Err(Error::model_request(format!("Request error: {}", e), false));
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, attempt, "Retryable API error: {}", body);
                last_error = Some(Error::model_request(format!("API error {}: {}", status, body), true));
                continue;
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::model_request(format!("API error {}: {}", status, body), false));
            }

            let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
                Error::model_request(format!("Failed to parse API response: {}", e), false)
            })?;

            *self.total_requests.write() += 1;
            if let Some(usage) = parsed.usage {
                *self.total_tokens.write() += usage.total_tokens as u64;
            }

            let choice = parsed
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| Error::model_request("No choices in API response", false))?;

            if choice.finish_reason.as_deref() == Some("length") {
                debug!(model = %params.model, "Completion truncated at max_tokens");
            }

            return Ok(choice.message.content.unwrap_or_default());
        }

        Err(last_error.unwrap_or_else(|| {
            Error::model_request("All retry attempts exhausted", true)
        }))
    }
}

#[async_trait]
impl VisionModel for OpenAiBackend {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn describe_image(&self, request: VisionRequest) -> Result<String> {
        let messages = vec![ChatMessage {
            role: "user",
            content: MessageContent::Parts(vec![
                ContentPart::Text {
                    text: request.instruction,
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: request.image_data_url,
                    },
                },
            ]),
        }];

        self.chat_completion(messages, &request.params).await
    }
}

#[async_trait]
impl TextModel for OpenAiBackend {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: MessageContent::Text(system),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: MessageContent::Text(request.prompt),
        });

        self.chat_completion(messages, &request.params).await
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_then_clamps() {
        assert_eq!(backoff_delay(1), Duration::from_millis(500));
        assert_eq!(backoff_delay(2), Duration::from_secs(1));
        assert_eq!(backoff_delay(4), Duration::from_secs(4));
        assert_eq!(backoff_delay(10), MAX_BACKOFF);
        assert_eq!(backoff_delay(56), MAX_BACKOFF);
        assert_eq!(backoff_delay(u32::MAX), MAX_BACKOFF);
    }

    #[test]
    fn test_config_from_settings_trims_slash() {
        let settings = ModelSettings {
            base_url: "http://localhost:11434/v1/".to_string(),
            ..Default::default()
        };
        let config = OpenAiConfig::from(&settings);
        assert_eq!(config.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn test_auth_header() {
        let config = OpenAiConfig {
            api_key: "sk-test-123".to_string(),
            ..Default::default()
        };
        let backend = OpenAiBackend::new(config).unwrap();
        assert_eq!(backend.auth_header(), Some("Bearer sk-test-123".to_string()));

        let no_key = OpenAiBackend::new(OpenAiConfig::default()).unwrap();
        assert_eq!(no_key.auth_header(), None);
    }

    #[test]
    fn test_image_message_wire_shape() {
        let message = ChatMessage {
            role: "user",
            content: MessageContent::Parts(vec![
                ContentPart::Text {
                    text: "Describe".into(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: "data:image/png;base64,AQID".into(),
                    },
                },
            ]),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][1]["type"], "image_url");
        assert_eq!(json["content"][1]["image_url"]["url"], "data:image/png;base64,AQID");
    }

    #[test]
    fn test_text_message_wire_shape() {
        let message = ChatMessage {
            role: "system",
            content: MessageContent::Text("You are Ember.".into()),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["content"], "You are Ember.");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_retryable() {
        let backend = OpenAiBackend::new(OpenAiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            max_retries: 0,
            ..Default::default()
        })
        .unwrap();

        let err = backend
            .complete(CompletionRequest {
                system_prompt: None,
                prompt: "hello".into(),
                params: GenerationParams::default(),
            })
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(backend.total_requests(), 0);
    }
}

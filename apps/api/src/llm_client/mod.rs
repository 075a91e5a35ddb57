/// LLM Client: the single point of entry for all generative backend calls.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// Services depend on the `LlmBackend` trait so tests can script responses.
///
/// Model: claude-sonnet-4-5 (hardcoded, do not make configurable to prevent drift)
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[cfg(test)]
pub mod fake;
pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
const RETRY_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Gave up after {attempts} attempts")]
    Exhausted { attempts: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// Transport faults, rate limits and server errors are worth one more attempt.
    fn is_transient(&self) -> bool {
        match self {
            LlmError::Http(_) => true,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// How many times a call may be attempted.
///
/// Question generation tolerates one retry. Turn decisions and scoring must not
/// be retried silently: the caller resubmits the idempotent request instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    None,
    Once,
}

impl RetryPolicy {
    pub fn max_attempts(self) -> u32 {
        match self {
            RetryPolicy::None => 1,
            RetryPolicy::Once => 2,
        }
    }
}

/// Prompt in, text out. Implemented by `LlmClient` and by the scripted test backend.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        system: &str,
        policy: RetryPolicy,
    ) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Wraps the Anthropic Messages API. Every call carries the configured timeout.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
        })
    }

    /// Makes a single request to the Claude API, returning the full response object.
    async fn call_once(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;
        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );
        Ok(llm_response)
    }
}

#[async_trait]
impl LlmBackend for LlmClient {
    async fn complete(
        &self,
        prompt: &str,
        system: &str,
        policy: RetryPolicy,
    ) -> Result<String, LlmError> {
        let attempts = policy.max_attempts();
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    RETRY_DELAY.as_millis()
                );
                tokio::time::sleep(RETRY_DELAY).await;
            }

            match self.call_once(prompt, system).await {
                Ok(response) => {
                    return response
                        .text()
                        .map(str::to_string)
                        .ok_or(LlmError::EmptyContent)
                }
                Err(e) if e.is_transient() => {
                    warn!("LLM call failed: {e}");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(LlmError::Exhausted { attempts }))
    }
}

/// Calls the backend and deserializes the text response as JSON.
/// The prompt must instruct the model to return valid JSON.
pub async fn call_json<T: DeserializeOwned>(
    backend: &dyn LlmBackend,
    prompt: &str,
    system: &str,
    policy: RetryPolicy,
) -> Result<T, LlmError> {
    let text = backend.complete(prompt, system, policy).await?;
    parse_json(&text)
}

/// Parses model output as JSON after stripping any markdown fences.
pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let text = strip_json_fences(text);
    if text.is_empty() {
        return Err(LlmError::EmptyContent);
    }
    serde_json::from_str(text).map_err(LlmError::Parse)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

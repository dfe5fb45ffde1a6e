/// LLM Client — the single point of entry for hosted-provider calls.
///
/// No other module may call the hosted provider directly. The local Ollama
/// endpoint has its own thin client in `ollama`.
///
/// Model: gpt-4o-mini (hardcoded so prompt behaviour does not drift)
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub mod ollama;

const RESPONSES_PATH: &str = "/v1/responses";
/// The model used for all hosted LLM calls.
pub const MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// One role-tagged message of the `input` array.
#[derive(Debug, Clone, Serialize)]
pub struct InputMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a [InputMessage<'a>],
    text: TextOptions<'a>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct TextOptions<'a> {
    format: &'a Value,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    #[serde(default)]
    pub output: Vec<OutputItem>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct OutputItem {
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
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
    /// Concatenates every `output_text` block of every `message` item.
    pub fn output_text(&self) -> Option<String> {
        let text: String = self
            .output
            .iter()
            .filter(|item| item.item_type == "message")
            .flat_map(|item| item.content.iter())
            .filter(|b| b.block_type == "output_text")
            .filter_map(|b| b.text.as_deref())
            .collect();

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Client for the hosted Responses API with structured-output support.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Makes one call constrained by `format` (a `json_schema` text format).
    /// No retries: a failed round trip is reported to the caller as-is.
    pub async fn call(
        &self,
        input: &[InputMessage<'_>],
        format: &Value,
        temperature: f32,
    ) -> Result<LlmResponse, LlmError> {
        let request_body = ResponsesRequest {
            model: MODEL,
            input,
            text: TextOptions { format },
            temperature,
        };

        let response = self
            .client
            .post(format!("{}{}", self.base_url, RESPONSES_PATH))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        if let Some(usage) = &llm_response.usage {
            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                usage.input_tokens, usage.output_tokens
            );
        }

        Ok(llm_response)
    }

    /// Calls the provider and parses the output text as JSON.
    pub async fn call_json(
        &self,
        input: &[InputMessage<'_>],
        format: &Value,
        temperature: f32,
    ) -> Result<Value, LlmError> {
        let response = self.call(input, format, temperature).await?;
        let text = response.output_text().ok_or(LlmError::EmptyContent)?;
        serde_json::from_str(&text).map_err(LlmError::Parse)
    }
}

//! OpenAI-compatible chat completion provider
//!
//! Covers OpenAI itself and the vendors that expose the same
//! `/v1/chat/completions` contract (DeepSeek, Mistral).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::provider::{LlmError, LlmProvider, LlmRequest, LlmResponse};

/// Chat completion request format
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

/// Chat completion response format
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    model: String,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u32,
}

/// Provider for any OpenAI-compatible endpoint
#[derive(Debug)]
pub struct OpenAICompatProvider {
    /// Short vendor name reported by [`LlmProvider::name`]
    vendor: String,
    /// API key
    api_key: String,
    /// Model to use (e.g., "gpt-4o-mini", "deepseek-chat")
    model: String,
    /// HTTP client
    client: reqwest::Client,
    /// Base URL, without the `/v1` suffix
    base_url: String,
}

impl OpenAICompatProvider {
    /// Create a provider for an arbitrary compatible endpoint
    pub fn new(vendor: &str, base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            vendor: vendor.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// OpenAI
    pub fn openai(api_key: &str, model: &str) -> Self {
        Self::new("openai", "https://api.openai.com", api_key, model)
    }

    /// DeepSeek
    pub fn deepseek(api_key: &str, model: &str) -> Self {
        Self::new("deepseek", "https://api.deepseek.com", api_key, model)
    }

    /// Mistral
    pub fn mistral(api_key: &str, model: &str) -> Self {
        Self::new("mistral", "https://api.mistral.ai", api_key, model)
    }

    /// Model this provider sends requests to
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmProvider for OpenAICompatProvider {
    fn name(&self) -> &str {
        &self.vendor
    }

    async fn is_available(&self) -> bool {
        self.client
            .get(format!("{}/v1/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = Instant::now();
        let url = format!("{}/v1/chat/completions", self.base_url);

        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system",
                    content: request.system,
                },
                Message {
                    role: "user",
                    content: request.prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed(format!(
                "Status: {}, Body: {}",
                status, body
            )));
        }

        let api_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("response has no content".to_string()))?;

        let latency_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(vendor = %self.vendor, model = %api_response.model, latency_ms, "chat completion");

        Ok(LlmResponse {
            content,
            model: api_response.model,
            tokens_used: api_response.usage.map(|u| u.total_tokens),
            latency_ms,
        })
    }
}

//! Ollama provider for locally hosted models
//!
//! Talks to the `/api/chat` endpoint so the agent persona travels as a real
//! system message, the same way the OpenAI-compatible provider sends it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::provider::{LlmError, LlmProvider, LlmRequest, LlmResponse};

/// Default Ollama endpoint
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

#[derive(Debug, Serialize)]
struct ChatTurn {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct SamplingOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Serialize)]
struct LocalChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatTurn>,
    stream: bool,
    options: SamplingOptions,
}

#[derive(Debug, Deserialize)]
struct LocalChatReply {
    model: String,
    message: LocalMessage,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct LocalMessage {
    #[serde(default)]
    content: String,
}

impl LocalChatReply {
    /// Prompt plus completion tokens, when the server reported either
    fn tokens_used(&self) -> Option<u32> {
        match (self.prompt_eval_count, self.eval_count) {
            (None, None) => None,
            (p, e) => Some(p.unwrap_or(0) + e.unwrap_or(0)),
        }
    }
}

/// Ollama provider
#[derive(Debug)]
pub struct OllamaProvider {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Use `model` on the default local endpoint
    pub fn new(model: &str) -> Self {
        Self::with_url(DEFAULT_OLLAMA_URL, model)
    }

    /// Use `model` on a custom endpoint
    pub fn with_url(base_url: &str, model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn chat_body(&self, request: LlmRequest) -> LocalChatRequest<'_> {
        let mut messages = Vec::with_capacity(2);
        if !request.system.trim().is_empty() {
            messages.push(ChatTurn {
                role: "system",
                content: request.system,
            });
        }
        messages.push(ChatTurn {
            role: "user",
            content: request.prompt,
        });

        LocalChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: SamplingOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn is_available(&self) -> bool {
        self.client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = Instant::now();
        let body = self.chat_body(request);

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed(format!(
                "ollama {} returned {}: {}",
                self.model, status, detail
            )));
        }

        let reply: LocalChatReply = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        if reply.message.content.trim().is_empty() {
            return Err(LlmError::InvalidResponse(format!(
                "ollama {} returned an empty message",
                self.model
            )));
        }

        let latency_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(model = %reply.model, latency_ms, "ollama completion");

        Ok(LlmResponse {
            tokens_used: reply.tokens_used(),
            content: reply.message.content,
            model: reply.model,
            latency_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires Ollama running locally
    async fn test_ollama_available() {
        let provider = OllamaProvider::new("llama3");
        if provider.is_available().await {
            let response = provider.ask("Say hello in one word").await.unwrap();
            assert!(!response.is_empty());
        }
    }

    #[test]
    fn test_url_normalized() {
        let provider = OllamaProvider::with_url("http://gpu-box:11434/", "mistral");
        assert_eq!(provider.base_url, "http://gpu-box:11434");
    }

    #[test]
    fn test_chat_body_carries_persona() {
        let provider = OllamaProvider::new("llama3");
        let body = provider.chat_body(LlmRequest::with_role("You are a critic.", "Review this."));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "You are a critic.");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["stream"], false);

        let bare = provider.chat_body(LlmRequest::with_role("  ", "Review this."));
        assert_eq!(bare.messages.len(), 1);
    }

    #[test]
    fn test_reply_token_count() {
        let raw = r#"{"model":"llama3","message":{"role":"assistant","content":"Hi"},"prompt_eval_count":12,"eval_count":3}"#;
        let reply: LocalChatReply = serde_json::from_str(raw).unwrap();
        assert_eq!(reply.message.content, "Hi");
        assert_eq!(reply.tokens_used(), Some(15));

        let raw = r#"{"model":"llama3","message":{"content":"Hi"}}"#;
        let reply: LocalChatReply = serde_json::from_str(raw).unwrap();
        assert_eq!(reply.tokens_used(), None);
    }
}

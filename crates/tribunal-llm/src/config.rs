//! Oracle configuration
//!
//! Handles API keys and provider selection from the environment.

use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;

use crate::mock::MockProvider;
use crate::ollama::{OllamaProvider, DEFAULT_OLLAMA_URL};
use crate::openai::OpenAICompatProvider;
use crate::provider::LlmProvider;

/// Error types for configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI API key (env: OPENAI_API_KEY)
    pub openai_api_key: Option<String>,
    /// DeepSeek API key (env: DEEPSEEK_API_KEY)
    pub deepseek_api_key: Option<String>,
    /// Mistral API key (env: MISTRAL_API_KEY)
    pub mistral_api_key: Option<String>,
    /// Ollama base URL (default: http://localhost:11434)
    pub ollama_url: String,
    /// Provider to build (env: TRIBUNAL_DEFAULT_PROVIDER)
    pub default_provider: String,
    /// Model to request (env: TRIBUNAL_DEFAULT_MODEL)
    pub default_model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            deepseek_api_key: None,
            mistral_api_key: None,
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            default_provider: "mock".to_string(),
            default_model: "gpt-4o-mini".to_string(),
        }
    }
}

impl LlmConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            deepseek_api_key: env::var("DEEPSEEK_API_KEY").ok(),
            mistral_api_key: env::var("MISTRAL_API_KEY").ok(),
            ollama_url: env::var("OLLAMA_URL").unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string()),
            default_provider: env::var("TRIBUNAL_DEFAULT_PROVIDER")
                .unwrap_or_else(|_| "mock".to_string()),
            default_model: env::var("TRIBUNAL_DEFAULT_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
        }
    }

    /// Get API key for a provider
    pub fn api_key(&self, provider: &str) -> Option<&str> {
        match provider.to_lowercase().as_str() {
            "openai" => self.openai_api_key.as_deref(),
            "deepseek" => self.deepseek_api_key.as_deref(),
            "mistral" => self.mistral_api_key.as_deref(),
            _ => None,
        }
    }

    /// Check if a provider is configured
    pub fn is_configured(&self, provider: &str) -> bool {
        match provider.to_lowercase().as_str() {
            "ollama" | "mock" => true,
            other => self.api_key(other).is_some(),
        }
    }

    /// List available providers
    pub fn available_providers(&self) -> Vec<&str> {
        let mut providers = vec!["mock", "ollama"];
        for name in ["openai", "deepseek", "mistral"] {
            if self.api_key(name).is_some() {
                providers.push(name);
            }
        }
        providers
    }

    /// Build the configured default provider
    pub fn build_provider(&self) -> Result<Arc<dyn LlmProvider>, ConfigError> {
        self.build(&self.default_provider)
    }

    /// Build a named provider
    pub fn build(&self, provider: &str) -> Result<Arc<dyn LlmProvider>, ConfigError> {
        let name = provider.to_lowercase();
        let model = self.default_model.as_str();
        let provider: Arc<dyn LlmProvider> = match name.as_str() {
            "mock" => Arc::new(MockProvider::smart()),
            "ollama" => Arc::new(OllamaProvider::with_url(&self.ollama_url, model)),
            "openai" | "deepseek" | "mistral" => {
                let key = self.api_key(&name).ok_or_else(|| {
                    ConfigError::MissingEnvVar(format!("{}_API_KEY", name.to_uppercase()))
                })?;
                match name.as_str() {
                    "openai" => Arc::new(OpenAICompatProvider::openai(key, model)),
                    "deepseek" => Arc::new(OpenAICompatProvider::deepseek(key, model)),
                    _ => Arc::new(OpenAICompatProvider::mistral(key, model)),
                }
            }
            other => {
                return Err(ConfigError::Invalid(format!(
                    "unknown provider '{}' (available: {})",
                    other,
                    self.available_providers().join(", ")
                )))
            }
        };
        Ok(provider)
    }
}

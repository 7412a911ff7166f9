//! # Tribunal LLM
//!
//! The oracle side of Tribunal: every argument, summary and verdict is text
//! produced by an [`LlmProvider`].
//!
//! ## Supported Backends
//!
//! | Provider | Type | Key Required |
//! |----------|------|--------------|
//! | OpenAI | API | `OPENAI_API_KEY` |
//! | DeepSeek | API | `DEEPSEEK_API_KEY` |
//! | Mistral | API | `MISTRAL_API_KEY` |
//! | Ollama | Local | None |
//! | Mock | Testing | None |
//!
//! ## Quick Start
//!
//! ```rust
//! use tribunal_llm::{MockProvider, LlmProvider};
//!
//! #[tokio::main]
//! async fn main() {
//!     let llm = MockProvider::smart();
//!     let summary = llm.ask("Write the closing summary").await.unwrap();
//!     assert!(summary.contains("/10"));
//! }
//! ```
//!
//! ## Pacing
//!
//! ```rust
//! use tribunal_llm::{FixedDelay, NoPacing};
//!
//! // Production: one second between debate turns
//! let _pacing = FixedDelay::millis(1000);
//! // Tests: no waiting
//! let _fast = NoPacing;
//! ```

pub mod config;
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod pacing;
pub mod provider;

pub use config::{ConfigError, LlmConfig};
pub use mock::MockProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAICompatProvider;
pub use pacing::{FixedDelay, NoPacing, PacingPolicy};
pub use provider::{LlmError, LlmProvider, LlmRequest, LlmResponse};

//! Integration tests that require a real LLM API
//!
//! The networked tests are marked with #[ignore] and require environment variables:
//! - OPENAI_API_KEY for OpenAI tests
//! - DEEPSEEK_API_KEY for DeepSeek tests
//!
//! Run with: cargo test -p tribunal-llm --test llm_integration -- --ignored

use std::sync::Arc;
use tribunal_llm::{LlmConfig, LlmProvider, LlmRequest, MockProvider, OpenAICompatProvider};

#[tokio::test]
#[ignore = "Requires OPENAI_API_KEY"]
async fn test_openai_real_request() {
    let api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set for this test");
    let provider = OpenAICompatProvider::openai(&api_key, "gpt-4o-mini");

    let request = LlmRequest::with_role(
        "You are a strict grader. Be extremely concise.",
        "Rate the answer '2 + 2 = 4' and end with the line 'THE FINAL SCORE IS: <1-4>'.",
    )
    .temperature(0.0)
    .max_tokens(60);

    let response = provider.complete(request).await;
    assert!(response.is_ok(), "Request should succeed: {:?}", response);
    let response = response.unwrap();
    assert!(response.content.to_uppercase().contains("THE FINAL SCORE IS"));
}

#[tokio::test]
#[ignore = "Makes real API call"]
async fn test_invalid_api_key() {
    let provider = OpenAICompatProvider::deepseek("invalid-key-12345", "deepseek-chat");
    let response = provider.ask("Hello").await;
    assert!(response.is_err(), "Should fail with invalid key");
}

/// The mock stands in for every provider in the rest of the workspace
#[tokio::test]
async fn test_mock_through_trait_object() {
    let llm: Arc<dyn LlmProvider> = Arc::new(MockProvider::smart());
    let text = llm
        .generate("You are the critic.", "Deliver your rebuttal.")
        .await
        .unwrap();
    assert!(text.contains("Responding to the previous argument"));
}

#[tokio::test]
async fn test_config_builds_mock_by_default() {
    let config = LlmConfig::default();
    let llm = config.build_provider().unwrap();
    assert!(llm.is_available().await);
    let text = llm.ask("Begin with THE FINAL SCORE IS: [1-4]").await.unwrap();
    assert!(text.starts_with("THE FINAL SCORE IS:"));
}

//! LLM client factory.
//!
//! Centralizes provider-specific logic for creating LLM clients.

use std::sync::Arc;

use crate::error::{AdsightError, Result};
use crate::llm::{
    AnthropicClient, AnthropicConfig, LlmClient, LlmProvider, MockLlmClient, OpenAiClient,
    OpenAiConfig,
};

/// Creates an LLM client for the given provider.
///
/// The API key is resolved in order:
/// 1. Provided `api_key` parameter
/// 2. Environment variable (`OPENAI_API_KEY` or `ANTHROPIC_API_KEY`)
///
/// `model` overrides the provider's default model when set.
pub fn create_client(
    provider: LlmProvider,
    model: Option<&str>,
    api_key: Option<String>,
) -> Result<Arc<dyn LlmClient>> {
    match provider {
        LlmProvider::OpenAi => {
            let key = api_key
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .ok_or_else(|| {
                    AdsightError::config("No API key configured. Set OPENAI_API_KEY.")
                })?;
            let model = model
                .map(String::from)
                .or_else(|| std::env::var("OPENAI_MODEL").ok())
                .unwrap_or_else(|| "gpt-4o".to_string());
            Ok(Arc::new(OpenAiClient::new(OpenAiConfig::new(key, model))?))
        }
        LlmProvider::Anthropic => {
            let key = api_key
                .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
                .ok_or_else(|| {
                    AdsightError::config("No API key configured. Set ANTHROPIC_API_KEY.")
                })?;
            let model = model
                .map(String::from)
                .or_else(|| std::env::var("ANTHROPIC_MODEL").ok())
                .unwrap_or_else(|| "claude-sonnet-4-20250514".to_string());
            Ok(Arc::new(AnthropicClient::new(AnthropicConfig::new(
                key, model,
            ))?))
        }
        LlmProvider::Mock => Ok(Arc::new(MockLlmClient::new())),
    }
}

//! LLM integration for Adsight.
//!
//! Provides traits and implementations for communicating with various LLM providers.

pub mod anthropic;
pub mod factory;
pub mod mock;
pub mod openai;
pub mod parser;
pub mod types;

pub use anthropic::{AnthropicClient, AnthropicConfig};
pub use factory::create_client;
pub use mock::MockLlmClient;
pub use openai::{OpenAiClient, OpenAiConfig};
pub use parser::extract_json_payload;
pub use types::{CompletionOptions, Message, Role};

use async_trait::async_trait;
use std::str::FromStr;

use crate::error::Result;

/// Trait for LLM clients that can generate completions.
///
/// Implementations must be thread-safe (Send + Sync) so a single client can
/// serve concurrent requests.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generates a completion for the given messages.
    ///
    /// `options` may override the client's default model and sampling
    /// settings for this single request. Returns the complete response as a
    /// single string.
    async fn complete(&self, messages: &[Message], options: &CompletionOptions)
        -> Result<String>;
}

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    /// OpenAI (GPT-4o, etc.)
    #[default]
    OpenAi,
    /// Anthropic (Claude)
    Anthropic,
    /// Mock client for testing (no API key required)
    Mock,
}

impl LlmProvider {
    /// Returns the provider as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Mock => "mock",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown LLM provider: {}", s)),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! Mock LLM client for testing.
//!
//! Provides deterministic responses based on the prompt contents, shaped like
//! the JSON each agent expects.

use async_trait::async_trait;

use crate::error::{AdsightError, Result};
use crate::llm::types::{CompletionOptions, Message, Role};
use crate::llm::LlmClient;

/// Mock LLM client that returns canned responses based on input patterns.
///
/// Used for unit and integration testing without making real API calls, and
/// for running the server in `--mock` mode.
#[derive(Debug, Clone, Default)]
pub struct MockLlmClient {
    /// Custom response mappings (pattern -> response), checked first.
    custom_responses: Vec<(String, String)>,
    /// When set, every call fails with a model error carrying this message.
    error_message: Option<String>,
}

impl MockLlmClient {
    /// Creates a new mock client with default responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom response mapping.
    ///
    /// When the prompt (system or user content) contains `pattern`, the mock
    /// returns `response` instead of its default for that agent shape.
    pub fn with_response(
        mut self,
        pattern: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.custom_responses
            .push((pattern.into(), response.into()));
        self
    }

    /// Makes every completion fail with a model error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            custom_responses: Vec::new(),
            error_message: Some(message.into()),
        }
    }

    /// Generates a mock response based on the prompt contents.
    fn mock_response(&self, system: &str, user: &str) -> String {
        let combined = format!("{}\n{}", system, user).to_lowercase();

        for (pattern, response) in &self.custom_responses {
            if combined.contains(&pattern.to_lowercase()) {
                return response.clone();
            }
        }

        if combined.contains("intent classifier") {
            return self.classify(user);
        }

        if combined.contains("cypher") {
            return QUERY_GENERATOR_RESPONSE.to_string();
        }

        if combined.contains("visualization") {
            return CHART_RESPONSE.to_string();
        }

        if combined.contains("report_sections") {
            return RECOMMENDATION_RESPONSE.to_string();
        }

        if combined.contains("data analyst") {
            return INSIGHT_RESPONSE.to_string();
        }

        "I can only help with advertising analytics questions.".to_string()
    }

    /// Keyword classification standing in for the real model.
    fn classify(&self, user: &str) -> String {
        let user_lower = user.to_lowercase();
        let optimization = ["improve", "optimize", "suggest", "recommend", "reduce", "lower"]
            .iter()
            .any(|kw| user_lower.contains(kw));

        if optimization {
            r#"{"workflow": "optimization", "reasoning": "The user asks for recommendations to improve performance."}"#
                .to_string()
        } else {
            r#"{"workflow": "insight", "reasoning": "The user asks for information from the data."}"#
                .to_string()
        }
    }

    /// Extracts the system prompt and last user message from a message list.
    fn split_prompt(messages: &[Message]) -> (String, String) {
        let system = messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        (system, user)
    }
}

/// Default generated-queries payload.
const QUERY_GENERATOR_RESPONSE: &str = r#"{
  "queries": [
    {
      "objective": "Top ads by clicks",
      "query": "MATCH (a:adaccount)-[:HAS_CAMPAIGN]->(:campaign)-[:HAS_ADGROUP]->(:adgroup)-[:HAS_AD]->(ad:ad)-[:HAS_METRICS]->(m:metrics) RETURN ad.name AS adName, SUM(m.clicks) AS totalClicks ORDER BY totalClicks DESC LIMIT 5"
    }
  ],
  "reasoning": "Aggregated clicks per ad across the account hierarchy and ranked the top five."
}"#;

/// Default insight synthesis payload.
const INSIGHT_RESPONSE: &str = r#"{
  "insight": "**Top Ads by Clicks**\n\n| Ad | Clicks |\n|----|--------|\n| Summer Sale Hero | 1500 |\n\n**Analysis:**\n* The Summer Sale Hero ad leads engagement by a wide margin.",
  "reasoning": "Ranked the returned rows by clicks and summarized the leader in a table with a short analysis."
}"#;

/// Default recommendation synthesis payload.
const RECOMMENDATION_RESPONSE: &str = r#"{
  "report_sections": [
    {
      "title": "Pause underperforming ads",
      "content": "Ads with CTR below 0.5% over the last 30 days should be paused to reallocate budget."
    }
  ],
  "reasoning": "Identified the weakest CTR segment in the executed results and proposed a single concrete action."
}"#;

/// Default chart suggestion payload.
const CHART_RESPONSE: &str = r#"{
  "graph_suggestions": [
    {
      "objective": "Top ads by clicks",
      "type": "bar",
      "columns": {"x": "adName", "y": "totalClicks"},
      "title": "Top Ads by Clicks"
    }
  ]
}"#;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(
        &self,
        messages: &[Message],
        _options: &CompletionOptions,
    ) -> Result<String> {
        if let Some(message) = &self.error_message {
            return Err(AdsightError::model(message.clone()));
        }

        let (system, user) = Self::split_prompt(messages);
        Ok(self.mock_response(&system, &user))
    }
}

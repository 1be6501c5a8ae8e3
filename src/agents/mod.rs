//! Prompt agents for Adsight.
//!
//! Each agent wraps a single LLM call with a fixed prompt and a
//! schema-validated JSON output. Agents are stateless and safe to share
//! across requests; model choice and sampling are explicit per agent via
//! [`CompletionOptions`].

mod chart;
mod classifier;
pub mod prompts;
mod query_generator;
mod synthesis;

pub use chart::{ChartSuggestionAgent, ChartSuggestions, ChartType, GraphColumns, GraphSuggestion};
pub use classifier::{Classification, ClassifierAgent};
pub use query_generator::{GeneratedQueries, GeneratedQuery, QueryGeneratorAgent};
pub use synthesis::{
    InsightGeneratorAgent, InsightReport, RecommendationGeneratorAgent, RecommendationReport,
    ReportSection,
};

use serde::de::DeserializeOwned;

use crate::error::{AdsightError, Result};
use crate::llm::{extract_json_payload, CompletionOptions, LlmClient, Message};

/// Invokes the model and parses its response into the agent's output type.
///
/// Model errors (transport, auth, rate limits) propagate unmodified. A
/// response that carries no JSON payload, or whose payload does not match
/// `T`, is an output parse error tagged with the agent name.
pub(crate) async fn invoke_structured<T: DeserializeOwned>(
    llm: &dyn LlmClient,
    agent_name: &str,
    messages: &[Message],
    options: &CompletionOptions,
) -> Result<T> {
    let response = llm.complete(messages, options).await?;

    let payload = extract_json_payload(&response).ok_or_else(|| {
        AdsightError::output_parse(format!(
            "{} returned no JSON payload: {}",
            agent_name,
            snippet(&response)
        ))
    })?;

    serde_json::from_str(&payload).map_err(|e| {
        AdsightError::output_parse(format!(
            "{} output did not match the expected shape: {}",
            agent_name, e
        ))
    })
}

/// Truncates a model response for inclusion in error messages.
fn snippet(response: &str) -> String {
    const MAX_LEN: usize = 120;
    let trimmed = response.trim();
    if trimmed.len() <= MAX_LEN {
        trimmed.to_string()
    } else {
        let mut end = MAX_LEN;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &trimmed[..end])
    }
}

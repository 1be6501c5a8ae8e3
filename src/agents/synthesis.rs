//! Final synthesis agents.
//!
//! Turn executed query results into the user-facing narrative: an insight
//! report for the insight workflow, a sectioned recommendation report for
//! the optimization workflow.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::agents::{invoke_structured, prompts};
use crate::error::{AdsightError, Result};
use crate::graph::ExecutedQuery;
use crate::llm::{CompletionOptions, LlmClient};

/// Insight synthesis output.
#[derive(Debug, Clone, Deserialize)]
pub struct InsightReport {
    /// The formatted report, in Markdown.
    pub insight: String,
    /// How the data was analyzed.
    #[serde(default)]
    pub reasoning: String,
}

/// One section of a recommendation report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportSection {
    /// The recommendation headline.
    pub title: String,
    /// Supporting evidence and the concrete action, in Markdown.
    pub content: String,
}

/// Optimization synthesis output.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationReport {
    /// Recommendations in priority order.
    pub report_sections: Vec<ReportSection>,
    /// How the data led to the recommendations.
    #[serde(default)]
    pub reasoning: String,
}

/// Agent that synthesizes the final insight narrative.
pub struct InsightGeneratorAgent {
    llm: Arc<dyn LlmClient>,
    options: CompletionOptions,
}

impl InsightGeneratorAgent {
    /// Creates an insight generator using the given client and options.
    pub fn new(llm: Arc<dyn LlmClient>, options: CompletionOptions) -> Self {
        Self { llm, options }
    }

    /// Synthesizes an insight from the executed results.
    ///
    /// `query_reasoning` is the query generator's explanation, passed through
    /// so the analysis understands why each result set was fetched.
    pub async fn invoke(
        &self,
        query: &str,
        results: &[ExecutedQuery],
        query_reasoning: &str,
    ) -> Result<InsightReport> {
        let results_json = serde_json::to_string_pretty(results)
            .map_err(|e| AdsightError::internal(format!("Failed to serialize results: {e}")))?;
        let messages = prompts::insight_messages(query, &results_json, query_reasoning);
        invoke_structured(self.llm.as_ref(), "InsightGenerator", &messages, &self.options).await
    }
}

/// Agent that synthesizes the final optimization recommendations.
pub struct RecommendationGeneratorAgent {
    llm: Arc<dyn LlmClient>,
    options: CompletionOptions,
}

impl RecommendationGeneratorAgent {
    /// Creates a recommendation generator using the given client and options.
    pub fn new(llm: Arc<dyn LlmClient>, options: CompletionOptions) -> Self {
        Self { llm, options }
    }

    /// Synthesizes recommendations from the executed results.
    ///
    /// Results are grouped by objective before prompting, so evidence for
    /// one recommendation angle stays together.
    pub async fn invoke(
        &self,
        query: &str,
        results: &[ExecutedQuery],
    ) -> Result<RecommendationReport> {
        let mut grouped: BTreeMap<&str, Vec<&ExecutedQuery>> = BTreeMap::new();
        for result in results {
            grouped.entry(&result.objective).or_default().push(result);
        }

        let grouped_json = serde_json::to_string_pretty(&grouped)
            .map_err(|e| AdsightError::internal(format!("Failed to serialize results: {e}")))?;
        let messages = prompts::recommendation_messages(query, &grouped_json);
        invoke_structured(
            self.llm.as_ref(),
            "RecommendationGenerator",
            &messages,
            &self.options,
        )
        .await
    }
}

//! Cypher query generation from natural-language questions.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::agents::{invoke_structured, prompts};
use crate::error::Result;
use crate::llm::{CompletionOptions, LlmClient};

/// One generated query with its human-readable purpose.
///
/// The objective correlates the query with its executed rows and any chart
/// suggestion downstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedQuery {
    /// What the query is meant to fetch or check.
    pub objective: String,
    /// The Cypher text.
    pub query: String,
}

/// Query generator output.
///
/// An empty `queries` list means the question needs no data retrieval.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedQueries {
    /// Generated queries in presentation order.
    pub queries: Vec<GeneratedQuery>,
    /// Explanation of how the queries were constructed.
    #[serde(default)]
    pub reasoning: String,
}

/// Agent that generates Cypher queries for one workflow.
///
/// The insight and optimization variants differ only in their instruction
/// text; both take {query, schema} and return [`GeneratedQueries`].
pub struct QueryGeneratorAgent {
    llm: Arc<dyn LlmClient>,
    options: CompletionOptions,
    name: &'static str,
    system_template: &'static str,
}

impl QueryGeneratorAgent {
    /// Creates the insight-workflow query generator.
    pub fn insight(llm: Arc<dyn LlmClient>, options: CompletionOptions) -> Self {
        Self {
            llm,
            options,
            name: "InsightQueryGenerator",
            system_template: prompts::INSIGHT_QUERY_SYSTEM_TEMPLATE,
        }
    }

    /// Creates the optimization-workflow query generator.
    pub fn optimization(llm: Arc<dyn LlmClient>, options: CompletionOptions) -> Self {
        Self {
            llm,
            options,
            name: "OptimizationQueryGenerator",
            system_template: prompts::OPTIMIZATION_QUERY_SYSTEM_TEMPLATE,
        }
    }

    /// Returns the agent name used in error messages and logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Generates queries for the given question against the given schema.
    pub async fn invoke(&self, query: &str, schema: &str) -> Result<GeneratedQueries> {
        let messages = prompts::query_generator_messages(self.system_template, query, schema);
        invoke_structured(self.llm.as_ref(), self.name, &messages, &self.options).await
    }
}

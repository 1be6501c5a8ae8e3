//! Query intent classification.

use std::sync::Arc;

use serde::Deserialize;

use crate::agents::{invoke_structured, prompts};
use crate::error::Result;
use crate::llm::{CompletionOptions, LlmClient};

/// Raw classifier output.
///
/// The label is kept as a string here; mapping it onto a known workflow (and
/// rejecting unknown labels) is the router's decision.
#[derive(Debug, Clone, Deserialize)]
pub struct Classification {
    /// Chosen workflow label.
    pub workflow: String,
    /// Short natural-language justification.
    #[serde(default)]
    pub reasoning: String,
}

/// Agent that maps a free-text query to an insight or optimization workflow.
///
/// Classification is entirely model-driven; there is no rule-based fallback.
pub struct ClassifierAgent {
    llm: Arc<dyn LlmClient>,
    options: CompletionOptions,
}

impl ClassifierAgent {
    /// Creates a classifier using the given client and completion options.
    pub fn new(llm: Arc<dyn LlmClient>, options: CompletionOptions) -> Self {
        Self { llm, options }
    }

    /// Classifies the query.
    ///
    /// A response without a `workflow` key is an output parse error, never a
    /// silent default.
    pub async fn invoke(&self, query: &str) -> Result<Classification> {
        let messages = prompts::classifier_messages(query);
        invoke_structured(self.llm.as_ref(), "Classifier", &messages, &self.options).await
    }
}

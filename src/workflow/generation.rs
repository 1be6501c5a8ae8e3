//! Query-generation workflow.
//!
//! The insight and optimization workflows share one state machine:
//! `start -> load_schema -> generate_queries -> end`. Exactly one terminal
//! `*_workflow_end` status is emitted per invocation, on every exit path.

use std::sync::Arc;

use async_stream::stream;
use futures::stream::BoxStream;

use crate::agents::{GeneratedQueries, QueryGeneratorAgent};
use crate::graph::SchemaProvider;
use crate::llm::{CompletionOptions, LlmClient};
use crate::workflow::events::{step, StepStatus, WorkflowEvent, WorkflowKind};

/// One query-generation workflow instance.
///
/// Holds no per-request state; `run` may be called for any number of
/// requests.
pub struct GenerationWorkflow {
    kind: WorkflowKind,
    schema: SchemaProvider,
    generator: QueryGeneratorAgent,
}

impl GenerationWorkflow {
    /// Creates the insight workflow.
    pub fn insight(
        schema: SchemaProvider,
        llm: Arc<dyn LlmClient>,
        options: CompletionOptions,
    ) -> Self {
        Self {
            kind: WorkflowKind::Insight,
            schema,
            generator: QueryGeneratorAgent::insight(llm, options),
        }
    }

    /// Creates the optimization workflow.
    pub fn optimization(
        schema: SchemaProvider,
        llm: Arc<dyn LlmClient>,
        options: CompletionOptions,
    ) -> Self {
        Self {
            kind: WorkflowKind::Optimization,
            schema,
            generator: QueryGeneratorAgent::optimization(llm, options),
        }
    }

    /// Runs the workflow for one user query, yielding progress events.
    ///
    /// Query execution and final synthesis are the caller's responsibility;
    /// this stream ends once queries are generated (or the step failed).
    pub fn run<'a>(&'a self, user_query: &'a str) -> BoxStream<'a, WorkflowEvent> {
        Box::pin(stream! {
            yield WorkflowEvent::status(self.kind.start_step(), StepStatus::InProgress);

            yield WorkflowEvent::status_with_details(
                step::LOAD_SCHEMA,
                StepStatus::InProgress,
                "Loading graph schema...",
            );

            let schema_content = match self.schema.load().await {
                Ok(content) => content,
                Err(e) => {
                    yield WorkflowEvent::error(
                        step::LOAD_SCHEMA,
                        format!("Failed to load schema: {}", e),
                    );
                    yield WorkflowEvent::status(self.kind.end_step(), StepStatus::Completed);
                    return;
                }
            };

            yield WorkflowEvent::status_with_details(
                step::LOAD_SCHEMA,
                StepStatus::Completed,
                "Schema loaded.",
            );

            yield WorkflowEvent::status_with_details(
                step::GENERATE_QUERIES,
                StepStatus::InProgress,
                "Generating queries...",
            );

            let generated = match self.generator.invoke(user_query, &schema_content).await {
                Ok(generated) => generated,
                Err(e) => {
                    yield WorkflowEvent::error(
                        step::GENERATE_QUERIES,
                        format!("{} failed: {}", self.generator.name(), e),
                    );
                    yield WorkflowEvent::status(self.kind.end_step(), StepStatus::Completed);
                    return;
                }
            };

            let GeneratedQueries { queries, reasoning } = generated;

            if queries.is_empty() {
                yield WorkflowEvent::Status {
                    step: step::GENERATE_QUERIES.to_string(),
                    status: StepStatus::Completed,
                    details: Some(
                        "No specific queries are needed to answer this question.".to_string(),
                    ),
                    generated_queries: Some(Vec::new()),
                    requires_execution: Some(false),
                };
                yield WorkflowEvent::status(self.kind.end_step(), StepStatus::Completed);
                return;
            }

            let count = queries.len();
            yield WorkflowEvent::Status {
                step: step::GENERATE_QUERIES.to_string(),
                status: StepStatus::Completed,
                details: Some(format!(
                    "Generated {} quer{}.",
                    count,
                    if count == 1 { "y" } else { "ies" }
                )),
                generated_queries: Some(queries),
                requires_execution: None,
            };

            if !reasoning.is_empty() {
                yield WorkflowEvent::ReasoningSummary {
                    step: step::GENERATE_QUERIES.to_string(),
                    reasoning,
                };
            }

            yield WorkflowEvent::status(self.kind.end_step(), StepStatus::Completed);
        })
    }
}

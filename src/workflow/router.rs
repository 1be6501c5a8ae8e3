//! Top-level request router.
//!
//! Classifies an incoming query, then delegates to the matching workflow and
//! forwards its events verbatim. Owns the graph connection for the duration
//! of one `run`, closing it on every exit path.

use std::sync::Arc;

use async_stream::stream;
use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::agents::ClassifierAgent;
use crate::error::AdsightError;
use crate::graph::{GraphClient, GraphConnector, SchemaProvider};
use crate::llm::{CompletionOptions, LlmClient};
use crate::workflow::events::{step, StepStatus, WorkflowEvent, WorkflowKind};
use crate::workflow::generation::GenerationWorkflow;

/// Router over the two query-generation workflows.
///
/// Stateless across requests; safe to share behind an `Arc`.
pub struct Router {
    classifier: ClassifierAgent,
    insight: GenerationWorkflow,
    optimization: GenerationWorkflow,
    connector: Arc<dyn GraphConnector>,
}

impl Router {
    /// Creates a router with both workflows wired to the given clients.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        connector: Arc<dyn GraphConnector>,
        schema: SchemaProvider,
        options: CompletionOptions,
    ) -> Self {
        Self {
            classifier: ClassifierAgent::new(llm.clone(), options.clone()),
            insight: GenerationWorkflow::insight(schema.clone(), llm.clone(), options.clone()),
            optimization: GenerationWorkflow::optimization(schema, llm, options),
            connector,
        }
    }

    /// Runs the full classification-and-generation pipeline for one query.
    ///
    /// A classification failure (model error, unparsable output, unknown
    /// label) is fatal for the request: one error event is emitted and no
    /// workflow runs. On success, a `routing_decision` event precedes the
    /// chosen workflow's events, which are forwarded unmodified.
    pub fn run<'a>(&'a self, user_query: &'a str) -> BoxStream<'a, WorkflowEvent> {
        Box::pin(stream! {
            yield WorkflowEvent::status_with_details(
                step::START_ROUTER,
                StepStatus::InProgress,
                "Initializing...",
            );

            let connection = match self.connector.connect().await {
                Ok(connection) => connection,
                Err(e) => {
                    yield WorkflowEvent::error(
                        step::START_ROUTER,
                        format!("Failed to open graph connection: {}", e),
                    );
                    return;
                }
            };
            let mut connection = ConnectionGuard::new(connection);

            yield WorkflowEvent::status_with_details(
                step::CLASSIFY_QUERY,
                StepStatus::InProgress,
                "Classifying query...",
            );

            let classification = match self.classifier.invoke(user_query).await {
                Ok(classification) => classification,
                Err(e) => {
                    yield WorkflowEvent::error(
                        step::CLASSIFY_QUERY,
                        format!("Failed to classify query: {}", e),
                    );
                    connection.close().await;
                    return;
                }
            };

            let kind = match WorkflowKind::parse(&classification.workflow) {
                Some(kind) => kind,
                None => {
                    let error = AdsightError::unknown_workflow(&classification.workflow);
                    yield WorkflowEvent::error(step::CLASSIFY_QUERY, error.to_string());
                    connection.close().await;
                    return;
                }
            };

            info!("Query classified as '{}': {}", kind, classification.reasoning);

            yield WorkflowEvent::status_with_details(
                step::CLASSIFY_QUERY,
                StepStatus::Completed,
                format!("Query classified for '{}' workflow.", kind),
            );
            yield WorkflowEvent::RoutingDecision { workflow_type: kind };
            yield WorkflowEvent::status_with_details(
                step::ROUTE_WORKFLOW,
                StepStatus::InProgress,
                format!("Routing to '{}' workflow.", kind),
            );

            let workflow = match kind {
                WorkflowKind::Insight => &self.insight,
                WorkflowKind::Optimization => &self.optimization,
            };

            // Forward every workflow event verbatim.
            let mut inner = workflow.run(user_query);
            while let Some(event) = inner.next().await {
                yield event;
            }

            connection.close().await;
        })
    }
}

/// Guard ensuring the graph connection is released on every exit path.
///
/// Normal paths close explicitly; if the consumer abandons the stream
/// mid-iteration the guard's Drop releases the handle and logs it. A close
/// failure is logged, not surfaced, so it cannot mask the primary error.
struct ConnectionGuard {
    connection: Option<Box<dyn GraphClient>>,
}

impl ConnectionGuard {
    fn new(connection: Box<dyn GraphClient>) -> Self {
        Self {
            connection: Some(connection),
        }
    }

    async fn close(&mut self) {
        if let Some(connection) = self.connection.take() {
            if let Err(e) = connection.close().await {
                warn!("Failed to close graph connection: {}", e);
            }
        }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if self.connection.take().is_some() {
            debug!("Graph connection released without explicit close (stream abandoned)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{MockGraphClient, MockGraphConnector};
    use crate::llm::MockLlmClient;
    use std::io::Write;

    fn schema_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "- (:adaccount)-[:HAS_CAMPAIGN]->(:campaign)").unwrap();
        file
    }

    fn router_with(llm: MockLlmClient, schema_path: &std::path::Path) -> Router {
        Router::new(
            Arc::new(llm),
            Arc::new(MockGraphConnector::new(MockGraphClient::new())),
            SchemaProvider::new(schema_path),
            CompletionOptions::default(),
        )
    }

    async fn collect(router: &Router, query: &str) -> Vec<WorkflowEvent> {
        router.run(query).collect().await
    }

    fn routing_decisions(events: &[WorkflowEvent]) -> Vec<WorkflowKind> {
        events
            .iter()
            .filter_map(|e| match e {
                WorkflowEvent::RoutingDecision { workflow_type } => Some(*workflow_type),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_insight_query_routes_to_insight() {
        let file = schema_file();
        let router = router_with(MockLlmClient::new(), file.path());

        let events = collect(&router, "Show me the top 5 ads by clicks last week").await;

        assert_eq!(routing_decisions(&events), vec![WorkflowKind::Insight]);
        assert!(events.iter().any(|e| matches!(
            e,
            WorkflowEvent::Status { generated_queries: Some(q), .. } if !q.is_empty()
        )));
        assert!(events.last().unwrap().is_workflow_end());
    }

    #[tokio::test]
    async fn test_optimization_query_routes_to_optimization() {
        let file = schema_file();
        let router = router_with(MockLlmClient::new(), file.path());

        let events = collect(&router, "Suggest how to improve my CTR").await;

        assert_eq!(routing_decisions(&events), vec![WorkflowKind::Optimization]);
        assert!(matches!(
            events.last().unwrap(),
            WorkflowEvent::Status { step, .. } if step == "optimization_workflow_end"
        ));
    }

    #[tokio::test]
    async fn test_classifier_missing_key_emits_error_without_routing() {
        let file = schema_file();
        let llm = MockLlmClient::new()
            .with_response("intent classifier", r#"{"reasoning": "no label here"}"#);
        let router = router_with(llm, file.path());

        let events = collect(&router, "ambiguous").await;

        assert!(routing_decisions(&events).is_empty());
        let errors: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, WorkflowEvent::Error { .. }))
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            WorkflowEvent::Error { step, .. } if step.as_deref() == Some("classify_query")
        ));
    }

    #[tokio::test]
    async fn test_unknown_workflow_label_is_error_not_default() {
        let file = schema_file();
        let llm = MockLlmClient::new().with_response(
            "intent classifier",
            r#"{"workflow": "forecasting", "reasoning": "made up"}"#,
        );
        let router = router_with(llm, file.path());

        let events = collect(&router, "predict next month").await;

        assert!(routing_decisions(&events).is_empty());
        let error_message = events.iter().find_map(|e| match e {
            WorkflowEvent::Error { message, .. } => Some(message.clone()),
            _ => None,
        });
        assert!(error_message.unwrap().contains("forecasting"));
    }

    #[tokio::test]
    async fn test_classifier_model_error_is_fatal() {
        let file = schema_file();
        let router = router_with(MockLlmClient::failing("rate limited"), file.path());

        let events = collect(&router, "anything").await;

        assert!(routing_decisions(&events).is_empty());
        assert!(events.iter().any(|e| matches!(
            e,
            WorkflowEvent::Error { message, .. } if message.contains("rate limited")
        )));
        // No workflow events after a fatal classification error.
        assert!(!events.iter().any(|e| e.is_workflow_end()));
    }

    #[tokio::test]
    async fn test_exactly_one_routing_decision_on_success() {
        let file = schema_file();
        let router = router_with(MockLlmClient::new(), file.path());

        let events = collect(&router, "How are my campaigns performing?").await;

        assert_eq!(routing_decisions(&events).len(), 1);
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, WorkflowEvent::Error { .. }))
                .count(),
            0
        );
    }

    #[tokio::test]
    async fn test_workflow_events_forwarded_verbatim() {
        let file = schema_file();
        let router = router_with(MockLlmClient::new(), file.path());

        let events = collect(&router, "Top ads by clicks").await;

        // The workflow's own start status arrives unmodified through the
        // router stream.
        assert!(events.iter().any(|e| matches!(
            e,
            WorkflowEvent::Status { step, .. } if step == "insight_workflow_start"
        )));
        assert!(events
            .iter()
            .any(|e| matches!(e, WorkflowEvent::ReasoningSummary { .. })));
    }

    #[tokio::test]
    async fn test_abandoned_stream_still_releases_connection() {
        let file = schema_file();
        let router = router_with(MockLlmClient::new(), file.path());

        let mut stream = router.run("Top ads by clicks");
        // Consume only the first event, then drop the stream mid-run.
        let first = stream.next().await;
        assert!(first.is_some());
        drop(stream);
        // The guard's Drop must release the connection without panicking.
    }
}

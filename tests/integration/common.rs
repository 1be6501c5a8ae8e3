//! Shared fixtures for the integration tests.

use std::io::Write;
use std::sync::Arc;

use adsight::config::Config;
use adsight::graph::{MockGraphClient, MockGraphConnector};
use adsight::llm::MockLlmClient;
use adsight::server::gateway::process_message;
use adsight::server::AppState;
use adsight::workflow::WorkflowEvent;
use futures::StreamExt;

/// A test fixture holding the app state plus handles to its mocks.
pub struct Fixture {
    pub state: AppState,
    pub graph: MockGraphClient,
    /// Keeps the schema file alive for the fixture's lifetime.
    _schema_file: tempfile::NamedTempFile,
}

impl Fixture {
    /// Builds a fixture with the given mock clients and a valid schema file.
    pub fn new(llm: MockLlmClient, graph: MockGraphClient) -> Self {
        let mut schema_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            schema_file,
            "# Ads Graph Schema\n\n- (:adaccount)-[:HAS_CAMPAIGN]->(:campaign)\n- (:campaign)-[:HAS_ADGROUP]->(:adgroup)\n- (:adgroup)-[:HAS_AD]->(:ad)\n- (:ad)-[:HAS_METRICS]->(:metrics {{clicks, impressions, cost}})"
        )
        .unwrap();

        let config = Config {
            schema_file: schema_file.path().to_path_buf(),
            ..Default::default()
        };

        let state = AppState::new(
            &config,
            Arc::new(llm),
            Arc::new(MockGraphConnector::new(graph.clone())),
        );

        Self {
            state,
            graph,
            _schema_file: schema_file,
        }
    }

    /// Fixture whose schema file does not exist.
    pub fn with_missing_schema(llm: MockLlmClient) -> (AppState, MockGraphClient) {
        let graph = MockGraphClient::new();
        let config = Config {
            schema_file: "/nonexistent/adsight-schema.md".into(),
            ..Default::default()
        };
        let state = AppState::new(
            &config,
            Arc::new(llm),
            Arc::new(MockGraphConnector::new(graph.clone())),
        );
        (state, graph)
    }

    /// Runs one client message through the gateway pipeline and collects
    /// every emitted event.
    pub async fn run(&self, message: &str) -> Vec<WorkflowEvent> {
        process_message(&self.state, message).collect().await
    }
}

impl Default for Fixture {
    /// Default mocks with a valid schema file.
    fn default() -> Self {
        Self::new(MockLlmClient::new(), MockGraphClient::new())
    }
}

/// Collects events for a state built outside the fixture.
pub async fn run_message(state: &AppState, message: &str) -> Vec<WorkflowEvent> {
    process_message(state, message).collect().await
}

/// Extracts the routing decisions from an event stream.
pub fn routing_decisions(events: &[WorkflowEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            WorkflowEvent::RoutingDecision { workflow_type } => {
                Some(workflow_type.as_str().to_string())
            }
            _ => None,
        })
        .collect()
}

/// Extracts the error messages from an event stream.
pub fn error_messages(events: &[WorkflowEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            WorkflowEvent::Error { message, .. } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

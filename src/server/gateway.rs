//! WebSocket chat gateway.
//!
//! Bridges one client connection to the analysis pipeline: relays router
//! events, executes generated queries, and emits the synthesized answer and
//! chart suggestions.

use async_stream::stream;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::agents::{GeneratedQuery, GraphSuggestion};
use crate::graph::{ExecutedQuery, GraphClient};
use crate::server::AppState;
use crate::workflow::{step, StepStatus, WorkflowEvent, WorkflowKind};

/// Marker opening a staged-context preamble in a client message.
const CONTEXT_START_MARKER: &str = "---DISPLAY_CONTEXT START---";

/// Marker separating the staged context from the literal query.
const QUERY_START_MARKER: &str = "---QUERY START---";

/// WebSocket upgrade handler for `/api/v1/chat/stream`.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Per-connection loop: greet with the session id, then answer queries until
/// the client disconnects.
async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let user_id = Uuid::new_v4().to_string();

    let greeting = WorkflowEvent::ConnectionEstablished {
        user_id: user_id.clone(),
    };
    if send_event(&mut socket, &greeting).await.is_err() {
        return;
    }
    info!("WebSocket connection established: {}", user_id);

    while let Some(message) = socket.recv().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                debug!("WebSocket receive error for {}: {}", user_id, e);
                break;
            }
        };

        match message {
            Message::Text(text) => {
                let mut events = process_message(&state, &text);
                let mut client_gone = false;
                while let Some(event) = events.next().await {
                    if send_event(&mut socket, &event).await.is_err() {
                        client_gone = true;
                        break;
                    }
                }
                if client_gone {
                    break;
                }
            }
            Message::Close(_) => break,
            // Pings are answered by axum; binary frames are not part of the
            // protocol.
            _ => {}
        }
    }

    info!("WebSocket connection closed: {}", user_id);
}

/// Serializes and sends one event frame.
async fn send_event(
    socket: &mut WebSocket,
    event: &WorkflowEvent,
) -> std::result::Result<(), axum::Error> {
    let json = serde_json::to_string(event)
        .expect("workflow events always serialize");
    socket.send(Message::Text(json)).await
}

/// Runs the full pipeline for one client message, yielding every event that
/// should reach the client, in order.
///
/// An error in any phase is surfaced as an `error` event; the stream ends
/// and the connection stays usable for the next query.
pub fn process_message<'a>(state: &'a AppState, raw: &'a str) -> BoxStream<'a, WorkflowEvent> {
    Box::pin(stream! {
        let message = ClientMessage::parse(raw);
        let prompt = message.contextualized();
        debug!("Processing query: {}", message.query);

        // Phase 1: classification and query generation, relayed verbatim.
        let mut captured = CapturedRun::new();
        {
            let mut events = state.router.run(&prompt);
            while let Some(event) = events.next().await {
                captured.observe(&event);
                yield event;
            }
        }

        let Some(workflow) = captured.workflow else {
            // Classification failed; the error event was already relayed.
            return;
        };

        // Phase 2: execute generated queries, one result per objective.
        if !captured.requires_execution {
            yield WorkflowEvent::status_with_details(
                step::QUERY_EXECUTION,
                StepStatus::Skipped,
                "No queries to execute for this question.",
            );
            return;
        }
        if captured.queries.is_empty() {
            // The workflow ended without producing queries (generation
            // failed); its error event was already relayed.
            return;
        }

        yield WorkflowEvent::status_with_details(
            step::QUERY_EXECUTION,
            StepStatus::InProgress,
            format!("Executing {} generated quer{}...",
                captured.queries.len(),
                if captured.queries.len() == 1 { "y" } else { "ies" }),
        );

        let connection = match state.connector.connect().await {
            Ok(connection) => connection,
            Err(e) => {
                yield WorkflowEvent::error(
                    step::QUERY_EXECUTION,
                    format!("Failed to open graph connection: {}", e),
                );
                return;
            }
        };

        let mut results = execute_all(connection.as_ref(), &captured.queries).await;
        if let Err(e) = connection.close().await {
            warn!("Failed to close graph connection: {}", e);
        }

        if let Some(platform) = &state.platform {
            for result in &mut results {
                result.platform = Some(platform.clone());
            }
        }

        for result in &results {
            yield WorkflowEvent::QueryResult {
                result: result.clone(),
            };
        }

        let failed = results.iter().filter(|r| r.error.is_some()).count();
        let execution_details = if failed == 0 {
            format!("Finished executing {} queries.", results.len())
        } else {
            format!(
                "Finished executing {} queries. {} failed.",
                results.len(),
                failed
            )
        };
        yield WorkflowEvent::status_with_details(
            step::QUERY_EXECUTION,
            StepStatus::Completed,
            execution_details,
        );

        // Phase 3: synthesis. Needs at least one usable result set; failed
        // objectives are kept in the input so the narrative can mention them.
        if results.iter().all(|r| r.error.is_some()) {
            yield WorkflowEvent::status_with_details(
                step::FINAL_ANALYSIS,
                StepStatus::Skipped,
                "All query executions failed; nothing to analyze.",
            );
            return;
        }

        yield WorkflowEvent::status_with_details(
            step::FINAL_ANALYSIS,
            StepStatus::InProgress,
            format!("Generating final {} and chart suggestions...", workflow),
        );

        match workflow {
            WorkflowKind::Insight => {
                let reasoning = captured.reasoning.as_deref().unwrap_or("");
                let (insight, charts) = tokio::join!(
                    state
                        .insight_generator
                        .invoke(&message.query, &results, reasoning),
                    state.chart_agent.invoke(&message.query, &results),
                );

                yield chart_event(charts);

                match insight {
                    Ok(report) => {
                        yield WorkflowEvent::FinalInsight {
                            insight: report.insight,
                            reasoning: Some(report.reasoning),
                            executed_queries: Some(captured.queries.clone()),
                        };
                    }
                    Err(e) => {
                        yield WorkflowEvent::error(
                            step::FINAL_ANALYSIS,
                            format!("Failed to generate insight: {}", e),
                        );
                    }
                }
            }
            WorkflowKind::Optimization => {
                let (recommendation, charts) = tokio::join!(
                    state
                        .recommendation_generator
                        .invoke(&message.query, &results),
                    state.chart_agent.invoke(&message.query, &results),
                );

                yield chart_event(charts);

                match recommendation {
                    Ok(report) => {
                        yield WorkflowEvent::FinalRecommendation {
                            report_sections: report.report_sections,
                            reasoning: Some(report.reasoning),
                            executed_queries: Some(captured.queries.clone()),
                        };
                    }
                    Err(e) => {
                        yield WorkflowEvent::error(
                            step::FINAL_ANALYSIS,
                            format!("Failed to generate recommendations: {}", e),
                        );
                    }
                }
            }
        }
    })
}

/// Executes all generated queries against one connection, fire-and-collect.
///
/// Objectives are independent reads; a failure in one never aborts the
/// others. Result order follows the generated order.
async fn execute_all(
    connection: &dyn GraphClient,
    queries: &[GeneratedQuery],
) -> Vec<ExecutedQuery> {
    let executions = queries.iter().map(|generated| async move {
        match connection.run_query(&generated.query).await {
            Ok(rows) => ExecutedQuery::success(&generated.objective, &generated.query, rows),
            Err(e) => {
                warn!(
                    "Query execution failed for objective '{}': {}",
                    generated.objective, e
                );
                ExecutedQuery::failure(&generated.objective, &generated.query, e.to_string())
            }
        }
    });

    futures::future::join_all(executions).await
}

/// Builds the graph_suggestions event, degrading a chart-agent failure to an
/// empty list rather than an error frame.
fn chart_event(
    charts: crate::error::Result<Vec<GraphSuggestion>>,
) -> WorkflowEvent {
    let graph_suggestions = match charts {
        Ok(suggestions) => suggestions,
        Err(e) => {
            warn!("Chart suggestion agent failed: {}", e);
            Vec::new()
        }
    };
    WorkflowEvent::GraphSuggestions { graph_suggestions }
}

/// A parsed client message.
///
/// The frontend may stage extra context (e.g. the visible conversation) in
/// front of the literal query using the display-context markers.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientMessage {
    /// Staged context preamble, when present.
    pub context: Option<String>,
    /// The literal user query.
    pub query: String,
}

impl ClientMessage {
    /// Parses a raw client frame, splitting staged context from the query.
    pub fn parse(raw: &str) -> Self {
        if let (Some(context_idx), Some(query_idx)) =
            (raw.find(CONTEXT_START_MARKER), raw.find(QUERY_START_MARKER))
        {
            if context_idx < query_idx {
                let context = raw[context_idx + CONTEXT_START_MARKER.len()..query_idx].trim();
                let query = raw[query_idx + QUERY_START_MARKER.len()..].trim();
                return Self {
                    context: (!context.is_empty()).then(|| context.to_string()),
                    query: query.to_string(),
                };
            }
        }

        Self {
            context: None,
            query: raw.trim().to_string(),
        }
    }

    /// Returns the prompt for the pipeline: staged context followed by the
    /// query, or just the query. Markers never reach the model.
    pub fn contextualized(&self) -> String {
        match &self.context {
            Some(context) => format!("{}\n\n{}", context, self.query),
            None => self.query.clone(),
        }
    }
}

/// What the gateway remembers from the router's event stream.
struct CapturedRun {
    workflow: Option<WorkflowKind>,
    queries: Vec<GeneratedQuery>,
    reasoning: Option<String>,
    requires_execution: bool,
}

impl CapturedRun {
    fn new() -> Self {
        Self {
            workflow: None,
            queries: Vec::new(),
            reasoning: None,
            requires_execution: true,
        }
    }

    /// Inspects one relayed event for state the later phases need.
    fn observe(&mut self, event: &WorkflowEvent) {
        match event {
            WorkflowEvent::RoutingDecision { workflow_type } => {
                self.workflow = Some(*workflow_type);
            }
            WorkflowEvent::Status {
                step,
                generated_queries: Some(queries),
                requires_execution,
                ..
            } if step == crate::workflow::step::GENERATE_QUERIES => {
                self.queries = queries.clone();
                if *requires_execution == Some(false) {
                    self.requires_execution = false;
                }
            }
            WorkflowEvent::ReasoningSummary { step, reasoning }
                if step == crate::workflow::step::GENERATE_QUERIES =>
            {
                self.reasoning = Some(reasoning.clone());
            }
            _ => {}
        }
    }
}

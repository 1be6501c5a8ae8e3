//! HTTP/WebSocket server assembly.

pub mod gateway;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::get;
use axum::Json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::agents::{ChartSuggestionAgent, InsightGeneratorAgent, RecommendationGeneratorAgent};
use crate::config::Config;
use crate::error::{AdsightError, Result};
use crate::graph::GraphConnector;
use crate::llm::{CompletionOptions, LlmClient};
use crate::workflow::Router;

/// Sampling temperature for the chart suggestion agent. The other agents
/// run at 0.
const CHART_TEMPERATURE: f32 = 0.1;

/// Shared state behind every connection.
#[derive(Clone)]
pub struct AppState {
    /// Request router (classification + query generation).
    pub router: Arc<Router>,
    /// Connector used by the gateway for query execution.
    pub connector: Arc<dyn GraphConnector>,
    /// Insight synthesis agent.
    pub insight_generator: Arc<InsightGeneratorAgent>,
    /// Optimization synthesis agent.
    pub recommendation_generator: Arc<RecommendationGeneratorAgent>,
    /// Chart suggestion agent.
    pub chart_agent: Arc<ChartSuggestionAgent>,
    /// Ad platform tag stamped onto query results, when configured.
    pub platform: Option<String>,
}

impl AppState {
    /// Wires up the router and agents from the configuration.
    pub fn new(
        config: &Config,
        llm: Arc<dyn LlmClient>,
        connector: Arc<dyn GraphConnector>,
    ) -> Self {
        let mut options = CompletionOptions::new().with_temperature(0.0);
        if let Some(model) = &config.llm.model {
            options = options.with_model(model.clone());
        }

        let schema = crate::graph::SchemaProvider::new(config.schema_file.clone());
        let router = Router::new(llm.clone(), connector.clone(), schema, options.clone());

        let chart_options = options.clone().with_temperature(CHART_TEMPERATURE);

        Self {
            router: Arc::new(router),
            connector,
            insight_generator: Arc::new(InsightGeneratorAgent::new(llm.clone(), options.clone())),
            recommendation_generator: Arc::new(RecommendationGeneratorAgent::new(
                llm.clone(),
                options,
            )),
            chart_agent: Arc::new(ChartSuggestionAgent::new(llm, chart_options)),
            platform: config.graph.platform.clone(),
        }
    }
}

/// Builds the axum application with the chat stream route and CORS for the
/// configured frontend origin.
pub fn build_app(state: AppState, cors_origin: &str) -> Result<axum::Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| AdsightError::config(format!("Invalid CORS origin '{cors_origin}': {e}")))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(axum::Router::new()
        .route("/", get(health))
        .route("/api/v1/chat/stream", get(gateway::ws_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Adsight backend is running." }))
}

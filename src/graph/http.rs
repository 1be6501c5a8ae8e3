//! Graph store client over the HTTP transactional query API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::GraphConfig;
use crate::error::{AdsightError, Result};
use crate::graph::{GraphClient, RowRecord};

/// Default timeout for query requests.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Graph store client speaking the HTTP transactional endpoint
/// (`/db/{database}/tx/commit`).
pub struct HttpGraphClient {
    client: Client,
    commit_url: String,
    user: Option<String>,
    password: Option<String>,
}

impl HttpGraphClient {
    /// Opens a client for the configured store and verifies connectivity
    /// with a trivial query.
    pub async fn connect(config: &GraphConfig) -> Result<Self> {
        let endpoint = config.endpoint_url()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                AdsightError::connection(format!("Failed to create HTTP client: {}", e))
            })?;

        let commit_url = format!(
            "{}/db/{}/tx/commit",
            endpoint.as_str().trim_end_matches('/'),
            config.database
        );

        let graph_client = Self {
            client,
            commit_url,
            user: config.user.clone(),
            password: config.password.clone(),
        };

        // Fail fast on unreachable stores before any model call is spent.
        graph_client
            .run_query("RETURN 1 AS ok")
            .await
            .map_err(|e| {
                AdsightError::connection(format!(
                    "Graph store at {} is not reachable: {}",
                    config.display_string(),
                    e
                ))
            })?;

        debug!("Connected to graph store: {}", config.display_string());
        Ok(graph_client)
    }

    /// Builds the request with optional basic auth applied.
    fn request(&self, body: &TxRequest) -> reqwest::RequestBuilder {
        let mut builder = self.client.post(&self.commit_url).json(body);
        if let Some(user) = &self.user {
            builder = builder.basic_auth(user, self.password.as_deref());
        }
        builder
    }

    /// Zips a statement result's columns with each row into records.
    fn rows_from_result(result: TxResult) -> Vec<RowRecord> {
        result
            .data
            .into_iter()
            .map(|entry| {
                result
                    .columns
                    .iter()
                    .cloned()
                    .zip(entry.row)
                    .collect::<RowRecord>()
            })
            .collect()
    }
}

#[async_trait]
impl GraphClient for HttpGraphClient {
    async fn run_query(&self, query: &str) -> Result<Vec<RowRecord>> {
        let body = TxRequest {
            statements: vec![TxStatement {
                statement: query.to_string(),
            }],
        };

        let response = self.request(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                AdsightError::query_execution("Query timed out")
            } else if e.is_connect() {
                AdsightError::connection("Failed to connect to graph store")
            } else {
                AdsightError::query_execution(format!("Request failed: {}", e))
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AdsightError::connection(
                "Graph store authentication failed. Check GRAPH_USERNAME/GRAPH_PASSWORD.",
            ));
        }

        let body: TxResponse = response
            .json()
            .await
            .map_err(|e| AdsightError::query_execution(format!("Malformed response: {}", e)))?;

        if let Some(error) = body.errors.first() {
            return Err(AdsightError::query_execution(format!(
                "{}: {}",
                error.code, error.message
            )));
        }

        let rows = body
            .results
            .into_iter()
            .next()
            .map(Self::rows_from_result)
            .unwrap_or_default();

        Ok(rows)
    }

    async fn close(&self) -> Result<()> {
        // The HTTP transport holds no server-side session state.
        Ok(())
    }
}

// HTTP transactional API types

#[derive(Debug, Serialize)]
struct TxRequest {
    statements: Vec<TxStatement>,
}

#[derive(Debug, Serialize)]
struct TxStatement {
    statement: String,
}

#[derive(Debug, Deserialize)]
struct TxResponse {
    #[serde(default)]
    results: Vec<TxResult>,
    #[serde(default)]
    errors: Vec<TxError>,
}

#[derive(Debug, Deserialize)]
struct TxResult {
    columns: Vec<String>,
    data: Vec<TxRow>,
}

#[derive(Debug, Deserialize)]
struct TxRow {
    row: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TxError {
    code: String,
    message: String,
}

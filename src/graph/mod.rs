//! Graph store abstraction for Adsight.
//!
//! Provides a trait-based interface for executing generated queries against
//! the graph database, plus the schema description provider.

mod http;
mod mock;
mod schema;

pub use http::HttpGraphClient;
pub use mock::{FailingGraphClient, MockGraphClient};
pub use schema::SchemaProvider;

use crate::config::GraphConfig;
use crate::error::Result;
use async_trait::async_trait;

/// A single result row.
///
/// Row shape is dynamic per query; columns are whatever the generated query
/// returned, so rows are modeled as ordered string-keyed JSON maps rather
/// than a fixed schema.
pub type RowRecord = serde_json::Map<String, serde_json::Value>;

/// Result of executing one generated query.
///
/// Held only for the duration of one request, never persisted. A failed
/// execution carries its error here instead of aborting sibling objectives.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ExecutedQuery {
    /// The objective of the generated query this result belongs to.
    pub objective: String,
    /// The query text that was executed.
    pub query: String,
    /// Result rows. Empty when the query failed.
    pub data: Vec<RowRecord>,
    /// Execution error, if the query failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Source ad platform, when known (e.g. "google", "facebook").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

impl ExecutedQuery {
    /// Creates a successful result.
    pub fn success(
        objective: impl Into<String>,
        query: impl Into<String>,
        data: Vec<RowRecord>,
    ) -> Self {
        Self {
            objective: objective.into(),
            query: query.into(),
            data,
            error: None,
            platform: None,
        }
    }

    /// Creates a failed result.
    pub fn failure(
        objective: impl Into<String>,
        query: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            objective: objective.into(),
            query: query.into(),
            data: Vec::new(),
            error: Some(error.into()),
            platform: None,
        }
    }
}

/// Trait defining the interface for graph store clients.
///
/// All operations are async and return Results with AdsightError.
#[async_trait]
pub trait GraphClient: Send + Sync {
    /// Executes a query and returns the result rows.
    async fn run_query(&self, query: &str) -> Result<Vec<RowRecord>>;

    /// Closes the connection.
    async fn close(&self) -> Result<()>;
}

/// Trait for opening graph store connections.
///
/// Each request opens and closes its own connection; the connector is the
/// long-lived handle shared across requests.
#[async_trait]
pub trait GraphConnector: Send + Sync {
    /// Opens a fresh connection, verifying the store is reachable.
    async fn connect(&self) -> Result<Box<dyn GraphClient>>;
}

/// Connector backed by the graph store's HTTP query API.
pub struct HttpGraphConnector {
    config: GraphConfig,
}

impl HttpGraphConnector {
    /// Creates a connector for the given graph configuration.
    pub fn new(config: GraphConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl GraphConnector for HttpGraphConnector {
    async fn connect(&self) -> Result<Box<dyn GraphClient>> {
        let client = HttpGraphClient::connect(&self.config).await?;
        Ok(Box::new(client))
    }
}

/// Connector that hands out clones of a shared mock client.
///
/// Clones share the recorded-query log, so tests can inspect what was
/// executed regardless of which connection ran it.
pub struct MockGraphConnector {
    client: MockGraphClient,
}

impl MockGraphConnector {
    /// Creates a connector around the given mock client.
    pub fn new(client: MockGraphClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GraphConnector for MockGraphConnector {
    async fn connect(&self) -> Result<Box<dyn GraphClient>> {
        Ok(Box::new(self.client.clone()))
    }
}

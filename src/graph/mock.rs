//! Mock graph clients for testing.

use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, Mutex};

use crate::error::{AdsightError, Result};
use crate::graph::{GraphClient, RowRecord};

/// A mock graph client that returns predefined rows.
///
/// Records every executed query so tests can assert on execution behavior.
/// Clones share the same recorded log and canned responses.
#[derive(Clone, Default)]
pub struct MockGraphClient {
    /// Canned responses (pattern -> rows). Checked in insertion order.
    responses: Arc<Mutex<Vec<(String, Vec<RowRecord>)>>>,
    /// Queries executed through this client (and its clones).
    executed: Arc<Mutex<Vec<String>>>,
    /// Patterns that make a matching query fail.
    failing_patterns: Arc<Mutex<Vec<String>>>,
}

impl MockGraphClient {
    /// Creates a new mock client with a generic single-row response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a canned response for queries containing `pattern`.
    pub fn with_rows(self, pattern: impl Into<String>, rows: Vec<RowRecord>) -> Self {
        self.responses.lock().unwrap().push((pattern.into(), rows));
        self
    }

    /// Makes queries containing `pattern` fail with a query execution error.
    pub fn with_failure(self, pattern: impl Into<String>) -> Self {
        self.failing_patterns.lock().unwrap().push(pattern.into());
        self
    }

    /// Returns the queries executed so far, in order.
    pub fn executed_queries(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    /// Builds a row from (column, value) pairs. Test helper.
    pub fn row(pairs: &[(&str, serde_json::Value)]) -> RowRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

#[async_trait]
impl GraphClient for MockGraphClient {
    async fn run_query(&self, query: &str) -> Result<Vec<RowRecord>> {
        self.executed.lock().unwrap().push(query.to_string());

        let query_lower = query.to_lowercase();
        for pattern in self.failing_patterns.lock().unwrap().iter() {
            if query_lower.contains(&pattern.to_lowercase()) {
                return Err(AdsightError::query_execution(format!(
                    "Simulated failure for query: {}",
                    query
                )));
            }
        }

        for (pattern, rows) in self.responses.lock().unwrap().iter() {
            if query_lower.contains(&pattern.to_lowercase()) {
                return Ok(rows.clone());
            }
        }

        // Generic default row so callers always get plottable data.
        Ok(vec![Self::row(&[
            ("name", json!("Summer Sale")),
            ("value", json!(1500)),
        ])])
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A graph client that fails every operation.
///
/// Used to test error paths.
#[derive(Debug, Clone, Default)]
pub struct FailingGraphClient;

impl FailingGraphClient {
    /// Creates a new failing client.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GraphClient for FailingGraphClient {
    async fn run_query(&self, _query: &str) -> Result<Vec<RowRecord>> {
        Err(AdsightError::query_execution("Graph store unavailable"))
    }

    async fn close(&self) -> Result<()> {
        Err(AdsightError::connection("Connection already lost"))
    }
}

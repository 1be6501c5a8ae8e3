//! Graph schema description loading.
//!
//! The schema is a markdown document describing node labels, relationships
//! and metric properties; it is injected verbatim into query-generation
//! prompts.

use std::path::PathBuf;

use crate::error::{AdsightError, Result};

/// Loads the graph schema description from a file.
#[derive(Debug, Clone)]
pub struct SchemaProvider {
    path: PathBuf,
}

impl SchemaProvider {
    /// Creates a provider for the given schema file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the schema content.
    ///
    /// Fails with a schema-not-found error if the file is missing, unreadable
    /// or empty.
    pub async fn load(&self) -> Result<String> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|_| AdsightError::schema_not_found(self.path.display()))?;

        if content.trim().is_empty() {
            return Err(AdsightError::schema_not_found(self.path.display()));
        }

        Ok(content)
    }
}

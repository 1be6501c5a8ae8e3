//! Error types for Adsight.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for Adsight operations.
#[derive(Error, Debug)]
pub enum AdsightError {
    /// Upstream model errors (transport, auth, rate limits, timeouts).
    #[error("Model error: {0}")]
    Model(String),

    /// Model responses that do not match the required output shape.
    #[error("Output parse error: {0}")]
    OutputParse(String),

    /// The graph schema description file is missing or unreadable.
    #[error("{0}")]
    SchemaNotFound(String),

    /// Query execution errors against the graph store.
    #[error("Query execution error: {0}")]
    QueryExecution(String),

    /// Graph store connection errors (endpoint unreachable, auth failed, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// The classifier produced a label that is not a known workflow.
    #[error("Unknown workflow: {0}")]
    UnknownWorkflow(String),

    /// Configuration errors (invalid config file, missing required fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AdsightError {
    /// Creates a model error with the given message.
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Creates an output parse error with the given message.
    pub fn output_parse(msg: impl Into<String>) -> Self {
        Self::OutputParse(msg.into())
    }

    /// Creates a schema-not-found error for the given schema path.
    pub fn schema_not_found(path: impl std::fmt::Display) -> Self {
        Self::SchemaNotFound(format!("Schema file '{path}' could not be loaded"))
    }

    /// Creates a query execution error with the given message.
    pub fn query_execution(msg: impl Into<String>) -> Self {
        Self::QueryExecution(msg.into())
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates an unknown-workflow error for the given label.
    pub fn unknown_workflow(label: impl Into<String>) -> Self {
        Self::UnknownWorkflow(label.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Model(_) => "Model Error",
            Self::OutputParse(_) => "Output Parse Error",
            Self::SchemaNotFound(_) => "Schema Error",
            Self::QueryExecution(_) => "Query Execution Error",
            Self::Connection(_) => "Connection Error",
            Self::UnknownWorkflow(_) => "Unknown Workflow",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using AdsightError.
pub type Result<T> = std::result::Result<T, AdsightError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_model() {
        let err = AdsightError::model("Rate limited. Please wait.");
        assert_eq!(err.to_string(), "Model error: Rate limited. Please wait.");
        assert_eq!(err.category(), "Model Error");
    }

    #[test]
    fn test_error_display_output_parse() {
        let err = AdsightError::output_parse("missing field `workflow`");
        assert_eq!(
            err.to_string(),
            "Output parse error: missing field `workflow`"
        );
        assert_eq!(err.category(), "Output Parse Error");
    }

    #[test]
    fn test_error_display_schema_not_found() {
        let err = AdsightError::schema_not_found("graph_schema.md");
        assert_eq!(
            err.to_string(),
            "Schema file 'graph_schema.md' could not be loaded"
        );
        assert_eq!(err.category(), "Schema Error");
    }

    #[test]
    fn test_error_display_query_execution() {
        let err = AdsightError::query_execution("Variable `c` not defined");
        assert_eq!(
            err.to_string(),
            "Query execution error: Variable `c` not defined"
        );
        assert_eq!(err.category(), "Query Execution Error");
    }

    #[test]
    fn test_error_display_unknown_workflow() {
        let err = AdsightError::unknown_workflow("forecasting");
        assert_eq!(err.to_string(), "Unknown workflow: forecasting");
        assert_eq!(err.category(), "Unknown Workflow");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AdsightError>();
    }
}

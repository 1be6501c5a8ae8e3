//! Wire events for the analysis pipeline.
//!
//! Every message sent to a client is one [`WorkflowEvent`]. The enum is a
//! closed sum over the protocol's `type` discriminators so dispatch in the
//! gateway is exhaustiveness-checked at compile time.

use serde::{Deserialize, Serialize};

use crate::agents::{GeneratedQuery, GraphSuggestion, ReportSection};
use crate::graph::ExecutedQuery;

/// Pipeline step identifiers used in status and error events.
pub mod step {
    pub const START_ROUTER: &str = "start_router";
    pub const CLASSIFY_QUERY: &str = "classify_query";
    pub const ROUTE_WORKFLOW: &str = "route_workflow";
    pub const LOAD_SCHEMA: &str = "load_schema";
    pub const GENERATE_QUERIES: &str = "generate_queries";
    pub const QUERY_EXECUTION: &str = "query_execution";
    pub const FINAL_ANALYSIS: &str = "final_analysis";
}

/// Which workflow a query was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowKind {
    Insight,
    Optimization,
}

impl WorkflowKind {
    /// Returns the kind as its wire label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insight => "insight",
            Self::Optimization => "optimization",
        }
    }

    /// Parses a classifier label. Unknown labels yield `None`; the caller
    /// decides how to surface that (never a silent default).
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "insight" => Some(Self::Insight),
            "optimization" => Some(Self::Optimization),
            _ => None,
        }
    }

    /// Step name of the workflow's opening status event.
    pub fn start_step(&self) -> String {
        format!("{}_workflow_start", self.as_str())
    }

    /// Step name of the workflow's terminal status event.
    pub fn end_step(&self) -> String {
        format!("{}_workflow_end", self.as_str())
    }
}

impl std::fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Progress state carried by status events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    InProgress,
    Completed,
    Failed,
    Skipped,
}

/// One server-to-client message.
///
/// Events are emitted in strict chronological order on a single logical
/// stream per request; consumers treat the stream as ordered and
/// append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    /// First message on a new connection, carrying the session id.
    ConnectionEstablished { user_id: String },

    /// Progress update for one pipeline step.
    Status {
        step: String,
        status: StepStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<String>,
        /// Present on the completed `generate_queries` status.
        #[serde(skip_serializing_if = "Option::is_none")]
        generated_queries: Option<Vec<GeneratedQuery>>,
        /// `false` when the workflow determined no execution is needed;
        /// omitted (implied true) otherwise.
        #[serde(skip_serializing_if = "Option::is_none")]
        requires_execution: Option<bool>,
    },

    /// Model reasoning attached to a pipeline step.
    ReasoningSummary { step: String, reasoning: String },

    /// The classifier's verdict.
    RoutingDecision { workflow_type: WorkflowKind },

    /// One objective's execution result.
    QueryResult {
        #[serde(flatten)]
        result: ExecutedQuery,
    },

    /// Chart recommendations for the executed results.
    GraphSuggestions {
        graph_suggestions: Vec<GraphSuggestion>,
    },

    /// Terminal answer for the insight workflow.
    FinalInsight {
        insight: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reasoning: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        executed_queries: Option<Vec<GeneratedQuery>>,
    },

    /// Terminal answer for the optimization workflow.
    FinalRecommendation {
        report_sections: Vec<ReportSection>,
        #[serde(skip_serializing_if = "Option::is_none")]
        reasoning: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        executed_queries: Option<Vec<GeneratedQuery>>,
    },

    /// A failure, tagged with the step at which it occurred.
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        step: Option<String>,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
}

impl WorkflowEvent {
    /// Creates a status event without details.
    pub fn status(step: impl Into<String>, status: StepStatus) -> Self {
        Self::Status {
            step: step.into(),
            status,
            details: None,
            generated_queries: None,
            requires_execution: None,
        }
    }

    /// Creates a status event with a details message.
    pub fn status_with_details(
        step: impl Into<String>,
        status: StepStatus,
        details: impl Into<String>,
    ) -> Self {
        Self::Status {
            step: step.into(),
            status,
            details: Some(details.into()),
            generated_queries: None,
            requires_execution: None,
        }
    }

    /// Creates an error event for the given step.
    pub fn error(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            step: Some(step.into()),
            message: message.into(),
            details: None,
        }
    }

    /// Returns true if this is the terminal `*_workflow_end` status.
    pub fn is_workflow_end(&self) -> bool {
        matches!(self, Self::Status { step, .. } if step.ends_with("_workflow_end"))
    }
}

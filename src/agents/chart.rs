//! Chart suggestion agent.
//!
//! Recommends a chart type and column mapping for each executed result with
//! plottable rows.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::agents::{invoke_structured, prompts};
use crate::error::{AdsightError, Result};
use crate::graph::{ExecutedQuery, RowRecord};
use crate::llm::{CompletionOptions, LlmClient};

/// Supported chart types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
    Scatter,
    Pie,
    Table,
    /// No chart for this objective.
    None,
}

/// Column mapping for a suggested chart.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphColumns {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub names: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A chart recommendation for one objective's result rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphSuggestion {
    /// The objective this suggestion visualizes.
    pub objective: String,
    /// Recommended chart type.
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    /// Column names to plot, keyed by chart property.
    #[serde(default)]
    pub columns: GraphColumns,
    /// Chart title.
    pub title: String,
}

impl GraphSuggestion {
    /// Validates the suggestion against the rows it is meant to plot,
    /// downgrading to no-chart instead of letting the frontend crash.
    ///
    /// A pie chart requires both `names` and `values` columns to be present
    /// in the data rows.
    pub fn validated_against(mut self, rows: &[RowRecord]) -> Self {
        if self.chart_type == ChartType::Pie && !self.pie_columns_present(rows) {
            self.chart_type = ChartType::None;
        }
        self
    }

    fn pie_columns_present(&self, rows: &[RowRecord]) -> bool {
        let (Some(names), Some(values)) = (&self.columns.names, &self.columns.values) else {
            return false;
        };
        rows.iter()
            .all(|row| row.contains_key(names) && row.contains_key(values))
            && !rows.is_empty()
    }
}

/// Chart suggestion agent output.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartSuggestions {
    /// One suggestion per objective with plottable data.
    pub graph_suggestions: Vec<GraphSuggestion>,
}

/// Agent that analyzes executed results and suggests visualizations.
pub struct ChartSuggestionAgent {
    llm: Arc<dyn LlmClient>,
    options: CompletionOptions,
}

impl ChartSuggestionAgent {
    /// Creates a chart suggestion agent using the given client and options.
    pub fn new(llm: Arc<dyn LlmClient>, options: CompletionOptions) -> Self {
        Self { llm, options }
    }

    /// Suggests charts for the executed results.
    ///
    /// Every returned suggestion is already validated against its
    /// objective's rows; unplottable pie suggestions come back as `none`.
    pub async fn invoke(
        &self,
        query: &str,
        results: &[ExecutedQuery],
    ) -> Result<Vec<GraphSuggestion>> {
        let results_json = serde_json::to_string_pretty(results)
            .map_err(|e| AdsightError::internal(format!("Failed to serialize results: {e}")))?;
        let messages = prompts::chart_messages(query, &results_json);

        let output: ChartSuggestions =
            invoke_structured(self.llm.as_ref(), "ChartSuggestion", &messages, &self.options)
                .await?;

        Ok(output
            .graph_suggestions
            .into_iter()
            .map(|suggestion| {
                let rows = results
                    .iter()
                    .find(|r| r.objective == suggestion.objective)
                    .map(|r| r.data.as_slice())
                    .unwrap_or(&[]);
                suggestion.validated_against(rows)
            })
            .collect())
    }
}

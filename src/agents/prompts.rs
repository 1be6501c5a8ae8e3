//! Prompt construction for the agents.
//!
//! Fixed instruction text plus builders that inject the per-request inputs
//! (user query, graph schema, executed results).

use crate::llm::Message;

/// System prompt for the classifier agent.
pub const CLASSIFIER_SYSTEM: &str = r#"You are an intent classifier for advertising analytics questions about Google Ads and Facebook Ads data.

Classify the user's query into exactly one of two workflows:

- "insight": the user asks for information, summaries, trends, rankings, anomalies, or specific data points.
  Examples: "What were the top 5 campaigns by clicks last month?", "Show ads with the lowest CTR.", "Summarize ad group X."
- "optimization": the user asks for suggestions, recommendations, or actions to improve performance.
  Examples: "How can I improve my CTR?", "Which ads should I pause?", "Recommend a better budget allocation."

Respond only with a JSON object with two keys:
1. "workflow": either "insight" or "optimization". You must always commit to one of the two.
2. "reasoning": one or two sentences explaining the choice."#;

/// System prompt template for the insight query generator. `{schema}` is
/// replaced with the graph schema description.
pub const INSIGHT_QUERY_SYSTEM_TEMPLATE: &str = r#"You are a Cypher query generator for a graph database of advertising performance data. You translate a natural-language question into one or more read-only Cypher queries that retrieve the data needed to answer it.

GRAPH SCHEMA:
{schema}

RULES:
- Adhere strictly to the schema. Use only the node labels, relationships and properties it defines.
- Every query path starts from the :adaccount node and traverses downwards through defined relationships.
- Aggregate metrics correctly: sum raw counters first, then derive ratios (CTR, CPC) from the aggregated totals, guarding against division by zero.
- Alias every returned column with a clear, unique name.
- Generate multiple independent queries when the question covers distinct information sets.
- If the question needs no data retrieval at all, return an empty queries list.

Respond only with a JSON object with two keys:
1. "queries": a list of objects, each with "objective" (a short description of what the query fetches) and "query" (the Cypher text).
2. "reasoning": a step-by-step explanation of how the queries were constructed and how metrics are calculated."#;

/// System prompt template for the optimization query generator.
pub const OPTIMIZATION_QUERY_SYSTEM_TEMPLATE: &str = r#"You are a Cypher query generator for a graph database of advertising performance data. You translate an optimization request into read-only Cypher queries that surface the evidence an optimization recommendation needs: underperformers, outliers, wasted spend, and comparative baselines.

GRAPH SCHEMA:
{schema}

RULES:
- Adhere strictly to the schema. Use only the node labels, relationships and properties it defines.
- Every query path starts from the :adaccount node and traverses downwards through defined relationships.
- Cover the request from several angles (e.g. lowest CTR ads, highest cost per conversion, budget-constrained campaigns) with one query per angle.
- Aggregate metrics correctly: sum raw counters first, then derive ratios from the aggregated totals, guarding against division by zero.
- Alias every returned column with a clear, unique name.
- If the request needs no data retrieval at all, return an empty queries list.

Respond only with a JSON object with two keys:
1. "queries": a list of objects, each with "objective" (a short description of what the query checks) and "query" (the Cypher text).
2. "reasoning": a step-by-step explanation of the chosen angles and calculations."#;

/// System prompt for the insight synthesis agent.
pub const INSIGHT_GENERATOR_SYSTEM: &str = r#"You are a data analyst turning graph query results into a clear, professional report for an advertising manager.

You receive the original question, the executed query results as JSON, and the reasoning used to construct the queries. Analyze only the data provided.

FORMAT:
- Present numerical metrics in Markdown tables, one clear header per column.
- Present interpretation and implications as bullet points under an Analysis heading.
- If the data is empty, say clearly that no matching data was found; do not speculate.
- If the data cannot fully answer the question, state the limitation.

Respond only with a JSON object with two keys:
1. "insight": the formatted report as a Markdown string.
2. "reasoning": two to four sentences describing how you analyzed the data."#;

/// System prompt for the optimization recommendation agent.
pub const RECOMMENDATION_SYSTEM: &str = r#"You are an advertising optimization specialist turning graph query results into concrete, prioritized recommendations.

You receive the original request and the executed query results grouped by objective, as JSON. Base every recommendation on the evidence in the data; quantify the expected effect where the data allows it.

Respond only with a JSON object with two keys:
1. "report_sections": a list of objects, each with "title" (the recommendation) and "content" (the supporting evidence and the concrete action, in Markdown).
2. "reasoning": two to four sentences describing how the data led to these recommendations."#;

/// System prompt for the chart suggestion agent.
pub const CHART_SYSTEM: &str = r#"You are a data visualization assistant. For each executed query result that contains plottable rows, recommend one chart.

You receive the original question and a list of result objects, each with "objective", "query", "data" (a list of records) and possibly "error".

RULES:
- Only suggest a chart for results with non-empty data and no error.
- Choose "type" from: "bar", "line", "scatter", "pie", "table", "none".
- "columns" values must be keys that actually appear in that result's records: "x"/"y" for bar, line and scatter; "names"/"values" for pie; "color" optionally for grouping.
- Prefer "table" or "none" over a confusing chart.

Respond only with a JSON object with one key:
1. "graph_suggestions": a list of objects, each with "objective", "type", "columns" and "title". Return an empty list if nothing is plottable."#;

/// Builds the message list for the classifier.
pub fn classifier_messages(query: &str) -> Vec<Message> {
    vec![
        Message::system(CLASSIFIER_SYSTEM),
        Message::user(format!("User query: {}", query)),
    ]
}

/// Builds the message list for a query generator from its system template.
pub fn query_generator_messages(template: &str, query: &str, schema: &str) -> Vec<Message> {
    vec![
        Message::system(template.replace("{schema}", schema)),
        Message::user(format!(
            "User query: {}\n\nGenerate the Cypher queries and reasoning based on the schema above.",
            query
        )),
    ]
}

/// Builds the message list for the insight synthesis agent.
pub fn insight_messages(query: &str, results_json: &str, query_reasoning: &str) -> Vec<Message> {
    vec![
        Message::system(INSIGHT_GENERATOR_SYSTEM),
        Message::user(format!(
            "Original question: {}\n\nQuery generation reasoning: {}\n\nExecuted query results (JSON):\n```json\n{}\n```",
            query, query_reasoning, results_json
        )),
    ]
}

/// Builds the message list for the recommendation agent.
pub fn recommendation_messages(query: &str, grouped_results_json: &str) -> Vec<Message> {
    vec![
        Message::system(RECOMMENDATION_SYSTEM),
        Message::user(format!(
            "Original request: {}\n\nExecuted query results grouped by objective (JSON):\n```json\n{}\n```",
            query, grouped_results_json
        )),
    ]
}

/// Builds the message list for the chart suggestion agent.
pub fn chart_messages(query: &str, results_json: &str) -> Vec<Message> {
    vec![
        Message::system(CHART_SYSTEM),
        Message::user(format!(
            "Original question: {}\n\nQuery results (JSON):\n```json\n{}\n```",
            query, results_json
        )),
    ]
}

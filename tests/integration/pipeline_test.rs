//! End-to-end pipeline tests with mock LLM and graph clients.

use adsight::graph::MockGraphClient;
use adsight::llm::MockLlmClient;
use adsight::workflow::WorkflowEvent;
use serde_json::json;

use super::common::{error_messages, routing_decisions, run_message, Fixture};

/// Scenario: insight question end to end.
/// Given "Show me the top 5 ads by clicks last week"
/// When the gateway processes it
/// Then it is routed to the insight workflow, at least one query is
/// generated and executed, and a final_insight with non-empty text arrives.
#[tokio::test]
async fn test_insight_question_end_to_end() {
    let fixture = Fixture::default();

    let events = fixture.run("Show me the top 5 ads by clicks last week").await;

    assert_eq!(routing_decisions(&events), vec!["insight"]);
    assert!(error_messages(&events).is_empty());

    // At least one query was generated and executed.
    assert!(!fixture.graph.executed_queries().is_empty());
    let query_results: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, WorkflowEvent::QueryResult { .. }))
        .collect();
    assert!(!query_results.is_empty());

    // Chart suggestions precede the final insight.
    let charts_idx = events
        .iter()
        .position(|e| matches!(e, WorkflowEvent::GraphSuggestions { .. }))
        .expect("expected graph_suggestions");
    let final_idx = events
        .iter()
        .position(|e| matches!(e, WorkflowEvent::FinalInsight { .. }))
        .expect("expected final_insight");
    assert!(charts_idx < final_idx);

    match &events[final_idx] {
        WorkflowEvent::FinalInsight {
            insight,
            reasoning,
            executed_queries,
        } => {
            assert!(!insight.is_empty());
            assert!(reasoning.is_some());
            assert!(executed_queries.as_ref().is_some_and(|q| !q.is_empty()));
        }
        _ => unreachable!(),
    }
}

/// Scenario: optimization question end to end.
/// Given "Suggest how to improve my CTR"
/// Then the optimization path produces report_sections in a
/// final_recommendation.
#[tokio::test]
async fn test_optimization_question_end_to_end() {
    let fixture = Fixture::default();

    let events = fixture.run("Suggest how to improve my CTR").await;

    assert_eq!(routing_decisions(&events), vec!["optimization"]);

    let report = events.iter().find_map(|e| match e {
        WorkflowEvent::FinalRecommendation {
            report_sections, ..
        } => Some(report_sections.clone()),
        _ => None,
    });
    let sections = report.expect("expected final_recommendation");
    assert!(!sections.is_empty());
    assert!(!sections[0].title.is_empty());
    assert!(!sections[0].content.is_empty());
}

/// Scenario: schema file missing.
/// Then load_schema emits an error mentioning "Schema file", the workflow
/// still terminates with its end status, and nothing is executed.
#[tokio::test]
async fn test_missing_schema_file() {
    let (state, graph) = Fixture::with_missing_schema(MockLlmClient::new());

    let events = run_message(&state, "Show me the top 5 ads by clicks").await;

    let errors = error_messages(&events);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Schema file"));

    // The error is immediately followed by the terminal workflow status,
    // which is the last event of the request.
    let error_idx = events
        .iter()
        .position(|e| matches!(e, WorkflowEvent::Error { .. }))
        .unwrap();
    assert!(events[error_idx + 1].is_workflow_end());
    assert_eq!(error_idx + 2, events.len());

    // No queries were generated or executed.
    assert!(!events.iter().any(|e| matches!(
        e,
        WorkflowEvent::Status {
            generated_queries: Some(_),
            ..
        }
    )));
    assert!(graph.executed_queries().is_empty());
}

/// Scenario: the generator decides no queries are needed.
/// Then the terminal status carries requires_execution=false with a
/// human-readable explanation, and the executor is never called.
#[tokio::test]
async fn test_no_queries_needed_skips_execution() {
    let llm = MockLlmClient::new()
        .with_response("cypher", r#"{"queries": [], "reasoning": "greeting, no data needed"}"#);
    let fixture = Fixture::new(llm, MockGraphClient::new());

    let events = fixture.run("hello!").await;

    let no_exec = events.iter().find_map(|e| match e {
        WorkflowEvent::Status {
            requires_execution: Some(flag),
            details,
            ..
        } => Some((*flag, details.clone().unwrap_or_default())),
        _ => None,
    });
    let (flag, details) = no_exec.expect("expected a requires_execution status");
    assert!(!flag);
    assert!(details.contains("No specific queries"));

    // Nothing was sent to the executor and no final answer was synthesized.
    assert!(fixture.graph.executed_queries().is_empty());
    assert!(!events
        .iter()
        .any(|e| matches!(e, WorkflowEvent::QueryResult { .. })));
    assert!(!events
        .iter()
        .any(|e| matches!(e, WorkflowEvent::FinalInsight { .. })));
}

/// Scenario: classifier output missing the workflow key.
/// Then one error is emitted, routing_decision never is, and the pipeline
/// stops before any workflow or execution work.
#[tokio::test]
async fn test_classifier_missing_workflow_key() {
    let llm = MockLlmClient::new()
        .with_response("intent classifier", r#"{"reasoning": "cannot decide"}"#);
    let fixture = Fixture::new(llm, MockGraphClient::new());

    let events = fixture.run("something ambiguous").await;

    assert!(routing_decisions(&events).is_empty());
    assert_eq!(error_messages(&events).len(), 1);
    assert!(fixture.graph.executed_queries().is_empty());
    assert!(!events.iter().any(|e| e.is_workflow_end()));
}

/// One objective failing does not abort its siblings; each result carries
/// its own error and the final answer is still synthesized.
#[tokio::test]
async fn test_query_error_does_not_abort_siblings() {
    let llm = MockLlmClient::new().with_response(
        "cypher",
        r#"{
            "queries": [
                {"objective": "Good objective", "query": "MATCH (good) RETURN good"},
                {"objective": "Bad objective", "query": "MATCH (bad_query) RETURN boom"}
            ],
            "reasoning": "two angles"
        }"#,
    );
    let graph = MockGraphClient::new().with_failure("bad_query");
    let fixture = Fixture::new(llm, graph);

    let events = fixture.run("Show me ads and their metrics").await;

    // Both queries were executed.
    assert_eq!(fixture.graph.executed_queries().len(), 2);

    let results: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            WorkflowEvent::QueryResult { result } => Some(result),
            _ => None,
        })
        .collect();
    assert_eq!(results.len(), 2);
    assert!(results.iter().any(|r| r.error.is_none()));
    assert!(results.iter().any(|r| r.error.is_some()));

    // Synthesis still ran on the surviving result.
    assert!(events
        .iter()
        .any(|e| matches!(e, WorkflowEvent::FinalInsight { .. })));
}

/// When every execution fails there is nothing to analyze; synthesis is
/// skipped explicitly instead of prompting with no data.
#[tokio::test]
async fn test_all_queries_failing_skips_synthesis() {
    let graph = MockGraphClient::new().with_failure("match");
    let fixture = Fixture::new(MockLlmClient::new(), graph);

    let events = fixture.run("Show me the top ads by clicks").await;

    let skipped = events.iter().any(|e| matches!(
        e,
        WorkflowEvent::Status { step, details, .. }
            if step == "final_analysis"
                && details.as_deref().is_some_and(|d| d.contains("failed"))
    ));
    assert!(skipped);
    assert!(!events
        .iter()
        .any(|e| matches!(e, WorkflowEvent::FinalInsight { .. })));
}

/// A staged-context message is split on the markers: the pipeline sees the
/// context, the markers never reach the prompt.
#[tokio::test]
async fn test_staged_context_message() {
    let fixture = Fixture::default();

    let raw = "---DISPLAY_CONTEXT START---\nEarlier we discussed campaign Alpha.\n---QUERY START---\nShow its top ads by clicks";
    let events = fixture.run(raw).await;

    assert_eq!(routing_decisions(&events), vec!["insight"]);
    assert!(events
        .iter()
        .any(|e| matches!(e, WorkflowEvent::FinalInsight { .. })));
}

/// The configured platform tag is stamped onto every query result.
#[tokio::test]
async fn test_platform_stamped_on_results() {
    use adsight::config::Config;
    use adsight::graph::MockGraphConnector;
    use adsight::server::AppState;
    use std::io::Write;
    use std::sync::Arc;

    let mut schema_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(schema_file, "- (:adaccount)-[:HAS_CAMPAIGN]->(:campaign)").unwrap();

    let mut config = Config {
        schema_file: schema_file.path().to_path_buf(),
        ..Default::default()
    };
    config.graph.platform = Some("google".to_string());

    let state = AppState::new(
        &config,
        Arc::new(MockLlmClient::new()),
        Arc::new(MockGraphConnector::new(MockGraphClient::new())),
    );

    let events = run_message(&state, "Show top ads by clicks").await;

    let platforms: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            WorkflowEvent::QueryResult { result } => Some(result.platform.clone()),
            _ => None,
        })
        .collect();
    assert!(!platforms.is_empty());
    assert!(platforms.iter().all(|p| p.as_deref() == Some("google")));
}

/// The model failing mid-synthesis surfaces one error event and the
/// connection-level stream still ends cleanly.
#[tokio::test]
async fn test_synthesis_failure_emits_error() {
    // Query generation succeeds, synthesis ("data analyst") fails to parse.
    let llm = MockLlmClient::new().with_response("data analyst", "sorry, plain text only");
    let fixture = Fixture::new(llm, MockGraphClient::new());

    let events = fixture.run("Show top ads by clicks").await;

    let errors = error_messages(&events);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("insight"));
    assert!(!events
        .iter()
        .any(|e| matches!(e, WorkflowEvent::FinalInsight { .. })));

    // Chart suggestions are still delivered (or an empty list).
    assert!(events
        .iter()
        .any(|e| matches!(e, WorkflowEvent::GraphSuggestions { .. })));
}

/// Canned rows flow through execution into the result frames untouched.
#[tokio::test]
async fn test_result_rows_round_trip() {
    let rows = vec![
        MockGraphClient::row(&[("adName", json!("Hero")), ("totalClicks", json!(1500))]),
        MockGraphClient::row(&[("adName", json!("Launch")), ("totalClicks", json!(900))]),
    ];
    let graph = MockGraphClient::new().with_rows("match", rows);
    let fixture = Fixture::new(MockLlmClient::new(), graph);

    let events = fixture.run("Show top ads by clicks").await;

    let result = events
        .iter()
        .find_map(|e| match e {
            WorkflowEvent::QueryResult { result } => Some(result.clone()),
            _ => None,
        })
        .expect("expected a query_result");

    assert_eq!(result.data.len(), 2);
    assert_eq!(result.data[0]["adName"], "Hero");
    assert_eq!(result.data[1]["totalClicks"], 900);
    assert!(result.error.is_none());
}

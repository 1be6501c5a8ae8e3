//! Wire-format tests: every frame the gateway emits must match the
//! protocol's field names and discriminators exactly, since the frontend
//! dispatches on them.

use adsight::graph::MockGraphClient;
use adsight::llm::MockLlmClient;
use pretty_assertions::assert_eq;
use serde_json::Value;

use super::common::Fixture;

/// Serializes every event of a run and parses the frames back as raw JSON.
async fn frames_for(message: &str) -> Vec<Value> {
    let fixture = Fixture::default();
    fixture
        .run(message)
        .await
        .iter()
        .map(|event| serde_json::to_value(event).unwrap())
        .collect()
}

#[tokio::test]
async fn test_every_frame_has_a_type() {
    let frames = frames_for("Show me the top 5 ads by clicks").await;

    assert!(!frames.is_empty());
    for frame in &frames {
        assert!(
            frame.get("type").and_then(Value::as_str).is_some(),
            "frame missing type discriminator: {frame}"
        );
    }
}

#[tokio::test]
async fn test_status_frames_carry_step_and_status() {
    let frames = frames_for("Show me the top 5 ads by clicks").await;

    let statuses: Vec<_> = frames
        .iter()
        .filter(|f| f["type"] == "status")
        .collect();
    assert!(!statuses.is_empty());

    for status in statuses {
        assert!(status["step"].is_string());
        let value = status["status"].as_str().unwrap();
        assert!(
            ["in_progress", "completed", "failed", "skipped"].contains(&value),
            "unexpected status value: {value}"
        );
    }
}

#[tokio::test]
async fn test_generated_queries_embedded_in_status() {
    let frames = frames_for("Show me the top 5 ads by clicks").await;

    let generation = frames
        .iter()
        .find(|f| {
            f["type"] == "status"
                && f["step"] == "generate_queries"
                && f["status"] == "completed"
        })
        .expect("expected a completed generate_queries status");

    let queries = generation["generated_queries"].as_array().unwrap();
    assert!(!queries.is_empty());
    assert!(queries[0]["objective"].is_string());
    assert!(queries[0]["query"].is_string());
}

#[tokio::test]
async fn test_query_result_frame_shape() {
    let frames = frames_for("Show me the top 5 ads by clicks").await;

    let result = frames
        .iter()
        .find(|f| f["type"] == "query_result")
        .expect("expected a query_result frame");

    assert!(result["objective"].is_string());
    assert!(result["query"].is_string());
    assert!(result["data"].is_array());
    // Successful results omit the error field entirely.
    assert!(result.get("error").is_none());
}

#[tokio::test]
async fn test_graph_suggestions_frame_shape() {
    let frames = frames_for("Show me the top 5 ads by clicks").await;

    let charts = frames
        .iter()
        .find(|f| f["type"] == "graph_suggestions")
        .expect("expected a graph_suggestions frame");

    let suggestions = charts["graph_suggestions"].as_array().unwrap();
    assert!(!suggestions.is_empty());

    let suggestion = &suggestions[0];
    assert!(suggestion["objective"].is_string());
    assert!(suggestion["title"].is_string());
    let chart_type = suggestion["type"].as_str().unwrap();
    assert!(["bar", "line", "scatter", "pie", "table", "none"].contains(&chart_type));
    assert!(suggestion["columns"].is_object());
}

#[tokio::test]
async fn test_final_insight_frame_shape() {
    let frames = frames_for("Show me the top 5 ads by clicks").await;

    let final_frame = frames
        .iter()
        .find(|f| f["type"] == "final_insight")
        .expect("expected a final_insight frame");

    assert!(final_frame["insight"].is_string());
    assert!(!final_frame["insight"].as_str().unwrap().is_empty());
    assert!(final_frame["reasoning"].is_string());
    assert!(final_frame["executed_queries"].is_array());
}

#[tokio::test]
async fn test_final_recommendation_frame_shape() {
    let frames = frames_for("Recommend ways to reduce my cost per conversion").await;

    let final_frame = frames
        .iter()
        .find(|f| f["type"] == "final_recommendation")
        .expect("expected a final_recommendation frame");

    let sections = final_frame["report_sections"].as_array().unwrap();
    assert!(!sections.is_empty());
    assert!(sections[0]["title"].is_string());
    assert!(sections[0]["content"].is_string());
}

#[tokio::test]
async fn test_routing_decision_frame_shape() {
    let frames = frames_for("Show me the top 5 ads by clicks").await;

    let routing: Vec<_> = frames
        .iter()
        .filter(|f| f["type"] == "routing_decision")
        .collect();

    assert_eq!(routing.len(), 1);
    assert_eq!(routing[0]["workflow_type"], "insight");
}

#[tokio::test]
async fn test_error_frame_shape() {
    let fixture = Fixture::new(
        MockLlmClient::failing("model down"),
        MockGraphClient::new(),
    );

    let frames: Vec<Value> = fixture
        .run("anything")
        .await
        .iter()
        .map(|event| serde_json::to_value(event).unwrap())
        .collect();

    let error = frames
        .iter()
        .find(|f| f["type"] == "error")
        .expect("expected an error frame");

    assert!(error["message"].as_str().unwrap().contains("model down"));
    assert_eq!(error["step"], "classify_query");
}

#[tokio::test]
async fn test_event_stream_is_ordered_start_to_finish() {
    let frames = frames_for("Show me the top 5 ads by clicks").await;

    let position = |pred: &dyn Fn(&Value) -> bool| frames.iter().position(|f| pred(f)).unwrap();

    let start = position(&|f| f["type"] == "status" && f["step"] == "start_router");
    let routing = position(&|f| f["type"] == "routing_decision");
    let generated = position(&|f| {
        f["type"] == "status" && f["step"] == "generate_queries" && f["status"] == "completed"
    });
    let workflow_end = position(&|f| {
        f["type"] == "status"
            && f["step"]
                .as_str()
                .is_some_and(|s| s.ends_with("_workflow_end"))
    });
    let executed = position(&|f| f["type"] == "query_result");
    let final_insight = position(&|f| f["type"] == "final_insight");

    assert!(start < routing);
    assert!(routing < generated);
    assert!(generated < workflow_end);
    assert!(workflow_end < executed);
    assert!(executed < final_insight);
    assert_eq!(final_insight, frames.len() - 1);
}

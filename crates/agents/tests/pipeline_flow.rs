//! End-to-end pipeline tests against the scripted provider:
//! input → intent → keypoint/synthesis → `final_result_text`.

use std::sync::Arc;

use agents::keypoint::tool::KeypointSummary;
use agents::synthesis::tool::SynthesisReport;
use agents::Summarizer;
use llm::MockProvider;
use pipeline::{LlmConfig, LlmError};

fn summarizer(mock: Arc<MockProvider>) -> Summarizer {
    Summarizer::new(mock, LlmConfig::new("test-model")).unwrap()
}

#[tokio::test]
async fn keypoint_route_fills_final_result_text() {
    let mock = Arc::new(MockProvider::new());
    // First call: intent classification. Second call: keypoint extraction.
    mock.push_content(
        r#"{"genre_type": "Informational", "context_type": "Other", "task_type": "KEYPOINT"}"#,
    );
    mock.push_content(
        r#"{"protagonist": "sanitation worker fatality", "focus_aspects": ["who", "what", "outcome"], "keypoints": ["A 23-year-old crew member was struck and killed on collection duty.", "The driver's blood alcohol level was far over the limit.", "The court approved pre-trial detention."]}"#,
    );

    let outcome = summarizer(mock.clone())
        .process("A sanitation crew member was struck by a car while collecting refuse ...")
        .await;

    assert!(outcome.success, "unexpected failure: {:?}", outcome.error);
    let data = outcome.data.unwrap();
    assert_eq!(data.get_str("selected_task_type"), Some("KEYPOINT"));
    assert_eq!(data.get_str("selected_genre_type"), Some("Informational"));

    let raw = data.get_str("final_result_text").unwrap();
    let summary: KeypointSummary = serde_json::from_str(raw).unwrap();
    assert_eq!(summary.keypoints.len(), 3);

    // Exactly two model calls: one per visited agent.
    assert_eq!(mock.requests().len(), 2);
}

#[tokio::test]
async fn synthesis_route_fills_final_result_text() {
    let mock = Arc::new(MockProvider::new());
    mock.push_content(
        r#"{"genre_type": "Expository", "context_type": "Other", "task_type": "SYNTHESIS"}"#,
    );
    mock.push_content(
        r#"{"protagonist": "Newton's second law", "focus_aspects": ["definition", "application"], "synthesis": "The net force on a body equals the rate of change of its momentum.", "added_context": ["Momentum is mass times velocity."], "examples": [], "takeaways": ["Force and momentum change are the same phenomenon."]}"#,
    );

    let outcome = summarizer(mock)
        .process("Newton's second law states that F = dp/dt ...")
        .await;

    assert!(outcome.success, "unexpected failure: {:?}", outcome.error);
    let data = outcome.data.unwrap();
    assert_eq!(data.get_str("selected_task_type"), Some("SYNTHESIS"));

    let raw = data.get_str("final_result_text").unwrap();
    let report: SynthesisReport = serde_json::from_str(raw).unwrap();
    assert!(!report.synthesis.is_empty());
    assert_eq!(report.takeaways.len(), 1);
}

#[tokio::test]
async fn input_text_survives_into_the_terminal_state() {
    let mock = Arc::new(MockProvider::new());
    mock.push_content(
        r#"{"genre_type": "Informational", "context_type": "Other", "task_type": "KEYPOINT"}"#,
    );
    mock.push_content(r#"{"protagonist": "x", "focus_aspects": [], "keypoints": ["p"]}"#);

    let outcome = summarizer(mock).process("original input").await;
    let data = outcome.data.unwrap();
    assert_eq!(data.get_str("input_text"), Some("original input"));
}

#[tokio::test]
async fn provider_failure_surfaces_as_a_formatted_error_path() {
    let mock = Arc::new(MockProvider::new());
    mock.push_error(LlmError::Transport {
        message: "connection refused".to_owned(),
    });

    let outcome = summarizer(mock).process("anything").await;

    assert!(!outcome.success);
    assert!(outcome.data.is_none());
    let report = outcome.error.unwrap();
    assert_eq!(
        report,
        "Error Path:\n  → Coordinator: classify_intent\n  → IntentAgent: classify_intent\n  → IntentTool.classify\n  → MockProvider.complete\nFinal Error: transport error: connection refused"
    );
}

#[tokio::test]
async fn downstream_failure_carries_the_keypoint_hop() {
    let mock = Arc::new(MockProvider::new());
    mock.push_content(
        r#"{"genre_type": "Informational", "context_type": "Other", "task_type": "KEYPOINT"}"#,
    );
    mock.push_error(LlmError::Api {
        status: 500,
        message: "upstream".to_owned(),
    });

    let outcome = summarizer(mock).process("news text").await;

    assert!(!outcome.success);
    let report = outcome.error.unwrap();
    assert!(report.contains("→ Coordinator: run_keypoint"));
    assert!(report.contains("→ KeypointAgent: extract_keypoints"));
    assert!(report.contains("→ KeypointTool.extract"));
    assert!(report.contains("Final Error: provider API error (status 500): upstream"));
}

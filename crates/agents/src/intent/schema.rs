//! Intent agent schema: state fields, the single classification node, and
//! the scenario mapping published to the coordinator.

use pipeline::{Schema, SchemaError, ScenarioMapping, StateShape, Target};

/// Field read by the classification node.
pub const INPUT_TEXT: &str = "input_text";
/// Candidate fields written by the classification node.
pub const GENRE_TYPE_CANDIDATE: &str = "genre_type_candidate";
pub const CONTEXT_TYPE_CANDIDATE: &str = "context_type_candidate";
pub const TASK_TYPE_CANDIDATE: &str = "task_type_candidate";

/// The classification node; also the name of the published scenario.
pub const CLASSIFY_INTENT: &str = "classify_intent";

/// Builds the intent agent's schema.
///
/// One node, one direct edge to the end. The scenario mapping feeds the
/// parent's `input_text` in and promotes the three candidates to the
/// parent's `selected_*` fields on the way out.
pub fn schema() -> Result<Schema, SchemaError> {
    Schema::builder()
        .state_shape(StateShape::new(
            "IntentState",
            [
                INPUT_TEXT,
                GENRE_TYPE_CANDIDATE,
                CONTEXT_TYPE_CANDIDATE,
                TASK_TYPE_CANDIDATE,
            ],
        ))
        .node(CLASSIFY_INTENT)
        .direct_edge(CLASSIFY_INTENT, Target::End)
        .mapping(
            CLASSIFY_INTENT,
            ScenarioMapping::new()
                .input("input_text", INPUT_TEXT)
                .output(GENRE_TYPE_CANDIDATE, "selected_genre_type")
                .output(CONTEXT_TYPE_CANDIDATE, "selected_context_type")
                .output(TASK_TYPE_CANDIDATE, "selected_task_type"),
        )
        .build()
}

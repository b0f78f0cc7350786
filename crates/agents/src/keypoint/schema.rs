//! Keypoint agent schema.

use pipeline::{Schema, SchemaError, ScenarioMapping, StateShape, Target};

pub const INPUT_TEXT: &str = "input_text";
/// Serialized [`crate::keypoint::tool::KeypointSummary`] JSON.
pub const KEYPOINT_RESULT: &str = "keypoint_result";

/// The extraction node; also the name of the published scenario.
pub const EXTRACT_KEYPOINTS: &str = "extract_keypoints";

/// Builds the keypoint agent's schema: one node, one edge to the end, and
/// the mapping that surfaces the result as the parent's `final_result_text`.
pub fn schema() -> Result<Schema, SchemaError> {
    Schema::builder()
        .state_shape(StateShape::new(
            "KeypointState",
            [INPUT_TEXT, KEYPOINT_RESULT],
        ))
        .node(EXTRACT_KEYPOINTS)
        .direct_edge(EXTRACT_KEYPOINTS, Target::End)
        .mapping(
            EXTRACT_KEYPOINTS,
            ScenarioMapping::new()
                .input("input_text", INPUT_TEXT)
                .output(KEYPOINT_RESULT, "final_result_text"),
        )
        .build()
}

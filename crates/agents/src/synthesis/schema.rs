//! Synthesis agent schema.

use pipeline::{Schema, SchemaError, ScenarioMapping, StateShape, Target};

pub const INPUT_TEXT: &str = "input_text";
/// Serialized [`crate::synthesis::tool::SynthesisReport`] JSON.
pub const SYNTHESIS_RESULT: &str = "synthesis_result";

/// The synthesis node; also the name of the published scenario.
pub const SYNTHESIZE_CONTENT: &str = "synthesize_content";

/// Builds the synthesis agent's schema: one node, one edge to the end, and
/// the mapping that surfaces the report as the parent's `final_result_text`.
pub fn schema() -> Result<Schema, SchemaError> {
    Schema::builder()
        .state_shape(StateShape::new(
            "SynthesisState",
            [INPUT_TEXT, SYNTHESIS_RESULT],
        ))
        .node(SYNTHESIZE_CONTENT)
        .direct_edge(SYNTHESIZE_CONTENT, Target::End)
        .mapping(
            SYNTHESIZE_CONTENT,
            ScenarioMapping::new()
                .input("input_text", INPUT_TEXT)
                .output(SYNTHESIS_RESULT, "final_result_text"),
        )
        .build()
}

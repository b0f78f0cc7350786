//! Coordinator schema: the root graph's state fields, the three subgraph
//! nodes, and the task-type routing between them.

use pipeline::{Schema, SchemaError, State, StateShape, Target};

use crate::vocab::TaskType;

pub const INPUT_TEXT: &str = "input_text";
pub const SELECTED_TASK_TYPE: &str = "selected_task_type";
pub const SELECTED_GENRE_TYPE: &str = "selected_genre_type";
pub const SELECTED_CONTEXT_TYPE: &str = "selected_context_type";
pub const FINAL_RESULT_TEXT: &str = "final_result_text";

pub const CLASSIFY_INTENT: &str = "classify_intent";
pub const RUN_KEYPOINT: &str = "run_keypoint";
pub const RUN_SYNTHESIS: &str = "run_synthesis";

/// Routes on the task type the intent subgraph selected.
///
/// An absent or unexpected value yields a label outside the edge's map, so
/// the traversal fails loudly instead of defaulting.
fn route_on_task_type(state: &State) -> String {
    state
        .get_str(SELECTED_TASK_TYPE)
        .unwrap_or_default()
        .to_owned()
}

/// Builds the coordinator's schema.
///
/// `classify_intent` runs first; its conditional edge dispatches to the
/// keypoint or synthesis subgraph, each of which ends the traversal.
pub fn schema() -> Result<Schema, SchemaError> {
    Schema::builder()
        .state_shape(StateShape::new(
            "CoordinatorState",
            [
                INPUT_TEXT,
                SELECTED_TASK_TYPE,
                SELECTED_GENRE_TYPE,
                SELECTED_CONTEXT_TYPE,
                FINAL_RESULT_TEXT,
            ],
        ))
        .node(CLASSIFY_INTENT)
        .node(RUN_KEYPOINT)
        .node(RUN_SYNTHESIS)
        .conditional_edge(
            CLASSIFY_INTENT,
            route_on_task_type,
            [
                (TaskType::Keypoint.as_label(), Target::node(RUN_KEYPOINT)),
                (TaskType::Synthesis.as_label(), Target::node(RUN_SYNTHESIS)),
            ],
        )
        .direct_edge(RUN_KEYPOINT, Target::End)
        .direct_edge(RUN_SYNTHESIS, Target::End)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_validates_and_enters_at_the_intent_node() {
        let schema = schema().unwrap();
        assert_eq!(schema.entry_point().as_str(), CLASSIFY_INTENT);
    }

    #[test]
    fn router_reads_the_selected_task_type() {
        let mut state = State::new();
        state.insert(SELECTED_TASK_TYPE, "KEYPOINT");
        assert_eq!(route_on_task_type(&state), "KEYPOINT");

        // Absent selection routes to an empty label, which no edge maps.
        assert_eq!(route_on_task_type(&State::new()), "");
    }
}

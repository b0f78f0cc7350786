//! The top-level API: one `process` operation per external request.
//!
//! The root graph is compiled once at construction; each call builds a fresh
//! initial state, runs one traversal, and converts any failure into the
//! structured outcome — callers never see a raw, un-annotated message.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, info_span, Instrument};

use pipeline::{
    format_error_path, LlmConfig, LlmProvider, Runnable, RunId, SchemaError, State, Timestamp,
};

use crate::coordinator::{schema, Coordinator};

/// Traversal bound for one root-graph run. The root graph is three nodes
/// deep, so anything near this limit is a wiring bug, not a long input.
const ROOT_STEP_LIMIT: usize = 64;

/// Structured result of one `process` call.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub success: bool,
    /// The terminal state of the traversal; `None` on failure.
    pub data: Option<State>,
    /// The formatted error-path report; `None` on success.
    pub error: Option<String>,
    pub run_id: RunId,
    pub completed_at: Timestamp,
}

/// Compile-once, invoke-per-request front door of the pipeline.
pub struct Summarizer {
    runnable: Runnable,
}

impl Summarizer {
    /// Builds the full agent tree against `provider` and compiles the root
    /// graph.
    pub fn new(provider: Arc<dyn LlmProvider>, config: LlmConfig) -> Result<Self, SchemaError> {
        let coordinator = Coordinator::new(provider, config)?;
        Ok(Self {
            runnable: coordinator.compile(Some(ROOT_STEP_LIMIT))?,
        })
    }

    /// Classifies and summarizes `input_text`.
    ///
    /// Failures are caught exactly once here and rendered through
    /// [`format_error_path`].
    pub async fn process(&self, input_text: &str) -> Outcome {
        let run_id = RunId::new_random();
        let span = info_span!("process", run_id = %run_id);

        let mut state = State::new();
        state.insert(schema::INPUT_TEXT, input_text);
        state.insert(schema::SELECTED_TASK_TYPE, "");
        state.insert(schema::SELECTED_GENRE_TYPE, "");
        state.insert(schema::SELECTED_CONTEXT_TYPE, "");
        state.insert(schema::FINAL_RESULT_TEXT, "");

        match self.runnable.invoke(state).instrument(span).await {
            Ok(data) => {
                info!(%run_id, "pipeline run completed");
                Outcome {
                    success: true,
                    data: Some(data),
                    error: None,
                    run_id,
                    completed_at: Timestamp::now(),
                }
            }
            Err(e) => {
                let message = e.to_string();
                error!(%run_id, error = %message, "pipeline run failed");
                Outcome {
                    success: false,
                    data: None,
                    error: Some(format_error_path(&message)),
                    run_id,
                    completed_at: Timestamp::now(),
                }
            }
        }
    }
}

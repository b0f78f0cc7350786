//! SummaWorks agent controllers.
//!
//! Each agent pairs a declarative schema (its state fields, nodes, edges,
//! and the scenario mappings it publishes to parents) with a controller that
//! supplies the real node implementations — thin structs that call the
//! prompt tools, which in turn call the injected [`pipeline::LlmProvider`].
//!
//! ## Architectural Layer
//!
//! **Orchestration.** Agents sequence calls between the graph engine in the
//! [`pipeline`] crate and the provider supplied by the `llm` crate. They
//! contain no transport details and no graph-engine internals.
//!
//! ## Composition
//!
//! The [`coordinator`] graph embeds the three leaf agents as subgraphs:
//! intent classification decides between keypoint extraction and synthesis,
//! and the chosen child's result is mapped back into the parent's
//! `final_result_text`. [`api::Summarizer`] compiles the coordinator once
//! and exposes the single `process` operation.

pub mod api;
pub mod coordinator;
pub mod intent;
pub mod keypoint;
pub mod synthesis;
pub mod vocab;

pub use api::{Outcome, Summarizer};
pub use coordinator::Coordinator;
pub use intent::IntentAgent;
pub use keypoint::KeypointAgent;
pub use synthesis::SynthesisAgent;
pub use vocab::{ContextType, GenreType, TaskType};

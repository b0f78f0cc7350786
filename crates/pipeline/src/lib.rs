//! Core orchestration domain for SummaWorks.
//!
//! This crate contains the graph-orchestration engine that the rest of the
//! workspace is built on: declarative [`Schema`]s are compiled into immutable
//! [`Runnable`]s, independently-scoped subgraphs compose through named
//! [`ScenarioMapping`]s, and every failure accumulates a bracketed location
//! trail as it unwinds so the caller can localise the failing component
//! without a stack trace.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* a processing step is; infrastructure crates define *how*
//! one talks to the outside world (see the `llm` crate for the chat
//! completion provider).
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`state`] | The open field-name → value record threaded through a traversal |
//! | [`schema`] | Declarative node/edge bundles, validation, node handler traits |
//! | [`graph`] | The compiler and the traversal executor |
//! | [`mapping`] | Parent ↔ subgraph field-name translation |
//! | [`trace`] | Bracketed error-path formatting |
//! | [`ports`] | The LLM chat-completion port consumed by node handlers |
//! | [`identifiers`] | Newtype domain identifiers (`NodeId`, `GraphName`, etc.) |
//! | [`types`] | Shared value types (`TokenCount`, `Timestamp`) |
//! | [`errors`] | Schema and traversal error types |

pub mod errors;
pub mod graph;
pub mod identifiers;
pub mod mapping;
pub mod ports;
pub mod schema;
pub mod state;
pub mod trace;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{PipelineError, RetryPolicy, SchemaError, TagError};
pub use graph::{Graph, HandlerRegistry, Runnable};
pub use identifiers::{GraphName, NodeId, RunId, ScenarioName};
pub use mapping::{
    invoke_subgraph, map_input_state, map_output_state, ScenarioMapping, StateMappings,
    SubgraphNode,
};
pub use ports::{
    ChatRequest, ChatResponse, LlmConfig, LlmError, LlmProvider, ResponseFormat,
};
pub use schema::{
    FnHandler, NodeHandler, Passthrough, Schema, SchemaBuilder, StateShape, Target,
};
pub use state::{State, Update};
pub use trace::format_error_path;
pub use types::{TokenCount, Timestamp};

//! Schema and traversal error types for the SummaWorks pipeline domain.
//!
//! [`SchemaError`] covers malformed graph definitions, detected once at
//! schema-build or graph-compile time and never per invocation.
//! [`PipelineError`] covers everything that can end a traversal: an unmatched
//! route, a missing scenario mapping, a failing node handler, or an exhausted
//! step budget.
//!
//! No error is swallowed or retried inside this crate. A handler failure is
//! re-raised at every enclosing graph boundary with a bracketed
//! `[owner: node]` location tag prepended, so the message that finally
//! surfaces reads outermost-call-site-first. The top-level API catches it
//! exactly once and renders the trail with [`crate::trace::format_error_path`].
//!
//! [`RetryPolicy`] is a cross-cutting concern: any error type that
//! participates in retry decisions must be able to produce a [`RetryPolicy`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identifiers::{NodeId, ScenarioName};

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// Returned by infrastructure error types to let a caller decide whether to
/// re-invoke an operation without escalating. The graph executor itself never
/// retries; retry decisions belong to the tool layer (e.g. re-requesting a
/// truncated completion with a larger token budget).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt. `None` means retry
        /// immediately or apply the caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried; the failure is surfaced as-is.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Schema-level errors
// ---------------------------------------------------------------------------

/// A malformed graph definition.
///
/// Produced by [`crate::SchemaBuilder::build`] and [`crate::Graph::compile`].
/// Fatal and never retried: a schema that fails validation produces no usable
/// [`crate::Runnable`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The schema never declared its state shape.
    #[error("schema is missing a state shape definition")]
    MissingStateShape,

    /// The schema declares no nodes; there is nothing to execute and no
    /// entry point to select.
    #[error("schema declares no nodes")]
    NoNodes,

    /// Two nodes were declared under the same name.
    #[error("duplicate node name '{name}'")]
    DuplicateNode {
        /// The name that was declared more than once.
        name: NodeId,
    },

    /// An edge or a handler registration references a node that the schema
    /// never declared.
    #[error("{referenced_by} references undeclared node '{node}'")]
    UnknownNode {
        /// Which part of the definition held the dangling reference
        /// (e.g. `"conditional edge from 'classify_intent'"`).
        referenced_by: String,
        /// The undeclared name.
        node: NodeId,
    },

    /// A node has both a conditional and a direct edge. The two edge kinds
    /// are mutually exclusive per source node; declaring both is rejected
    /// rather than resolved by registration order.
    #[error("node '{node}' declares both a conditional and a direct edge")]
    ConflictingEdges {
        /// The over-constrained source node.
        node: NodeId,
    },
}

// ---------------------------------------------------------------------------
// Traversal-level errors
// ---------------------------------------------------------------------------

/// Everything that can end a graph traversal early.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A schema fault surfaced at compile time.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A router produced a label that its edge's label map does not contain.
    /// There is no silent default route.
    #[error("no route from node '{node}' for label '{label}' (expected one of {expected:?})")]
    UnmatchedRoute {
        /// The node whose conditional edge failed to route.
        node: NodeId,
        /// The label the router returned.
        label: String,
        /// The labels the edge was configured with, in declaration order.
        expected: Vec<String>,
    },

    /// A subgraph invocation requested a scenario that has no registered
    /// state mapping.
    #[error("no state mapping registered for scenario '{scenario}'")]
    MappingNotFound {
        /// The scenario that was requested.
        scenario: ScenarioName,
    },

    /// A node handler (or a collaborator it called) failed.
    ///
    /// The message carries the accumulated bracketed location trail,
    /// outermost call site first:
    /// `[Coordinator: classify_intent] [IntentAgent: classify_intent] [IntentTool.classify] …`.
    #[error("{message}")]
    Handler {
        /// The annotated failure chain.
        message: String,
    },

    /// The traversal executed more steps than the configured limit allows.
    ///
    /// Only produced when a step limit was installed via
    /// [`crate::Graph::with_step_limit`]; by default traversal length is
    /// bounded only by the edge graph.
    #[error("traversal exceeded the configured step limit of {limit}")]
    StepLimitExceeded {
        /// The limit that was exceeded.
        limit: usize,
    },
}

// ---------------------------------------------------------------------------
// Location tagging
// ---------------------------------------------------------------------------

/// Prepends a bracketed location tag to a failing `Result`.
///
/// The tool and controller layers use this at every boundary an error
/// crosses, producing the outermost-first trail that
/// [`crate::trace::format_error_path`] renders:
///
/// ```
/// use pipeline::TagError;
///
/// let failing: Result<(), &str> = Err("boom");
/// let err = failing.tag("IntentTool.classify").unwrap_err();
/// assert_eq!(err.to_string(), "[IntentTool.classify] boom");
/// ```
pub trait TagError<T> {
    /// Converts the error into [`PipelineError::Handler`], prefixing the
    /// existing message with `[tag] `.
    fn tag(self, tag: impl std::fmt::Display) -> Result<T, PipelineError>;
}

impl<T, E: std::fmt::Display> TagError<T> for Result<T, E> {
    fn tag(self, tag: impl std::fmt::Display) -> Result<T, PipelineError> {
        self.map_err(|e| PipelineError::Handler {
            message: format!("[{tag}] {e}"),
        })
    }
}

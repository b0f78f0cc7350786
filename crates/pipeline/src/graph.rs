//! Graph compilation and traversal.
//!
//! [`Graph::compile`] turns a validated [`Schema`] plus a controller's
//! [`HandlerRegistry`] into a [`Runnable`]: an immutable traversal structure
//! with every handler wrapped in failure-context annotation. A failed
//! compile leaves no usable runnable.
//!
//! [`Runnable::invoke`] performs one synchronous-in-order traversal: execute
//! the current node, merge its partial update, then follow the node's
//! conditional edge (routing on the post-update state), or its direct edge,
//! or stop if the node has no outgoing edge. The executor never retries and
//! never reorders; it is cycle-agnostic — bounding a cyclic edge graph is
//! the caller's responsibility, via [`Graph::with_step_limit`] if desired.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::errors::{PipelineError, SchemaError};
use crate::identifiers::{GraphName, NodeId};
use crate::schema::{NodeHandler, Router, Schema, Target};
use crate::state::{State, Update};

// ---------------------------------------------------------------------------
// Handler registry
// ---------------------------------------------------------------------------

/// Explicit node-name → handler registration.
///
/// Controllers declare which concrete implementation backs each node; nodes
/// without a registration fall back to the schema's placeholder handler.
/// Registering a name the schema never declared is a compile-time
/// [`SchemaError`], not a silent no-op.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<NodeId, Arc<dyn NodeHandler>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `handler` to the node named `name`, replacing any previous binding.
    pub fn register(&mut self, name: impl Into<NodeId>, handler: Arc<dyn NodeHandler>) {
        self.handlers.insert(name.into(), handler);
    }

    fn get(&self, name: &NodeId) -> Option<&Arc<dyn NodeHandler>> {
        self.handlers.get(name)
    }
}

// ---------------------------------------------------------------------------
// Failure-context annotation
// ---------------------------------------------------------------------------

/// Wraps a node handler so any failure is re-raised with a
/// `[owner: node]` location tag prepended to the inner message.
///
/// Across nested graphs the tags accumulate outermost call site first: the
/// outer graph's node tag, then the inner graph's node tag, then the
/// tool/client tags, then the root cause text.
struct TaggedHandler {
    inner: Arc<dyn NodeHandler>,
    tag: String,
}

impl TaggedHandler {
    fn wrap(inner: Arc<dyn NodeHandler>, owner: &GraphName, node: &NodeId) -> Arc<dyn NodeHandler> {
        Arc::new(Self {
            inner,
            tag: format!("{owner}: {node}"),
        })
    }
}

#[async_trait]
impl NodeHandler for TaggedHandler {
    async fn run(&self, state: &State) -> Result<Update, PipelineError> {
        match self.inner.run(state).await {
            Ok(update) => Ok(update),
            Err(e) => Err(PipelineError::Handler {
                message: format!("[{}] {e}", self.tag),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Compiler
// ---------------------------------------------------------------------------

/// Compiles one [`Schema`] into a [`Runnable`].
pub struct Graph<'a> {
    schema: &'a Schema,
    owner: GraphName,
    step_limit: Option<usize>,
}

impl<'a> Graph<'a> {
    /// Prepares a compilation of `schema` owned by `owner`.
    ///
    /// The owner name appears in every failure-context tag this graph
    /// produces.
    pub fn new(schema: &'a Schema, owner: GraphName) -> Self {
        Self {
            schema,
            owner,
            step_limit: None,
        }
    }

    /// Installs a traversal step limit on the compiled runnable.
    ///
    /// The executor does not detect cycles; a schema whose edges loop will
    /// traverse until this limit trips. Unlimited by default.
    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = Some(limit);
        self
    }

    /// Resolves handlers, wraps them with failure-context annotation, and
    /// freezes the traversal structure.
    ///
    /// For each declared node the effective handler is the registry's
    /// binding if one exists, else the schema's placeholder. Fails if the
    /// registry binds a name the schema never declared.
    pub fn compile(self, registry: &HandlerRegistry) -> Result<Runnable, SchemaError> {
        let declared: Vec<&NodeId> = self.schema.nodes.iter().map(|(n, _)| n).collect();
        for name in registry.handlers.keys() {
            if !declared.contains(&name) {
                return Err(SchemaError::UnknownNode {
                    referenced_by: "handler registry".to_owned(),
                    node: name.clone(),
                });
            }
        }

        let mut handlers = HashMap::new();
        for (name, placeholder) in &self.schema.nodes {
            let effective = registry.get(name).unwrap_or(placeholder).clone();
            handlers.insert(name.clone(), TaggedHandler::wrap(effective, &self.owner, name));
        }

        let conditional = self
            .schema
            .conditional_edges
            .iter()
            .map(|edge| {
                (
                    edge.source.clone(),
                    CompiledConditional {
                        router: edge.router.clone(),
                        targets: edge.targets.clone(),
                    },
                )
            })
            .collect();

        let direct = self
            .schema
            .direct_edges
            .iter()
            .map(|edge| (edge.source.clone(), edge.target.clone()))
            .collect();

        Ok(Runnable {
            owner: self.owner,
            entry: self.schema.entry_point().clone(),
            handlers,
            conditional,
            direct,
            step_limit: self.step_limit,
        })
    }
}

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

struct CompiledConditional {
    router: Router,
    targets: Vec<(String, Target)>,
}

/// The compiled, executable form of one schema.
///
/// Created once by [`Graph::compile`] and logically immutable afterwards.
/// Each [`invoke`](Self::invoke) call owns its state record exclusively;
/// concurrent invocations share only this structure and whatever
/// collaborators the handlers captured at construction, so a runnable can be
/// shared freely behind an [`Arc`].
pub struct Runnable {
    owner: GraphName,
    entry: NodeId,
    handlers: HashMap<NodeId, Arc<dyn NodeHandler>>,
    conditional: HashMap<NodeId, CompiledConditional>,
    direct: HashMap<NodeId, Target>,
    step_limit: Option<usize>,
}

impl std::fmt::Debug for Runnable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runnable")
            .field("owner", &self.owner)
            .field("entry", &self.entry)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("conditional", &self.conditional.keys().collect::<Vec<_>>())
            .field("direct", &self.direct)
            .field("step_limit", &self.step_limit)
            .finish()
    }
}

impl Runnable {
    /// The graph's owner name.
    pub fn owner(&self) -> &GraphName {
        &self.owner
    }

    /// Performs one full traversal from the entry point.
    ///
    /// Nodes execute in strict edge-determined sequence; each node's partial
    /// update is merged into the accumulated state before its outgoing edge
    /// is evaluated. Returns the fully accumulated state once a node routes
    /// to [`Target::End`] or has no outgoing edge.
    pub async fn invoke(&self, initial_state: State) -> Result<State, PipelineError> {
        let mut state = initial_state;
        let mut current = self.entry.clone();
        let mut steps = 0usize;

        loop {
            if let Some(limit) = self.step_limit {
                if steps >= limit {
                    return Err(PipelineError::StepLimitExceeded { limit });
                }
            }
            steps += 1;

            let handler = self.handlers.get(&current).ok_or_else(|| {
                // Compile-time validation makes this unreachable; kept as a
                // propagated error rather than a panic.
                PipelineError::Handler {
                    message: format!("[{}] no handler for node '{current}'", self.owner),
                }
            })?;

            let update = handler.run(&state).await?;
            state.merge(update);
            debug!(graph = %self.owner, node = %current, step = steps, "node completed");

            if let Some(edge) = self.conditional.get(&current) {
                let label = (edge.router)(&state);
                let target = edge
                    .targets
                    .iter()
                    .find(|(l, _)| *l == label)
                    .map(|(_, t)| t)
                    .ok_or_else(|| PipelineError::UnmatchedRoute {
                        node: current.clone(),
                        label: label.clone(),
                        expected: edge.targets.iter().map(|(l, _)| l.clone()).collect(),
                    })?;
                match target {
                    Target::End => return Ok(state),
                    Target::Node(next) => current = next.clone(),
                }
            } else if let Some(target) = self.direct.get(&current) {
                match target {
                    Target::End => return Ok(state),
                    Target::Node(next) => current = next.clone(),
                }
            } else {
                // No outgoing edge: the node is implicitly terminal.
                return Ok(state);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FnHandler, StateShape};

    fn record_visit(name: &'static str) -> Arc<dyn NodeHandler> {
        Arc::new(FnHandler::new(move |state: &State| {
            let mut visited: Vec<String> = state
                .get("visited")
                .and_then(|v| serde_json::from_value(v.clone()).ok())
                .unwrap_or_default();
            visited.push(name.to_owned());
            Ok(Update::new().set("visited", serde_json::json!(visited)))
        }))
    }

    fn visited(state: &State) -> Vec<String> {
        state
            .get("visited")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn entry_point_is_always_the_first_node() {
        let schema = Schema::builder()
            .state_shape(StateShape::new("S", ["visited"]))
            .node_with("n0", record_visit("n0"))
            .node_with("n1", record_visit("n1"))
            .node_with("n2", record_visit("n2"))
            .build()
            .unwrap();

        let runnable = Graph::new(&schema, GraphName::new("G"))
            .compile(&HandlerRegistry::new())
            .unwrap();

        // No edges: the entry node runs and is implicitly terminal.
        let mut initial = State::new();
        initial.insert("unrelated", "noise");
        let out = runnable.invoke(initial).await.unwrap();
        assert_eq!(visited(&out), vec!["n0"]);
    }

    #[tokio::test]
    async fn conditional_edge_routes_by_label() {
        let schema = Schema::builder()
            .state_shape(StateShape::new("S", ["visited", "label"]))
            .node_with("n1", record_visit("n1"))
            .node_with("n2", record_visit("n2"))
            .conditional_edge(
                "n1",
                |state: &State| state.get_str("label").unwrap_or_default().to_owned(),
                [("L1", Target::node("n2")), ("L2", Target::End)],
            )
            .direct_edge("n2", Target::End)
            .build()
            .unwrap();
        let runnable = Graph::new(&schema, GraphName::new("G"))
            .compile(&HandlerRegistry::new())
            .unwrap();

        let mut initial = State::new();
        initial.insert("label", "L1");
        let out = runnable.invoke(initial).await.unwrap();
        assert_eq!(visited(&out), vec!["n1", "n2"]);

        let mut initial = State::new();
        initial.insert("label", "L2");
        let out = runnable.invoke(initial).await.unwrap();
        assert_eq!(visited(&out), vec!["n1"]);
    }

    #[tokio::test]
    async fn unmatched_label_fails_naming_label_and_alternatives() {
        let schema = Schema::builder()
            .state_shape(StateShape::new("S", ["visited", "label"]))
            .node_with("n1", record_visit("n1"))
            .node_with("n2", record_visit("n2"))
            .conditional_edge(
                "n1",
                |state: &State| state.get_str("label").unwrap_or_default().to_owned(),
                [("L1", Target::node("n2")), ("L2", Target::End)],
            )
            .build()
            .unwrap();
        let runnable = Graph::new(&schema, GraphName::new("G"))
            .compile(&HandlerRegistry::new())
            .unwrap();

        let mut initial = State::new();
        initial.insert("label", "L3");
        let err = runnable.invoke(initial).await.unwrap_err();
        match err {
            PipelineError::UnmatchedRoute {
                node,
                label,
                expected,
            } => {
                assert_eq!(node.as_str(), "n1");
                assert_eq!(label, "L3");
                assert_eq!(expected, vec!["L1".to_owned(), "L2".to_owned()]);
            }
            other => panic!("expected UnmatchedRoute, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn router_sees_the_post_update_state() {
        // The node writes the field the router reads in the same step.
        let writer: Arc<dyn NodeHandler> = Arc::new(FnHandler::new(|_: &State| {
            Ok(Update::new().set("decision", "go"))
        }));
        let schema = Schema::builder()
            .state_shape(StateShape::new("S", ["visited", "decision"]))
            .node_with("decide", writer)
            .node_with("next", record_visit("next"))
            .conditional_edge(
                "decide",
                |state: &State| state.get_str("decision").unwrap_or_default().to_owned(),
                [("go", Target::node("next"))],
            )
            .build()
            .unwrap();
        let runnable = Graph::new(&schema, GraphName::new("G"))
            .compile(&HandlerRegistry::new())
            .unwrap();

        let out = runnable.invoke(State::new()).await.unwrap();
        assert_eq!(visited(&out), vec!["next"]);
    }

    #[tokio::test]
    async fn registry_overrides_placeholder_and_unregistered_nodes_keep_it() {
        let schema = Schema::builder()
            .state_shape(StateShape::new("S", ["visited"]))
            .node("first") // passthrough placeholder
            .node("second")
            .direct_edge("first", Target::node("second"))
            .direct_edge("second", Target::End)
            .build()
            .unwrap();

        let mut registry = HandlerRegistry::new();
        registry.register("second", record_visit("second-override"));

        let runnable = Graph::new(&schema, GraphName::new("G"))
            .compile(&registry)
            .unwrap();
        let out = runnable.invoke(State::new()).await.unwrap();
        assert_eq!(visited(&out), vec!["second-override"]);
    }

    #[tokio::test]
    async fn registering_an_undeclared_node_fails_compilation() {
        let schema = Schema::builder()
            .state_shape(StateShape::new("S", ["visited"]))
            .node("only")
            .build()
            .unwrap();

        let mut registry = HandlerRegistry::new();
        registry.register("ghost", Arc::new(crate::schema::Passthrough));

        let err = Graph::new(&schema, GraphName::new("G"))
            .compile(&registry)
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownNode { node, .. } if node.as_str() == "ghost"));
    }

    #[tokio::test]
    async fn handler_failure_is_annotated_with_owner_and_node() {
        let failing: Arc<dyn NodeHandler> = Arc::new(FnHandler::new(|_: &State| {
            Err(PipelineError::Handler {
                message: "boom".to_owned(),
            })
        }));
        let schema = Schema::builder()
            .state_shape(StateShape::new("S", ["visited"]))
            .node_with("n1", failing)
            .build()
            .unwrap();
        let runnable = Graph::new(&schema, GraphName::new("G"))
            .compile(&HandlerRegistry::new())
            .unwrap();

        let err = runnable.invoke(State::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "[G: n1] boom");
    }

    #[tokio::test]
    async fn cyclic_schema_is_not_detected_and_trips_the_opt_in_step_limit() {
        // Two direct edges routing back to each other: the executor follows
        // them until the installed limit trips.
        let schema = Schema::builder()
            .state_shape(StateShape::new("S", ["visited"]))
            .node_with("a", record_visit("a"))
            .node_with("b", record_visit("b"))
            .direct_edge("a", Target::node("b"))
            .direct_edge("b", Target::node("a"))
            .build()
            .unwrap();
        let runnable = Graph::new(&schema, GraphName::new("G"))
            .with_step_limit(5)
            .compile(&HandlerRegistry::new())
            .unwrap();

        let err = runnable.invoke(State::new()).await.unwrap_err();
        assert!(matches!(err, PipelineError::StepLimitExceeded { limit: 5 }));
    }

    #[tokio::test]
    async fn a_node_may_run_twice_when_edges_revisit_it() {
        // A self-terminating loop: "again" routes back to "counted" once,
        // then ends. The executor itself imposes no single-visit rule.
        let counter: Arc<dyn NodeHandler> = Arc::new(FnHandler::new(|state: &State| {
            let count = state.get("count").and_then(|v| v.as_u64()).unwrap_or(0);
            Ok(Update::new().set("count", count + 1))
        }));
        let schema = Schema::builder()
            .state_shape(StateShape::new("S", ["count"]))
            .node_with("counted", counter)
            .conditional_edge(
                "counted",
                |state: &State| {
                    if state.get("count").and_then(|v| v.as_u64()).unwrap_or(0) < 2 {
                        "again".to_owned()
                    } else {
                        "done".to_owned()
                    }
                },
                [
                    ("again", Target::node("counted")),
                    ("done", Target::End),
                ],
            )
            .build()
            .unwrap();
        let runnable = Graph::new(&schema, GraphName::new("G"))
            .compile(&HandlerRegistry::new())
            .unwrap();

        let out = runnable.invoke(State::new()).await.unwrap();
        assert_eq!(out.get("count").and_then(|v| v.as_u64()), Some(2));
    }
}

//! Declarative graph schemas.
//!
//! A [`Schema`] is the static description of one graph: the state shape it
//! operates on, an ordered list of named nodes, the conditional and direct
//! edges between them, and the scenario mappings a parent graph uses to
//! invoke it as a subgraph. Schemas carry no runtime logic beyond the
//! one-shot validation performed by [`SchemaBuilder::build`].
//!
//! Node behaviour is supplied in two layers. The schema may attach a
//! *placeholder* handler to each node (the default is [`Passthrough`]); a
//! controller then overrides placeholders with its real implementations
//! through an explicit [`crate::HandlerRegistry`] at compile time. There is
//! no name-based reflection: an override for an undeclared node is a compile
//! error.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::errors::{PipelineError, SchemaError};
use crate::identifiers::{NodeId, ScenarioName};
use crate::mapping::{ScenarioMapping, StateMappings};
use crate::state::{State, Update};

// ---------------------------------------------------------------------------
// Edge targets
// ---------------------------------------------------------------------------

/// Where an edge leads: another node, or the end of the traversal.
///
/// The terminal sentinel is part of the type, so a schema cannot reference an
/// unrecognised sentinel — only an undeclared node name, which validation
/// catches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// Continue at the named node.
    Node(NodeId),
    /// Stop the traversal and return the accumulated state.
    End,
}

impl Target {
    /// Shorthand for `Target::Node(NodeId::new(name))`.
    pub fn node(name: impl Into<NodeId>) -> Self {
        Self::Node(name.into())
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Node(id) => write!(f, "{id}"),
            Self::End => write!(f, "END"),
        }
    }
}

// ---------------------------------------------------------------------------
// Node handlers
// ---------------------------------------------------------------------------

/// One processing step: state in, partial update out.
///
/// Handlers may perform blocking I/O through their own collaborators (the
/// LLM port, for instance) but must not mutate shared resources; the only
/// thing a handler changes is the per-call state, via the update it returns.
#[async_trait]
pub trait NodeHandler: Send + Sync {
    /// Runs the step against the accumulated state.
    async fn run(&self, state: &State) -> Result<Update, PipelineError>;
}

/// The default placeholder handler: produces an empty update, leaving the
/// state untouched.
pub struct Passthrough;

#[async_trait]
impl NodeHandler for Passthrough {
    async fn run(&self, _state: &State) -> Result<Update, PipelineError> {
        Ok(Update::new())
    }
}

/// Adapts a plain closure into a [`NodeHandler`].
///
/// Useful for small synchronous steps and test fixtures:
///
/// ```
/// use pipeline::{FnHandler, Update};
///
/// let handler = FnHandler::new(|state| {
///     let text = state.get_str("input_text").unwrap_or_default();
///     Ok(Update::new().set("length", text.len()))
/// });
/// ```
pub struct FnHandler<F>(F);

impl<F> FnHandler<F>
where
    F: Fn(&State) -> Result<Update, PipelineError> + Send + Sync,
{
    /// Wraps the closure.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> NodeHandler for FnHandler<F>
where
    F: Fn(&State) -> Result<Update, PipelineError> + Send + Sync,
{
    async fn run(&self, state: &State) -> Result<Update, PipelineError> {
        (self.0)(state)
    }
}

// ---------------------------------------------------------------------------
// Edges
// ---------------------------------------------------------------------------

/// Routing function of a conditional edge: reads the post-update state and
/// returns the label to follow.
pub type Router = Arc<dyn Fn(&State) -> String + Send + Sync>;

/// A value-dependent transition. After `source` completes, `router` is
/// called with the accumulated state and its label is looked up in
/// `targets`; an unmatched label fails the traversal.
#[derive(Clone)]
pub struct ConditionalEdge {
    pub(crate) source: NodeId,
    pub(crate) router: Router,
    /// Label → target, in declaration order.
    pub(crate) targets: Vec<(String, Target)>,
}

/// An unconditional transition, always followed after `source` completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectEdge {
    pub(crate) source: NodeId,
    pub(crate) target: Target,
}

// ---------------------------------------------------------------------------
// State shape
// ---------------------------------------------------------------------------

/// The named field set of a graph's state record.
///
/// Fields are documentation and a validation anchor, not a runtime
/// constraint: nodes may still read fields that were never written (and get
/// the absence marker back).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateShape {
    name: String,
    fields: Vec<String>,
}

impl StateShape {
    /// Declares a state shape with the given type name and field names.
    pub fn new(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// The shape's type name (e.g. `"CoordinatorState"`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared field names.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// The immutable, validated declaration of one graph.
///
/// Built with [`Schema::builder`]; compiled into a [`crate::Runnable`] by
/// [`crate::Graph`].
#[derive(Clone)]
pub struct Schema {
    pub(crate) state_shape: StateShape,
    pub(crate) nodes: Vec<(NodeId, Arc<dyn NodeHandler>)>,
    pub(crate) conditional_edges: Vec<ConditionalEdge>,
    pub(crate) direct_edges: Vec<DirectEdge>,
    pub(crate) mappings: StateMappings,
}

impl std::fmt::Debug for Schema {
    // Handlers and routers are opaque; show the declarative structure only.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("state_shape", &self.state_shape.name)
            .field(
                "nodes",
                &self.nodes.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
            )
            .field("conditional_edges", &self.conditional_edges.len())
            .field("direct_edges", &self.direct_edges.len())
            .finish()
    }
}

impl Schema {
    /// Starts an empty schema definition.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// The entry point: the first declared node.
    pub fn entry_point(&self) -> &NodeId {
        // Validation guarantees at least one node.
        &self.nodes[0].0
    }

    /// The declared state shape.
    pub fn state_shape(&self) -> &StateShape {
        &self.state_shape
    }

    /// The scenario mappings a parent uses to invoke this graph as a subgraph.
    pub fn mappings(&self) -> &StateMappings {
        &self.mappings
    }

    /// Returns a JSON description of the schema structure, for inspection
    /// and debugging only.
    pub fn describe(&self) -> serde_json::Value {
        json!({
            "state_shape": self.state_shape.name(),
            "fields": self.state_shape.fields(),
            "nodes": self.nodes.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
            "conditional_edges": self
                .conditional_edges
                .iter()
                .map(|e| {
                    json!({
                        "from": e.source.as_str(),
                        "labels": e.targets.iter().map(|(l, t)| {
                            json!({ "label": l, "to": t.to_string() })
                        }).collect::<Vec<_>>(),
                    })
                })
                .collect::<Vec<_>>(),
            "direct_edges": self
                .direct_edges
                .iter()
                .map(|e| format!("{} -> {}", e.source, e.target))
                .collect::<Vec<_>>(),
            "scenarios": self.mappings.scenario_names(),
        })
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Accumulates a schema definition and validates it on [`build`](Self::build).
#[derive(Default)]
pub struct SchemaBuilder {
    state_shape: Option<StateShape>,
    nodes: Vec<(NodeId, Arc<dyn NodeHandler>)>,
    conditional_edges: Vec<ConditionalEdge>,
    direct_edges: Vec<DirectEdge>,
    mappings: StateMappings,
}

impl SchemaBuilder {
    /// Declares the state shape. Required.
    pub fn state_shape(mut self, shape: StateShape) -> Self {
        self.state_shape = Some(shape);
        self
    }

    /// Declares a node with the default [`Passthrough`] placeholder.
    ///
    /// The first declared node becomes the entry point.
    pub fn node(self, name: impl Into<NodeId>) -> Self {
        self.node_with(name, Arc::new(Passthrough))
    }

    /// Declares a node with an explicit placeholder handler.
    pub fn node_with(mut self, name: impl Into<NodeId>, placeholder: Arc<dyn NodeHandler>) -> Self {
        self.nodes.push((name.into(), placeholder));
        self
    }

    /// Declares a conditional edge from `source`.
    ///
    /// After `source` completes, `router` is called with the accumulated
    /// state; its label selects the next target from `targets`.
    pub fn conditional_edge<R>(
        mut self,
        source: impl Into<NodeId>,
        router: R,
        targets: impl IntoIterator<Item = (&'static str, Target)>,
    ) -> Self
    where
        R: Fn(&State) -> String + Send + Sync + 'static,
    {
        self.conditional_edges.push(ConditionalEdge {
            source: source.into(),
            router: Arc::new(router),
            targets: targets
                .into_iter()
                .map(|(label, target)| (label.to_owned(), target))
                .collect(),
        });
        self
    }

    /// Declares a direct edge from `source` to `target`.
    pub fn direct_edge(mut self, source: impl Into<NodeId>, target: Target) -> Self {
        self.direct_edges.push(DirectEdge {
            source: source.into(),
            target,
        });
        self
    }

    /// Registers a scenario mapping under `scenario`.
    pub fn mapping(mut self, scenario: impl Into<ScenarioName>, mapping: ScenarioMapping) -> Self {
        self.mappings.insert(scenario.into(), mapping);
        self
    }

    /// Validates and freezes the schema.
    ///
    /// Fails when the state shape is unset, no node is declared, a node name
    /// is duplicated, an edge references an undeclared node, or a node has
    /// both a conditional and a direct edge.
    pub fn build(self) -> Result<Schema, SchemaError> {
        let state_shape = self.state_shape.ok_or(SchemaError::MissingStateShape)?;

        if self.nodes.is_empty() {
            return Err(SchemaError::NoNodes);
        }

        let mut declared: HashSet<&NodeId> = HashSet::new();
        for (name, _) in &self.nodes {
            if !declared.insert(name) {
                return Err(SchemaError::DuplicateNode { name: name.clone() });
            }
        }

        for edge in &self.conditional_edges {
            if !declared.contains(&edge.source) {
                return Err(SchemaError::UnknownNode {
                    referenced_by: "conditional edge".to_owned(),
                    node: edge.source.clone(),
                });
            }
            for (label, target) in &edge.targets {
                if let Target::Node(node) = target {
                    if !declared.contains(node) {
                        return Err(SchemaError::UnknownNode {
                            referenced_by: format!(
                                "conditional edge from '{}' (label '{label}')",
                                edge.source
                            ),
                            node: node.clone(),
                        });
                    }
                }
            }
        }

        for edge in &self.direct_edges {
            if !declared.contains(&edge.source) {
                return Err(SchemaError::UnknownNode {
                    referenced_by: "direct edge".to_owned(),
                    node: edge.source.clone(),
                });
            }
            if let Target::Node(node) = &edge.target {
                if !declared.contains(node) {
                    return Err(SchemaError::UnknownNode {
                        referenced_by: format!("direct edge from '{}'", edge.source),
                        node: node.clone(),
                    });
                }
            }
        }

        // Conditional and direct edges on the same source would make routing
        // depend on registration order; rejected outright.
        let conditional_sources: HashSet<&NodeId> =
            self.conditional_edges.iter().map(|e| &e.source).collect();
        for edge in &self.direct_edges {
            if conditional_sources.contains(&edge.source) {
                return Err(SchemaError::ConflictingEdges {
                    node: edge.source.clone(),
                });
            }
        }

        Ok(Schema {
            state_shape,
            nodes: self.nodes,
            conditional_edges: self.conditional_edges,
            direct_edges: self.direct_edges,
            mappings: self.mappings,
        })
    }
}

//! Coordinator: the root graph that composes the three leaf agents.
//!
//! Each embedded agent is compiled once at construction and packaged as a
//! [`SubgraphNode`] under the scenario its schema publishes. All
//! dependencies — the provider, the compiled children, their mappings — are
//! injected through the constructor; nothing is shared across instances.

pub mod schema;

use std::sync::Arc;

use pipeline::{
    Graph, GraphName, HandlerRegistry, LlmConfig, LlmProvider, Runnable, Schema, SchemaError,
    ScenarioName, SubgraphNode,
};

use crate::intent::{self, IntentAgent};
use crate::keypoint::{self, KeypointAgent};
use crate::synthesis::{self, SynthesisAgent};

/// Controller for the root orchestration graph.
pub struct Coordinator {
    schema: Schema,
    intent: Arc<Runnable>,
    intent_mappings: pipeline::StateMappings,
    keypoint: Arc<Runnable>,
    keypoint_mappings: pipeline::StateMappings,
    synthesis: Arc<Runnable>,
    synthesis_mappings: pipeline::StateMappings,
}

impl Coordinator {
    /// Owner name used in failure-context tags.
    pub const NAME: &'static str = "Coordinator";

    /// Builds and compiles the three leaf agents against the injected
    /// provider.
    pub fn new(provider: Arc<dyn LlmProvider>, config: LlmConfig) -> Result<Self, SchemaError> {
        let intent_agent = IntentAgent::new(provider.clone(), config.clone())?;
        let keypoint_agent = KeypointAgent::new(provider.clone(), config.clone())?;
        let synthesis_agent = SynthesisAgent::new(provider, config)?;

        Ok(Self {
            schema: schema::schema()?,
            intent_mappings: intent_agent.schema().mappings().clone(),
            intent: Arc::new(intent_agent.compile()?),
            keypoint_mappings: keypoint_agent.schema().mappings().clone(),
            keypoint: Arc::new(keypoint_agent.compile()?),
            synthesis_mappings: synthesis_agent.schema().mappings().clone(),
            synthesis: Arc::new(synthesis_agent.compile()?),
        })
    }

    /// Compiles the root graph.
    ///
    /// `step_limit` bounds one traversal of the root graph; `None` leaves it
    /// unbounded.
    pub fn compile(&self, step_limit: Option<usize>) -> Result<Runnable, SchemaError> {
        let mut registry = HandlerRegistry::new();
        registry.register(
            schema::CLASSIFY_INTENT,
            Arc::new(SubgraphNode::new(
                self.intent.clone(),
                self.intent_mappings.clone(),
                ScenarioName::new(intent::schema::CLASSIFY_INTENT),
            )),
        );
        registry.register(
            schema::RUN_KEYPOINT,
            Arc::new(SubgraphNode::new(
                self.keypoint.clone(),
                self.keypoint_mappings.clone(),
                ScenarioName::new(keypoint::schema::EXTRACT_KEYPOINTS),
            )),
        );
        registry.register(
            schema::RUN_SYNTHESIS,
            Arc::new(SubgraphNode::new(
                self.synthesis.clone(),
                self.synthesis_mappings.clone(),
                ScenarioName::new(synthesis::schema::SYNTHESIZE_CONTENT),
            )),
        );

        let graph = Graph::new(&self.schema, GraphName::new(Self::NAME));
        let graph = match step_limit {
            Some(limit) => graph.with_step_limit(limit),
            None => graph,
        };
        graph.compile(&registry)
    }
}

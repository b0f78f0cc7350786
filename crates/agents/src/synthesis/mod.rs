//! Synthesis agent: explains the input in reorganised continuous prose.

pub mod schema;
pub mod tool;

use std::sync::Arc;

use async_trait::async_trait;

use pipeline::{
    Graph, GraphName, HandlerRegistry, LlmConfig, LlmProvider, NodeHandler, PipelineError,
    Runnable, Schema, SchemaError, State, TagError, Update,
};

use tool::SynthesisTool;

/// Controller for the synthesis subgraph.
pub struct SynthesisAgent {
    schema: Schema,
    tool: Arc<SynthesisTool>,
}

impl SynthesisAgent {
    /// Owner name used in failure-context tags.
    pub const NAME: &'static str = "SynthesisAgent";

    /// Creates the agent with an injected provider and base configuration.
    pub fn new(provider: Arc<dyn LlmProvider>, config: LlmConfig) -> Result<Self, SchemaError> {
        Ok(Self {
            schema: schema::schema()?,
            tool: Arc::new(SynthesisTool::new(provider, config)),
        })
    }

    /// The agent's schema, including the scenario mappings it publishes.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Compiles the agent into a runnable subgraph.
    pub fn compile(&self) -> Result<Runnable, SchemaError> {
        let mut registry = HandlerRegistry::new();
        registry.register(
            schema::SYNTHESIZE_CONTENT,
            Arc::new(SynthesizeContentNode {
                tool: self.tool.clone(),
            }),
        );
        Graph::new(&self.schema, GraphName::new(Self::NAME)).compile(&registry)
    }
}

struct SynthesizeContentNode {
    tool: Arc<SynthesisTool>,
}

#[async_trait]
impl NodeHandler for SynthesizeContentNode {
    async fn run(&self, state: &State) -> Result<Update, PipelineError> {
        let text = state.get_str(schema::INPUT_TEXT).unwrap_or_default();
        let report = self.tool.synthesize(text).await?;
        let serialized = serde_json::to_string(&report).tag(SynthesisAgent::NAME)?;
        Ok(Update::new().set(schema::SYNTHESIS_RESULT, serialized))
    }
}

//! Keypoint agent: compresses the input into its most important points.

pub mod schema;
pub mod tool;

use std::sync::Arc;

use async_trait::async_trait;

use pipeline::{
    Graph, GraphName, HandlerRegistry, LlmConfig, LlmProvider, NodeHandler, PipelineError,
    Runnable, Schema, SchemaError, State, TagError, Update,
};

use tool::KeypointTool;

/// Controller for the keypoint extraction subgraph.
pub struct KeypointAgent {
    schema: Schema,
    tool: Arc<KeypointTool>,
}

impl KeypointAgent {
    /// Owner name used in failure-context tags.
    pub const NAME: &'static str = "KeypointAgent";

    /// Creates the agent with an injected provider and base configuration.
    pub fn new(provider: Arc<dyn LlmProvider>, config: LlmConfig) -> Result<Self, SchemaError> {
        Ok(Self {
            schema: schema::schema()?,
            tool: Arc::new(KeypointTool::new(provider, config)),
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
            schema::EXTRACT_KEYPOINTS,
            Arc::new(ExtractKeypointsNode {
                tool: self.tool.clone(),
            }),
        );
        Graph::new(&self.schema, GraphName::new(Self::NAME)).compile(&registry)
    }
}

struct ExtractKeypointsNode {
    tool: Arc<KeypointTool>,
}

#[async_trait]
impl NodeHandler for ExtractKeypointsNode {
    async fn run(&self, state: &State) -> Result<Update, PipelineError> {
        let text = state.get_str(schema::INPUT_TEXT).unwrap_or_default();
        let summary = self.tool.extract(text).await?;
        let serialized = serde_json::to_string(&summary).tag(KeypointAgent::NAME)?;
        Ok(Update::new().set(schema::KEYPOINT_RESULT, serialized))
    }
}

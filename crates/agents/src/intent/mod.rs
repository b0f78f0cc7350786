//! Intent agent: decides which summarization mode fits the input.

pub mod schema;
pub mod tool;

use std::sync::Arc;

use async_trait::async_trait;

use pipeline::{
    Graph, GraphName, HandlerRegistry, LlmConfig, LlmProvider, NodeHandler, PipelineError,
    Runnable, Schema, SchemaError, State, Update,
};

use tool::IntentTool;

/// Controller for the intent classification subgraph.
pub struct IntentAgent {
    schema: Schema,
    tool: Arc<IntentTool>,
}

impl IntentAgent {
    /// Owner name used in failure-context tags.
    pub const NAME: &'static str = "IntentAgent";

    /// Creates the agent with an injected provider and base configuration.
    pub fn new(provider: Arc<dyn LlmProvider>, config: LlmConfig) -> Result<Self, SchemaError> {
        Ok(Self {
            schema: schema::schema()?,
            tool: Arc::new(IntentTool::new(provider, config)),
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
            schema::CLASSIFY_INTENT,
            Arc::new(ClassifyIntentNode {
                tool: self.tool.clone(),
            }),
        );
        Graph::new(&self.schema, GraphName::new(Self::NAME)).compile(&registry)
    }
}

struct ClassifyIntentNode {
    tool: Arc<IntentTool>,
}

#[async_trait]
impl NodeHandler for ClassifyIntentNode {
    async fn run(&self, state: &State) -> Result<Update, PipelineError> {
        let text = state.get_str(schema::INPUT_TEXT).unwrap_or_default();
        let decision = self.tool.classify(text).await?;
        Ok(Update::new()
            .set(schema::GENRE_TYPE_CANDIDATE, decision.genre.as_label())
            .set(schema::CONTEXT_TYPE_CANDIDATE, decision.context.as_label())
            .set(schema::TASK_TYPE_CANDIDATE, decision.task.as_label()))
    }
}

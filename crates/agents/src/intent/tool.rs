//! Intent classification tool.
//!
//! One JSON-mode completion that decides which summarization mode fits the
//! input. Parsing is deliberately lenient: a malformed or partial model
//! reply degrades to the defaults (`Other` / `Keypoint`) instead of failing
//! the traversal — a misclassification is recoverable downstream, a dead
//! pipeline is not.

use std::sync::Arc;

use pipeline::{ChatRequest, LlmConfig, LlmProvider, PipelineError, ResponseFormat, TagError};

use crate::vocab::{ContextType, GenreType, TaskType};

const TAG: &str = "IntentTool.classify";

const SYSTEM_PROMPT: &str = r#"You are an intent classifier for summarization tasks. Decide why a typical reader would read the given text and therefore which summarization mode fits:
- KEYPOINT: the reader mainly wants compressed information (news, announcements, reports, logs).
- SYNTHESIS: the reader mainly wants help understanding (lecture notes, definitions, laws, formulas, literary or abstract texts).

Also classify the text's communicative purpose as exactly one genre_type of: Narrative, Informational, Expository, Argumentative, Instructional, Normative, Expressive, Other. Use Other when the text is too short, random, non-linguistic, or has no clear intent. context_type is always "Other".

Rules:
1. An explicit reader request ("bullet points", "highlights", "TL;DR") forces KEYPOINT; ("explain", "help me understand", "walk me through") forces SYNTHESIS. The explicit request always overrides genre-based defaults.
2. Without an explicit request: news-like factual texts prefer KEYPOINT; conceptual, theoretical, or literary texts prefer SYNTHESIS.
3. A short definition, law, or formula that states a core idea is SYNTHESIS even when brief.
4. If the input is meaningless or the intent stays ambiguous, default task_type to SYNTHESIS.
5. Always output exactly one JSON object with all three fields and nothing else:
{"genre_type": "<type>", "context_type": "Other", "task_type": "<KEYPOINT|SYNTHESIS>"}"#;

/// What the classifier decided about one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntentDecision {
    pub genre: GenreType,
    pub context: ContextType,
    pub task: TaskType,
}

/// Wraps the provider call and the lenient parse.
pub struct IntentTool {
    provider: Arc<dyn LlmProvider>,
    config: LlmConfig,
}

impl IntentTool {
    /// Creates the tool with an injected provider and base configuration.
    pub fn new(provider: Arc<dyn LlmProvider>, config: LlmConfig) -> Self {
        Self { provider, config }
    }

    /// Classifies `text` into a genre, context, and summarization mode.
    pub async fn classify(&self, text: &str) -> Result<IntentDecision, PipelineError> {
        let mut config = self.config.clone();
        config.response_format = ResponseFormat::JsonObject;

        let request = ChatRequest {
            system_prompt: SYSTEM_PROMPT.to_owned(),
            user_prompt: format!(
                "Classify the intent of the following user request according to the system rules.\nUser request (or text): {text}"
            ),
            config,
        };

        let response = self
            .provider
            .complete(&request)
            .await
            .tag(format!("{}.complete", self.provider.name()))
            .tag(TAG)?;

        Ok(parse_decision(&response.content))
    }
}

fn parse_decision(content: &str) -> IntentDecision {
    let value: serde_json::Value = serde_json::from_str(content).unwrap_or_default();
    let genre = value
        .get("genre_type")
        .and_then(|v| v.as_str())
        .map(GenreType::from_label)
        .unwrap_or(GenreType::Other);
    let task = value
        .get("task_type")
        .and_then(|v| v.as_str())
        .and_then(TaskType::from_label)
        .unwrap_or(TaskType::Keypoint);

    IntentDecision {
        genre,
        context: ContextType::Other,
        task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm::MockProvider;
    use pipeline::LlmError;

    fn tool(mock: Arc<MockProvider>) -> IntentTool {
        IntentTool::new(mock, LlmConfig::new("test-model"))
    }

    #[tokio::test]
    async fn well_formed_reply_parses_into_a_decision() {
        let mock = Arc::new(MockProvider::new());
        mock.push_content(
            r#"{"genre_type": "Expository", "context_type": "Other", "task_type": "SYNTHESIS"}"#,
        );

        let decision = tool(mock.clone()).classify("F = dp/dt").await.unwrap();
        assert_eq!(decision.genre, GenreType::Expository);
        assert_eq!(decision.task, TaskType::Synthesis);

        // JSON mode is forced regardless of the base configuration.
        assert_eq!(
            mock.requests()[0].config.response_format,
            ResponseFormat::JsonObject
        );
    }

    #[tokio::test]
    async fn malformed_reply_degrades_to_defaults() {
        let mock = Arc::new(MockProvider::new());
        mock.push_content("not json at all");

        let decision = tool(mock).classify("whatever").await.unwrap();
        assert_eq!(decision.genre, GenreType::Other);
        assert_eq!(decision.context, ContextType::Other);
        assert_eq!(decision.task, TaskType::Keypoint);
    }

    #[tokio::test]
    async fn unknown_labels_degrade_field_by_field() {
        let mock = Arc::new(MockProvider::new());
        mock.push_content(r#"{"genre_type": "Sonnet", "task_type": "SYNTHESIS"}"#);

        let decision = tool(mock).classify("poem").await.unwrap();
        assert_eq!(decision.genre, GenreType::Other);
        assert_eq!(decision.task, TaskType::Synthesis);
    }

    #[tokio::test]
    async fn provider_failure_is_tagged_with_tool_and_provider() {
        let mock = Arc::new(MockProvider::new());
        mock.push_error(LlmError::EmptyResponse);

        let err = tool(mock).classify("text").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "[IntentTool.classify] [MockProvider.complete] model returned empty content"
        );
    }
}

//! Synthesis tool.
//!
//! Produces a tutor-style explanation of the input: a reorganised core
//! analysis in continuous prose, plus the small amounts of background,
//! examples, and takeaways that make the content easier to understand and
//! apply.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use pipeline::{
    ChatRequest, LlmConfig, LlmError, LlmProvider, PipelineError, ResponseFormat, TagError,
};

const TAG: &str = "SynthesisTool.synthesize";

const SYSTEM_PROMPT: &str = r#"You are a careful tutor. Read the given text and produce a synthesized explanation that reduces the effort needed to understand and apply it: identify the main subject, reorganise the content into clear continuous prose, and add only small amounts of necessary background, concrete examples, and takeaways. Stay faithful to the original intent; never contradict or go beyond what the text supports.

Output exactly one JSON object and nothing else, keeping the original language of the input:
{"protagonist": "<main subject>", "focus_aspects": ["<angle>", ...], "synthesis": "<reorganised explanation>", "added_context": ["<background>", ...], "examples": ["<illustration>", ...], "takeaways": ["<key takeaway>", ...]}"#;

/// Structured result of one synthesis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisReport {
    #[serde(default)]
    pub protagonist: String,
    #[serde(default)]
    pub focus_aspects: Vec<String>,
    #[serde(default)]
    pub synthesis: String,
    #[serde(default)]
    pub added_context: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub takeaways: Vec<String>,
}

/// Wraps the provider call and the strict parse.
pub struct SynthesisTool {
    provider: Arc<dyn LlmProvider>,
    config: LlmConfig,
}

impl SynthesisTool {
    /// Creates the tool with an injected provider and base configuration.
    pub fn new(provider: Arc<dyn LlmProvider>, config: LlmConfig) -> Self {
        Self { provider, config }
    }

    /// Synthesizes an explanation of `text`.
    pub async fn synthesize(&self, text: &str) -> Result<SynthesisReport, PipelineError> {
        let mut config = self.config.clone();
        config.response_format = ResponseFormat::JsonObject;

        let request = ChatRequest {
            system_prompt: SYSTEM_PROMPT.to_owned(),
            user_prompt: format!(
                "Synthesize an explanation of the following text according to the system rules.\n\n{text}"
            ),
            config,
        };

        let response = self
            .provider
            .complete(&request)
            .await
            .tag(format!("{}.complete", self.provider.name()))
            .tag(TAG)?;

        if response.content.trim().is_empty() {
            return Err(LlmError::EmptyResponse).tag(TAG);
        }

        serde_json::from_str(&response.content).tag(TAG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm::MockProvider;

    fn tool(mock: Arc<MockProvider>) -> SynthesisTool {
        SynthesisTool::new(mock, LlmConfig::new("test-model"))
    }

    #[tokio::test]
    async fn well_formed_reply_parses_with_optional_sections_defaulted() {
        let mock = Arc::new(MockProvider::new());
        mock.push_content(
            r#"{"protagonist": "Newton's second law", "focus_aspects": ["definition"], "synthesis": "The law relates force to the rate of change of momentum."}"#,
        );

        let report = tool(mock).synthesize("F = dp/dt").await.unwrap();
        assert_eq!(report.protagonist, "Newton's second law");
        assert!(!report.synthesis.is_empty());
        assert!(report.examples.is_empty());
        assert!(report.takeaways.is_empty());
    }

    #[tokio::test]
    async fn provider_failure_is_tagged_with_tool_and_provider() {
        let mock = Arc::new(MockProvider::new());
        mock.push_error(LlmError::Api {
            status: 500,
            message: "upstream".to_owned(),
        });

        let err = tool(mock).synthesize("text").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "[SynthesisTool.synthesize] [MockProvider.complete] provider API error (status 500): upstream"
        );
    }
}

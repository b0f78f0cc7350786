//! Keypoint extraction tool.
//!
//! Produces a compact structured summary: the text's main subject, the
//! angles the summary focuses on, and the keypoints themselves. Blank input
//! short-circuits without spending a model call. A completion truncated by
//! the token budget is retried once with the budget doubled.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use pipeline::{
    ChatRequest, LlmConfig, LlmError, LlmProvider, PipelineError, ResponseFormat, TagError,
};

const TAG: &str = "KeypointTool.extract";

const NO_KEYPOINTS: &str = "No clear keypoints can be extracted from the input.";

const SYSTEM_PROMPT: &str = r#"You are a professional keypoint summarizer. Identify the text's main subject (its protagonist), decide the 3-5 most important angles for this kind of text, and compress the content into short, information-dense keypoints along those angles.

Rules:
- Compress and generalize; never re-order or lightly rephrase the original sentences.
- 5-8 keypoints for long texts, 3-5 for short texts. Drop redundancy, minor details, and non-central examples.
- Never invent facts or add outside knowledge. Keep the original language of the input.
- If the text is too short, random, or has no clear meaning, use an empty protagonist, no focus aspects, and the single keypoint "No clear keypoints can be extracted from the input."
- Output exactly one JSON object and nothing else:
{"protagonist": "<main subject>", "focus_aspects": ["<angle>", ...], "keypoints": ["<point>", ...]}"#;

/// Structured result of one extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeypointSummary {
    #[serde(default)]
    pub protagonist: String,
    #[serde(default)]
    pub focus_aspects: Vec<String>,
    #[serde(default)]
    pub keypoints: Vec<String>,
}

impl KeypointSummary {
    /// The fixed result for input with nothing to extract.
    pub fn empty_input() -> Self {
        Self {
            protagonist: String::new(),
            focus_aspects: Vec::new(),
            keypoints: vec![NO_KEYPOINTS.to_owned()],
        }
    }
}

/// Wraps the provider call, the truncation retry, and the strict parse.
pub struct KeypointTool {
    provider: Arc<dyn LlmProvider>,
    config: LlmConfig,
}

impl KeypointTool {
    /// Creates the tool with an injected provider and base configuration.
    pub fn new(provider: Arc<dyn LlmProvider>, config: LlmConfig) -> Self {
        Self { provider, config }
    }

    /// Extracts keypoints from `text`.
    pub async fn extract(&self, text: &str) -> Result<KeypointSummary, PipelineError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(KeypointSummary::empty_input());
        }

        let mut config = self.config.clone();
        config.response_format = ResponseFormat::JsonObject;

        let user_prompt = format!(
            "Extract keypoints from the following text. First determine the main subject, then summarize only the most important information.\n\n{text}"
        );

        let mut request = ChatRequest {
            system_prompt: SYSTEM_PROMPT.to_owned(),
            user_prompt,
            config,
        };

        let response = match self.provider.complete(&request).await {
            Err(LlmError::Incomplete { reason }) => {
                // Token budget ran out mid-object; one retry with double budget.
                request.config.max_tokens = request.config.max_tokens.saturating_mul(2);
                warn!(
                    %reason,
                    max_tokens = request.config.max_tokens,
                    "completion truncated, retrying with a larger budget"
                );
                self.provider.complete(&request).await
            }
            other => other,
        }
        .tag(format!("{}.complete", self.provider.name()))
        .tag(TAG)?;

        if response.content.trim().is_empty() {
            return Err(LlmError::EmptyResponse).tag(TAG);
        }

        serde_json::from_str(&response.content).tag(TAG)
    }
}

//! OpenAI-compatible chat-completions provider.
//!
//! One stateless HTTP adapter: merged sampling config in, content plus usage
//! counters out. A truncated completion (`finish_reason == "length"`)
//! surfaces as [`LlmError::Incomplete`] so tools can decide to retry with a
//! larger token budget; HTTP 429 surfaces as [`LlmError::RateLimited`] with
//! the `Retry-After` header when present.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use pipeline::{ChatRequest, ChatResponse, LlmError, LlmProvider, ResponseFormat, TokenCount};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat-completions client for OpenAI and API-compatible endpoints.
pub struct OpenAiProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiProvider {
    /// Creates a provider against the official OpenAI endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: api_key.into(),
        }
    }

    /// Points the provider at a different OpenAI-compatible base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "OpenAiProvider"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let body = WireRequest::from(request);
        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %body.model, max_tokens = body.max_completion_tokens, "chat completion request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after = parse_retry_after(
                response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok()),
            );
            return Err(LlmError::RateLimited { retry_after });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let wire: WireResponse = response.json().await.map_err(|e| LlmError::Transport {
            message: e.to_string(),
        })?;
        parse_completion(wire)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    temperature: f64,
    top_p: f64,
    presence_penalty: f64,
    frequency_penalty: f64,
    max_completion_tokens: u32,
    response_format: WireResponseFormat,
    messages: Vec<WireMessage>,
}

#[derive(Debug, Serialize)]
struct WireResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

impl From<&ChatRequest> for WireRequest {
    fn from(request: &ChatRequest) -> Self {
        let config = &request.config;
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            presence_penalty: config.presence_penalty,
            frequency_penalty: config.frequency_penalty,
            max_completion_tokens: config.max_tokens,
            response_format: WireResponseFormat {
                kind: match config.response_format {
                    ResponseFormat::Text => "text",
                    ResponseFormat::JsonObject => "json_object",
                },
            },
            messages: vec![
                WireMessage {
                    role: "system",
                    content: request.system_prompt.clone(),
                },
                WireMessage {
                    role: "user",
                    content: request.user_prompt.clone(),
                },
            ],
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

fn parse_completion(wire: WireResponse) -> Result<ChatResponse, LlmError> {
    let usage = wire.usage.unwrap_or_default();
    let choice = wire.choices.into_iter().next().ok_or(LlmError::EmptyResponse)?;

    if choice.finish_reason.as_deref() == Some("length") {
        return Err(LlmError::Incomplete {
            reason: "length".to_owned(),
        });
    }

    let content = choice.message.content.unwrap_or_default();
    if content.is_empty() {
        return Err(LlmError::EmptyResponse);
    }

    Ok(ChatResponse {
        content,
        tokens_in: TokenCount::new(usage.prompt_tokens),
        tokens_out: TokenCount::new(usage.completion_tokens),
    })
}

fn parse_retry_after(header: Option<&str>) -> Option<Duration> {
    header
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline::LlmConfig;

    fn request() -> ChatRequest {
        let mut config = LlmConfig::new("gpt-4o-mini");
        config.response_format = ResponseFormat::JsonObject;
        config.max_tokens = 800;
        ChatRequest {
            system_prompt: "You are a classifier.".to_owned(),
            user_prompt: "Classify this.".to_owned(),
            config,
        }
    }

    #[test]
    fn request_body_carries_config_and_both_messages() {
        let body = serde_json::to_value(WireRequest::from(&request())).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_completion_tokens"], 800);
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Classify this.");
    }

    #[test]
    fn completion_parsing_extracts_content_and_usage() {
        let wire: WireResponse = serde_json::from_value(serde_json::json!({
            "choices": [{
                "message": {"content": "{\"task_type\": \"KEYPOINT\"}"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 120, "completion_tokens": 9}
        }))
        .unwrap();

        let response = parse_completion(wire).unwrap();
        assert_eq!(response.content, "{\"task_type\": \"KEYPOINT\"}");
        assert_eq!(response.tokens_in, TokenCount::new(120));
        assert_eq!(response.tokens_out, TokenCount::new(9));
    }

    #[test]
    fn truncated_completion_is_reported_as_incomplete() {
        let wire: WireResponse = serde_json::from_value(serde_json::json!({
            "choices": [{
                "message": {"content": "partial"},
                "finish_reason": "length"
            }]
        }))
        .unwrap();

        let err = parse_completion(wire).unwrap_err();
        assert!(matches!(err, LlmError::Incomplete { ref reason } if reason == "length"));
    }

    #[test]
    fn missing_content_is_an_empty_response() {
        let wire: WireResponse = serde_json::from_value(serde_json::json!({
            "choices": [{"message": {}}]
        }))
        .unwrap();
        assert!(matches!(parse_completion(wire).unwrap_err(), LlmError::EmptyResponse));

        let no_choices: WireResponse =
            serde_json::from_value(serde_json::json!({"choices": []})).unwrap();
        assert!(matches!(
            parse_completion(no_choices).unwrap_err(),
            LlmError::EmptyResponse
        ));
    }

    #[test]
    fn retry_after_header_parses_to_seconds() {
        assert_eq!(parse_retry_after(Some("7")), Some(Duration::from_secs(7)));
        assert_eq!(parse_retry_after(Some("not a number")), None);
        assert_eq!(parse_retry_after(None), None);
    }
}

//! Port trait definitions for the LLM boundary.
//!
//! Node handlers that talk to a model do so through [`LlmProvider`], the one
//! port this domain exposes. Infrastructure crates implement it (see the
//! `llm` crate for the OpenAI-compatible provider and the in-memory mock);
//! this crate never sees transport details.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::RetryPolicy;
use crate::types::TokenCount;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Requested shape of the model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Free-form text.
    Text,
    /// A single JSON object.
    JsonObject,
}

/// Sampling and budget configuration shared across requests.
///
/// Mirrors the chat-completions parameter surface; tools clone and adjust it
/// per call (e.g. forcing [`ResponseFormat::JsonObject`], or doubling
/// `max_tokens` when retrying a truncated response).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier, e.g. `"gpt-4o-mini"`.
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
    /// Completion token budget.
    pub max_tokens: u32,
    pub response_format: ResponseFormat,
}

impl LlmConfig {
    /// Creates a configuration for `model` with neutral sampling defaults.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 1.0,
            top_p: 1.0,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            max_tokens: 500,
            response_format: ResponseFormat::Text,
        }
    }
}

/// One chat completion call: a system instruction, a user turn, and the
/// configuration to run them with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub config: LlmConfig,
}

/// The model's reply plus usage accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    pub tokens_in: TokenCount,
    pub tokens_out: TokenCount,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure of a chat completion call, transport-agnostic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LlmError {
    /// The provider rejected the call due to rate limiting.
    #[error("rate limited by provider")]
    RateLimited {
        /// Suggested minimum delay before retrying, if the provider sent one.
        retry_after: Option<Duration>,
    },

    /// The provider returned a non-success status.
    #[error("provider API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response (connection, TLS, timeout).
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The completion stopped before the model finished
    /// (e.g. the token budget ran out).
    #[error("response incomplete: {reason}")]
    Incomplete { reason: String },

    /// The provider answered with no content at all.
    #[error("model returned empty content")]
    EmptyResponse,
}

impl LlmError {
    /// Whether and how this failure may be retried.
    ///
    /// Rate limits and transport faults are retryable (with the provider's
    /// suggested back-off when present); an incomplete response is retryable
    /// because the caller can raise the token budget; API rejections and
    /// empty content are not.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::RateLimited { retry_after } => RetryPolicy::Retryable {
                after: *retry_after,
            },
            Self::Transport { .. } | Self::Incomplete { .. } => {
                RetryPolicy::Retryable { after: None }
            }
            Self::Api { .. } | Self::EmptyResponse => RetryPolicy::NonRetryable,
        }
    }
}

// ---------------------------------------------------------------------------
// Provider port
// ---------------------------------------------------------------------------

/// The chat completion port.
///
/// Implementations must be safe for concurrent use behind an [`std::sync::Arc`]:
/// one provider instance is shared by every agent of a compiled pipeline.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name used in failure-context tags
    /// (e.g. `"OpenAiProvider"`).
    fn name(&self) -> &str;

    /// Performs one chat completion call.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError>;
}

//! SummaWorks LLM provider infrastructure adapter.
//!
//! Implements the [`pipeline::LlmProvider`] port for OpenAI-compatible
//! chat-completions endpoints. Additional providers are added as new modules
//! in this crate without any changes to the `pipeline` crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** All HTTP transport, request formatting, response
//! parsing, and rate-limit header handling live here. The [`pipeline`] crate
//! sees only [`pipeline::LlmProvider`].
//!
//! The [`mock`] module provides an in-memory provider with scripted
//! responses; agent and end-to-end tests run against it instead of the
//! network.

pub mod mock;
pub mod openai;

pub use mock::MockProvider;
pub use openai::OpenAiProvider;

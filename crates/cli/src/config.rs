//! CLI configuration: `summaworks.toml` plus environment for the secret.
//!
//! Everything has a default so a missing file still produces a working
//! setup; only the API key is mandatory, and it never lives in the file —
//! `api_key_env` names the environment variable that holds it.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use pipeline::{LlmConfig, ResponseFormat};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Environment variable holding the provider API key.
    pub api_key_env: String,
    /// Override for OpenAI-compatible endpoints; `None` means the official API.
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
    pub max_tokens: u32,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_owned(),
            base_url: None,
            model: "gpt-4o-mini".to_owned(),
            temperature: 0.3,
            top_p: 1.0,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            max_tokens: 800,
        }
    }
}

impl CliConfig {
    /// Loads the configuration from `path`; a missing file yields the
    /// defaults, a malformed file is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// The base LLM configuration handed to every agent. Tools switch the
    /// response format per call; text is the neutral starting point.
    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            model: self.model.clone(),
            temperature: self.temperature,
            top_p: self.top_p,
            presence_penalty: self.presence_penalty,
            frequency_penalty: self.frequency_penalty,
            max_tokens: self.max_tokens,
            response_format: ResponseFormat::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_file_fills_in_defaults() {
        let config: CliConfig = toml::from_str(r#"model = "gpt-4o""#).unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.max_tokens, 800);
        assert!(config.base_url.is_none());
    }

    #[test]
    fn full_file_parses() {
        let config: CliConfig = toml::from_str(
            r#"
            api_key_env = "MY_KEY"
            base_url = "http://localhost:8080/v1"
            model = "local-model"
            temperature = 0.7
            top_p = 0.9
            presence_penalty = 0.1
            frequency_penalty = 0.2
            max_tokens = 1200
            "#,
        )
        .unwrap();
        assert_eq!(config.api_key_env, "MY_KEY");
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080/v1"));
        assert_eq!(config.max_tokens, 1200);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<CliConfig>(r#"api_key = "inline-secret""#).is_err());
    }

    #[test]
    fn llm_config_starts_in_text_mode() {
        let config = CliConfig::default().llm_config();
        assert_eq!(config.response_format, ResponseFormat::Text);
        assert_eq!(config.model, "gpt-4o-mini");
    }
}

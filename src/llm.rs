use async_trait::async_trait;
use rig::client::Nothing;
use rig::completion::Prompt;
use rig::prelude::CompletionClient;
use rig::providers::ollama;

use crate::init::AiConfig;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM client setup failed: {0}")]
    Client(String),
    #[error("LLM request failed: {0}")]
    Request(String),
    #[error("LLM returned an empty response")]
    EmptyResponse,
    #[error("Could not parse LLM response: {0}")]
    Parse(String),
}

/// One-shot completion seam between the agents and the model provider.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, preamble: &str, prompt: &str) -> Result<String, LlmError>;

    fn model_name(&self) -> &str;
}

// ============================================================================
// Ollama via rig
// ============================================================================

pub struct OllamaLlm {
    client: ollama::Client,
    model: String,
    temperature: f64,
}

impl OllamaLlm {
    pub fn new(config: &AiConfig) -> Result<Self, LlmError> {
        let client = ollama::Client::builder()
            .api_key(Nothing)
            .base_url(&config.url)
            .build()
            .map_err(|e| LlmError::Client(e.to_string()))?;

        Ok(Self {
            client,
            model: config.chat_model.clone(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl LlmClient for OllamaLlm {
    async fn complete(&self, preamble: &str, prompt: &str) -> Result<String, LlmError> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(preamble)
            .temperature(self.temperature)
            .build();

        let response = agent
            .prompt(prompt)
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        if response.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Reply helpers
// ============================================================================

/// Unwraps a reply wrapped in a markdown code fence (```json or bare ```).
pub fn extract_json_block(reply: &str) -> &str {
    let trimmed = reply.trim();
    if let Some((_, rest)) = trimmed.split_once("```json") {
        return rest.split("```").next().unwrap_or(rest).trim();
    }
    if let Some((_, rest)) = trimmed.split_once("```") {
        return rest.split("```").next().unwrap_or(rest).trim();
    }
    trimmed
}

// ============================================================================
// Test doubles
// ============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_fence() {
        let reply = "Sure!\n```json\n{\"a\": 1}\n```\nbye";
        assert_eq!(extract_json_block(reply), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_bare_fence() {
        assert_eq!(extract_json_block("```\n[1,2]\n```"), "[1,2]");
    }

    #[test]
    fn test_extract_plain_json() {
        assert_eq!(extract_json_block("  {\"x\":true} "), "{\"x\":true}");
    }
}

//! Ollama client implementation
//!
//! Asks a local Ollama model for one JSON-formatted planning decision per call.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::{AgentError, Config, Message, Result};
use crate::llm::traits::{LlmClient, LlmResponse};

/// Ollama API client
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

/// Ollama chat request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    /// Constrains the reply to valid JSON
    format: &'static str,
    options: OllamaOptions,
    stream: bool,
}

/// Ollama generation options
#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Ollama chat response (non-streaming)
#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Message,
}

impl OllamaClient {
    /// Create a new Ollama client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.planner.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.ollama_url(),
            model: config.planner.model.clone(),
        })
    }

    /// Create a client with custom base URL and model
    pub fn with_base_url(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(120)).build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    /// Base URL of the Ollama server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Parse the model's message content into a decision
    fn parse_decision(content: &str) -> Result<LlmResponse> {
        // Some models wrap JSON in a fenced block despite `format: json`
        let trimmed = content
            .trim()
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim();

        serde_json::from_str(trimmed).map_err(|e| {
            AgentError::llm(format!("Model returned an unparseable decision: {}", e))
        })
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(&self, prompt: &str, system_prompt: &str) -> Result<LlmResponse> {
        let messages = [Message::system(system_prompt), Message::user(prompt)];

        let request = ChatRequest {
            model: &self.model,
            messages: &messages,
            format: "json",
            // Low temperature for tool selection
            options: OllamaOptions { temperature: 0.1 },
            stream: false,
        };

        tracing::debug!(model = %self.model, "Sending planning request to Ollama");

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    AgentError::llm(format!(
                        "Cannot connect to Ollama at {}. Is it running?",
                        self.base_url
                    ))
                } else {
                    AgentError::from(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 404 && error_text.contains("not found") {
                return Err(AgentError::llm(format!(
                    "Model '{}' not available in Ollama. Run: ollama pull {}",
                    self.model, self.model
                )));
            }

            return Err(AgentError::llm(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::llm(format!("Failed to parse response: {}", e)))?;

        tracing::debug!(content = %chat_response.message.content, "Ollama replied");

        Self::parse_decision(&chat_response.message.content)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OllamaClient::with_base_url("http://localhost:11434", "qwen3:8b").unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
        assert_eq!(client.name(), "ollama");
    }

    #[test]
    fn test_parse_plain_and_fenced_json() {
        let plain = OllamaClient::parse_decision(r#"{"action": "answer", "final_answer": "hi"}"#)
            .unwrap();
        assert_eq!(plain.action, "answer");

        let fenced = OllamaClient::parse_decision(
            "```json\n{\"action\": \"use_tool\", \"tool_name\": \"math\"}\n```",
        )
        .unwrap();
        assert_eq!(fenced.tool_name.as_deref(), Some("math"));

        assert!(OllamaClient::parse_decision("I think you should use math").is_err());
    }

    #[test]
    fn test_request_shape() {
        let messages = [Message::system("sys"), Message::user("goal")];
        let request = ChatRequest {
            model: "m",
            messages: &messages,
            format: "json",
            options: OllamaOptions { temperature: 0.1 },
            stream: false,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["format"], "json");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["stream"], false);
    }
}

//! LLM client trait for abstracting different backends
//!
//! The LLM-backed planner talks to a model through this trait only, so
//! Ollama, OpenAI or a test double can be swapped without touching it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{AgentError, Decision, JsonMap, Result};

/// Decision as returned on the wire by a model.
///
/// `action` is free text; [`LlmResponse::into_decision`] is where unknown
/// tags are turned into planning errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    /// `answer` or `use_tool`
    pub action: String,
    /// Tool to invoke when `action == "use_tool"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    /// Tool input when `action == "use_tool"`, checked in
    /// [`LlmResponse::into_decision`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_input: Option<Value>,
    /// Answer text when `action == "answer"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_answer: Option<String>,
    /// Model's stated reasoning, for logs only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl LlmResponse {
    /// Create an answer response
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            action: "answer".to_string(),
            final_answer: Some(text.into()),
            ..Default::default()
        }
    }

    /// Create a tool-use response
    pub fn use_tool(tool_name: impl Into<String>, tool_input: JsonMap) -> Self {
        Self {
            action: "use_tool".to_string(),
            tool_name: Some(tool_name.into()),
            tool_input: Some(Value::Object(tool_input)),
            ..Default::default()
        }
    }

    /// Validate the tag and convert into a loop decision
    pub fn into_decision(self) -> Result<Decision> {
        match self.action.trim() {
            "answer" => Ok(Decision::answer(
                self.final_answer
                    .unwrap_or_else(|| "Task completed".to_string()),
            )),
            "use_tool" => {
                let tool_name = self
                    .tool_name
                    .filter(|name| !name.trim().is_empty())
                    .ok_or_else(|| AgentError::planning("use_tool decision without tool_name"))?;
                match self.tool_input {
                    None | Some(Value::Null) => {
                        Ok(Decision::use_tool(tool_name, JsonMap::new()))
                    }
                    Some(Value::Object(input)) => Ok(Decision::use_tool(tool_name, input)),
                    Some(raw) => Ok(Decision::invalid_tool_call(
                        tool_name,
                        raw,
                        "tool_input must be an object",
                    )),
                }
            }
            other => Err(AgentError::UnknownAction(other.to_string())),
        }
    }
}

/// Trait for LLM backends
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Produce one decision for a prompt
    async fn generate(&self, prompt: &str, system_prompt: &str) -> Result<LlmResponse>;

    /// Get the backend name
    fn name(&self) -> &str;
}

//! Shared types used across agent-core modules
//!
//! Contains tool definitions, planner decisions, run status and chat messages.

use serde::{Deserialize, Serialize};

/// JSON object used for tool inputs and outputs
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// A message sent to a chat-style LLM backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender (user, assistant, system)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl Message {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }
}

/// What a planner hands to the loop about one tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name
    pub name: String,
    /// Description of what the tool does
    pub description: String,
    /// JSON Schema for the input object
    pub input_schema: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new tool definition
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Next action chosen by a planner
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Stop and return this text
    Answer { final_text: String },
    /// Invoke a tool with the given input
    UseTool { tool_name: String, tool_input: JsonMap },
    /// Tool call whose input was unusable; recorded as a failed step
    InvalidToolCall {
        tool_name: String,
        raw_input: serde_json::Value,
        reason: String,
    },
}

impl Decision {
    /// Create an answer decision
    pub fn answer(text: impl Into<String>) -> Self {
        Self::Answer {
            final_text: text.into(),
        }
    }

    /// Create a tool decision
    pub fn use_tool(tool_name: impl Into<String>, tool_input: JsonMap) -> Self {
        Self::UseTool {
            tool_name: tool_name.into(),
            tool_input,
        }
    }

    /// Create a tool decision that fails at step level
    pub fn invalid_tool_call(
        tool_name: impl Into<String>,
        raw_input: serde_json::Value,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidToolCall {
            tool_name: tool_name.into(),
            raw_input,
            reason: reason.into(),
        }
    }
}

/// Lifecycle status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Loop still iterating
    Running,
    /// Loop finished with an answer or a summary
    Completed,
    /// Loop aborted on a planning or internal failure
    Error,
}

impl RunStatus {
    /// Whether no further transitions are allowed
    pub fn is_terminal(self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Running => write!(f, "running"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Error => write!(f, "error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&RunStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
        assert_eq!(RunStatus::Error.to_string(), "error");
    }

    #[test]
    fn test_status_terminal() {
        assert!(!RunStatus::Running.is_terminal());
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Error.is_terminal());
    }
}

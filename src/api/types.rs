//! Request and response bodies for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::agent::AgentResult;
use crate::core::ToolDefinition;

/// Tools a run may use when the request does not name any.
pub const DEFAULT_TOOLS: [&str; 3] = ["web_search", "math", "governance_note"];

/// POST /run-task body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunTaskRequest {
    /// Missing and blank goals are rejected by the handler with 422.
    #[serde(default)]
    pub goal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<String>>,
}

impl RunTaskRequest {
    /// Requested tool names, falling back to [`DEFAULT_TOOLS`].
    pub fn tool_names(&self) -> Vec<String> {
        match self.tools {
            Some(ref tools) => tools.clone(),
            None => DEFAULT_TOOLS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// POST /run-task response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunTaskResponse {
    #[serde(flatten)]
    pub result: AgentResult,
    /// Requested names with no registered tool
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknown_tools: Vec<String>,
}

/// GET /governance-notes/{proposal_id} response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesResponse {
    pub proposal_id: String,
    pub notes: Vec<String>,
}

/// GET /tools response item
pub type ToolsResponse = Vec<ToolDefinition>;

/// GET /health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            service: "agent-core".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Error body for rejected requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

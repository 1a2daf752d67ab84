//! Error types for agent-core
//!
//! Two families: `AgentError` for failures that end a run (or happen outside
//! one), and `ToolError` for failures that are recorded on a single step.

use thiserror::Error;

/// Main error type for agent-core operations
#[derive(Error, Debug)]
pub enum AgentError {
    /// Planner broke the decision protocol
    #[error("Planning error: {0}")]
    Planning(String),

    /// Planner returned a decision tag the loop does not understand
    #[error("Unknown action type: {0}")]
    UnknownAction(String),

    /// LLM backend connection or API errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Tool registration rejected
    #[error("Registry error: {0}")]
    Registry(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for agent-core operations
pub type Result<T> = std::result::Result<T, AgentError>;

impl AgentError {
    /// Create a planning error
    pub fn planning(msg: impl Into<String>) -> Self {
        Self::Planning(msg.into())
    }

    /// Create an LLM error
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Create a registry error
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Failure of a single tool invocation.
///
/// The loop never propagates these; their `Display` text becomes the
/// step's `error` field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// Input did not match the tool's declared shape
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Tool is not part of the run's tool set
    #[error("Tool '{0}' not found in available tools")]
    NotFound(String),

    /// Tool ran but could not produce a result
    #[error("{0}")]
    Execution(String),
}

impl ToolError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an execution error
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }
}

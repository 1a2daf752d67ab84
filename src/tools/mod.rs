//! Tools module - capabilities the agent loop can invoke
//!
//! Contains the `Tool` contract, the registry, and the bundled arithmetic,
//! search and governance-note tools.

pub mod governance;
pub mod math;
pub mod registry;
pub mod search;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::core::{JsonMap, ToolDefinition, ToolError};

pub use governance::{GovernanceNoteTool, NoteStore};
pub use math::MathTool;
pub use registry::{ToolRegistry, ToolSet};
pub use search::WebSearchTool;

/// A named capability the loop can dispatch to.
///
/// Tools may keep their own state (see [`NoteStore`]) but never see the
/// loop's execution state.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique snake_case identifier used by planners and the registry
    fn name(&self) -> &str;

    /// Human-readable description for planner consumption
    fn description(&self) -> &str;

    /// JSON Schema of the expected input object
    fn input_schema(&self) -> serde_json::Value;

    /// Run the tool against a JSON input object
    async fn execute(&self, input: &JsonMap) -> Result<JsonMap, ToolError>;

    /// Bundle name, description and schema for planners
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.input_schema())
    }
}

/// Deserialize a tool's typed input from the raw JSON object
pub(crate) fn parse_input<T: DeserializeOwned>(input: &JsonMap) -> Result<T, ToolError> {
    serde_json::from_value(serde_json::Value::Object(input.clone()))
        .map_err(|e| ToolError::invalid_input(e.to_string()))
}

/// Serialize a tool's typed output into a JSON object
pub(crate) fn to_output<T: serde::Serialize>(output: &T) -> Result<JsonMap, ToolError> {
    match serde_json::to_value(output) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(ToolError::execution(format!(
            "Tool output is not an object: {}",
            other
        ))),
        Err(e) => Err(ToolError::execution(e.to_string())),
    }
}

/// Reject blank strings the way a `min_length = 1` field would
pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), ToolError> {
    if value.trim().is_empty() {
        return Err(ToolError::invalid_input(format!(
            "field `{}` must not be empty",
            field
        )));
    }
    Ok(())
}

//! Tool registry - name to implementation lookup
//!
//! Built once at startup, then shared read-only. Holds no execution logic;
//! dispatch belongs to the agent loop.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::{AgentError, Result, ToolDefinition};
use crate::tools::{GovernanceNoteTool, MathTool, NoteStore, Tool, WebSearchTool};

/// Snapshot of tools resolved for one run, ordered by name
pub type ToolSet = BTreeMap<String, Arc<dyn Tool>>;

/// Registry of available tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: ToolSet,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the bundled math, search and note tools
    pub fn with_defaults(notes: Arc<NoteStore>) -> Self {
        let mut registry = Self::new();
        let defaults: [Arc<dyn Tool>; 3] = [
            Arc::new(WebSearchTool::new()),
            Arc::new(MathTool::new()),
            Arc::new(GovernanceNoteTool::new(notes)),
        ];
        for tool in defaults {
            // Bundled tools always satisfy the contract
            if let Err(e) = registry.register(tool) {
                tracing::error!("Failed to register bundled tool: {}", e);
            }
        }
        registry
    }

    /// Register a tool. A later registration under the same name wins.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        validate(tool.as_ref())?;

        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            tracing::warn!("Tool '{}' re-registered; replacing previous implementation", name);
        } else {
            tracing::debug!("Registered tool '{}'", name);
        }
        Ok(())
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Snapshot of every registered tool
    pub fn all(&self) -> ToolSet {
        self.tools.clone()
    }

    /// Snapshot containing only the named tools; unknown names are skipped
    pub fn subset<S: AsRef<str>>(&self, names: &[S]) -> ToolSet {
        names
            .iter()
            .filter_map(|name| {
                self.tools
                    .get_key_value(name.as_ref())
                    .map(|(k, v)| (k.clone(), Arc::clone(v)))
            })
            .collect()
    }

    /// Names from `names` that are not registered, in input order
    pub fn missing<S: AsRef<str>>(&self, names: &[S]) -> Vec<String> {
        let mut missing: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref();
            if !self.tools.contains_key(name) && !missing.iter().any(|m| m == name) {
                missing.push(name.to_string());
            }
        }
        missing
    }

    /// Definitions of every registered tool
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    /// Names of every registered tool, sorted
    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

fn validate(tool: &dyn Tool) -> Result<()> {
    let name = tool.name();
    let mut chars = name.chars();
    let well_formed = matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if !well_formed {
        return Err(AgentError::registry(format!(
            "tool name '{}' must be snake_case and start with a letter",
            name
        )));
    }

    if !tool.input_schema().is_object() {
        return Err(AgentError::registry(format!(
            "tool '{}' must declare an object input schema",
            name
        )));
    }
    Ok(())
}

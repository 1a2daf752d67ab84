//! Final-output summarization
//!
//! Turns the last step of a run into a user-facing sentence. Formatting is
//! looked up by tool name, so new tools add an entry instead of touching the
//! loop.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::agent::state::ExecutionStep;
use crate::core::JsonMap;

/// Formats a successful tool output
pub type SummaryFn = Arc<dyn Fn(&JsonMap) -> String + Send + Sync>;

/// Tool-name keyed table of output formatters
#[derive(Clone)]
pub struct Summarizer {
    formatters: HashMap<String, SummaryFn>,
}

impl Summarizer {
    /// Create a summarizer with no tool-specific entries
    pub fn empty() -> Self {
        Self {
            formatters: HashMap::new(),
        }
    }

    /// Register or replace the formatter for a tool
    pub fn register<F>(&mut self, tool_name: impl Into<String>, formatter: F)
    where
        F: Fn(&JsonMap) -> String + Send + Sync + 'static,
    {
        self.formatters.insert(tool_name.into(), Arc::new(formatter));
    }

    /// Builder-style [`Summarizer::register`]
    pub fn with<F>(mut self, tool_name: impl Into<String>, formatter: F) -> Self
    where
        F: Fn(&JsonMap) -> String + Send + Sync + 'static,
    {
        self.register(tool_name, formatter);
        self
    }

    /// Summarize the latest step of a run
    pub fn summarize(&self, step: Option<&ExecutionStep>) -> String {
        let Some(step) = step else {
            return "No steps executed".to_string();
        };

        if let Some(ref error) = step.error {
            return format!("Task failed: {}", error);
        }

        match step.output {
            Some(ref output) => match self.formatters.get(&step.tool_name) {
                Some(formatter) => formatter(output),
                None => format!(
                    "Tool {} completed: {}",
                    step.tool_name,
                    Value::Object(output.clone())
                ),
            },
            None => "Task completed successfully".to_string(),
        }
    }
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::empty()
            .with("math", |output| {
                format!(
                    "Calculation result: {} (from {})",
                    display(output.get("result")),
                    display(output.get("expression"))
                )
            })
            .with("web_search", |output| {
                let count = output
                    .get("results")
                    .and_then(Value::as_array)
                    .map(Vec::len)
                    .unwrap_or(0);
                format!(
                    "Found {} search results for '{}'",
                    count,
                    display(output.get("query"))
                )
            })
            .with("governance_note", |output| {
                format!(
                    "Added note to proposal {} (total notes: {})",
                    display(output.get("proposal_id")),
                    output
                        .get("total_notes")
                        .map(|v| display(Some(v)))
                        .unwrap_or_else(|| "0".to_string())
                )
            })
    }
}

impl std::fmt::Debug for Summarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tools: Vec<&String> = self.formatters.keys().collect();
        tools.sort();
        f.debug_struct("Summarizer").field("tools", &tools).finish()
    }
}

/// Render a JSON value without quoting strings
fn display(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

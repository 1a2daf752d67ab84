//! Planner capability
//!
//! A planner looks at the goal, the tools on offer and what has happened so
//! far, and returns the loop's next [`Decision`]. The loop depends on this
//! trait only.

use std::sync::Arc;

use async_trait::async_trait;

use crate::agent::state::ExecutionStep;
use crate::core::{Decision, Result, ToolDefinition};
use crate::llm::LlmClient;

/// Chooses the next action of a run
#[async_trait]
pub trait Planner: Send + Sync {
    /// Decide whether to answer now or call a tool
    async fn decide(
        &self,
        goal: &str,
        context: Option<&str>,
        tools: &[ToolDefinition],
        history: &[ExecutionStep],
    ) -> Result<Decision>;

    /// Short identifier for logs
    fn name(&self) -> &str;
}

/// Planner that delegates the decision to a language model
pub struct LlmPlanner {
    llm: Arc<dyn LlmClient>,
}

impl LlmPlanner {
    /// Create a planner over an LLM client
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// System prompt describing the tools and the response contract
    pub fn build_system_prompt(tools: &[ToolDefinition]) -> String {
        let tool_lines: Vec<String> = tools
            .iter()
            .map(|tool| {
                format!(
                    "- {}: {}\n  Input schema: {}",
                    tool.name, tool.description, tool.input_schema
                )
            })
            .collect();

        let tool_section = if tool_lines.is_empty() {
            "(no tools available)".to_string()
        } else {
            tool_lines.join("\n")
        };

        format!(
            r#"You are an AI agent that can use tools to accomplish tasks.

## Available tools
{}

## Response format
Reply with a single JSON object and nothing else.
- To answer directly: {{"action": "answer", "final_answer": "<text>", "reasoning": "<why>"}}
- To use a tool: {{"action": "use_tool", "tool_name": "<name>", "tool_input": {{...}}, "reasoning": "<why>"}}

## Rules
- Only use tools from the list above, with input matching their schema.
- Read the execution history before choosing; do not repeat a step that already failed the same way.
- Answer as soon as the goal is achieved."#,
            tool_section
        )
    }

    /// User prompt with goal, context and history
    pub fn build_planning_prompt(
        goal: &str,
        context: Option<&str>,
        history: &[ExecutionStep],
    ) -> String {
        let mut prompt = format!("Goal: {}", goal);

        if let Some(context) = context {
            prompt.push_str(&format!("\nContext: {}", context));
        }

        prompt.push_str(&format_history(history));
        prompt.push_str("\n\nWhat should be the next step?");
        prompt
    }
}

#[async_trait]
impl Planner for LlmPlanner {
    async fn decide(
        &self,
        goal: &str,
        context: Option<&str>,
        tools: &[ToolDefinition],
        history: &[ExecutionStep],
    ) -> Result<Decision> {
        let system_prompt = Self::build_system_prompt(tools);
        let prompt = Self::build_planning_prompt(goal, context, history);

        let response = self.llm.generate(&prompt, &system_prompt).await?;
        if let Some(ref reasoning) = response.reasoning {
            tracing::debug!(backend = self.llm.name(), %reasoning, "Planner reasoning");
        }
        response.into_decision()
    }

    fn name(&self) -> &str {
        "llm"
    }
}

/// Format executed steps for inclusion in a prompt
pub fn format_history(history: &[ExecutionStep]) -> String {
    if history.is_empty() {
        return String::new();
    }

    let mut output = String::from("\n\nExecution history:");
    for step in history {
        let input = serde_json::Value::Object(step.input.clone());
        match (&step.error, &step.output) {
            (Some(error), _) => output.push_str(&format!(
                "\n  Step {}: Used {} with input {} -> ERROR: {}",
                step.index, step.tool_name, input, error
            )),
            (None, Some(result)) => output.push_str(&format!(
                "\n  Step {}: Used {} with input {} -> {}",
                step.index,
                step.tool_name,
                input,
                serde_json::Value::Object(result.clone())
            )),
            (None, None) => output.push_str(&format!(
                "\n  Step {}: Used {} with input {} -> N/A",
                step.index, step.tool_name, input
            )),
        }
    }
    output
}

//! Agent orchestrator
//!
//! Runs the plan → act → observe loop for a single goal. Each iteration asks
//! the planner for a decision, executes at most one tool, records the step and
//! checks whether the goal has been reached. Runs are sequential internally;
//! the `Agent` itself is shared immutably so many runs can proceed at once.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::agent::planner::{LlmPlanner, Planner};
use crate::agent::rules::RuleBasedPlanner;
use crate::agent::state::{AgentResult, AgentState};
use crate::agent::summary::Summarizer;
use crate::core::{Config, Decision, JsonMap, PlannerKind, Result, ToolDefinition, ToolError};
use crate::llm::OllamaClient;
use crate::tools::{ToolRegistry, ToolSet};

/// Default step ceiling
pub const DEFAULT_MAX_STEPS: usize = 10;

/// Main agent that coordinates the planner and tools
#[derive(Clone)]
pub struct Agent {
    /// Tool registry shared with the API and REPL
    registry: Arc<ToolRegistry>,
    /// Decision strategy
    planner: Arc<dyn Planner>,
    /// Final-output formatting
    summarizer: Summarizer,
    /// Iteration ceiling per run
    max_steps: usize,
}

impl Agent {
    /// Create an agent with the default ceiling and summarizer
    pub fn new(registry: Arc<ToolRegistry>, planner: Arc<dyn Planner>) -> Self {
        Self {
            registry,
            planner,
            summarizer: Summarizer::default(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Build an agent with the planner selected in configuration
    pub fn from_config(config: &Config, registry: Arc<ToolRegistry>) -> Result<Self> {
        let planner: Arc<dyn Planner> = match config.planner.provider {
            PlannerKind::RuleBased => Arc::new(RuleBasedPlanner::new()),
            PlannerKind::Ollama => {
                let client = OllamaClient::from_config(config)?;
                Arc::new(LlmPlanner::new(Arc::new(client)))
            }
        };

        tracing::debug!(
            planner = planner.name(),
            max_steps = config.agent.max_steps,
            "Agent configured"
        );

        Ok(Self::new(registry, planner).with_max_steps(config.agent.max_steps))
    }

    /// Set the step ceiling (at least one)
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Replace the summarizer
    pub fn with_summarizer(mut self, summarizer: Summarizer) -> Self {
        self.summarizer = summarizer;
        self
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn planner_name(&self) -> &str {
        self.planner.name()
    }

    /// Run the loop for one goal
    ///
    /// `tool_names` of `None` or an empty slice exposes every registered
    /// tool. Never fails: planning errors, LLM failures and panics all end up
    /// as an `error` status with the trace gathered so far.
    pub async fn run(
        &self,
        goal: &str,
        context: Option<&str>,
        tool_names: Option<&[String]>,
    ) -> AgentResult {
        let mut state = AgentState::new(goal, context.map(str::to_string), self.max_steps);
        let tools = self.resolve_tools(tool_names);

        tracing::info!(
            goal,
            tools = tools.len(),
            max_steps = self.max_steps,
            planner = self.planner.name(),
            "Starting run"
        );

        let outcome = AssertUnwindSafe(self.drive(&mut state, &tools))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Run failed");
                state.fail(format!("Error: {}", e));
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(%message, "Planner panicked");
                state.fail(format!("Error: {}", message));
            }
        }

        let result = state.into_result();
        tracing::info!(status = %result.status, steps = result.trace.len(), "Run finished");
        result
    }

    /// Map requested names onto the registry
    fn resolve_tools(&self, tool_names: Option<&[String]>) -> ToolSet {
        match tool_names {
            Some(names) if !names.is_empty() => {
                let missing = self.registry.missing(names);
                if !missing.is_empty() {
                    tracing::warn!(?missing, "Requested tools are not registered");
                }
                self.registry.subset(names)
            }
            _ => self.registry.all(),
        }
    }

    /// Loop body; errors propagate to `run`
    async fn drive(&self, state: &mut AgentState, tools: &ToolSet) -> Result<()> {
        let definitions: Vec<ToolDefinition> = tools.values().map(|t| t.definition()).collect();

        while state.should_continue() {
            tracing::debug!(turn = state.turn() + 1, max = state.max_steps(), "Planning");

            let decision = self
                .planner
                .decide(state.goal(), state.context(), &definitions, state.steps())
                .await?;

            let (tool_name, tool_input, rejection) = match decision {
                Decision::Answer { final_text } => {
                    tracing::debug!("Planner answered directly");
                    state.complete(final_text);
                    return Ok(());
                }
                Decision::UseTool {
                    tool_name,
                    tool_input,
                } => (tool_name, tool_input, None),
                Decision::InvalidToolCall {
                    tool_name,
                    raw_input,
                    reason,
                } => {
                    let mut input = JsonMap::new();
                    input.insert("tool_input".to_string(), raw_input);
                    (tool_name, input, Some(ToolError::invalid_input(reason)))
                }
            };

            let step = state.append_step(tool_name, tool_input);
            tracing::debug!(step = step.index, tool = %step.tool_name, "Executing tool");

            let outcome = match rejection {
                Some(error) => Err(error.to_string()),
                None => Self::execute_tool(tools, &step.tool_name, &step.input).await,
            };
            if let Err(ref error) = outcome {
                tracing::debug!(step = step.index, tool = %step.tool_name, %error, "Tool step failed");
            }
            step.record(outcome);

            if Self::is_goal_achieved(state) {
                let summary = self.summarizer.summarize(state.latest_step());
                state.complete(summary);
                return Ok(());
            }

            state.next_turn();
        }

        tracing::warn!(max_steps = state.max_steps(), "Step ceiling reached");
        let summary = self.summarizer.summarize(state.latest_step());
        state.complete(summary);
        Ok(())
    }

    /// Execute one tool, turning every failure into step error text
    async fn execute_tool(
        tools: &ToolSet,
        name: &str,
        input: &JsonMap,
    ) -> std::result::Result<JsonMap, String> {
        let Some(tool) = tools.get(name) else {
            return Err(ToolError::NotFound(name.to_string()).to_string());
        };

        match AssertUnwindSafe(tool.execute(input)).catch_unwind().await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(e.to_string()),
            Err(panic) => Err(format!(
                "Tool '{}' panicked: {}",
                name,
                panic_message(panic.as_ref())
            )),
        }
    }

    /// A tool step without an error is taken as success
    fn is_goal_achieved(state: &AgentState) -> bool {
        state.latest_step().is_some_and(|step| step.succeeded())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

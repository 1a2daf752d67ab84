//! Execution state of one agent run
//!
//! Tracks the goal, the append-only step trace and the single terminal
//! transition of the loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{JsonMap, RunStatus};

/// One attempted tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStep {
    /// 1-based position in the trace
    pub index: usize,
    /// Tool the planner asked for
    pub tool_name: String,
    /// Input handed to the tool
    pub input: JsonMap,
    /// Tool output on success
    pub output: Option<JsonMap>,
    /// Failure text on error
    pub error: Option<String>,
    /// When the step was created
    pub timestamp: DateTime<Utc>,
}

impl ExecutionStep {
    /// Record the step's outcome. Only the first call has any effect.
    pub fn record(&mut self, outcome: Result<JsonMap, String>) {
        if self.is_complete() {
            tracing::warn!("Step {} already completed; ignoring new outcome", self.index);
            return;
        }
        match outcome {
            Ok(output) => self.output = Some(output),
            Err(error) => self.error = Some(error),
        }
    }

    /// Whether an output or an error has been recorded
    pub fn is_complete(&self) -> bool {
        self.output.is_some() || self.error.is_some()
    }

    /// Whether the step ended without an error
    pub fn succeeded(&self) -> bool {
        self.output.is_some() && self.error.is_none()
    }
}

/// State of the agent loop for a single run
#[derive(Debug, Clone)]
pub struct AgentState {
    goal: String,
    context: Option<String>,
    steps: Vec<ExecutionStep>,
    status: RunStatus,
    final_output: Option<String>,
    /// Iterations consumed so far
    turn: usize,
    /// Iteration ceiling
    max_steps: usize,
}

impl AgentState {
    /// Create a running state for a goal
    pub fn new(goal: impl Into<String>, context: Option<String>, max_steps: usize) -> Self {
        Self {
            goal: goal.into(),
            context,
            steps: Vec::new(),
            status: RunStatus::Running,
            final_output: None,
            turn: 0,
            max_steps,
        }
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn steps(&self) -> &[ExecutionStep] {
        &self.steps
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn final_output(&self) -> Option<&str> {
        self.final_output.as_deref()
    }

    pub fn turn(&self) -> usize {
        self.turn
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Check if the loop should run another iteration
    pub fn should_continue(&self) -> bool {
        self.status == RunStatus::Running && self.turn < self.max_steps
    }

    /// Increment the turn counter
    pub fn next_turn(&mut self) {
        self.turn += 1;
    }

    /// Append a new, not yet completed step and hand it back for recording
    pub fn append_step(&mut self, tool_name: impl Into<String>, input: JsonMap) -> &mut ExecutionStep {
        let now = Utc::now();
        // Wall clock may step backwards; keep the trace non-decreasing
        let timestamp = match self.steps.last() {
            Some(prev) if prev.timestamp > now => prev.timestamp,
            _ => now,
        };

        self.steps.push(ExecutionStep {
            index: self.steps.len() + 1,
            tool_name: tool_name.into(),
            input,
            output: None,
            error: None,
            timestamp,
        });
        let last = self.steps.len() - 1;
        &mut self.steps[last]
    }

    /// Most recent step, if any
    pub fn latest_step(&self) -> Option<&ExecutionStep> {
        self.steps.last()
    }

    /// Finish successfully
    pub fn complete(&mut self, output: impl Into<String>) {
        self.finish(RunStatus::Completed, output.into());
    }

    /// Finish with an error
    pub fn fail(&mut self, output: impl Into<String>) {
        self.finish(RunStatus::Error, output.into());
    }

    fn finish(&mut self, status: RunStatus, output: String) {
        if self.status.is_terminal() {
            tracing::warn!(
                "Run already finished as {}; ignoring transition to {}",
                self.status,
                status
            );
            return;
        }
        self.status = status;
        self.final_output = Some(output);
    }

    /// Consume the state into the caller-facing result
    pub fn into_result(self) -> AgentResult {
        let (status, output) = match (self.status, self.final_output) {
            (RunStatus::Running, _) => (
                RunStatus::Error,
                "Error: run ended without reaching a terminal status".to_string(),
            ),
            (status, output) => (status, output.unwrap_or_else(|| "Task completed".to_string())),
        };

        AgentResult {
            status,
            output,
            trace: self.steps,
        }
    }
}

/// Final result of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    /// `completed` or `error`
    pub status: RunStatus,
    /// User-facing summary
    pub output: String,
    /// Every step, in order
    pub trace: Vec<ExecutionStep>,
}

impl AgentResult {
    /// Whether the run completed
    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(key: &str, value: &str) -> JsonMap {
        let mut map = JsonMap::new();
        map.insert(key.to_string(), json!(value));
        map
    }

    #[test]
    fn test_state_new() {
        let state = AgentState::new("Calculate 2+2", None, 10);
        assert_eq!(state.goal(), "Calculate 2+2");
        assert_eq!(state.status(), RunStatus::Running);
        assert!(state.steps().is_empty());
        assert!(state.final_output().is_none());
        assert!(state.latest_step().is_none());
    }

    #[test]
    fn test_should_continue() {
        let mut state = AgentState::new("goal", None, 2);
        assert!(state.should_continue());

        state.next_turn();
        assert!(state.should_continue());

        state.next_turn();
        assert!(!state.should_continue()); // Reached the ceiling
    }

    #[test]
    fn test_steps_are_indexed_and_ordered() {
        let mut state = AgentState::new("goal", None, 10);
        state
            .append_step("math", input("expression", "1+1"))
            .record(Ok(JsonMap::new()));
        state
            .append_step("web_search", input("query", "x"))
            .record(Err("boom".to_string()));

        let indices: Vec<usize> = state.steps().iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert!(state.steps()[0].timestamp <= state.steps()[1].timestamp);
        assert_eq!(state.latest_step().unwrap().tool_name, "web_search");
    }

    #[test]
    fn test_step_records_once() {
        let mut state = AgentState::new("goal", None, 10);
        let step = state.append_step("math", JsonMap::new());
        assert!(!step.is_complete());

        step.record(Err("first".to_string()));
        step.record(Ok(JsonMap::new()));

        let step = state.latest_step().unwrap();
        assert_eq!(step.error.as_deref(), Some("first"));
        assert!(step.output.is_none());
        assert!(!step.succeeded());
    }

    #[test]
    fn test_terminal_transition_happens_once() {
        let mut state = AgentState::new("goal", None, 10);
        state.complete("done");
        state.fail("late failure");

        assert_eq!(state.status(), RunStatus::Completed);
        assert_eq!(state.final_output(), Some("done"));
        assert!(!state.should_continue());
    }

    #[test]
    fn test_into_result_never_running() {
        let state = AgentState::new("goal", None, 10);
        let result = state.into_result();
        assert_eq!(result.status, RunStatus::Error);
    }

    #[test]
    fn test_step_serialization_shape() {
        let mut state = AgentState::new("goal", None, 10);
        state
            .append_step("math", input("expression", "2 + 2"))
            .record(Ok(input("result", "4")));

        let value = serde_json::to_value(&state.steps()[0]).unwrap();
        assert_eq!(value["index"], json!(1));
        assert_eq!(value["toolName"], json!("math"));
        assert_eq!(value["input"]["expression"], json!("2 + 2"));
        assert!(value["error"].is_null());
        assert!(value["timestamp"].is_string());
    }
}

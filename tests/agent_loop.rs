//! Agent loop tests
//!
//! End-to-end runs through the loop with the bundled tools, the rule-based
//! planner and a few scripted planners for the failure paths.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use agent_core::agent::{
    Agent, AgentResult, ExecutionStep, LlmPlanner, Planner, RuleBasedPlanner, Summarizer,
};
use agent_core::core::{
    AgentError, Decision, JsonMap, Result, RunStatus, ToolDefinition, ToolError,
};
use agent_core::llm::{LlmClient, LlmResponse};
use agent_core::tools::{NoteStore, Tool, ToolRegistry};
use async_trait::async_trait;
use serde_json::{json, Value};

/// One scripted planner move
#[derive(Clone)]
enum Move {
    Decide(Decision),
    Fail(String),
    Panic,
}

/// Plays its moves in order, repeating the last one once exhausted
struct ScriptedPlanner {
    moves: Vec<Move>,
    calls: AtomicUsize,
}

impl ScriptedPlanner {
    fn new(moves: Vec<Move>) -> Arc<Self> {
        Arc::new(Self {
            moves,
            calls: AtomicUsize::new(0),
        })
    }

    fn repeating(decision: Decision) -> Arc<Self> {
        Self::new(vec![Move::Decide(decision)])
    }
}

#[async_trait]
impl Planner for ScriptedPlanner {
    async fn decide(
        &self,
        _goal: &str,
        _context: Option<&str>,
        _tools: &[ToolDefinition],
        _history: &[ExecutionStep],
    ) -> Result<Decision> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let index = call.min(self.moves.len() - 1);
        match self.moves[index].clone() {
            Move::Decide(decision) => Ok(decision),
            Move::Fail(message) => Err(AgentError::planning(message)),
            Move::Panic => panic!("planner blew up"),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// LLM double that always answers with the same raw response
struct FixedLlm(LlmResponse);

#[async_trait]
impl LlmClient for FixedLlm {
    async fn generate(&self, _prompt: &str, _system_prompt: &str) -> Result<LlmResponse> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Tool that panics on every call
struct ExplodingTool;

#[async_trait]
impl Tool for ExplodingTool {
    fn name(&self) -> &str {
        "explode"
    }

    fn description(&self) -> &str {
        "Always panics"
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _input: &JsonMap) -> std::result::Result<JsonMap, ToolError> {
        panic!("kaboom")
    }
}

fn input(value: Value) -> JsonMap {
    value.as_object().cloned().unwrap_or_default()
}

fn default_registry() -> (Arc<ToolRegistry>, Arc<NoteStore>) {
    let notes = Arc::new(NoteStore::new());
    (Arc::new(ToolRegistry::with_defaults(notes.clone())), notes)
}

fn rule_agent() -> (Agent, Arc<NoteStore>) {
    let (registry, notes) = default_registry();
    (Agent::new(registry, Arc::new(RuleBasedPlanner::new())), notes)
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Structural guarantees every result must satisfy
fn assert_well_formed(result: &AgentResult, max_steps: usize) {
    assert_ne!(result.status, RunStatus::Running);
    assert!(result.trace.len() <= max_steps);
    for (i, step) in result.trace.iter().enumerate() {
        assert_eq!(step.index, i + 1);
        assert!(step.output.is_some() ^ step.error.is_some());
    }
    for pair in result.trace.windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
}

#[tokio::test]
async fn test_calculation_goal() {
    let (agent, _) = rule_agent();
    let result = agent
        .run("Calculate 2 + 2", None, Some(names(&["math"]).as_slice()))
        .await;

    assert_well_formed(&result, agent.max_steps());
    assert_eq!(result.status, RunStatus::Completed);
    assert_eq!(result.trace.len(), 1);

    let step = &result.trace[0];
    assert_eq!(step.tool_name, "math");
    assert_eq!(
        Value::Object(step.output.clone().unwrap()),
        json!({"result": 4, "expression": "2 + 2"})
    );
    assert!(result.output.contains('4'));
    assert_eq!(result.output, "Calculation result: 4 (from 2 + 2)");
}

#[tokio::test]
async fn test_search_goal() {
    let (agent, _) = rule_agent();
    let result = agent
        .run(
            "Search for Python async programming tips",
            None,
            Some(names(&["web_search"]).as_slice()),
        )
        .await;

    assert_well_formed(&result, agent.max_steps());
    assert_eq!(result.status, RunStatus::Completed);
    assert_eq!(result.trace.len(), 1);

    let output = result.trace[0].output.as_ref().unwrap();
    assert_eq!(output["results"].as_array().map(Vec::len), Some(3));
    assert_eq!(
        result.output,
        "Found 3 search results for 'Python async programming tips'"
    );
}

#[tokio::test]
async fn test_governance_notes_accumulate() {
    let (agent, notes) = rule_agent();
    let tools = names(&["governance_note"]);
    let goal = "Add note to PROP-2025-001: Budget approved by council";

    let first = agent.run(goal, None, Some(tools.as_slice())).await;
    assert_eq!(first.status, RunStatus::Completed);
    assert_eq!(first.trace[0].output.as_ref().unwrap()["total_notes"], 1);
    assert_eq!(
        first.output,
        "Added note to proposal PROP-2025-001 (total notes: 1)"
    );

    let second = agent.run(goal, None, Some(tools.as_slice())).await;
    assert_eq!(second.trace[0].output.as_ref().unwrap()["total_notes"], 2);

    assert_eq!(
        notes.notes("PROP-2025-001"),
        vec!["Budget approved by council", "Budget approved by council"]
    );
}

#[tokio::test]
async fn test_missing_tool_hits_ceiling() {
    let (agent, _) = rule_agent();
    let agent = agent.with_max_steps(3);

    let result = agent
        .run(
            "Search for the latest Rust release",
            None,
            Some(names(&["math"]).as_slice()),
        )
        .await;

    assert_well_formed(&result, 3);
    assert_eq!(result.status, RunStatus::Completed);
    assert_eq!(result.trace.len(), 3);
    for step in &result.trace {
        assert_eq!(step.tool_name, "web_search");
        assert_eq!(
            step.error.as_deref(),
            Some("Tool 'web_search' not found in available tools")
        );
    }
    assert_eq!(
        result.output,
        "Task failed: Tool 'web_search' not found in available tools"
    );
}

#[tokio::test]
async fn test_disallowed_expression_is_never_executed() {
    let (registry, _) = default_registry();
    let planner = ScriptedPlanner::repeating(Decision::use_tool(
        "math",
        input(json!({"expression": "__import__('os').system('ls')"})),
    ));
    let agent = Agent::new(registry, planner).with_max_steps(2);

    let result = agent.run("Do something sneaky", None, None).await;

    assert_well_formed(&result, 2);
    assert_eq!(result.status, RunStatus::Completed);
    assert_eq!(result.trace.len(), 2);
    let error = result.trace[0].error.as_deref().unwrap();
    assert!(error.starts_with("Math evaluation failed:"), "{}", error);
    assert!(result.output.starts_with("Task failed: Math evaluation failed:"));
}

#[tokio::test]
async fn test_direct_answer_has_no_steps() {
    let (agent, _) = rule_agent();
    let result = agent.run("Hello there", Some("small talk"), None).await;

    assert_well_formed(&result, agent.max_steps());
    assert_eq!(result.status, RunStatus::Completed);
    assert!(result.trace.is_empty());
}

#[tokio::test]
async fn test_unknown_action_fails_run() {
    let (registry, _) = default_registry();
    let llm = Arc::new(FixedLlm(LlmResponse {
        action: "dance".to_string(),
        ..Default::default()
    }));
    let agent = Agent::new(registry, Arc::new(LlmPlanner::new(llm)));

    let result = agent.run("Calculate 2 + 2", None, None).await;

    assert_eq!(result.status, RunStatus::Error);
    assert_eq!(result.output, "Error: Unknown action type: dance");
    assert!(result.trace.is_empty());
}

#[tokio::test]
async fn test_non_object_tool_input_fails_only_the_step() {
    let (registry, _) = default_registry();
    let response: LlmResponse = serde_json::from_value(json!({
        "action": "use_tool",
        "tool_name": "math",
        "tool_input": "2 + 2"
    }))
    .unwrap();
    let planner = Arc::new(LlmPlanner::new(Arc::new(FixedLlm(response))));
    let agent = Agent::new(registry, planner).with_max_steps(2);

    let result = agent.run("Calculate 2 + 2", None, None).await;

    assert_well_formed(&result, 2);
    assert_eq!(result.status, RunStatus::Completed);
    assert_eq!(result.trace.len(), 2);
    let step = &result.trace[0];
    assert_eq!(step.tool_name, "math");
    assert_eq!(step.input["tool_input"], "2 + 2");
    assert_eq!(
        step.error.as_deref(),
        Some("Invalid input: tool_input must be an object")
    );
    assert_eq!(
        result.output,
        "Task failed: Invalid input: tool_input must be an object"
    );
}

#[tokio::test]
async fn test_deeply_nested_expression_is_a_step_error() {
    let (agent, _) = rule_agent();
    let agent = agent.with_max_steps(2);
    let goal = format!("Calculate {}1{}", "(".repeat(50_000), ")".repeat(50_000));

    let result = agent.run(&goal, None, None).await;

    assert_well_formed(&result, 2);
    assert_eq!(result.status, RunStatus::Completed);
    assert_eq!(result.trace[0].tool_name, "math");
    let error = result.trace[0].error.as_deref().unwrap();
    assert_eq!(error, "Math evaluation failed: expression nested too deeply");
}

#[tokio::test]
async fn test_planner_failure_keeps_trace() {
    let (registry, _) = default_registry();
    let planner = ScriptedPlanner::new(vec![
        Move::Decide(Decision::use_tool(
            "math",
            input(json!({"expression": "1 / 0"})),
        )),
        Move::Fail("model went away".to_string()),
    ]);
    let agent = Agent::new(registry, planner);

    let result = agent.run("Divide by zero", None, None).await;

    assert_well_formed(&result, agent.max_steps());
    assert_eq!(result.status, RunStatus::Error);
    assert_eq!(result.output, "Error: Planning error: model went away");
    assert_eq!(result.trace.len(), 1);
    assert_eq!(
        result.trace[0].error.as_deref(),
        Some("Math evaluation failed: division by zero")
    );
}

#[tokio::test]
async fn test_planner_panic_is_contained() {
    let (registry, _) = default_registry();
    let agent = Agent::new(registry, ScriptedPlanner::new(vec![Move::Panic]));

    let result = agent.run("anything", None, None).await;

    assert_eq!(result.status, RunStatus::Error);
    assert_eq!(result.output, "Error: planner blew up");
    assert!(result.trace.is_empty());
}

#[tokio::test]
async fn test_tool_panic_is_recorded() {
    let notes = Arc::new(NoteStore::new());
    let mut registry = ToolRegistry::with_defaults(notes);
    registry.register(Arc::new(ExplodingTool)).unwrap();

    let planner = ScriptedPlanner::new(vec![
        Move::Decide(Decision::use_tool("explode", JsonMap::new())),
        Move::Decide(Decision::use_tool(
            "math",
            input(json!({"expression": "6 * 7"})),
        )),
    ]);
    let agent = Agent::new(Arc::new(registry), planner);

    let result = agent.run("Try the risky tool first", None, None).await;

    assert_well_formed(&result, agent.max_steps());
    assert_eq!(result.status, RunStatus::Completed);
    assert_eq!(result.trace.len(), 2);
    assert_eq!(
        result.trace[0].error.as_deref(),
        Some("Tool 'explode' panicked: kaboom")
    );
    assert_eq!(result.output, "Calculation result: 42 (from 6 * 7)");
}

#[tokio::test]
async fn test_unknown_names_restrict_to_known_subset() {
    let (agent, _) = rule_agent();
    let result = agent
        .run(
            "Calculate 5 * 5",
            None,
            Some(names(&["math", "weather"]).as_slice()),
        )
        .await;

    assert_eq!(result.status, RunStatus::Completed);
    assert_eq!(result.output, "Calculation result: 25 (from 5 * 5)");
}

#[tokio::test]
async fn test_custom_summary_entry() {
    let (registry, _) = default_registry();
    let summarizer = Summarizer::default().with("math", |output| {
        format!("= {}", output.get("result").cloned().unwrap_or(Value::Null))
    });
    let agent = Agent::new(registry, Arc::new(RuleBasedPlanner::new())).with_summarizer(summarizer);

    let result = agent.run("Calculate 3 * 3", None, None).await;
    assert_eq!(result.output, "= 9");
}

#[tokio::test]
async fn test_results_are_always_well_formed() {
    let (agent, _) = rule_agent();
    let agent = agent.with_max_steps(4);
    let goals = [
        "Calculate 2 ** 10",
        "What is 7 / 2?",
        "Calculate 1 / 0",
        "Find information about tokio",
        "Record note for PROP-9: looks good",
        "Tell me a joke",
    ];

    for goal in goals {
        for tools in [None, Some(names(&["math"]))] {
            let result = agent.run(goal, None, tools.as_deref()).await;
            assert_well_formed(&result, 4);
        }
    }
}

#[tokio::test]
async fn test_result_json_shape() {
    let (agent, _) = rule_agent();
    let result = agent.run("Calculate 2 + 2", None, None).await;

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["status"], "completed");
    let step = &value["trace"][0];
    assert_eq!(step["index"], 1);
    assert_eq!(step["toolName"], "math");
    assert!(step["error"].is_null());
    assert!(step["timestamp"].as_str().unwrap().ends_with('Z'));
}

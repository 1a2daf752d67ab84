//! Agent module - the planning loop and its collaborators
//!
//! Contains the loop itself, the execution state it accumulates, the planner
//! strategies it can be driven by and the summarizer for final outputs.

pub mod orchestrator;
pub mod planner;
pub mod rules;
pub mod state;
pub mod summary;

pub use orchestrator::{Agent, DEFAULT_MAX_STEPS};
pub use planner::{format_history, LlmPlanner, Planner};
pub use rules::RuleBasedPlanner;
pub use state::{AgentResult, AgentState, ExecutionStep};
pub use summary::{SummaryFn, Summarizer};

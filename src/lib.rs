//! agent-core - goal-driven tool-using agent
//!
//! Takes a natural-language goal, repeatedly asks a planner for the next
//! action, executes at most one tool per step, records every step and returns
//! a summarized result with the full trace.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **Tools**: Tool capability, built-in tools, and the registry
//! - **LLM**: Client abstraction with an Ollama implementation
//! - **Agent**: Planners, execution state, summarizer, and the loop
//! - **API**: axum HTTP surface
//! - **CLI**: REPL and result rendering
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use agent_core::agent::{Agent, RuleBasedPlanner};
//! use agent_core::tools::{NoteStore, ToolRegistry};
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = Arc::new(ToolRegistry::with_defaults(Arc::new(NoteStore::new())));
//!     let agent = Agent::new(registry, Arc::new(RuleBasedPlanner::new()));
//!
//!     let result = agent.run("Calculate 2 + 2", None, None).await;
//!     println!("{}", result.output);
//! }
//! ```

pub mod agent;
pub mod api;
pub mod cli;
pub mod core;
pub mod llm;
pub mod logging;
pub mod tools;

// Re-export commonly used items
pub use agent::{Agent, AgentResult};
pub use cli::Repl;
pub use core::{AgentError, Config, PlannerKind, Result, RunStatus};

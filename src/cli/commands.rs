//! CLI commands
//!
//! Special commands that can be executed in the REPL, plus the text
//! rendering shared with the one-shot `run` subcommand.

use serde_json::Value;

use crate::agent::{AgentResult, ExecutionStep};
use crate::core::RunStatus;
use crate::tools::{NoteStore, ToolRegistry};

/// Result of parsing a command
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Not a command; run it as a goal
    Continue(String),
    /// Command was handled, show output
    Handled(String),
    /// Flip trace printing
    ToggleTrace,
    /// Exit the REPL
    Exit,
}

/// Parse and handle special commands
pub fn handle_command(input: &str, registry: &ToolRegistry, notes: &NoteStore) -> CommandResult {
    let input = input.trim();
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0].to_lowercase();
    let args = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd.as_str() {
        "exit" | "quit" | "q" => CommandResult::Exit,

        "help" | "?" => CommandResult::Handled(help_text()),

        "tools" => CommandResult::Handled(render_tools(registry)),

        "trace" => CommandResult::ToggleTrace,

        "notes" => {
            if args.is_empty() {
                let ids = notes.proposal_ids();
                if ids.is_empty() {
                    return CommandResult::Handled(
                        "No notes recorded yet. Usage: notes <PROPOSAL_ID>".to_string(),
                    );
                }
                return CommandResult::Handled(format!(
                    "Proposals with notes: {}\nUsage: notes <PROPOSAL_ID>",
                    ids.join(", ")
                ));
            }
            CommandResult::Handled(render_notes(&args.to_uppercase(), notes))
        }

        _ => CommandResult::Continue(input.to_string()),
    }
}

/// List tools with their descriptions
pub fn render_tools(registry: &ToolRegistry) -> String {
    if registry.is_empty() {
        return "No tools registered.".to_string();
    }

    let mut output = String::from("Available tools:");
    for definition in registry.definitions() {
        output.push_str(&format!("\n  {:<16} {}", definition.name, definition.description));
    }
    output
}

/// Notes stored for one proposal
pub fn render_notes(proposal_id: &str, notes: &NoteStore) -> String {
    let entries = notes.notes(proposal_id);
    if entries.is_empty() {
        return format!("No notes for {}", proposal_id);
    }

    let mut output = format!("Notes for {} ({}):", proposal_id, entries.len());
    for (i, note) in entries.iter().enumerate() {
        output.push_str(&format!("\n  {}. {}", i + 1, note));
    }
    output
}

/// Human-readable rendering of a run
pub fn render_result(result: &AgentResult, show_trace: bool) -> String {
    let marker = match result.status {
        RunStatus::Completed => "✓",
        RunStatus::Error | RunStatus::Running => "✗",
    };

    let mut output = format!("{} [{}] {}", marker, result.status, result.output);

    if show_trace && !result.trace.is_empty() {
        output.push_str("\n\nTrace:");
        for step in &result.trace {
            output.push_str(&format!("\n  {}", render_step(step)));
        }
    }
    output
}

fn render_step(step: &ExecutionStep) -> String {
    let input = Value::Object(step.input.clone());
    match (&step.output, &step.error) {
        (_, Some(error)) => format!(
            "{}. {} {} -> ERROR: {}",
            step.index, step.tool_name, input, error
        ),
        (Some(output), None) => format!(
            "{}. {} {} -> {}",
            step.index,
            step.tool_name,
            input,
            Value::Object(output.clone())
        ),
        (None, None) => format!("{}. {} {} -> (pending)", step.index, step.tool_name, input),
    }
}

/// Generate help text
fn help_text() -> String {
    r#"agent-core commands:
─────────────────────────────────────────────
  help, ?              Show this help message
  tools                List available tools
  notes <PROPOSAL_ID>  Show governance notes for a proposal
  trace                Toggle printing of execution traces
  exit, quit, q        Exit

Anything else is run as a goal, for example:
  Calculate 2 + 2
  Search for Rust async runtimes
  Add note to PROP-2025-001: Budget approved
─────────────────────────────────────────────"#
        .to_string()
}

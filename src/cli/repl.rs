//! Interactive REPL for agent-core
//!
//! Each line is either a command or a goal. The note store lives as long as
//! the session, so notes accumulate across goals.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use crate::agent::Agent;
use crate::cli::commands::{handle_command, render_result, CommandResult};
use crate::core::Result;
use crate::tools::NoteStore;

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    agent: Agent,
    notes: Arc<NoteStore>,
    show_trace: bool,
}

impl Repl {
    /// Create a REPL over an agent and the note store its tools write to
    pub fn new(agent: Agent, notes: Arc<NoteStore>) -> Self {
        Self {
            agent,
            notes,
            show_trace: false,
        }
    }

    /// Start with trace printing on or off
    pub fn with_trace(mut self, show_trace: bool) -> Self {
        self.show_trace = show_trace;
        self
    }

    /// Run the REPL
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            print!("goal> ");
            stdout.flush()?;

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    // EOF (Ctrl+D)
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }

            let input = input.trim();
            if input.is_empty() {
                continue;
            }

            match handle_command(input, self.agent.registry(), &self.notes) {
                CommandResult::Exit => {
                    println!("Goodbye!");
                    break;
                }
                CommandResult::Handled(output) => {
                    println!("{}\n", output);
                }
                CommandResult::ToggleTrace => {
                    self.show_trace = !self.show_trace;
                    println!(
                        "Trace printing: {}\n",
                        if self.show_trace { "ON" } else { "OFF" }
                    );
                }
                CommandResult::Continue(goal) => {
                    let result = self.agent.run(&goal, None, None).await;
                    println!("{}\n", render_result(&result, self.show_trace));
                }
            }
        }

        Ok(())
    }

    /// Print the startup banner
    fn print_banner(&self) {
        println!();
        println!("agent-core {}", env!("CARGO_PKG_VERSION"));
        println!("Planner:    {}", self.agent.planner_name());
        println!("Max steps:  {}", self.agent.max_steps());
        println!("Tools:      {}", self.agent.registry().names().join(", "));
        println!();
        println!("Commands: help, tools, notes <ID>, trace, exit");
        println!("─────────────────────────────────────────────");
    }
}

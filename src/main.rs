//! agent-core - goal-driven tool-using agent
//!
//! Main entry point for the CLI application.

use std::sync::Arc;

use agent_core::api::{self, AppState};
use agent_core::cli::{render_result, render_tools, Repl};
use agent_core::tools::{NoteStore, ToolRegistry};
use agent_core::{logging, Agent, Config, PlannerKind};
use clap::{Parser, Subcommand};

/// agent-core - plan, call tools, summarize
#[derive(Parser, Debug)]
#[command(name = "agent-core")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Maximum plan/act iterations per run
    #[arg(long, global = true)]
    max_steps: Option<usize>,

    /// Planner implementation (rule_based or ollama)
    #[arg(long, global = true)]
    planner: Option<PlannerKind>,

    /// Enable debug output
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a single goal and exit
    Run {
        /// What the agent should achieve
        goal: String,

        /// Extra context passed to the planner
        #[arg(long)]
        context: Option<String>,

        /// Restrict the run to these tools (repeatable)
        #[arg(long = "tool")]
        tools: Vec<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP API
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },

    /// Interactive session (default)
    Repl,

    /// List registered tools
    Tools,

    /// Show the effective configuration
    Config {
        /// Write it to the config file instead
        #[arg(long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if let Some(max_steps) = args.max_steps {
        config.agent.max_steps = max_steps;
    }

    if let Some(planner) = args.planner {
        config.planner.provider = planner;
    }

    if args.debug {
        config.agent.debug = true;
        config.logging.level = "debug".to_string();
    }

    if let Some(Command::Serve { ref host, port }) = args.command {
        if let Some(host) = host {
            config.server.host = host.clone();
        }
        if let Some(port) = port {
            config.server.port = port;
        }
    }

    config.validate()?;
    logging::init(&config.logging.level);

    let notes = Arc::new(NoteStore::new());
    let registry = Arc::new(ToolRegistry::with_defaults(notes.clone()));
    let agent = Agent::from_config(&config, registry.clone())?;

    match args.command.unwrap_or(Command::Repl) {
        Command::Run {
            goal,
            context,
            tools,
            json,
        } => {
            let result = agent
                .run(&goal, context.as_deref(), Some(tools.as_slice()))
                .await;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", render_result(&result, true));
            }

            if !result.is_completed() {
                std::process::exit(1);
            }
        }

        Command::Serve { .. } => {
            api::serve(&config, AppState::new(agent, notes)).await?;
        }

        Command::Repl => {
            let mut repl = Repl::new(agent, notes).with_trace(config.agent.debug);
            repl.run().await?;
        }

        Command::Tools => {
            println!("{}", render_tools(&registry));
        }

        Command::Config { write } => {
            if write {
                let path = config.save()?;
                println!("Configuration written to {}", path.display());
            } else {
                print!("{}", config.to_toml()?);
            }
        }
    }

    Ok(())
}

//! CLI module - command-line interface
//!
//! Contains the REPL, its commands and result rendering.

pub mod commands;
pub mod repl;

pub use commands::{render_result, render_tools};
pub use repl::Repl;

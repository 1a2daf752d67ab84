//! Core module - shared infrastructure for agent-core
//!
//! This module contains foundational types, configuration, and error handling
//! used throughout the crate.

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, PlannerKind};
pub use error::{AgentError, Result, ToolError};
pub use types::*;

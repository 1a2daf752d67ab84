//! Configuration management for agent-core
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/agent-core/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{AgentError, Result};

/// Main configuration for agent-core
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Agent loop configuration
    #[serde(default)]
    pub agent: AgentConfig,
    /// Planner selection
    #[serde(default)]
    pub planner: PlannerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (default: 127.0.0.1)
    pub host: String,
    /// Port number (default: 8000)
    pub port: u16,
    /// Origins allowed by CORS
    pub cors_origins: Vec<String>,
}

/// Agent loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum plan/act iterations before forced completion
    /// Default: 10
    pub max_steps: usize,
    /// Whether to show debug output
    pub debug: bool,
}

/// Which planner drives the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannerKind {
    /// Deterministic keyword rules, no network
    RuleBased,
    /// Local Ollama server
    Ollama,
}

impl std::str::FromStr for PlannerKind {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "rule_based" | "rule-based" | "rules" | "mock" => Ok(PlannerKind::RuleBased),
            "ollama" => Ok(PlannerKind::Ollama),
            other => Err(AgentError::config(format!("Unknown planner: {}", other))),
        }
    }
}

impl std::fmt::Display for PlannerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlannerKind::RuleBased => write!(f, "rule_based"),
            PlannerKind::Ollama => write!(f, "ollama"),
        }
    }
}

/// Planner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Planner implementation
    pub provider: PlannerKind,
    /// Model name for LLM-backed planners
    pub model: String,
    /// Ollama host address
    pub ollama_host: String,
    /// Ollama port number
    pub ollama_port: u16,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: env::var("AGENT_CORE_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("AGENT_CORE_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:8000".to_string(),
            ],
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: env::var("AGENT_CORE_MAX_STEPS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            debug: env::var("AGENT_CORE_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            provider: env::var("AGENT_CORE_PLANNER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(PlannerKind::RuleBased),
            model: env::var("AGENT_CORE_MODEL").unwrap_or_else(|_| "qwen3:8b".to_string()),
            ollama_host: env::var("OLLAMA_HOST").unwrap_or_else(|_| "localhost".to_string()),
            ollama_port: env::var("OLLAMA_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(11434),
            timeout_secs: 120,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: env::var("AGENT_CORE_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("agent-core")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        Self::load_or_default(&Self::config_file())
    }

    /// Load `path` if present, falling back to defaults
    ///
    /// A file that exists but fails to parse or validate is reported on
    /// stderr; logging is not initialized yet when this runs.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: ignoring config file {}: {}",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Load configuration from a specific TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AgentError::config("Config file not found"));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| AgentError::config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| AgentError::config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the loop or server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.agent.max_steps == 0 {
            return Err(AgentError::config("agent.max_steps must be at least 1"));
        }
        if self.server.port == 0 {
            return Err(AgentError::config("server.port must be non-zero"));
        }
        Ok(())
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file();
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| {
                    AgentError::config(format!("Failed to create config dir: {}", e))
                })?;
            }
        }

        let content = self.to_toml()?;

        fs::write(path, content)
            .map_err(|e| AgentError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Render the configuration as pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| AgentError::config(format!("Failed to serialize config: {}", e)))
    }

    /// Get the full Ollama API URL
    pub fn ollama_url(&self) -> String {
        format!(
            "http://{}:{}",
            self.planner.ollama_host, self.planner.ollama_port
        )
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

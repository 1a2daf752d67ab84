//! LLM module - language model backends for the LLM-backed planner
//!
//! Provides the client abstraction with Ollama as the bundled backend.

pub mod ollama;
pub mod traits;

pub use ollama::OllamaClient;
pub use traits::{LlmClient, LlmResponse};

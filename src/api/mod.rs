//! HTTP API
//!
//! Thin axum layer over [`Agent::run`] and the note store. Handlers share an
//! [`AppState`]; each request owns its own run.

pub mod routes;
pub mod types;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::agent::Agent;
use crate::core::{AgentError, Config, Result};
use crate::tools::NoteStore;

pub use types::{HealthResponse, NotesResponse, RunTaskRequest, RunTaskResponse, DEFAULT_TOOLS};

/// Shared state accessible from all request handlers
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<Agent>,
    /// Same store the `governance_note` tool appends to
    pub notes: Arc<NoteStore>,
}

impl AppState {
    pub fn new(agent: Agent, notes: Arc<NoteStore>) -> Self {
        Self {
            agent: Arc::new(agent),
            notes,
        }
    }
}

/// Build the full application router
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_router())
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(parsed))
}

/// Bind the configured address and serve until the process stops
pub async fn serve(config: &Config, state: AppState) -> Result<()> {
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(addr.as_str())
        .await
        .map_err(|e| AgentError::config(format!("Cannot bind {}: {}", addr, e)))?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    let app = router(state, &config.server.cors_origins);

    axum::serve(listener, app).await?;
    Ok(())
}

//! HTTP route handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;

use crate::api::types::{
    ErrorBody, HealthResponse, NotesResponse, RunTaskRequest, RunTaskResponse, ToolsResponse,
};
use crate::api::AppState;

type ApiError = (StatusCode, Json<ErrorBody>);

/// Build the API router (mounted under `/api/v1`).
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/run-task", post(run_task))
        .route("/governance-notes/{proposal_id}", get(get_notes))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// GET /api/v1/tools - definitions of every registered tool.
async fn list_tools(State(state): State<AppState>) -> Json<ToolsResponse> {
    Json(state.agent.registry().definitions())
}

/// POST /api/v1/run-task - run the agent loop for one goal.
///
/// Any run, including one that ends in `error`, answers 200.
async fn run_task(
    State(state): State<AppState>,
    Json(request): Json<RunTaskRequest>,
) -> Result<Json<RunTaskResponse>, ApiError> {
    let goal = request.goal.trim();
    if goal.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorBody::new("goal must not be empty")),
        ));
    }

    let tool_names = request.tool_names();
    let unknown_tools = state.agent.registry().missing(tool_names.as_slice());

    let result = state
        .agent
        .run(goal, request.context.as_deref(), Some(tool_names.as_slice()))
        .await;

    Ok(Json(RunTaskResponse {
        result,
        unknown_tools,
    }))
}

/// GET /api/v1/governance-notes/{proposal_id} - notes for one proposal.
async fn get_notes(
    State(state): State<AppState>,
    Path(proposal_id): Path<String>,
) -> Json<NotesResponse> {
    let notes = state.notes.notes(&proposal_id);
    Json(NotesResponse { proposal_id, notes })
}

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};

use crate::api::{SessionView, SessionsResponse};
use crate::common::errors::ApiError;
use crate::server::AppState;
use crate::session::SnapshotPatch;

/// GET /sessions — observable state of every live media session.
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<SessionsResponse> {
    let sessions = state
        .registry
        .sessions()
        .iter()
        .map(|handle| handle.to_session_response())
        .collect();
    Json(SessionsResponse { sessions })
}

/// GET /sessions/{key}
pub async fn get_session(
    Path(key): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionView>, ApiError> {
    match state.registry.get(&key.clone().into()) {
        Some(handle) => Ok(Json(handle.to_session_response())),
        None => Err(ApiError::not_found(
            format!("No session for {}", key),
            format!("/sessions/{}", key),
        )),
    }
}

/// PATCH /sessions/{key} — playback-event observation pushes snapshot
/// updates here. Fire-and-forget: never waits on a reattachment.
pub async fn patch_session(
    Path(key): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(patch): Json<SnapshotPatch>,
) -> Result<impl IntoResponse, ApiError> {
    if state.registry.update_snapshot(&key.clone().into(), &patch) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(
            format!("No session for {}", key),
            format!("/sessions/{}", key),
        ))
    }
}

/// DELETE /sessions/{key} — explicit release; the only way a session's
/// engine is ever destroyed.
pub async fn delete_session(
    Path(key): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    if state.registry.release(&key.clone().into()) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(
            format!("No session for {}", key),
            format!("/sessions/{}", key),
        ))
    }
}

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::common::errors::ApiError;
use crate::server::AppState;

const MANIFEST_CONTENT_TYPE: &str = "application/dash+xml";
const SEGMENT_CONTENT_TYPE: &str = "audio/mp4";

async fn serve_file(
    path: std::path::PathBuf,
    content_type: &'static str,
    request_path: String,
) -> Result<Response, ApiError> {
    let body = tokio::fs::read(&path)
        .await
        .map_err(|err| ApiError::internal(err.to_string(), request_path))?;
    Ok(([(header::CONTENT_TYPE, content_type)], body).into_response())
}

/// GET|HEAD /stream/{name}/manifest
pub async fn get_manifest(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let request_path = format!("/stream/{}/manifest", name);
    tracing::debug!("Requested manifest for {}", name);
    let Some(path) = state.library.manifest_path(&name).await else {
        return Err(ApiError::not_found("Manifest not found", request_path));
    };
    serve_file(path, MANIFEST_CONTENT_TYPE, request_path).await
}

/// GET /stream/{name}/segment/{segment}
pub async fn get_segment(
    Path((name, segment)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let request_path = format!("/stream/{}/segment/{}", name, segment);
    serve_segment(state, name, segment, request_path).await
}

/// GET /stream/{name}/{segment} — segments referenced by bare name from the
/// manifest resolve here.
pub async fn get_direct_segment(
    Path((name, segment)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let request_path = format!("/stream/{}/{}", name, segment);
    serve_segment(state, name, segment, request_path).await
}

async fn serve_segment(
    state: Arc<AppState>,
    name: String,
    segment: String,
    request_path: String,
) -> Result<Response, ApiError> {
    tracing::debug!("Requested segment {} of {}", segment, name);
    let Some(path) = state.library.segment_path(&name, &segment).await else {
        return Err(ApiError::not_found("Segment not found", request_path));
    };
    serve_file(path, SEGMENT_CONTENT_TYPE, request_path).await
}

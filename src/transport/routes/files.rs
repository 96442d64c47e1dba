use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};

use crate::api::{FileEntry, UploadResponse};
use crate::common::errors::ApiError;
use crate::server::AppState;
use crate::segmenter::standardize_filename;

/// POST /upload — store the file, segment it, drop the raw upload.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(err.to_string(), "/upload"))?
        .ok_or_else(|| ApiError::bad_request("missing file field", "/upload"))?;

    let original_name = field
        .file_name()
        .map(ToOwned::to_owned)
        .ok_or_else(|| ApiError::bad_request("file field has no filename", "/upload"))?;
    let bytes = field
        .bytes()
        .await
        .map_err(|err| ApiError::bad_request(err.to_string(), "/upload"))?;

    let standardized = standardize_filename(&original_name);
    let stem = standardized
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("upload")
        .to_string();

    let upload_dir = std::path::Path::new(&state.config.storage.upload_dir);
    let upload_path = upload_dir.join(&standardized);
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|err| ApiError::internal(err.to_string(), "/upload"))?;
    tokio::fs::write(&upload_path, &bytes)
        .await
        .map_err(|err| ApiError::internal(err.to_string(), "/upload"))?;

    let output_dir = state.library.segments_dir().join(&stem);
    let result = state.segmenter.segment(&upload_path, &output_dir).await;

    // The raw upload is transient either way.
    if let Err(err) = tokio::fs::remove_file(&upload_path).await {
        tracing::warn!("Failed to remove upload {}: {}", upload_path.display(), err);
    }

    if let Err(err) = result {
        tracing::error!("Segmentation of {} failed: {}", original_name, err);
        return Err(ApiError::internal(
            "Failed to process audio file",
            "/upload",
        ));
    }

    tracing::info!("Processed upload {} as {}", original_name, stem);
    Ok(Json(UploadResponse {
        message: "File uploaded and processed successfully".to_string(),
        filename: stem,
    }))
}

/// GET /files — every processed file with its manifest URL.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FileEntry>>, ApiError> {
    let files = state
        .library
        .scan()
        .await
        .map_err(|err| ApiError::internal(err.to_string(), "/files"))?;

    Ok(Json(
        files
            .into_iter()
            .map(|file| FileEntry {
                name: file.name,
                manifest_url: file.manifest_url,
            })
            .collect(),
    ))
}

/// DELETE /files/{name} — remove segments and release the media session.
pub async fn delete_file(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let path = format!("/files/{}", name);
    let removed = state
        .library
        .remove(&name)
        .await
        .map_err(|err| ApiError::internal(err.to_string(), &*path))?;

    // The session dies with the file, not with any consumer.
    state.registry.release(&name.clone().into());

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("No such file: {}", name), path))
    }
}

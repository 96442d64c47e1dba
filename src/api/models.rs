use serde::Serialize;

use crate::common::types::{ResourceUri, SessionKey, SurfaceId};
use crate::session::{SessionStatus, Snapshot};

/// POST /upload response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    /// Standardized name the file is served under.
    pub filename: String,
}

/// One entry in GET /files.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    pub manifest_url: String,
}

/// Observable state of one media session, replacing console logging as the
/// visibility into the reattachment state machine.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub key: SessionKey,
    pub status: SessionStatus,
    pub requested_resource: ResourceUri,
    pub loaded_resource: Option<ResourceUri>,
    /// Identity of the currently bound surface, if any.
    pub surface: Option<SurfaceId>,
    pub snapshot: Snapshot,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionsResponse {
    pub sessions: Vec<SessionView>,
}

/// GET /info response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    pub version: String,
    /// Unix timestamp in milliseconds.
    pub build_time: u64,
    pub git_commit: String,
}

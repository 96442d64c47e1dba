use std::time::Duration;

use thiserror::Error;

use crate::common::types::{ResourceUri, SurfaceId};

/// Engine construction failed. The session stays registered with status
/// `Error` and no engine; the next acquire retries construction.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("engine construction failed: {0}")]
pub struct CreationError(pub String);

/// `load` was rejected. Retryable: the cached resource is untouched and the
/// session keeps its engine, so a later reattach may succeed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error("load of {uri} failed: {reason}")]
    Failed { uri: ResourceUri, reason: String },
    #[error("engine already destroyed")]
    Gone,
}

/// Binding a surface failed. Isolated: the engine's loaded state and every
/// other session are unaffected.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("failed to bind surface {surface}: {reason}")]
pub struct BindError {
    pub surface: SurfaceId,
    pub reason: String,
}

/// Resuming playback after a restore failed. Recoverable: the session stays
/// usable and an explicit play command may still succeed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResumeError {
    #[error("engine not ready to resume within {0:?}")]
    NotReady(Duration),
    #[error("playback start requires an explicit user gesture")]
    GestureRequired,
    #[error("engine already destroyed")]
    Gone,
}

/// Failures a reattachment reports to its caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Creation(#[from] CreationError),
    #[error(transparent)]
    Bind(#[from] BindError),
    #[error(transparent)]
    Load(#[from] LoadError),
}

use std::sync::Arc;

use async_trait::async_trait;

use crate::common::types::{ResourceUri, SurfaceId};
use crate::session::errors::{BindError, CreationError, LoadError, ResumeError};

/// A render sink (e.g. a media output element). Owned by the consumer that
/// created it; a session only holds a weak reference to whichever surface was
/// bound last.
#[derive(Debug)]
pub struct Surface {
    id: SurfaceId,
    label: String,
}

impl Surface {
    pub fn new(label: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: SurfaceId::random(),
            label: label.into(),
        })
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Instantaneous playback state as reported by an engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    pub position: f64,
    pub volume: f32,
    pub playing: bool,
}

/// The adaptive-streaming engine capability.
///
/// Engines are expensive to create and cheap to rebind. An engine is owned by
/// exactly one session and destroyed only through explicit release; it is the
/// authority on which resource is actually loaded.
#[async_trait]
pub trait PlaybackEngine: Send + Sync {
    /// Attaches the engine output to `surface`, displacing any previous one.
    fn bind(&self, surface: &Arc<Surface>) -> Result<(), BindError>;

    /// Loads `uri`, fetching the manifest and priming buffers.
    async fn load(&self, uri: &ResourceUri) -> Result<(), LoadError>;

    /// The resource the engine itself considers loaded, if any.
    async fn loaded_resource(&self) -> Option<ResourceUri>;

    /// Starts or resumes playback. Fails with `ResumeError::NotReady` while
    /// buffers are still warming up.
    async fn play(&self) -> Result<(), ResumeError>;

    fn pause(&self);

    fn seek(&self, seconds: f64);

    fn set_volume(&self, volume: f32);

    fn playback_state(&self) -> PlaybackState;

    /// Tears the engine down. Every later call fails or is ignored.
    fn destroy(&self);
}

/// Creates engines for the registry. Construction is synchronous so that
/// get-or-create can run under the registry's per-key insertion guard.
pub trait EngineFactory: Send + Sync {
    fn create(&self) -> Result<Arc<dyn PlaybackEngine>, CreationError>;
}

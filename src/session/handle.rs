use std::sync::Weak;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::common::types::{ResourceUri, SessionKey, SurfaceId};
use crate::session::engine::{PlaybackEngine, PlaybackState, Surface};
use crate::session::snapshot::{Snapshot, SnapshotPatch};

/// Lifecycle status of a media session, exposed through the session view
/// instead of log statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    /// Engine exists (or construction failed) but no surface was bound yet.
    Unbound,
    /// A reattachment is loading a new resource.
    Loading,
    /// Bound, loaded, snapshot restored.
    Ready,
    /// Engine construction or the last load failed; reattach to retry.
    Error,
}

struct HandleState {
    engine: Option<Arc<dyn PlaybackEngine>>,
    /// The surface currently receiving output. Weak: consumers own their
    /// surfaces, the session only tracks the latest bind.
    bound_surface: Weak<Surface>,
    bound_surface_id: Option<SurfaceId>,
    /// Cache of the last successfully loaded resource. The engine's own
    /// report is the authority; this only short-circuits the common case.
    loaded_resource: Option<ResourceUri>,
    requested_resource: ResourceUri,
}

/// One live media session: exactly one engine, at most one bound surface,
/// and the snapshot that survives consumer churn.
///
/// Handles are created and destroyed only by the registry. Unbinding a
/// surface or dropping a consumer never tears a session down.
pub struct SessionHandle {
    key: SessionKey,
    state: parking_lot::Mutex<HandleState>,
    snapshot: parking_lot::Mutex<Snapshot>,
    status: parking_lot::Mutex<SessionStatus>,
    /// Serializes reattachments for this key.
    pub(crate) reattach_lock: tokio::sync::Mutex<()>,
    /// Monotonic per-key request generation; the supersession checkpoint
    /// compares against it after every suspension point.
    generation: AtomicU64,
    released: AtomicBool,
    observer: parking_lot::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl SessionHandle {
    pub(crate) fn new(
        key: SessionKey,
        requested_resource: ResourceUri,
        engine: Option<Arc<dyn PlaybackEngine>>,
    ) -> Self {
        let status = if engine.is_some() {
            SessionStatus::Unbound
        } else {
            SessionStatus::Error
        };
        Self {
            key,
            state: parking_lot::Mutex::new(HandleState {
                engine,
                bound_surface: Weak::new(),
                bound_surface_id: None,
                loaded_resource: None,
                requested_resource,
            }),
            snapshot: parking_lot::Mutex::new(Snapshot::default()),
            status: parking_lot::Mutex::new(status),
            reattach_lock: tokio::sync::Mutex::new(()),
            generation: AtomicU64::new(0),
            released: AtomicBool::new(false),
            observer: parking_lot::Mutex::new(None),
        }
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    pub fn status(&self) -> SessionStatus {
        *self.status.lock()
    }

    pub(crate) fn set_status(&self, status: SessionStatus) {
        *self.status.lock() = status;
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.lock().clone()
    }

    pub fn update_snapshot(&self, patch: &SnapshotPatch) {
        self.snapshot.lock().apply(patch);
    }

    /// Folds an engine-reported state into the snapshot. Last write wins.
    pub(crate) fn observe(&self, state: PlaybackState) {
        let mut snapshot = self.snapshot.lock();
        snapshot.position = state.position.max(0.0);
        snapshot.volume = state.volume.clamp(0.0, 1.0);
        snapshot.playing = state.playing;
    }

    pub fn engine(&self) -> Option<Arc<dyn PlaybackEngine>> {
        self.state.lock().engine.clone()
    }

    /// Installs an engine on a handle whose construction previously failed.
    /// Returns false when another retry won the race.
    pub(crate) fn install_engine(&self, engine: Arc<dyn PlaybackEngine>) -> bool {
        let mut state = self.state.lock();
        if state.engine.is_some() {
            return false;
        }
        state.engine = Some(engine);
        drop(state);
        self.set_status(SessionStatus::Unbound);
        true
    }

    pub fn loaded_resource(&self) -> Option<ResourceUri> {
        self.state.lock().loaded_resource.clone()
    }

    pub(crate) fn set_loaded_resource(&self, uri: ResourceUri) {
        self.state.lock().loaded_resource = Some(uri);
    }

    pub fn requested_resource(&self) -> ResourceUri {
        self.state.lock().requested_resource.clone()
    }

    pub(crate) fn set_requested_resource(&self, uri: ResourceUri) {
        self.state.lock().requested_resource = uri;
    }

    /// The surface currently bound, if its owner still holds it.
    pub fn bound_surface(&self) -> Option<Arc<Surface>> {
        self.state.lock().bound_surface.upgrade()
    }

    pub fn bound_surface_id(&self) -> Option<SurfaceId> {
        self.state.lock().bound_surface_id
    }

    pub(crate) fn set_bound_surface(&self, surface: &Arc<Surface>) {
        let mut state = self.state.lock();
        state.bound_surface = Arc::downgrade(surface);
        state.bound_surface_id = Some(surface.id());
    }

    /// Stamps a new request generation, invalidating every older in-flight
    /// reattachment for this key.
    pub(crate) fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether a request stamped with `generation` is still the newest one
    /// and the session has not been released.
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        !self.released.load(Ordering::SeqCst)
            && self.generation.load(Ordering::SeqCst) == generation
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    pub(crate) fn set_observer(&self, task: tokio::task::JoinHandle<()>) {
        if let Some(previous) = self.observer.lock().replace(task) {
            previous.abort();
        }
    }

    /// Marks the session released, fails the next supersession checkpoint of
    /// any in-flight reattachment, and hands the engine back for teardown.
    pub(crate) fn invalidate(&self) -> Option<Arc<dyn PlaybackEngine>> {
        self.released.store(true, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.observer.lock().take() {
            task.abort();
        }
        self.set_status(SessionStatus::Unbound);
        let mut state = self.state.lock();
        state.bound_surface = Weak::new();
        state.bound_surface_id = None;
        state.engine.take()
    }

    pub fn to_session_response(&self) -> crate::api::SessionView {
        crate::api::SessionView {
            key: self.key.clone(),
            status: self.status(),
            requested_resource: self.requested_resource(),
            loaded_resource: self.loaded_resource(),
            surface: self.bound_surface_id(),
            snapshot: self.snapshot(),
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if let Some(task) = self.observer.lock().take() {
            tracing::debug!("Aborting observer task for session {}", self.key);
            task.abort();
        }
    }
}

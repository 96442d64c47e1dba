//! Scriptable engine used by the session tests: counts calls, injects
//! failures, and can hold a load in flight behind a semaphore gate.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::common::types::{ResourceUri, SurfaceId};
use crate::session::engine::{EngineFactory, PlaybackEngine, PlaybackState, Surface};
use crate::session::errors::{BindError, CreationError, LoadError, ResumeError};

#[derive(Default)]
pub(crate) struct MockState {
    pub loaded: Option<ResourceUri>,
    pub position: f64,
    pub volume: f32,
    pub playing: bool,
    pub surface: Option<SurfaceId>,
    pub destroyed: bool,
}

#[derive(Default)]
pub(crate) struct MockEngine {
    /// Every `load` call in arrival order, recorded before the gate.
    pub loads: parking_lot::Mutex<Vec<ResourceUri>>,
    /// When set, each `load` consumes one permit before completing.
    pub load_gate: parking_lot::Mutex<Option<Arc<Semaphore>>>,
    pub fail_loads: AtomicBool,
    pub fail_bind: AtomicBool,
    /// `play` fails with `GestureRequired` while set.
    pub block_play: AtomicBool,
    /// `play` fails with `NotReady` this many times before succeeding.
    pub not_ready_plays: AtomicUsize,
    pub play_calls: AtomicUsize,
    pub destroy_calls: AtomicUsize,
    pub state: parking_lot::Mutex<MockState>,
}

impl MockEngine {
    fn new() -> Self {
        let engine = Self::default();
        engine.state.lock().volume = 1.0;
        engine
    }

    pub fn gate_loads(&self, gate: Arc<Semaphore>) {
        *self.load_gate.lock() = Some(gate);
    }
}

#[async_trait]
impl PlaybackEngine for MockEngine {
    fn bind(&self, surface: &Arc<Surface>) -> Result<(), BindError> {
        if self.fail_bind.load(Ordering::SeqCst) || self.state.lock().destroyed {
            return Err(BindError {
                surface: surface.id(),
                reason: "mock bind refused".to_string(),
            });
        }
        self.state.lock().surface = Some(surface.id());
        Ok(())
    }

    async fn load(&self, uri: &ResourceUri) -> Result<(), LoadError> {
        if self.state.lock().destroyed {
            return Err(LoadError::Gone);
        }
        self.loads.lock().push(uri.clone());
        let gate = self.load_gate.lock().clone();
        if let Some(gate) = gate {
            gate.acquire().await.expect("load gate closed").forget();
        }
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(LoadError::Failed {
                uri: uri.clone(),
                reason: "mock load failure".to_string(),
            });
        }
        let mut state = self.state.lock();
        state.loaded = Some(uri.clone());
        state.position = 0.0;
        state.playing = false;
        Ok(())
    }

    async fn loaded_resource(&self) -> Option<ResourceUri> {
        self.state.lock().loaded.clone()
    }

    async fn play(&self) -> Result<(), ResumeError> {
        if self.state.lock().destroyed {
            return Err(ResumeError::Gone);
        }
        self.play_calls.fetch_add(1, Ordering::SeqCst);
        if self.block_play.load(Ordering::SeqCst) {
            return Err(ResumeError::GestureRequired);
        }
        let remaining = self.not_ready_plays.load(Ordering::SeqCst);
        if remaining > 0 {
            self.not_ready_plays.store(remaining - 1, Ordering::SeqCst);
            return Err(ResumeError::NotReady(Duration::ZERO));
        }
        self.state.lock().playing = true;
        Ok(())
    }

    fn pause(&self) {
        self.state.lock().playing = false;
    }

    fn seek(&self, seconds: f64) {
        self.state.lock().position = seconds.max(0.0);
    }

    fn set_volume(&self, volume: f32) {
        self.state.lock().volume = volume.clamp(0.0, 1.0);
    }

    fn playback_state(&self) -> PlaybackState {
        let state = self.state.lock();
        PlaybackState {
            position: state.position,
            volume: state.volume,
            playing: state.playing,
        }
    }

    fn destroy(&self) {
        self.destroy_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        state.destroyed = true;
        state.playing = false;
    }
}

#[derive(Default)]
pub(crate) struct MockFactory {
    pub created: AtomicUsize,
    pub fail_next: AtomicBool,
    pub engines: parking_lot::Mutex<Vec<Arc<MockEngine>>>,
}

impl MockFactory {
    pub fn latest(&self) -> Arc<MockEngine> {
        self.engines.lock().last().expect("no engine created yet").clone()
    }
}

impl EngineFactory for MockFactory {
    fn create(&self) -> Result<Arc<dyn PlaybackEngine>, CreationError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(CreationError("mock construction refused".to_string()));
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        let engine = Arc::new(MockEngine::new());
        self.engines.lock().push(engine.clone());
        Ok(engine)
    }
}

//! Default engine: realizes the playback capability over HTTP. `load`
//! fetches the manifest to validate it; the playback clock is modelled
//! locally so sessions have live positions without a real decoder attached.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::common::types::{ResourceUri, SurfaceId};
use crate::session::engine::{EngineFactory, PlaybackEngine, PlaybackState, Surface};
use crate::session::errors::{BindError, CreationError, LoadError, ResumeError};

struct EngineModel {
    loaded: Option<ResourceUri>,
    /// Position at the last play/pause/seek edge.
    base_position: f64,
    playing_since: Option<Instant>,
    volume: f32,
    /// Buffer warm-up: `play` is refused until this instant.
    ready_at: Option<Instant>,
    surface: Option<SurfaceId>,
    destroyed: bool,
}

pub struct HttpStreamEngine {
    client: reqwest::Client,
    base_url: String,
    ready_delay: Duration,
    model: parking_lot::Mutex<EngineModel>,
}

impl HttpStreamEngine {
    fn new(client: reqwest::Client, base_url: String, ready_delay: Duration) -> Self {
        Self {
            client,
            base_url,
            ready_delay,
            model: parking_lot::Mutex::new(EngineModel {
                loaded: None,
                base_position: 0.0,
                playing_since: None,
                volume: 1.0,
                ready_at: None,
                surface: None,
                destroyed: false,
            }),
        }
    }

    fn resolve(&self, uri: &ResourceUri) -> String {
        if uri.starts_with("http://") || uri.starts_with("https://") {
            uri.to_string()
        } else {
            format!("{}{}", self.base_url.trim_end_matches('/'), uri.0)
        }
    }
}

impl EngineModel {
    fn position(&self) -> f64 {
        match self.playing_since {
            Some(since) => self.base_position + since.elapsed().as_secs_f64(),
            None => self.base_position,
        }
    }

    /// Folds elapsed play time into the base so the clock can be re-edged.
    fn settle(&mut self) {
        self.base_position = self.position();
        if self.playing_since.is_some() {
            self.playing_since = Some(Instant::now());
        }
    }
}

#[async_trait]
impl PlaybackEngine for HttpStreamEngine {
    fn bind(&self, surface: &Arc<Surface>) -> Result<(), BindError> {
        let mut model = self.model.lock();
        if model.destroyed {
            return Err(BindError {
                surface: surface.id(),
                reason: "engine destroyed".to_string(),
            });
        }
        model.surface = Some(surface.id());
        Ok(())
    }

    async fn load(&self, uri: &ResourceUri) -> Result<(), LoadError> {
        if self.model.lock().destroyed {
            return Err(LoadError::Gone);
        }
        let url = self.resolve(uri);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|err| LoadError::Failed {
                uri: uri.clone(),
                reason: err.to_string(),
            })?;
        // Pull the whole manifest so the fetch stands in for priming buffers.
        let _ = response.bytes().await.map_err(|err| LoadError::Failed {
            uri: uri.clone(),
            reason: err.to_string(),
        })?;

        let mut model = self.model.lock();
        if model.destroyed {
            return Err(LoadError::Gone);
        }
        model.loaded = Some(uri.clone());
        model.base_position = 0.0;
        model.playing_since = None;
        model.ready_at = Some(Instant::now() + self.ready_delay);
        Ok(())
    }

    async fn loaded_resource(&self) -> Option<ResourceUri> {
        self.model.lock().loaded.clone()
    }

    async fn play(&self) -> Result<(), ResumeError> {
        let mut model = self.model.lock();
        if model.destroyed {
            return Err(ResumeError::Gone);
        }
        let Some(ready_at) = model.ready_at else {
            // Nothing loaded yet; buffers cannot become ready.
            return Err(ResumeError::NotReady(self.ready_delay));
        };
        let now = Instant::now();
        if now < ready_at {
            return Err(ResumeError::NotReady(ready_at - now));
        }
        if model.playing_since.is_none() {
            model.playing_since = Some(now);
        }
        Ok(())
    }

    fn pause(&self) {
        let mut model = self.model.lock();
        model.settle();
        model.playing_since = None;
    }

    fn seek(&self, seconds: f64) {
        let mut model = self.model.lock();
        model.base_position = seconds.max(0.0);
        if model.playing_since.is_some() {
            model.playing_since = Some(Instant::now());
        }
    }

    fn set_volume(&self, volume: f32) {
        self.model.lock().volume = volume.clamp(0.0, 1.0);
    }

    fn playback_state(&self) -> PlaybackState {
        let model = self.model.lock();
        PlaybackState {
            position: model.position(),
            volume: model.volume,
            playing: model.playing_since.is_some(),
        }
    }

    fn destroy(&self) {
        let mut model = self.model.lock();
        model.destroyed = true;
        model.playing_since = None;
        model.ready_at = None;
    }
}

pub struct HttpEngineFactory {
    client: reqwest::Client,
    base_url: String,
    ready_delay: Duration,
}

impl HttpEngineFactory {
    pub fn new(client: reqwest::Client, base_url: String, ready_delay: Duration) -> Self {
        Self {
            client,
            base_url,
            ready_delay,
        }
    }
}

impl EngineFactory for HttpEngineFactory {
    fn create(&self) -> Result<Arc<dyn PlaybackEngine>, CreationError> {
        Ok(Arc::new(HttpStreamEngine::new(
            self.client.clone(),
            self.base_url.clone(),
            self.ready_delay,
        )))
    }
}

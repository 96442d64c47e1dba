use std::sync::Arc;

use dashmap::DashMap;

use crate::common::types::{ResourceUri, SessionKey};
use crate::configs::PlaybackConfig;
use crate::session::engine::{EngineFactory, Surface};
use crate::session::errors::SessionError;
use crate::session::handle::{SessionHandle, SessionStatus};
use crate::session::reattach::{self, ReattachReport};
use crate::session::snapshot::{Snapshot, SnapshotPatch};

/// Keyed store of media sessions: the single point of creation, lookup and
/// teardown. Explicitly constructed and owned by the application state so
/// tests build isolated instances.
///
/// One engine exists per live key. Sessions survive consumer churn; only
/// `release` destroys an engine.
pub struct SessionRegistry {
    handles: DashMap<SessionKey, Arc<SessionHandle>>,
    factory: Arc<dyn EngineFactory>,
    playback: PlaybackConfig,
}

impl SessionRegistry {
    pub fn new(factory: Arc<dyn EngineFactory>, playback: PlaybackConfig) -> Self {
        Self {
            handles: DashMap::new(),
            factory,
            playback,
        }
    }

    /// Idempotent get-or-create. Concurrent acquires for one unseen key
    /// observe exactly one engine construction: the insertion runs under the
    /// map's per-key entry guard.
    ///
    /// Construction failure is not an error here; the handle comes back with
    /// status `Error` and the next acquire retries in place.
    pub fn acquire(&self, key: &SessionKey, desired: &ResourceUri) -> Arc<SessionHandle> {
        let mut created_now = false;
        let handle = self
            .handles
            .entry(key.clone())
            .or_insert_with(|| {
                created_now = true;
                tracing::info!("Creating media session for {}", key);
                let engine = match self.factory.create() {
                    Ok(engine) => Some(engine),
                    Err(err) => {
                        tracing::error!("Engine construction for {} failed: {}", key, err);
                        None
                    }
                };
                Arc::new(SessionHandle::new(key.clone(), desired.clone(), engine))
            })
            .clone();

        if !created_now && handle.engine().is_none() && !handle.is_released() {
            match self.factory.create() {
                Ok(engine) => {
                    if !handle.install_engine(engine.clone()) {
                        // Lost the retry race; ours is surplus.
                        engine.destroy();
                    }
                }
                Err(err) => {
                    tracing::error!("Engine construction for {} failed again: {}", key, err);
                }
            }
        }

        handle
    }

    /// Binds `surface` to the session for `key` (creating it if needed),
    /// reloading only when the engine disagrees with `desired`, then restores
    /// the snapshot. Serialized per key; a newer call supersedes an older
    /// in-flight one. Last bind wins: the previously bound consumer is
    /// silently displaced.
    pub async fn reattach(
        &self,
        key: &SessionKey,
        surface: &Arc<Surface>,
        desired: &ResourceUri,
    ) -> Result<ReattachReport, SessionError> {
        let handle = self.acquire(key, desired);
        let report = reattach::run(&handle, surface, desired, &self.playback).await?;
        if report.status == SessionStatus::Ready && !handle.is_released() {
            self.spawn_observer(handle);
        }
        Ok(report)
    }

    /// Destroys the engine and forgets the session. No-op for an absent key.
    /// Safe against an in-flight reattachment for the same key: that request
    /// fails its next supersession checkpoint and never touches the engine
    /// again.
    pub fn release(&self, key: &SessionKey) -> bool {
        let Some((_, handle)) = self.handles.remove(key) else {
            return false;
        };
        tracing::info!("Releasing media session for {}", key);
        if let Some(engine) = handle.invalidate() {
            engine.destroy();
        }
        true
    }

    pub fn release_all(&self) {
        let keys: Vec<SessionKey> = self.handles.iter().map(|e| e.key().clone()).collect();
        for key in keys {
            self.release(&key);
        }
    }

    /// Fire-and-forget snapshot merge from playback-event observation. Never
    /// serialized with reattachment; the restore step reads whatever is
    /// latest when it runs.
    pub fn update_snapshot(&self, key: &SessionKey, patch: &SnapshotPatch) -> bool {
        match self.handles.get(key) {
            Some(handle) => {
                handle.update_snapshot(patch);
                true
            }
            None => false,
        }
    }

    pub fn get_snapshot(&self, key: &SessionKey) -> Option<Snapshot> {
        self.handles.get(key).map(|handle| handle.snapshot())
    }

    pub fn has(&self, key: &SessionKey) -> bool {
        self.handles.contains_key(key)
    }

    pub fn get(&self, key: &SessionKey) -> Option<Arc<SessionHandle>> {
        self.handles.get(key).map(|entry| entry.value().clone())
    }

    pub fn sessions(&self) -> Vec<Arc<SessionHandle>> {
        self.handles.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Periodically folds the engine's own playback state into the snapshot,
    /// so the session view stays fresh without consumers pushing updates.
    fn spawn_observer(&self, handle: Arc<SessionHandle>) {
        let interval = self.playback.observe_interval();
        let task_handle = handle.clone();
        let task = tokio::spawn(async move {
            // First observation one interval from now; the reattach that
            // spawned us has just written authoritative state.
            let mut ticker =
                tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            loop {
                ticker.tick().await;
                if task_handle.is_released() {
                    break;
                }
                let Some(engine) = task_handle.engine() else {
                    break;
                };
                task_handle.observe(engine.playback_state());
            }
        });
        handle.set_observer(task);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::session::mock::MockFactory;

    fn registry_with(factory: &Arc<MockFactory>) -> Arc<SessionRegistry> {
        Arc::new(SessionRegistry::new(
            factory.clone(),
            PlaybackConfig::default(),
        ))
    }

    #[tokio::test]
    async fn concurrent_acquires_create_one_engine() {
        let factory = Arc::new(MockFactory::default());
        let registry = registry_with(&factory);
        let key: SessionKey = "mix_tape".into();
        let uri: ResourceUri = "/stream/mix_tape/manifest".into();

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let registry = registry.clone();
            let key = key.clone();
            let uri = uri.clone();
            tasks.push(tokio::spawn(
                async move { registry.acquire(&key, &uri) },
            ));
        }

        let handles: Vec<_> = futures::future::join_all(tasks)
            .await
            .into_iter()
            .map(|task| task.unwrap())
            .collect();

        assert_eq!(factory.created.load(Ordering::SeqCst), 1);
        for handle in &handles[1..] {
            assert!(Arc::ptr_eq(&handles[0], handle));
        }
        assert_eq!(handles[0].status(), SessionStatus::Unbound);
    }

    #[tokio::test]
    async fn creation_failure_marks_error_and_next_acquire_retries() {
        let factory = Arc::new(MockFactory::default());
        factory.fail_next.store(true, Ordering::SeqCst);
        let registry = registry_with(&factory);
        let key: SessionKey = "broken".into();
        let uri: ResourceUri = "/stream/broken/manifest".into();

        let handle = registry.acquire(&key, &uri);
        assert_eq!(handle.status(), SessionStatus::Error);
        assert!(handle.engine().is_none());
        assert!(registry.has(&key));

        // Same handle identity, engine installed on retry.
        let retried = registry.acquire(&key, &uri);
        assert!(Arc::ptr_eq(&handle, &retried));
        assert_eq!(retried.status(), SessionStatus::Unbound);
        assert!(retried.engine().is_some());
        assert_eq!(factory.created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn release_destroys_engine_and_next_acquire_starts_fresh() {
        let factory = Arc::new(MockFactory::default());
        let registry = registry_with(&factory);
        let key: SessionKey = "song".into();
        let uri: ResourceUri = "/stream/song/manifest".into();

        registry.acquire(&key, &uri);
        registry.update_snapshot(
            &key,
            &SnapshotPatch {
                position: Some(99.0),
                volume: Some(0.2),
                playing: Some(true),
            },
        );

        assert!(registry.release(&key));
        assert!(!registry.has(&key));
        assert_eq!(factory.engines.lock()[0].destroy_calls.load(Ordering::SeqCst), 1);

        let fresh = registry.acquire(&key, &uri);
        assert_eq!(factory.created.load(Ordering::SeqCst), 2);
        assert_eq!(fresh.snapshot(), Snapshot::default());
        assert_eq!(fresh.status(), SessionStatus::Unbound);
        assert!(fresh.loaded_resource().is_none());
    }

    #[tokio::test]
    async fn release_of_absent_key_is_noop() {
        let factory = Arc::new(MockFactory::default());
        let registry = registry_with(&factory);
        assert!(!registry.release(&"nothing".into()));
    }

    #[tokio::test]
    async fn snapshot_ops_on_absent_key() {
        let factory = Arc::new(MockFactory::default());
        let registry = registry_with(&factory);
        let key: SessionKey = "ghost".into();

        assert!(!registry.has(&key));
        assert!(registry.get_snapshot(&key).is_none());
        assert!(!registry.update_snapshot(&key, &SnapshotPatch::position(5.0)));
    }

    #[tokio::test]
    async fn release_all_clears_every_session() {
        let factory = Arc::new(MockFactory::default());
        let registry = registry_with(&factory);
        for name in ["a", "b", "c"] {
            registry.acquire(&name.into(), &format!("/stream/{name}/manifest").into());
        }

        registry.release_all();

        assert!(registry.sessions().is_empty());
        for engine in factory.engines.lock().iter() {
            assert_eq!(engine.destroy_calls.load(Ordering::SeqCst), 1);
        }
    }
}

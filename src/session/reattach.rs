//! The reattachment protocol: bind a (possibly new) surface to a session,
//! reload only when the engine disagrees with the desired resource, and
//! restore the snapshot — serialized per key, superseded by newer requests.

use std::sync::Arc;

use crate::common::types::ResourceUri;
use crate::configs::PlaybackConfig;
use crate::session::engine::{PlaybackEngine, Surface};
use crate::session::errors::{CreationError, ResumeError, SessionError};
use crate::session::handle::{SessionHandle, SessionStatus};

/// What a reattachment accomplished.
#[derive(Debug, Clone, PartialEq)]
pub struct ReattachReport {
    /// Session status when the request finished. A superseded request reports
    /// whatever status the newer request left behind.
    pub status: SessionStatus,
    /// Set when the snapshot asked for playback but resuming failed. The
    /// session stays usable; an explicit play may still succeed.
    pub resume: Option<ResumeError>,
}

enum ResumeOutcome {
    Done,
    Blocked(ResumeError),
    Superseded,
}

/// A request that lost the supersession race resolves as if it had simply
/// finished: the newer request owns the session state.
fn superseded(handle: &SessionHandle) -> Result<ReattachReport, SessionError> {
    tracing::debug!("Reattach for {} superseded, discarding result", handle.key());
    Ok(ReattachReport {
        status: handle.status(),
        resume: None,
    })
}

pub(crate) async fn run(
    handle: &Arc<SessionHandle>,
    surface: &Arc<Surface>,
    desired: &ResourceUri,
    timing: &PlaybackConfig,
) -> Result<ReattachReport, SessionError> {
    // Stamp before taking the lock: a request that arrives while an older one
    // is loading invalidates it immediately.
    let generation = handle.next_generation();
    let _guard = handle.reattach_lock.lock().await;

    if !handle.is_current(generation) {
        return superseded(handle);
    }

    let Some(engine) = handle.engine() else {
        return Err(SessionError::Creation(CreationError(
            "no engine; previous construction failed".to_string(),
        )));
    };

    handle.set_requested_resource(desired.clone());

    // Bind is cheap and has no network effect. The previous surface is
    // silently displaced: last bind wins.
    engine.bind(surface)?;
    handle.set_bound_surface(surface);
    tracing::debug!(
        "Bound surface {} to session {}",
        surface.id(),
        handle.key()
    );

    // The engine, not the cached field, decides whether a reload is needed.
    let resolved = engine.loaded_resource().await;
    if !handle.is_current(generation) {
        return superseded(handle);
    }

    if resolved.as_ref() == Some(desired) {
        tracing::debug!(
            "Session {} already has {} loaded, skipping reload",
            handle.key(),
            desired
        );
    } else {
        handle.set_status(SessionStatus::Loading);
        match engine.load(desired).await {
            Ok(()) => {
                if !handle.is_current(generation) {
                    return superseded(handle);
                }
                handle.set_loaded_resource(desired.clone());
            }
            Err(err) => {
                if !handle.is_current(generation) {
                    return superseded(handle);
                }
                // Cached resource stays untouched; the caller may retry.
                handle.set_status(SessionStatus::Error);
                tracing::warn!("Load of {} for session {} failed: {}", desired, handle.key(), err);
                return Err(err.into());
            }
        }
    }

    // Restore from the snapshot as it is *now*, not as captured when the
    // request started: observation may have moved it while we loaded.
    let snapshot = handle.snapshot();
    engine.set_volume(snapshot.volume);
    engine.seek(snapshot.position);
    handle.set_status(SessionStatus::Ready);

    let resume = if snapshot.playing {
        match resume_with_deadline(handle, engine.as_ref(), generation, timing).await {
            ResumeOutcome::Done => None,
            ResumeOutcome::Blocked(err) => {
                tracing::warn!("Resume for session {} failed: {}", handle.key(), err);
                Some(err)
            }
            ResumeOutcome::Superseded => return superseded(handle),
        }
    } else {
        None
    };

    Ok(ReattachReport {
        status: handle.status(),
        resume,
    })
}

/// Retries `play` until the engine is ready, the deadline passes, or the
/// request stops being current. A deadline miss is recoverable, never fatal.
async fn resume_with_deadline(
    handle: &SessionHandle,
    engine: &dyn PlaybackEngine,
    generation: u64,
    timing: &PlaybackConfig,
) -> ResumeOutcome {
    let deadline = tokio::time::Instant::now() + timing.resume_timeout();
    loop {
        if !handle.is_current(generation) {
            return ResumeOutcome::Superseded;
        }
        match engine.play().await {
            Ok(()) => return ResumeOutcome::Done,
            Err(ResumeError::NotReady(_)) => {
                if tokio::time::Instant::now() + timing.resume_poll() > deadline {
                    return ResumeOutcome::Blocked(ResumeError::NotReady(
                        timing.resume_timeout(),
                    ));
                }
                tokio::time::sleep(timing.resume_poll()).await;
            }
            Err(err) => return ResumeOutcome::Blocked(err),
        }
    }
}

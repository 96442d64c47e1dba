//! Media sessions: playback engines that outlive the consumers that created
//! them. The registry is the single point of creation, lookup and teardown;
//! the reattachment protocol moves a session between render surfaces without
//! redundant reloads or lost playback state.

pub mod engine;
pub mod errors;
pub mod handle;
pub mod http_engine;
pub mod reattach;
pub mod registry;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod mock;

pub use engine::{EngineFactory, PlaybackEngine, PlaybackState, Surface};
pub use errors::{BindError, CreationError, LoadError, ResumeError, SessionError};
pub use handle::{SessionHandle, SessionStatus};
pub use http_engine::{HttpEngineFactory, HttpStreamEngine};
pub use reattach::ReattachReport;
pub use registry::SessionRegistry;
pub use snapshot::{Snapshot, SnapshotPatch};

use crate::configs::Config;
use crate::library::MediaLibrary;
use crate::segmenter::Segmenter;
use crate::session::SessionRegistry;

/// Top-level application state. Explicitly constructed in `main` (and in
/// tests) rather than living in module-level globals, so instances stay
/// isolated and tear down cleanly.
pub struct AppState {
    pub config: Config,
    pub registry: SessionRegistry,
    pub library: MediaLibrary,
    pub segmenter: Segmenter,
}

pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

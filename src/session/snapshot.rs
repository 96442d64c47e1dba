use serde::{Deserialize, Serialize};

/// Minimal serializable playback state carried across reattachment.
///
/// Continuously overwritten by playback-event observation; read back by the
/// restore step of a reattach. Last write wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Playback position in seconds.
    pub position: f64,
    /// Volume in `[0, 1]`.
    pub volume: f32,
    pub playing: bool,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            position: 0.0,
            volume: 1.0,
            playing: false,
        }
    }
}

impl Snapshot {
    pub fn apply(&mut self, patch: &SnapshotPatch) {
        if let Some(position) = patch.position {
            self.position = position.max(0.0);
        }
        if let Some(volume) = patch.volume {
            self.volume = volume.clamp(0.0, 1.0);
        }
        if let Some(playing) = patch.playing {
            self.playing = playing;
        }
    }
}

/// Partial snapshot update. Omitted fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPatch {
    #[serde(default)]
    pub position: Option<f64>,
    #[serde(default)]
    pub volume: Option<f32>,
    #[serde(default)]
    pub playing: Option<bool>,
}

impl SnapshotPatch {
    pub fn position(position: f64) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SegmenterConfig {
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,
    /// AAC bitrate passed to ffmpeg, e.g. "128k".
    #[serde(default = "default_bitrate")]
    pub bitrate: String,
    #[serde(default = "default_segment_seconds")]
    pub segment_seconds: u32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            bitrate: default_bitrate(),
            segment_seconds: default_segment_seconds(),
        }
    }
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_bitrate() -> String {
    "128k".to_string()
}

fn default_segment_seconds() -> u32 {
    4
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    /// Directory where raw uploads are parked until segmentation finishes.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Directory holding one subdirectory of manifest + segments per file.
    #[serde(default = "default_segments_dir")]
    pub segments_dir: String,
    /// Maximum accepted upload size.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            segments_dir: default_segments_dir(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_segments_dir() -> String {
    "segments".to_string()
}

fn default_max_upload_mb() -> usize {
    512
}

//! Filesystem catalog of segmented files: one directory per processed
//! upload, valid only when it contains a manifest.

use std::path::{Path, PathBuf};

use crate::segmenter::MANIFEST_NAME;

#[derive(Debug, Clone, PartialEq)]
pub struct MediaFile {
    pub name: String,
    pub manifest_url: String,
}

pub struct MediaLibrary {
    segments_dir: PathBuf,
}

impl MediaLibrary {
    pub fn new(segments_dir: impl Into<PathBuf>) -> Self {
        Self {
            segments_dir: segments_dir.into(),
        }
    }

    pub fn segments_dir(&self) -> &Path {
        &self.segments_dir
    }

    pub fn entry_dir(&self, name: &str) -> Option<PathBuf> {
        if !is_safe_component(name) {
            return None;
        }
        Some(self.segments_dir.join(name))
    }

    /// Lists every directory holding a manifest.
    pub async fn scan(&self) -> std::io::Result<Vec<MediaFile>> {
        let mut files = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.segments_dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(files),
            Err(err) => return Err(err),
        };
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if tokio::fs::try_exists(entry.path().join(MANIFEST_NAME)).await? {
                files.push(MediaFile {
                    manifest_url: format!("/stream/{}/manifest", name),
                    name,
                });
            }
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Path of the manifest for `name`, if the entry exists.
    pub async fn manifest_path(&self, name: &str) -> Option<PathBuf> {
        let path = self.entry_dir(name)?.join(MANIFEST_NAME);
        tokio::fs::try_exists(&path).await.ok()?.then_some(path)
    }

    /// Path of one media segment, traversal-safe.
    pub async fn segment_path(&self, name: &str, segment: &str) -> Option<PathBuf> {
        if !is_safe_component(segment) {
            return None;
        }
        let path = self.entry_dir(name)?.join(segment);
        tokio::fs::try_exists(&path).await.ok()?.then_some(path)
    }

    /// Deletes the whole entry. Returns false when it did not exist.
    pub async fn remove(&self, name: &str) -> std::io::Result<bool> {
        let Some(dir) = self.entry_dir(name) else {
            return Ok(false);
        };
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }
}

/// A single path component: no separators, no parent escapes.
fn is_safe_component(value: &str) -> bool {
    !value.is_empty()
        && value != "."
        && value != ".."
        && !value.contains('/')
        && !value.contains('\\')
}

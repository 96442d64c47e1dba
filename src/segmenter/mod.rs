//! Turns an uploaded audio file into a DASH manifest plus segments by
//! driving ffmpeg as an external tool.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::process::Command;

use crate::configs::SegmenterConfig;

pub const MANIFEST_NAME: &str = "manifest.mpd";

#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ffmpeg exited with {status}: {stderr}")]
    Ffmpeg { status: i32, stderr: String },
}

pub struct Segmenter {
    config: SegmenterConfig,
}

impl Segmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    /// Segments `input` into `output_dir/manifest.mpd` + media segments.
    /// ffmpeg runs with the output directory as its working directory so the
    /// manifest references segments by bare name.
    pub async fn segment(&self, input: &Path, output_dir: &Path) -> Result<(), SegmentError> {
        tokio::fs::create_dir_all(output_dir).await?;

        let input = tokio::fs::canonicalize(input).await?;
        let output_dir = tokio::fs::canonicalize(output_dir).await?;

        tracing::info!(
            "Segmenting {} into {}",
            input.display(),
            output_dir.display()
        );

        let output = Command::new(&self.config.ffmpeg_path)
            .current_dir(&output_dir)
            .arg("-y")
            .args(["-i".as_ref(), input.as_os_str()])
            .args(["-c:a", "aac", "-b:a", &self.config.bitrate])
            .args(["-map", "0:a:0"])
            .args(["-f", "dash"])
            .args(["-seg_duration", &self.config.segment_seconds.to_string()])
            .args(["-use_timeline", "1"])
            .args(["-use_template", "1"])
            .args(["-init_seg_name", "init_$RepresentationID$.m4s"])
            .args(["-media_seg_name", "chunk_$RepresentationID$_$Number%05d$.m4s"])
            .arg(MANIFEST_NAME)
            .output()
            .await?;

        if !output.status.success() {
            return Err(SegmentError::Ffmpeg {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(())
    }
}

/// Normalizes an upload name into a stable identifier: periods and commas are
/// stripped from the stem, every other non-alphanumeric run becomes `_`, and
/// the extension is kept.
pub fn standardize_filename(original: &str) -> PathBuf {
    let path = Path::new(original);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("upload");
    let extension = path.extension().and_then(|s| s.to_str());

    let cleaned = stem.replace(['.', ','], "");
    let underscored = regex::Regex::new(r"[^a-zA-Z0-9]")
        .unwrap()
        .replace_all(&cleaned, "_")
        .into_owned();

    match extension {
        Some(ext) => PathBuf::from(format!("{}.{}", underscored, ext)),
        None => PathBuf::from(underscored),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn segmenting_missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let segmenter = Segmenter::new(SegmenterConfig::default());
        let err = segmenter
            .segment(&dir.path().join("nonexistent.mp3"), &dir.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, SegmentError::Io(_)));
    }

    #[tokio::test]
    async fn converter_failure_surfaces_exit_status() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.mp3");
        std::fs::write(&input, b"not really audio").unwrap();

        let segmenter = Segmenter::new(SegmenterConfig {
            ffmpeg_path: "false".to_string(),
            ..SegmenterConfig::default()
        });
        let err = segmenter
            .segment(&input, &dir.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, SegmentError::Ffmpeg { status: 1, .. }));
    }

    #[test]
    fn standardize_replaces_special_characters() {
        assert_eq!(
            standardize_filename("My Song (Live) [2024].mp3"),
            PathBuf::from("My_Song__Live___2024_.mp3")
        );
    }

    #[test]
    fn standardize_strips_periods_and_commas_from_stem() {
        assert_eq!(
            standardize_filename("a.b,c.flac"),
            PathBuf::from("abc.flac")
        );
    }

    #[test]
    fn standardize_keeps_plain_names() {
        assert_eq!(
            standardize_filename("already_clean.wav"),
            PathBuf::from("already_clean.wav")
        );
    }
}

//! ffmpeg/ffprobe wrappers.
//!
//! Audio extraction for transcription, clip cutting for shorts, and audio splitting
//! for engines with an upload size limit.

use super::MediaEncoder;
use crate::error::{Result, ShortsError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// `MediaEncoder` backed by the ffmpeg binary.
#[derive(Debug, Clone, Default)]
pub struct FfmpegEncoder;

impl FfmpegEncoder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MediaEncoder for FfmpegEncoder {
    #[instrument(skip(self), fields(video = %video.display()))]
    async fn extract_audio(&self, video: &Path, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let result = Command::new("ffmpeg")
            .arg("-i").arg(video)
            .arg("-vn")
            .arg("-acodec").arg("pcm_s16le")
            .arg("-ac").arg("1")
            .arg("-ar").arg("16000")
            .arg("-y")
            .arg("-loglevel").arg("error")
            .arg(dest)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        match result {
            Ok(out) if out.status.success() => {
                info!("Audio extracted to {}", dest.display());
                Ok(())
            }
            Ok(out) => {
                let err = String::from_utf8_lossy(&out.stderr);
                Err(ShortsError::Transcription(format!(
                    "Audio extraction failed: {}",
                    err.trim()
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ShortsError::ToolNotFound("ffmpeg".into()))
            }
            Err(e) => Err(ShortsError::Transcription(format!("ffmpeg error: {e}"))),
        }
    }

    #[instrument(skip(self), fields(dest = %dest.display()))]
    async fn cut_clip(&self, source: &Path, start: f64, duration: f64, dest: &Path) -> Result<()> {
        let result = Command::new("ffmpeg")
            .arg("-ss").arg(format!("{:.3}", start))
            .arg("-i").arg(source)
            .arg("-t").arg(format!("{:.3}", duration))
            .arg("-c:v").arg("libx264")
            .arg("-preset").arg("medium")
            .arg("-crf").arg("23")
            .arg("-c:a").arg("aac")
            .arg("-movflags").arg("+faststart")
            .arg("-y")
            .arg("-loglevel").arg("error")
            .arg(dest)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        match result {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => {
                let err = String::from_utf8_lossy(&out.stderr);
                Err(ShortsError::Extraction(format!("ffmpeg failed: {}", err.trim())))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ShortsError::ToolNotFound("ffmpeg".into()))
            }
            Err(e) => Err(ShortsError::Extraction(format!("ffmpeg error: {e}"))),
        }
    }
}

/// Segments a long audio file into smaller chunks for processing.
///
/// Each chunk will be approximately `chunk_seconds` long. Returns tuples of
/// (chunk_path, offset_seconds) for each segment.
#[instrument(skip_all)]
pub async fn split_audio(
    source: &Path,
    output_dir: &Path,
    chunk_seconds: u32,
) -> Result<Vec<(PathBuf, f64)>> {
    std::fs::create_dir_all(output_dir)?;

    let total_duration = probe_duration(source).await?;
    info!("Total audio duration: {:.1}s", total_duration);

    let chunk_len = chunk_seconds as f64;

    if total_duration <= chunk_len {
        return Ok(vec![(source.to_path_buf(), 0.0)]);
    }

    let base_name = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");
    let extension = source
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("wav");

    let mut segments = Vec::new();
    let mut idx = 0u32;
    let mut offset = 0.0;

    while offset < total_duration {
        let segment_path = output_dir.join(format!("{}_{:04}.{}", base_name, idx, extension));
        let segment_len = chunk_len.min(total_duration - offset);

        copy_segment(source, &segment_path, offset, segment_len).await?;

        debug!("Created segment {} at offset {:.1}s", idx, offset);
        segments.push((segment_path, offset));

        idx += 1;
        offset = idx as f64 * chunk_len;
    }

    info!("Created {} audio segments", segments.len());
    Ok(segments)
}

/// Copies a time range of an audio file without re-encoding.
async fn copy_segment(source: &Path, dest: &Path, start: f64, length: f64) -> Result<()> {
    let result = Command::new("ffmpeg")
        .arg("-ss").arg(format!("{:.3}", start))
        .arg("-i").arg(source)
        .arg("-t").arg(format!("{:.3}", length))
        .arg("-c").arg("copy")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(ShortsError::Transcription(format!(
                "Audio split failed: {}",
                err.trim()
            )))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ShortsError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(ShortsError::Transcription(format!("ffmpeg error: {e}"))),
    }
}

/// Queries the duration of a media file using ffprobe with JSON output.
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let result = Command::new("ffprobe")
        .arg("-v").arg("quiet")
        .arg("-print_format").arg("json")
        .arg("-show_format")
        .arg(path)
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ShortsError::ToolNotFound("ffprobe".into()));
        }
        Err(e) => {
            return Err(ShortsError::ToolFailed(format!("ffprobe failed: {e}")));
        }
    };

    if !output.status.success() {
        return Err(ShortsError::ToolFailed("ffprobe returned error".into()));
    }

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout)
        .map_err(|_| ShortsError::ToolFailed("Invalid ffprobe output".into()))?;

    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| ShortsError::ToolFailed("Could not determine media duration".into()))
}

//! Media encoding collaborators.

mod ffmpeg;

pub use ffmpeg::{probe_duration, split_audio, FfmpegEncoder};

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Trait for the encoder that turns source video into audio and clips.
#[async_trait]
pub trait MediaEncoder: Send + Sync {
    /// Extract a mono 16 kHz WAV track suitable for transcription.
    async fn extract_audio(&self, video: &Path, dest: &Path) -> Result<()>;

    /// Cut `duration` seconds starting at `start` into `dest`, overwriting it.
    async fn cut_clip(&self, source: &Path, start: f64, duration: f64, dest: &Path) -> Result<()>;
}

//! Video source acquisition for shortsmith.
//!
//! Provides a trait-based interface for resolving an input (remote URL or local path)
//! into a video file on disk plus its metadata.

mod local;
mod remote;

pub use local::LocalProvider;
pub use remote::{CredentialStrategy, RemoteProvider};

use crate::config::Settings;
use crate::error::{Result, ShortsError};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Type of video source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Remote,
    Local,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::Remote => write!(f, "remote"),
            SourceType::Local => write!(f, "local"),
        }
    }
}

/// A resolved video, ready for processing. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSource {
    /// Unique identifier.
    pub id: String,
    /// Title.
    pub title: String,
    /// Duration in seconds.
    pub duration: f64,
    /// Local file holding the video.
    pub file_path: PathBuf,
    /// Channel, author, or "Local File".
    pub uploader: Option<String>,
    /// Publication date (if available).
    pub upload_date: Option<NaiveDate>,
    /// The input this video was resolved from.
    pub source_url: String,
    /// Type of source.
    pub source_type: SourceType,
}

impl VideoSource {
    /// Format seconds as MM:SS or HH:MM:SS.
    pub fn format_duration(&self) -> String {
        crate::transcription::format_timestamp(self.duration)
    }
}

/// Trait for video acquisition providers.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Get the source type.
    fn source_type(&self) -> SourceType;

    /// Check if this provider can handle the given input.
    fn can_handle(&self, input: &str) -> bool;

    /// Resolve the input into a local video file, placing downloads in `work_dir`.
    async fn acquire(&self, input: &str, work_dir: &Path) -> Result<VideoSource>;
}

/// Build the default provider chain: local files first, then remote URLs.
pub fn default_providers(settings: &Settings) -> Vec<Box<dyn VideoProvider>> {
    let local: Box<dyn VideoProvider> = Box::new(LocalProvider::new());
    let remote: Box<dyn VideoProvider> = Box::new(RemoteProvider::from_settings(settings));
    vec![local, remote]
}

/// Pick the first provider that claims the input.
pub fn detect_provider<'a>(
    providers: &'a [Box<dyn VideoProvider>],
    input: &str,
) -> Result<&'a dyn VideoProvider> {
    providers
        .iter()
        .find(|p| p.can_handle(input))
        .map(|p| &**p)
        .ok_or_else(|| {
            ShortsError::InvalidInput(format!(
                "Not an existing file or a recognized video URL: {}",
                input
            ))
        })
}

/// Whether the input refers to a remote video (used for preflight checks).
pub fn is_remote_input(input: &str) -> bool {
    !Path::new(input).exists() && RemoteProvider::default().can_handle(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_provider_prefers_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("talk.mp4");
        std::fs::write(&file, b"not really a video").unwrap();

        let providers = default_providers(&Settings::default());
        let provider = detect_provider(&providers, file.to_str().unwrap()).unwrap();
        assert_eq!(provider.source_type(), SourceType::Local);

        let provider = detect_provider(&providers, "https://youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(provider.source_type(), SourceType::Remote);
    }

    #[test]
    fn test_detect_provider_routes_by_existence_not_extension() {
        let providers = default_providers(&Settings::default());

        let provider = detect_provider(&providers, "https://example.com/media/talk.mp4").unwrap();
        assert_eq!(provider.source_type(), SourceType::Remote);
        assert!(is_remote_input("https://example.com/media/talk.mp4"));

        let result = detect_provider(&providers, "/no/such/dir/talk.mp4");
        assert!(matches!(result, Err(ShortsError::InvalidInput(_))));
    }

    #[test]
    fn test_detect_provider_rejects_garbage() {
        let providers = default_providers(&Settings::default());
        let result = detect_provider(&providers, "definitely not a video");
        assert!(matches!(result, Err(ShortsError::InvalidInput(_))));
    }

    #[test]
    fn test_is_remote_input() {
        assert!(is_remote_input("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(is_remote_input("dQw4w9WgXcQ"));
        assert!(!is_remote_input("/no/such/dir/video.mp4"));
    }
}

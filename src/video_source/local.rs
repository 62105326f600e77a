//! Local file provider.

use super::{SourceType, VideoProvider, VideoSource};
use crate::error::{Result, ShortsError};
use async_trait::async_trait;
use std::path::Path;

/// Local video files, probed with ffprobe.
pub struct LocalProvider;

impl LocalProvider {
    pub fn new() -> Self {
        Self
    }

    /// Stable id derived from the canonical path.
    fn media_id(path: &Path) -> String {
        format!(
            "local_{}",
            path.canonicalize()
                .unwrap_or_else(|_| path.to_path_buf())
                .to_string_lossy()
                .trim_start_matches(['/', '\\'])
                .replace(['/', '\\', ' ', ':', '.'], "_")
        )
    }

    /// Get (duration, has_video_stream) using ffprobe.
    async fn probe(path: &Path) -> Result<(Option<f64>, bool)> {
        let output = tokio::process::Command::new("ffprobe")
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ShortsError::ToolNotFound("ffprobe".to_string())
                } else {
                    ShortsError::Acquisition(format!("Failed to run ffprobe: {}", e))
                }
            })?;

        if !output.status.success() {
            return Err(ShortsError::Acquisition(format!(
                "ffprobe could not read {}",
                path.display()
            )));
        }

        let json: serde_json::Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| ShortsError::Acquisition(format!("Invalid ffprobe output: {}", e)))?;

        Ok(parse_probe(&json))
    }
}

/// Pull duration and video-stream presence out of ffprobe JSON.
fn parse_probe(json: &serde_json::Value) -> (Option<f64>, bool) {
    let duration = json["format"]["duration"]
        .as_str()
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| *d > 0.0);

    let has_video = json["streams"]
        .as_array()
        .map(|streams| streams.iter().any(|s| s["codec_type"] == "video"))
        .unwrap_or(false);

    (duration, has_video)
}

impl Default for LocalProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoProvider for LocalProvider {
    fn source_type(&self) -> SourceType {
        SourceType::Local
    }

    /// Only existing files; the container is checked by ffprobe on acquire.
    fn can_handle(&self, input: &str) -> bool {
        Path::new(input).is_file()
    }

    async fn acquire(&self, input: &str, _work_dir: &Path) -> Result<VideoSource> {
        let path = Path::new(input);

        if !path.is_file() {
            return Err(ShortsError::VideoNotFound(format!("File not found: {}", input)));
        }

        let (duration, has_video) = Self::probe(path).await?;
        if !has_video {
            return Err(ShortsError::Acquisition(format!(
                "No video stream found in {}",
                input
            )));
        }
        let duration = duration.ok_or_else(|| {
            ShortsError::Acquisition(format!("Could not determine duration of {}", input))
        })?;

        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ShortsError::Acquisition(format!("No usable title for {}", input)))?
            .to_string();

        let file_path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        Ok(VideoSource {
            id: Self::media_id(path),
            title,
            duration,
            source_url: file_path.to_string_lossy().to_string(),
            file_path,
            uploader: Some("Local File".to_string()),
            upload_date: None,
            source_type: SourceType::Local,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_handle_only_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("talk.mp4");
        std::fs::write(&file, b"v").unwrap();

        let provider = LocalProvider::new();
        assert!(provider.can_handle(file.to_str().unwrap()));
        assert!(!provider.can_handle("/no/such/dir/talk.mp4"));
        assert!(!provider.can_handle("https://example.com/media/talk.mp4"));
        assert!(!provider.can_handle(dir.path().to_str().unwrap()));
    }

    #[test]
    fn test_parse_probe() {
        let json = serde_json::json!({
            "format": { "duration": "125.480000" },
            "streams": [
                { "codec_type": "audio" },
                { "codec_type": "video" }
            ]
        });
        let (duration, has_video) = parse_probe(&json);
        assert_eq!(duration, Some(125.48));
        assert!(has_video);

        let audio_only = serde_json::json!({
            "format": { "duration": "30.0" },
            "streams": [{ "codec_type": "audio" }]
        });
        assert_eq!(parse_probe(&audio_only), (Some(30.0), false));
    }

    #[test]
    fn test_media_id_is_stable() {
        let a = LocalProvider::media_id(Path::new("/videos/My Talk.mp4"));
        let b = LocalProvider::media_id(Path::new("/videos/My Talk.mp4"));
        assert_eq!(a, b);
        assert!(a.starts_with("local_"));
        assert!(!a.contains('/'));
        assert!(!a.contains(' '));
    }

    #[tokio::test]
    async fn test_acquire_missing_file() {
        let provider = LocalProvider::new();
        let result = provider
            .acquire("/no/such/file.mp4", Path::new("/tmp"))
            .await;
        assert!(matches!(result, Err(ShortsError::VideoNotFound(_))));
    }
}

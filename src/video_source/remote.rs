//! Remote video provider backed by yt-dlp.

use super::{SourceType, VideoProvider, VideoSource};
use crate::config::Settings;
use crate::error::{Result, ShortsError};
use async_trait::async_trait;
use regex::Regex;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Video container extensions yt-dlp may produce.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mkv", "mov", "avi", "flv"];

/// One way of authenticating against the remote site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialStrategy {
    /// Borrow cookies from a locally installed browser.
    BrowserCookies(String),
    /// No credentials.
    Anonymous,
}

impl CredentialStrategy {
    fn args(&self) -> Vec<String> {
        match self {
            CredentialStrategy::BrowserCookies(browser) => {
                vec!["--cookies-from-browser".to_string(), browser.clone()]
            }
            CredentialStrategy::Anonymous => Vec::new(),
        }
    }
}

impl std::fmt::Display for CredentialStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialStrategy::BrowserCookies(browser) => write!(f, "cookies from {}", browser),
            CredentialStrategy::Anonymous => write!(f, "no cookies"),
        }
    }
}

/// Remote source: YouTube (URL or bare id) and any other http(s) URL yt-dlp understands.
pub struct RemoteProvider {
    video_id_regex: Regex,
    strategies: Vec<CredentialStrategy>,
    max_height: u32,
}

impl RemoteProvider {
    pub fn new(strategies: Vec<CredentialStrategy>, max_height: u32) -> Self {
        // Matches various YouTube URL formats and bare video IDs
        let video_id_regex = Regex::new(
            r"(?x)
            (?:
                (?:https?://)?
                (?:www\.|m\.)?
                (?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/shorts/|youtube\.com/v/)
                ([a-zA-Z0-9_-]{11})
            )
            |
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("Invalid regex");

        Self {
            video_id_regex,
            strategies,
            max_height,
        }
    }

    /// Build from settings: one cookie strategy per configured browser, then anonymous.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut strategies: Vec<CredentialStrategy> = settings
            .acquisition
            .cookie_browsers
            .iter()
            .filter(|b| !b.trim().is_empty())
            .map(|b| CredentialStrategy::BrowserCookies(b.trim().to_string()))
            .collect();
        strategies.push(CredentialStrategy::Anonymous);

        Self::new(strategies, settings.video.max_height().unwrap_or(720))
    }

    /// The ordered credential strategies.
    pub fn strategies(&self) -> &[CredentialStrategy] {
        &self.strategies
    }

    /// Extract video ID from a YouTube URL or bare ID.
    fn extract_video_id(&self, input: &str) -> Option<String> {
        let caps = self.video_id_regex.captures(input.trim())?;

        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
    }

    fn is_http_url(input: &str) -> bool {
        url::Url::parse(input.trim())
            .map(|u| u.scheme() == "http" || u.scheme() == "https")
            .unwrap_or(false)
    }

    /// Normalize the input into something yt-dlp can fetch.
    fn resolve_url(&self, input: &str) -> String {
        let input = input.trim();
        if Self::is_http_url(input) {
            return input.to_string();
        }
        match self.extract_video_id(input) {
            Some(id) => format!("https://www.youtube.com/watch?v={}", id),
            None => input.to_string(),
        }
    }

    fn format_selector(&self) -> String {
        format!("best[height<={}]/best", self.max_height)
    }

    /// Fetch metadata and download the video using one credential strategy.
    #[instrument(skip(self, strategy, work_dir), fields(strategy = %strategy))]
    async fn acquire_with(
        &self,
        url: &str,
        strategy: &CredentialStrategy,
        work_dir: &Path,
    ) -> Result<VideoSource> {
        let output = Command::new("yt-dlp")
            .args(["--dump-json", "--no-download", "--no-warnings", "--no-playlist"])
            .args(strategy.args())
            .arg(url)
            .output()
            .await
            .map_err(map_spawn_error)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ShortsError::VideoNotFound(format!(
                "{} unavailable: {}",
                url,
                stderr.trim()
            )));
        }

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).map_err(|e| {
            ShortsError::Acquisition(format!("Failed to parse yt-dlp output: {}", e))
        })?;
        let mut video = parse_info_json(&json, url)?;

        info!("Downloading '{}' ({:.0}s)", video.title, video.duration);

        let template = work_dir.join(format!("{}.%(ext)s", video.id));
        let download = Command::new("yt-dlp")
            .arg("--format")
            .arg(self.format_selector())
            .arg("--output")
            .arg(template.to_str().unwrap_or_default())
            .args(["--no-playlist", "--quiet", "--no-warnings"])
            .args(strategy.args())
            .arg(url)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(map_spawn_error)?;

        if !download.status.success() {
            let stderr = String::from_utf8_lossy(&download.stderr);
            return Err(ShortsError::Acquisition(format!(
                "yt-dlp download failed: {}",
                stderr.trim()
            )));
        }

        video.file_path = find_video_file(work_dir, &video.id)?;
        debug!("Downloaded to {}", video.file_path.display());
        Ok(video)
    }
}

impl Default for RemoteProvider {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

#[async_trait]
impl VideoProvider for RemoteProvider {
    fn source_type(&self) -> SourceType {
        SourceType::Remote
    }

    fn can_handle(&self, input: &str) -> bool {
        Self::is_http_url(input) || self.extract_video_id(input).is_some()
    }

    async fn acquire(&self, input: &str, work_dir: &Path) -> Result<VideoSource> {
        std::fs::create_dir_all(work_dir)?;
        let url = self.resolve_url(input);
        let url = url.as_str();

        first_success(&self.strategies, |strategy| {
            self.acquire_with(url, strategy, work_dir)
        })
        .await
    }
}

/// Run `attempt` for each strategy in order until one succeeds.
///
/// Returns the last failure when every strategy fails. `ToolNotFound` stops the
/// loop at once.
async fn first_success<'a, T, F, Fut>(
    strategies: &'a [CredentialStrategy],
    mut attempt: F,
) -> Result<T>
where
    F: FnMut(&'a CredentialStrategy) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error = None;
    for strategy in strategies {
        info!("Trying {}", strategy);
        match attempt(strategy).await {
            Ok(value) => return Ok(value),
            Err(e @ ShortsError::ToolNotFound(_)) => return Err(e),
            Err(e) => {
                warn!("Acquisition with {} failed: {}", strategy, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        ShortsError::Acquisition("No credential strategies configured".to_string())
    }))
}

fn map_spawn_error(e: std::io::Error) -> ShortsError {
    if e.kind() == std::io::ErrorKind::NotFound {
        ShortsError::ToolNotFound("yt-dlp".to_string())
    } else {
        ShortsError::Acquisition(format!("Failed to run yt-dlp: {}", e))
    }
}

/// Build a `VideoSource` from yt-dlp's info JSON. The file path is filled in after download.
fn parse_info_json(json: &serde_json::Value, url: &str) -> Result<VideoSource> {
    let id = json["id"].as_str().map(|s| s.to_string());
    let title = json["title"].as_str().map(|s| s.to_string());
    let duration = json["duration"].as_f64().filter(|d| *d > 0.0);

    let (id, title, duration) = match (id, title, duration) {
        (Some(id), Some(title), Some(duration)) => (id, title, duration),
        _ => {
            return Err(ShortsError::Acquisition(
                "Video metadata is missing id, title or duration".to_string(),
            ))
        }
    };

    let uploader = json["uploader"]
        .as_str()
        .or_else(|| json["channel"].as_str())
        .map(|s| s.to_string());

    // yt-dlp returns date as YYYYMMDD
    let upload_date = json["upload_date"]
        .as_str()
        .and_then(|d| chrono::NaiveDate::parse_from_str(d, "%Y%m%d").ok());

    Ok(VideoSource {
        id,
        title,
        duration,
        file_path: PathBuf::new(),
        uploader,
        upload_date,
        source_url: url.to_string(),
        source_type: SourceType::Remote,
    })
}

/// Locate a downloaded video by id, preferring the newest match.
fn find_video_file(dir: &Path, video_id: &str) -> Result<PathBuf> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| ShortsError::Acquisition(format!("Cannot read directory: {e}")))?;

    let newest = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            let stem_matches = path
                .file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|s| s == video_id);
            let is_video = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| VIDEO_EXTENSIONS.contains(&e.to_lowercase().as_str()));
            stem_matches && is_video
        })
        .max_by_key(|path| {
            std::fs::metadata(path)
                .and_then(|m| m.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
        });

    newest.ok_or_else(|| {
        ShortsError::Acquisition("Video file not found after download".to_string())
    })
}

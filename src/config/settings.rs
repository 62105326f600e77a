//! Configuration settings for shortsmith.

use crate::error::{Result, ShortsError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub paths: PathSettings,
    pub video: VideoSettings,
    pub acquisition: AcquisitionSettings,
    pub transcription: TranscriptionSettings,
    pub analysis: AnalysisSettings,
    pub features: FeatureSettings,
    pub processing: ProcessingSettings,
    pub logging: LoggingSettings,
    pub prompts: PromptSettings,
}

/// Working and output directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Directory for downloads and extracted audio. Emptied after each run.
    pub temp_dir: String,
    /// Root directory for produced shorts.
    pub output_dir: String,
    /// Directory for log files (when file logging is enabled).
    pub logs_dir: String,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            temp_dir: "/tmp/shortsmith".to_string(),
            output_dir: "./output".to_string(),
            logs_dir: "./logs".to_string(),
        }
    }
}

/// Constraints on produced shorts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    /// Download quality ceiling, e.g. "720p".
    pub quality: String,
    /// Shortest acceptable short, in seconds.
    pub min_short_duration: f64,
    /// Longest short, in seconds. Also the fallback window length.
    pub max_short_duration: f64,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            quality: "720p".to_string(),
            min_short_duration: 15.0,
            max_short_duration: 60.0,
        }
    }
}

impl VideoSettings {
    /// Height ceiling parsed from `quality` ("720p" -> 720).
    pub fn max_height(&self) -> Option<u32> {
        self.quality
            .trim()
            .trim_end_matches(['p', 'P'])
            .parse::<u32>()
            .ok()
            .filter(|h| *h > 0)
    }
}

/// Remote source acquisition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionSettings {
    /// Browsers to borrow cookies from, in order. Anonymous access is tried last.
    pub cookie_browsers: Vec<String>,
}

impl Default for AcquisitionSettings {
    fn default() -> Self {
        Self {
            cookie_browsers: vec![
                "chrome".to_string(),
                "firefox".to_string(),
                "safari".to_string(),
            ],
        }
    }
}

/// Transcription provider type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionProvider {
    /// Local `whisper` CLI (default).
    #[default]
    Local,
    /// OpenAI Whisper API.
    OpenAi,
}

impl std::str::FromStr for TranscriptionProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "whisper" => Ok(TranscriptionProvider::Local),
            "openai" => Ok(TranscriptionProvider::OpenAi),
            _ => Err(format!("Unknown transcription provider: {}", s)),
        }
    }
}

impl std::fmt::Display for TranscriptionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptionProvider::Local => write!(f, "local"),
            TranscriptionProvider::OpenAi => write!(f, "openai"),
        }
    }
}

/// Transcription service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Transcription provider (local, openai).
    pub provider: TranscriptionProvider,
    /// Whisper model ("base", "small", ... for local; "whisper-1" for openai).
    pub model: String,
    /// Language hint passed to the engine.
    pub language: Option<String>,
    /// Chunk length for splitting long audio before upload (openai only).
    pub chunk_duration_seconds: u32,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            provider: TranscriptionProvider::Local,
            model: "base".to_string(),
            language: None,
            chunk_duration_seconds: 600,
        }
    }
}

/// Content-analysis backend (Ollama-compatible) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Base URL of the backend.
    pub base_url: String,
    /// Model name sent with every request.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Transcript characters included in the planning prompt.
    pub transcript_excerpt_chars: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            timeout_seconds: 60,
            transcript_excerpt_chars: 2000,
        }
    }
}

/// Feature flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSettings {
    /// Ask the analysis backend for titles/descriptions.
    pub auto_generate_titles: bool,
    /// Write metadata sidecars for every produced short.
    pub auto_generate_descriptions: bool,
}

impl Default for FeatureSettings {
    fn default() -> Self {
        Self {
            auto_generate_titles: true,
            auto_generate_descriptions: true,
        }
    }
}

/// Processing behavior.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProcessingSettings {
    /// Keep downloaded videos and extracted audio after the run.
    pub preserve_temp_files: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,
    /// Console log format.
    pub format: LogFormat,
    /// Also write logs to a timestamped file in `paths.logs_dir`.
    pub file_logging: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Full,
            file_logging: false,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// The loaded settings are validated before being returned.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str::<Settings>(&content)?
        } else if path.is_some() {
            return Err(ShortsError::Config(format!(
                "Configuration file not found: {}",
                config_path.display()
            )));
        } else {
            Settings::default()
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Check every option for values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        let video = &self.video;
        if !video.min_short_duration.is_finite() || video.min_short_duration <= 0.0 {
            return Err(ShortsError::Config(format!(
                "video.min_short_duration must be positive, got {}",
                video.min_short_duration
            )));
        }
        if !video.max_short_duration.is_finite() || video.max_short_duration <= 0.0 {
            return Err(ShortsError::Config(format!(
                "video.max_short_duration must be positive, got {}",
                video.max_short_duration
            )));
        }
        if video.min_short_duration > video.max_short_duration {
            return Err(ShortsError::Config(format!(
                "video.min_short_duration ({}) exceeds video.max_short_duration ({})",
                video.min_short_duration, video.max_short_duration
            )));
        }
        if video.max_height().is_none() {
            return Err(ShortsError::Config(format!(
                "video.quality must look like \"720p\", got {:?}",
                video.quality
            )));
        }

        let analysis = &self.analysis;
        match url::Url::parse(&analysis.base_url) {
            Ok(u) if u.scheme() == "http" || u.scheme() == "https" => {}
            _ => {
                return Err(ShortsError::Config(format!(
                    "analysis.base_url is not an http(s) URL: {}",
                    analysis.base_url
                )))
            }
        }
        if analysis.model.trim().is_empty() {
            return Err(ShortsError::Config("analysis.model is empty".to_string()));
        }
        if analysis.timeout_seconds == 0 {
            return Err(ShortsError::Config(
                "analysis.timeout_seconds must be greater than zero".to_string(),
            ));
        }
        if analysis.transcript_excerpt_chars == 0 {
            return Err(ShortsError::Config(
                "analysis.transcript_excerpt_chars must be greater than zero".to_string(),
            ));
        }

        if self.transcription.chunk_duration_seconds == 0 {
            return Err(ShortsError::Config(
                "transcription.chunk_duration_seconds must be greater than zero".to_string(),
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ShortsError::Config(format!(
                "logging.level must be one of {}, got {:?}",
                LOG_LEVELS.join(", "),
                self.logging.level
            )));
        }

        Ok(())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ShortsError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shortsmith")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.paths.temp_dir)
    }

    /// Get the expanded output directory path.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.paths.output_dir)
    }

    /// Get the expanded logs directory path.
    pub fn logs_dir(&self) -> PathBuf {
        Self::expand_path(&self.paths.logs_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.video.max_height(), Some(720));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [video]
            min_short_duration = 20.0

            [features]
            auto_generate_titles = false
            "#,
        )
        .unwrap();

        assert_eq!(settings.video.min_short_duration, 20.0);
        assert_eq!(settings.video.max_short_duration, 60.0);
        assert!(!settings.features.auto_generate_titles);
        assert!(settings.features.auto_generate_descriptions);
        assert_eq!(settings.analysis.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_rejects_inverted_durations() {
        let mut settings = Settings::default();
        settings.video.min_short_duration = 90.0;
        assert!(matches!(settings.validate(), Err(ShortsError::Config(_))));
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let mut settings = Settings::default();
        settings.analysis.base_url = "localhost:11434".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_quality_and_level() {
        let mut settings = Settings::default();
        settings.video.quality = "hd".to_string();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.logging.level = "loud".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!("openai".parse::<TranscriptionProvider>(), Ok(TranscriptionProvider::OpenAi));
        assert_eq!("Whisper".parse::<TranscriptionProvider>(), Ok(TranscriptionProvider::Local));
        assert!("azure".parse::<TranscriptionProvider>().is_err());
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let path = PathBuf::from("/nonexistent/shortsmith/config.toml");
        assert!(Settings::load_from(Some(&path)).is_err());
    }

    #[test]
    fn test_save_and_load_round_trip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.video.max_short_duration = 45.0;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.video.max_short_duration, 45.0);
    }
}

//! Error types for shortsmith.

use thiserror::Error;

/// Library-level error type for shortsmith operations.
#[derive(Error, Debug)]
pub enum ShortsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Acquisition failed: {0}")]
    Acquisition(String),

    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("Video is too short for shorts ({duration:.1}s, minimum {minimum:.1}s)")]
    VideoTooShort { duration: f64, minimum: f64 },

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Analysis backend error: {0}")]
    AnalysisBackend(String),

    #[error("Clip extraction failed: {0}")]
    Extraction(String),

    #[error("Metadata generation failed: {0}")]
    Metadata(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Failure classes the pipeline distinguishes when deciding abort vs. continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Acquisition,
    Transcription,
    AnalysisBackend,
    Extraction,
    Metadata,
    Other,
}

impl ShortsError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShortsError::Config(_) | ShortsError::TomlParse(_) => ErrorKind::Configuration,
            ShortsError::Acquisition(_)
            | ShortsError::VideoNotFound(_)
            | ShortsError::VideoTooShort { .. }
            | ShortsError::InvalidInput(_) => ErrorKind::Acquisition,
            ShortsError::Transcription(_) | ShortsError::OpenAI(_) => ErrorKind::Transcription,
            ShortsError::AnalysisBackend(_) | ShortsError::Http(_) => ErrorKind::AnalysisBackend,
            ShortsError::Extraction(_) => ErrorKind::Extraction,
            ShortsError::Metadata(_) => ErrorKind::Metadata,
            ShortsError::Io(_)
            | ShortsError::Json(_)
            | ShortsError::ToolNotFound(_)
            | ShortsError::ToolFailed(_) => ErrorKind::Other,
        }
    }
}

/// Result type alias for shortsmith operations.
pub type Result<T> = std::result::Result<T, ShortsError>;

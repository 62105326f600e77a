//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting a run that would otherwise fail midway.

use crate::config::{Settings, TranscriptionProvider};
use crate::error::{Result, ShortsError};
use crate::transcription::is_api_key_configured;
use crate::video_source::is_remote_input;
use std::process::Command;

/// External programs a `process` run will call for this input.
pub fn required_tools(settings: &Settings, input: &str) -> Vec<&'static str> {
    let mut tools = vec!["ffmpeg", "ffprobe"];
    if is_remote_input(input) {
        tools.push("yt-dlp");
    }
    if settings.transcription.provider == TranscriptionProvider::Local {
        tools.push("whisper");
    }
    tools
}

/// Run pre-flight checks for `shortsmith process`.
///
/// Every failure is reported as a configuration error.
pub fn check_process(settings: &Settings, input: &str) -> Result<()> {
    for tool in required_tools(settings, input) {
        check_tool(tool).map_err(|e| ShortsError::Config(e.to_string()))?;
    }
    if settings.transcription.provider == TranscriptionProvider::OpenAi && !is_api_key_configured() {
        return Err(ShortsError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        ));
    }
    Ok(())
}

/// Check if an external tool is available.
pub fn check_tool(name: &str) -> Result<()> {
    // ffmpeg/ffprobe use -version (single dash), whisper only answers --help
    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        "whisper" => "--help",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(ShortsError::ToolFailed(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ShortsError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(ShortsError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

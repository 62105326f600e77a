//! Local Whisper transcription via the `whisper` command-line tool.

use super::{Transcriber, Transcript, TranscriptSegment};
use crate::error::{Result, ShortsError};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Runs the openai-whisper CLI and reads its JSON output.
pub struct LocalWhisperTranscriber {
    model: String,
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WhisperOutput {
    #[serde(default)]
    text: String,
    #[serde(default)]
    segments: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
}

impl LocalWhisperTranscriber {
    pub fn new(model: &str, language: Option<&str>) -> Self {
        Self {
            model: model.to_string(),
            language: language.map(|l| l.to_string()),
        }
    }

    fn parse_output(json: &str) -> Result<Transcript> {
        let output: WhisperOutput = serde_json::from_str(json).map_err(|e| {
            ShortsError::Transcription(format!("Unreadable whisper output: {}", e))
        })?;

        let segments = output
            .segments
            .into_iter()
            .map(|s| TranscriptSegment::new(s.start, s.end, s.text.trim().to_string()))
            .collect();

        Ok(Transcript {
            text: output.text.trim().to_string(),
            segments,
        })
    }
}

#[async_trait]
impl Transcriber for LocalWhisperTranscriber {
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript> {
        let out_dir = tempfile::tempdir()?;
        info!("Transcribing with local whisper model '{}'", self.model);

        let mut command = Command::new("whisper");
        command
            .arg(audio_path)
            .arg("--model").arg(&self.model)
            .arg("--output_format").arg("json")
            .arg("--output_dir").arg(out_dir.path())
            .arg("--verbose").arg("False");
        if let Some(lang) = &self.language {
            command.arg("--language").arg(lang);
        }

        let result = command
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ShortsError::ToolNotFound("whisper".into()));
            }
            Err(e) => {
                return Err(ShortsError::Transcription(format!("whisper execution failed: {e}")));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ShortsError::Transcription(format!(
                "whisper failed: {}",
                stderr.trim()
            )));
        }

        let stem = audio_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("audio");
        let json_path = out_dir.path().join(format!("{}.json", stem));
        let json = tokio::fs::read_to_string(&json_path).await.map_err(|e| {
            ShortsError::Transcription(format!("whisper produced no output: {}", e))
        })?;

        let transcript = Self::parse_output(&json)?;
        debug!("Transcribed {} segments", transcript.segments.len());
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output() {
        let json = r#"{
            "text": " Hello there. General Kenobi.",
            "segments": [
                {"id": 0, "start": 0.0, "end": 2.5, "text": " Hello there."},
                {"id": 1, "start": 2.5, "end": 4.0, "text": " General Kenobi."}
            ],
            "language": "en"
        }"#;

        let transcript = LocalWhisperTranscriber::parse_output(json).unwrap();
        assert_eq!(transcript.text, "Hello there. General Kenobi.");
        assert_eq!(transcript.segments.len(), 2);
        assert_eq!(transcript.segments[1].start_seconds, 2.5);
        assert_eq!(transcript.segments[1].text, "General Kenobi.");
    }

    #[test]
    fn test_parse_output_rejects_garbage() {
        assert!(matches!(
            LocalWhisperTranscriber::parse_output("not json"),
            Err(ShortsError::Transcription(_))
        ));
    }
}

//! Transcription module for shortsmith.
//!
//! Turns extracted audio into text with time-aligned segments.
//!
//! # Engines
//!
//! - **Local** (default): the `whisper` CLI running on this machine.
//! - **OpenAI**: the hosted Whisper API; long audio is split and sent chunk by chunk.

mod local;
mod models;
mod openai;

pub use local::LocalWhisperTranscriber;
pub use models::{format_timestamp, Transcript, TranscriptSegment};
pub use openai::{is_api_key_configured, OpenAiTranscriber};

use crate::config::{TranscriptionProvider, TranscriptionSettings};
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file and return text plus timestamped segments.
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript>;
}

/// Build the transcriber selected in the settings.
pub fn create_transcriber(settings: &TranscriptionSettings) -> Result<Arc<dyn Transcriber>> {
    let transcriber: Arc<dyn Transcriber> = match settings.provider {
        TranscriptionProvider::Local => Arc::new(LocalWhisperTranscriber::new(
            &settings.model,
            settings.language.as_deref(),
        )),
        TranscriptionProvider::OpenAi => Arc::new(OpenAiTranscriber::with_config(
            &settings.model,
            settings.language.as_deref(),
            settings.chunk_duration_seconds,
        )?),
    };
    Ok(transcriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_local_transcriber() {
        let settings = TranscriptionSettings::default();
        assert!(create_transcriber(&settings).is_ok());
    }
}

//! OpenAI Whisper API transcription.

use super::{Transcriber, Transcript, TranscriptSegment};
use crate::error::{Result, ShortsError};
use crate::media::split_audio;
use async_openai::config::OpenAIConfig;
use async_openai::types::{AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_openai::Client;
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Default timeout for OpenAI API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// OpenAI Whisper-based transcriber.
pub struct OpenAiTranscriber {
    client: Client<OpenAIConfig>,
    model: String,
    language: Option<String>,
    chunk_duration_seconds: u32,
}

impl OpenAiTranscriber {
    /// Create a transcriber. Fails when no API key is configured.
    pub fn with_config(
        model: &str,
        language: Option<&str>,
        chunk_duration_seconds: u32,
    ) -> Result<Self> {
        if !is_api_key_configured() {
            return Err(ShortsError::Config(
                "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client: Client::with_config(OpenAIConfig::default()).with_http_client(http_client),
            model: model.to_string(),
            language: language.map(|l| l.to_string()),
            chunk_duration_seconds,
        })
    }

    /// Transcribe a single audio file (no splitting).
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe_single(&self, audio_path: &Path) -> Result<Vec<TranscriptSegment>> {
        debug!("Transcribing audio file");

        let file_bytes = tokio::fs::read(audio_path).await?;

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(async_openai::types::AudioInput::from_vec_u8(
                audio_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.wav")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::VerboseJson);

        if let Some(lang) = &self.language {
            request_builder.language(lang);
        }

        let request = request_builder
            .build()
            .map_err(|e| ShortsError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe_verbose_json(request)
            .await
            .map_err(|e| ShortsError::OpenAI(format!("Whisper API error: {}", e)))?;

        let segments: Vec<TranscriptSegment> = response
            .segments
            .map(|segs| {
                segs.iter()
                    .map(|s| {
                        TranscriptSegment::new(s.start as f64, s.end as f64, s.text.trim().to_string())
                    })
                    .collect()
            })
            .unwrap_or_else(|| {
                vec![TranscriptSegment::new(
                    0.0,
                    response.duration as f64,
                    response.text.trim().to_string(),
                )]
            });

        Ok(segments)
    }
}

#[async_trait]
impl Transcriber for OpenAiTranscriber {
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript> {
        let temp_dir = tempfile::tempdir()?;
        let chunks = split_audio(audio_path, temp_dir.path(), self.chunk_duration_seconds).await?;

        if chunks.len() == 1 {
            let segments = self.transcribe_single(audio_path).await?;
            return Ok(Transcript::from_segments(segments));
        }

        info!("Processing {} audio chunks with {}", chunks.len(), self.model);

        let pb = ProgressBar::new(chunks.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.green} Whisper   [{bar:30.cyan/blue}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );

        // Chunks go one at a time; each is offset by its position in the source.
        let mut all_segments = Vec::new();
        for (idx, (chunk_path, time_offset)) in chunks.into_iter().enumerate() {
            let mut segments = match self.transcribe_single(&chunk_path).await {
                Ok(segments) => segments,
                Err(e) => {
                    pb.finish_and_clear();
                    return Err(ShortsError::Transcription(format!(
                        "Chunk {} at {:.0}s failed: {}",
                        idx, time_offset, e
                    )));
                }
            };
            for segment in &mut segments {
                segment.start_seconds += time_offset;
                segment.end_seconds += time_offset;
            }
            all_segments.extend(segments);
            pb.inc(1);
        }

        pb.finish_and_clear();
        drop(temp_dir);

        Ok(Transcript::from_segments(all_segments))
    }
}

/// Check if the OpenAI API key is configured.
pub fn is_api_key_configured() -> bool {
    std::env::var("OPENAI_API_KEY").is_ok_and(|k| !k.is_empty())
}

//! In-memory collaborators for unit tests.

use crate::analysis::AnalysisBackend;
use crate::error::{Result, ShortsError};
use crate::media::MediaEncoder;
use crate::transcription::{Transcriber, Transcript, TranscriptSegment};
use crate::video_source::{SourceType, VideoProvider, VideoSource};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Backend that replays a fixed list of answers, then fails.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<std::result::Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answering(self, text: &str) -> Self {
        self.replies.lock().unwrap().push_back(Ok(text.to_string()));
        self
    }

    pub fn failing(self, message: &str) -> Self {
        self.replies.lock().unwrap().push_back(Err(message.to_string()));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisBackend for ScriptedBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(ShortsError::AnalysisBackend(message)),
            None => Err(ShortsError::AnalysisBackend("connection refused".into())),
        }
    }
}

/// Encoder that writes empty files and fails on chosen destination names.
#[derive(Default)]
pub struct RecordingEncoder {
    fail_on: Vec<String>,
    fail_audio: bool,
    cuts: Mutex<Vec<(PathBuf, f64, f64)>>,
}

impl RecordingEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, file_name: &str) -> Self {
        self.fail_on.push(file_name.to_string());
        self
    }

    pub fn failing_audio(mut self) -> Self {
        self.fail_audio = true;
        self
    }

    /// `(dest, start, duration)` for every cut attempt.
    pub fn cuts(&self) -> Vec<(PathBuf, f64, f64)> {
        self.cuts.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaEncoder for RecordingEncoder {
    async fn extract_audio(&self, _video: &Path, dest: &Path) -> Result<()> {
        if self.fail_audio {
            return Err(ShortsError::Transcription("no audio stream".into()));
        }
        tokio::fs::write(dest, b"").await?;
        Ok(())
    }

    async fn cut_clip(&self, _source: &Path, start: f64, duration: f64, dest: &Path) -> Result<()> {
        self.cuts
            .lock()
            .unwrap()
            .push((dest.to_path_buf(), start, duration));

        let name = dest.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if self.fail_on.iter().any(|f| f == name) {
            return Err(ShortsError::Extraction(format!("encoder crashed on {}", name)));
        }
        tokio::fs::write(dest, b"").await?;
        Ok(())
    }
}

/// Provider that "downloads" a placeholder file and returns a fixed video.
pub struct FakeProvider {
    pub duration: f64,
    pub title: String,
}

impl FakeProvider {
    pub fn new(title: &str, duration: f64) -> Self {
        Self {
            duration,
            title: title.to_string(),
        }
    }
}

#[async_trait]
impl VideoProvider for FakeProvider {
    fn source_type(&self) -> SourceType {
        SourceType::Remote
    }

    fn can_handle(&self, input: &str) -> bool {
        input.starts_with("fake:")
    }

    async fn acquire(&self, input: &str, work_dir: &Path) -> Result<VideoSource> {
        let id = input.trim_start_matches("fake:").to_string();
        let file_path = work_dir.join(format!("{}.mp4", id));
        tokio::fs::write(&file_path, b"video").await?;

        Ok(sample_video(&id, &self.title, self.duration, file_path))
    }
}

/// Transcriber returning a canned transcript.
pub struct FakeTranscriber;

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(&self, _audio_path: &Path) -> Result<Transcript> {
        Ok(Transcript::from_segments(vec![
            TranscriptSegment::new(0.0, 30.0, "Welcome to the show.".into()),
            TranscriptSegment::new(30.0, 90.0, "Today we build a rocket.".into()),
        ]))
    }
}

pub fn sample_video(id: &str, title: &str, duration: f64, file_path: PathBuf) -> VideoSource {
    VideoSource {
        id: id.to_string(),
        title: title.to_string(),
        duration,
        file_path,
        uploader: Some("Test Channel".to_string()),
        upload_date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1),
        source_url: format!("https://www.youtube.com/watch?v={}", id),
        source_type: SourceType::Remote,
    }
}

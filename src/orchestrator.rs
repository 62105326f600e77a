//! Pipeline orchestrator for shortsmith.
//!
//! Runs one video through `Acquiring → Transcribing → Planning → Extracting →
//! Composing → Done`. Only this module decides whether a failure aborts the
//! video, and only this module touches [`RunStats`]. Temporary files are
//! removed after every run unless `processing.preserve_temp_files` is set.

use crate::analysis::{AnalysisBackend, OllamaBackend};
use crate::config::{Prompts, Settings};
use crate::error::{Result, ShortsError};
use crate::extraction::{ClipArtifact, ClipExtractor};
use crate::media::{FfmpegEncoder, MediaEncoder};
use crate::metadata::{write_sidecar, ClipMetadata, MetadataComposer};
use crate::planning::SegmentPlanner;
use crate::stats::RunStats;
use crate::transcription::{create_transcriber, Transcriber, Transcript};
use crate::video_source::{default_providers, detect_provider, VideoProvider, VideoSource};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Pipeline stage. A video that aborts reports the stage it stopped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Acquiring,
    Transcribing,
    Planning,
    Extracting,
    Composing,
    Done,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Acquiring => "acquiring",
            Stage::Transcribing => "transcribing",
            Stage::Planning => "planning",
            Stage::Extracting => "extracting",
            Stage::Composing => "composing",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// How a single video run ended.
#[derive(Debug)]
pub enum VideoOutcome {
    Completed {
        title: String,
        output_dir: PathBuf,
        clips: Vec<ClipArtifact>,
        used_fallback: bool,
    },
    Aborted {
        stage: Stage,
        error: ShortsError,
    },
}

/// Outcome plus the statistics handed back to the caller.
#[derive(Debug)]
pub struct RunReport {
    pub outcome: VideoOutcome,
    pub stats: RunStats,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, VideoOutcome::Completed { .. })
    }
}

/// Sequences the collaborators for one video at a time.
pub struct PipelineOrchestrator {
    settings: Settings,
    prompts: Prompts,
    providers: Vec<Box<dyn VideoProvider>>,
    backend: Arc<dyn AnalysisBackend>,
    encoder: Arc<dyn MediaEncoder>,
    /// Created on first use, then reused for the rest of the process.
    transcriber: Option<Arc<dyn Transcriber>>,
}

impl PipelineOrchestrator {
    /// Create an orchestrator with the production collaborators.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let providers = default_providers(&settings);
        let backend: Arc<dyn AnalysisBackend> =
            Arc::new(OllamaBackend::from_settings(&settings.analysis)?);
        let encoder: Arc<dyn MediaEncoder> = Arc::new(FfmpegEncoder::new());

        let mut orchestrator = Self::with_components(settings, providers, backend, encoder, None);
        orchestrator.prompts = prompts;
        Ok(orchestrator)
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        providers: Vec<Box<dyn VideoProvider>>,
        backend: Arc<dyn AnalysisBackend>,
        encoder: Arc<dyn MediaEncoder>,
        transcriber: Option<Arc<dyn Transcriber>>,
    ) -> Self {
        let mut prompts = Prompts::default();
        prompts.variables = settings.prompts.variables.clone();

        Self {
            settings,
            prompts,
            providers,
            backend,
            encoder,
            transcriber,
        }
    }

    /// Run one input through the whole pipeline.
    ///
    /// Never returns an error: failures end up in [`VideoOutcome::Aborted`]
    /// and in the error counter of the returned stats.
    #[instrument(skip(self, stats))]
    pub async fn process_video(&mut self, input: &str, mut stats: RunStats) -> RunReport {
        let work_dir = self.settings.temp_dir();
        let outcome = self.run_stages(input, &work_dir, &mut stats).await;

        match &outcome {
            VideoOutcome::Completed { clips, .. } => {
                info!(stage = %Stage::Done, "Created {} shorts", clips.len());
            }
            VideoOutcome::Aborted { stage, error } => {
                warn!(stage = %stage, kind = ?error.kind(), "Video aborted: {}", error);
            }
        }

        self.cleanup(&work_dir).await;
        RunReport { outcome, stats }
    }

    async fn run_stages(&mut self, input: &str, work_dir: &Path, stats: &mut RunStats) -> VideoOutcome {
        macro_rules! abort {
            ($stage:expr, $error:expr) => {{
                stats.errors += 1;
                return VideoOutcome::Aborted {
                    stage: $stage,
                    error: $error,
                };
            }};
        }

        // Acquiring
        let video = match self.acquire(input, work_dir).await {
            Ok(video) => video,
            Err(e) => abort!(Stage::Acquiring, e),
        };
        stats.videos_processed += 1;
        eprintln!("  Title: {} ({})", video.title, video.format_duration());

        // Transcribing
        let transcript = match self.transcribe(&video, work_dir).await {
            Ok(transcript) => transcript,
            Err(e) => abort!(Stage::Transcribing, e),
        };

        // Planning
        info!(stage = %Stage::Planning, "Planning segments");
        eprintln!("  Picking highlights...");
        let planner = SegmentPlanner::new(self.backend.clone(), self.prompts.clone(), &self.settings);
        let plan = planner.plan(&video, &transcript).await;
        if plan.used_fallback() {
            stats.errors += 1;
        }
        if plan.is_empty() {
            return VideoOutcome::Aborted {
                stage: Stage::Planning,
                error: ShortsError::InvalidInput(format!(
                    "No usable segments in a {:.1}s video",
                    video.duration
                )),
            };
        }
        eprintln!("  Planned {} shorts", plan.segments.len());

        // Extracting
        info!(stage = %Stage::Extracting, "Extracting {} clips", plan.segments.len());
        let extractor = ClipExtractor::new(self.encoder.clone(), self.settings.output_dir());
        let output_dir = extractor.output_dir_for(&video);
        let report = match extractor.extract(&video, &plan.segments).await {
            Ok(report) => report,
            Err(e) => abort!(Stage::Extracting, e),
        };
        stats.errors += report.failures.len() as u32;
        stats.shorts_created += report.clips.len() as u32;
        if report.clips.is_empty() {
            return VideoOutcome::Aborted {
                stage: Stage::Extracting,
                error: ShortsError::Extraction(format!(
                    "All {} clips failed",
                    report.failures.len()
                )),
            };
        }

        // Composing
        if self.settings.features.auto_generate_descriptions {
            self.compose(&video, &report.clips, &output_dir, stats).await;
        } else {
            debug!("Metadata generation disabled, skipping {}", Stage::Composing);
        }

        VideoOutcome::Completed {
            title: video.title,
            output_dir,
            clips: report.clips,
            used_fallback: plan.used_fallback(),
        }
    }

    async fn acquire(&self, input: &str, work_dir: &Path) -> Result<VideoSource> {
        info!(stage = %Stage::Acquiring, "Acquiring video");
        eprintln!("  Fetching video...");
        tokio::fs::create_dir_all(work_dir).await?;

        let provider = detect_provider(&self.providers, input)?;
        let video = provider.acquire(input, work_dir).await?;

        let minimum = self.settings.video.min_short_duration;
        if video.duration < minimum {
            return Err(ShortsError::VideoTooShort {
                duration: video.duration,
                minimum,
            });
        }
        Ok(video)
    }

    async fn transcribe(&mut self, video: &VideoSource, work_dir: &Path) -> Result<Transcript> {
        info!(stage = %Stage::Transcribing, "Transcribing audio");
        eprintln!("  Transcribing...");

        let audio_path = work_dir.join(format!("{}.wav", video.id));
        self.encoder.extract_audio(&video.file_path, &audio_path).await?;

        let transcriber = self.transcriber()?;
        let transcript = transcriber.transcribe(&audio_path).await?;
        if transcript.is_empty() {
            warn!("Transcript is empty, planning from title and duration only");
        }
        eprintln!("  Transcription complete ({} segments)", transcript.segments.len());
        Ok(transcript)
    }

    fn transcriber(&mut self) -> Result<Arc<dyn Transcriber>> {
        if let Some(transcriber) = &self.transcriber {
            return Ok(transcriber.clone());
        }
        let transcriber = create_transcriber(&self.settings.transcription)?;
        self.transcriber = Some(transcriber.clone());
        Ok(transcriber)
    }

    async fn compose(
        &self,
        video: &VideoSource,
        clips: &[ClipArtifact],
        output_dir: &Path,
        stats: &mut RunStats,
    ) {
        info!(stage = %Stage::Composing, "Writing metadata for {} shorts", clips.len());
        let composer = MetadataComposer::new(
            self.backend.clone(),
            self.prompts.clone(),
            &self.settings.features,
        );

        for clip in clips {
            let composed = composer.compose(video, &clip.segment).await;
            if let Some(e) = &composed.backend_error {
                warn!("Short {}: using default metadata ({})", clip.sequence_index, e);
                stats.errors += 1;
            }

            let record = ClipMetadata::new(video, clip, composed.title, composed.description);
            if let Err(e) = write_sidecar(output_dir, &record).await {
                warn!("Short {}: {}", clip.sequence_index, e);
                stats.errors += 1;
            }
        }
    }

    /// Empty the temp directory unless preservation is requested.
    async fn cleanup(&self, work_dir: &Path) {
        if self.settings.processing.preserve_temp_files {
            info!("Keeping temporary files in {}", work_dir.display());
            return;
        }

        let mut entries = match tokio::fs::read_dir(work_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Nothing to clean in {}: {}", work_dir.display(), e);
                return;
            }
        };

        let mut removed = 0usize;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            let result = match entry.file_type().await {
                Ok(t) if t.is_dir() => tokio::fs::remove_dir_all(&path).await,
                _ => tokio::fs::remove_file(&path).await,
            };
            match result {
                Ok(()) => removed += 1,
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
        debug!("Removed {} temporary entries", removed);
    }
}

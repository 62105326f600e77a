//! Cutting planned segments out of the source video.
//!
//! Each segment is encoded independently; a failed clip leaves a gap in the
//! result but never shifts the numbering of later clips.

use crate::error::{Result, ShortsError};
use crate::media::MediaEncoder;
use crate::planning::CandidateSegment;
use crate::video_source::VideoSource;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Longest directory name derived from a video title.
const MAX_DIR_NAME_CHARS: usize = 50;

/// A short written to disk.
#[derive(Debug, Clone)]
pub struct ClipArtifact {
    pub segment: CandidateSegment,
    pub output_path: PathBuf,
    /// 1-based position of the segment in the plan.
    pub sequence_index: usize,
}

/// A clip that could not be produced.
#[derive(Debug)]
pub struct ClipFailure {
    pub sequence_index: usize,
    pub error: ShortsError,
}

/// Outcome of extracting every segment of a plan.
#[derive(Debug, Default)]
pub struct ExtractionReport {
    pub clips: Vec<ClipArtifact>,
    pub failures: Vec<ClipFailure>,
}

/// Drives the encoder over a list of segments.
pub struct ClipExtractor {
    encoder: Arc<dyn MediaEncoder>,
    output_root: PathBuf,
}

impl ClipExtractor {
    pub fn new(encoder: Arc<dyn MediaEncoder>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            encoder,
            output_root: output_root.into(),
        }
    }

    /// Folder holding every short of a video.
    pub fn output_dir_for(&self, video: &VideoSource) -> PathBuf {
        self.output_root.join(sanitize_filename(&video.title))
    }

    /// Encode each segment into `short_NNN.mp4`.
    ///
    /// Fails only when the output folder cannot be created.
    #[instrument(skip_all, fields(video_id = %video.id, segments = segments.len()))]
    pub async fn extract(
        &self,
        video: &VideoSource,
        segments: &[CandidateSegment],
    ) -> Result<ExtractionReport> {
        let out_dir = self.output_dir_for(video);
        tokio::fs::create_dir_all(&out_dir).await.map_err(|e| {
            ShortsError::Extraction(format!("Cannot create {}: {}", out_dir.display(), e))
        })?;

        let pb = ProgressBar::new(segments.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.green} Cutting   [{bar:30.cyan/blue}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );

        let mut report = ExtractionReport::default();
        for (position, segment) in segments.iter().enumerate() {
            let sequence_index = position + 1;
            let dest = out_dir.join(clip_file_name(sequence_index));

            match self.extract_one(&video.file_path, segment, &dest).await {
                Ok(()) => {
                    info!("Created {}", dest.display());
                    report.clips.push(ClipArtifact {
                        segment: segment.clone(),
                        output_path: dest,
                        sequence_index,
                    });
                }
                Err(error) => {
                    warn!("Short {} failed: {}", sequence_index, error);
                    report.failures.push(ClipFailure {
                        sequence_index,
                        error,
                    });
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        Ok(report)
    }

    async fn extract_one(&self, source: &Path, segment: &CandidateSegment, dest: &Path) -> Result<()> {
        if !(segment.start_time >= 0.0 && segment.start_time < segment.end_time) {
            return Err(ShortsError::Extraction(format!(
                "Invalid segment bounds [{}, {})",
                segment.start_time, segment.end_time
            )));
        }
        self.encoder
            .cut_clip(source, segment.start_time, segment.duration(), dest)
            .await
    }
}

/// `short_007.mp4`
pub fn clip_file_name(sequence_index: usize) -> String {
    format!("short_{:03}.mp4", sequence_index)
}

/// Make a title safe to use as a directory name.
///
/// Illegal and control characters become `_`, the result is trimmed and
/// bounded to 50 characters. An empty result becomes `untitled`.
pub fn sanitize_filename(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let bounded: String = replaced.trim().chars().take(MAX_DIR_NAME_CHARS).collect();
    // No trailing dots or spaces
    let bounded = bounded.trim_end_matches(['.', ' ']);

    if bounded.is_empty() {
        "untitled".to_string()
    } else {
        bounded.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_video, RecordingEncoder};

    fn segments() -> Vec<CandidateSegment> {
        vec![
            CandidateSegment::new(0.0, 60.0, "one", 0.5),
            CandidateSegment::new(60.0, 120.0, "two", 0.5),
            CandidateSegment::new(120.0, 180.0, "three", 0.5),
        ]
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("What? A <Video>: Part 1/2"), "What_ A _Video__ Part 1_2");
        assert_eq!(sanitize_filename("  spaced  "), "spaced");
        assert_eq!(sanitize_filename("tab\there"), "tab_here");
        assert_eq!(sanitize_filename(""), "untitled");
        assert_eq!(sanitize_filename("..."), "untitled");
        assert_eq!(sanitize_filename(&"é".repeat(80)).chars().count(), 50);
    }

    #[test]
    fn test_clip_file_name() {
        assert_eq!(clip_file_name(3), "short_003.mp4");
        assert_eq!(clip_file_name(12), "short_012.mp4");
    }

    #[tokio::test]
    async fn test_numbering_is_stable_when_a_clip_fails() {
        let dir = tempfile::tempdir().unwrap();
        let encoder = Arc::new(RecordingEncoder::new().failing_on("short_002.mp4"));
        let extractor = ClipExtractor::new(encoder.clone(), dir.path());
        let video = sample_video("abc", "My: Video", 200.0, dir.path().join("abc.mp4"));

        let report = extractor.extract(&video, &segments()).await.unwrap();

        let names: Vec<String> = report
            .clips
            .iter()
            .map(|c| c.output_path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["short_001.mp4", "short_003.mp4"]);
        assert_eq!(report.clips[1].sequence_index, 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].sequence_index, 2);

        let out_dir = dir.path().join("My_ Video");
        assert!(out_dir.join("short_001.mp4").exists());
        assert!(!out_dir.join("short_002.mp4").exists());
        assert!(out_dir.join("short_003.mp4").exists());
        assert_eq!(encoder.cuts().len(), 3);
        assert_eq!(encoder.cuts()[2].1, 120.0);
        assert_eq!(encoder.cuts()[2].2, 60.0);
    }

    #[tokio::test]
    async fn test_corrupted_bounds_never_reach_encoder() {
        let dir = tempfile::tempdir().unwrap();
        let encoder = Arc::new(RecordingEncoder::new());
        let extractor = ClipExtractor::new(encoder.clone(), dir.path());
        let video = sample_video("abc", "Video", 200.0, dir.path().join("abc.mp4"));

        let bad = vec![
            CandidateSegment::new(50.0, 20.0, "backwards", 0.5),
            CandidateSegment::new(-3.0, 20.0, "negative", 0.5),
            CandidateSegment::new(20.0, 40.0, "fine", 0.5),
        ];
        let report = extractor.extract(&video, &bad).await.unwrap();

        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.clips.len(), 1);
        assert_eq!(report.clips[0].sequence_index, 3);
        assert_eq!(encoder.cuts().len(), 1);
    }
}

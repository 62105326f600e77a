//! JSON sidecar records written next to each short.

use crate::error::{Result, ShortsError};
use crate::extraction::ClipArtifact;
use crate::video_source::VideoSource;
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Subfolder of a video's output directory holding sidecars.
pub const METADATA_DIR: &str = "metadata";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginalVideoRecord {
    pub id: String,
    pub title: String,
    pub url: String,
    pub duration: f64,
    pub uploader: Option<String>,
    pub upload_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortRecord {
    pub file_path: PathBuf,
    pub sequence_index: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub title: String,
    pub description: String,
    pub relevance_score: f64,
}

/// Everything persisted about one short.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipMetadata {
    pub original_video: OriginalVideoRecord,
    pub short: ShortRecord,
    pub generated_at: DateTime<Local>,
    pub generator: String,
}

impl ClipMetadata {
    pub fn new(video: &VideoSource, clip: &ClipArtifact, title: String, description: String) -> Self {
        Self {
            original_video: OriginalVideoRecord {
                id: video.id.clone(),
                title: video.title.clone(),
                url: video.source_url.clone(),
                duration: video.duration,
                uploader: video.uploader.clone(),
                upload_date: video.upload_date,
            },
            short: ShortRecord {
                file_path: clip.output_path.clone(),
                sequence_index: clip.sequence_index,
                start_time: clip.segment.start_time,
                end_time: clip.segment.end_time,
                duration: clip.segment.duration(),
                title,
                description,
                relevance_score: clip.segment.relevance_score,
            },
            generated_at: Local::now(),
            generator: format!("shortsmith v{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// `metadata/short_NNN_metadata.json` under a video's output directory.
pub fn sidecar_path(video_dir: &Path, sequence_index: usize) -> PathBuf {
    video_dir
        .join(METADATA_DIR)
        .join(format!("short_{:03}_metadata.json", sequence_index))
}

/// Write the record as pretty JSON, returning its path.
pub async fn write_sidecar(video_dir: &Path, record: &ClipMetadata) -> Result<PathBuf> {
    let path = sidecar_path(video_dir, record.short.sequence_index);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            ShortsError::Metadata(format!("Cannot create {}: {}", parent.display(), e))
        })?;
    }

    let json = serde_json::to_string_pretty(record)?;
    tokio::fs::write(&path, json)
        .await
        .map_err(|e| ShortsError::Metadata(format!("Cannot write {}: {}", path.display(), e)))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::CandidateSegment;
    use crate::testing::sample_video;

    #[tokio::test]
    async fn test_write_sidecar_layout_and_fields() {
        let dir = tempfile::tempdir().unwrap();
        let video = sample_video("abc123", "Rockets", 300.0, dir.path().join("abc123.mp4"));
        let clip = ClipArtifact {
            segment: CandidateSegment::new(60.0, 90.0, "Liftoff", 0.8),
            output_path: dir.path().join("short_003.mp4"),
            sequence_index: 3,
        };

        let record = ClipMetadata::new(&video, &clip, "Go!".into(), "Up it goes".into());
        let path = write_sidecar(dir.path(), &record).await.unwrap();
        assert_eq!(path, dir.path().join("metadata").join("short_003_metadata.json"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["original_video"]["id"], "abc123");
        assert_eq!(json["original_video"]["upload_date"], "2024-03-01");
        assert_eq!(json["short"]["sequence_index"], 3);
        assert_eq!(json["short"]["duration"], 30.0);
        assert_eq!(json["short"]["title"], "Go!");
        assert_eq!(json["short"]["relevance_score"], 0.8);
        assert!(json["generator"].as_str().unwrap().starts_with("shortsmith v"));
        assert!(chrono::DateTime::parse_from_rfc3339(json["generated_at"].as_str().unwrap()).is_ok());
    }
}

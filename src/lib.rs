//! shortsmith - highlight shorts from long-form video
//!
//! A CLI tool that turns one long video into a handful of short, self-contained
//! clips with generated titles and descriptions.
//!
//! # Overview
//!
//! For each input, shortsmith:
//! - Acquires the video (YouTube via yt-dlp, or a local file)
//! - Transcribes its audio (local whisper or the OpenAI API)
//! - Asks a local LLM (Ollama) for the most interesting windows, falling back
//!   to uniform cuts when the answer is missing or unusable
//! - Cuts each window with ffmpeg and writes a JSON sidecar per short
//!
//! # Architecture
//!
//! - `config` - Configuration and prompt templates
//! - `video_source` - Video acquisition (remote, local)
//! - `media` - ffmpeg/ffprobe wrappers
//! - `transcription` - Speech-to-text
//! - `analysis` - Text-generation backend
//! - `planning` - Segment validation, fallback, and model-driven planning
//! - `extraction` - Clip cutting
//! - `metadata` - Titles, descriptions, and sidecar records
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use shortsmith::config::Settings;
//! use shortsmith::orchestrator::PipelineOrchestrator;
//! use shortsmith::stats::RunStats;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let mut orchestrator = PipelineOrchestrator::new(settings)?;
//!
//!     let report = orchestrator.process_video("dQw4w9WgXcQ", RunStats::new()).await;
//!     println!("{}", report.stats.summary());
//!
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod media;
pub mod metadata;
pub mod orchestrator;
pub mod planning;
pub mod stats;
pub mod transcription;
pub mod video_source;

#[cfg(test)]
mod testing;

pub use error::{Result, ShortsError};

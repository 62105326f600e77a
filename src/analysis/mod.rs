//! Content-analysis backend.
//!
//! A free-text generation service queried by the segment planner and the
//! metadata composer. Every failure is reported as `ShortsError::AnalysisBackend`
//! so callers can fall back without inspecting transport details.

mod ollama;

pub use ollama::OllamaBackend;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for text-generation backends.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Send a prompt and return the model's free-text answer.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

//! Configuration module for shortsmith.
//!
//! Handles loading and validating application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AnalysisPrompts, MetadataPrompts, Prompts};
pub use settings::{
    AcquisitionSettings, AnalysisSettings, FeatureSettings, LogFormat, LoggingSettings,
    PathSettings, ProcessingSettings, PromptSettings, Settings, TranscriptionProvider,
    TranscriptionSettings, VideoSettings,
};

//! Per-short title and description generation.

use crate::analysis::AnalysisBackend;
use crate::config::{FeatureSettings, Prompts};
use crate::error::ShortsError;
use crate::planning::CandidateSegment;
use crate::video_source::VideoSource;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

const TITLE_PREFIX: &str = "Title:";
const DESCRIPTION_PREFIX: &str = "Description:";

/// Characters of the source title kept in the generated default.
const DEFAULT_TITLE_CHARS: usize = 30;

/// Result of composing metadata for one short.
#[derive(Debug)]
pub struct ComposedMetadata {
    pub title: String,
    pub description: String,
    /// Set when the backend failed and the defaults were used.
    pub backend_error: Option<ShortsError>,
}

/// Produces a title and description for a short, never failing.
pub struct MetadataComposer {
    backend: Arc<dyn AnalysisBackend>,
    prompts: Prompts,
    generate_titles: bool,
}

impl MetadataComposer {
    pub fn new(backend: Arc<dyn AnalysisBackend>, prompts: Prompts, features: &FeatureSettings) -> Self {
        Self {
            backend,
            prompts,
            generate_titles: features.auto_generate_titles,
        }
    }

    #[instrument(skip_all, fields(start = segment.start_time, end = segment.end_time))]
    pub async fn compose(&self, video: &VideoSource, segment: &CandidateSegment) -> ComposedMetadata {
        if !self.generate_titles {
            return ComposedMetadata {
                title: format!("Short from {}", video.title),
                description: segment.description.clone(),
                backend_error: None,
            };
        }

        let short_title: String = video.title.chars().take(DEFAULT_TITLE_CHARS).collect();
        let short_title = short_title.trim_end();
        let mut composed = ComposedMetadata {
            title: format!("Short from {}", short_title),
            description: segment.description.clone(),
            backend_error: None,
        };

        match self.backend.generate(&self.build_prompt(video, segment)).await {
            Ok(answer) => {
                let (title, description) = parse_labeled_lines(&answer);
                if let Some(title) = title {
                    composed.title = title;
                }
                if let Some(description) = description {
                    composed.description = description;
                }
            }
            Err(e) => {
                debug!("Metadata generation failed, keeping defaults: {}", e);
                composed.backend_error = Some(e);
            }
        }

        composed
    }

    fn build_prompt(&self, video: &VideoSource, segment: &CandidateSegment) -> String {
        let mut vars = HashMap::new();
        vars.insert("title".to_string(), video.title.clone());
        vars.insert("description".to_string(), segment.description.clone());
        vars.insert("start".to_string(), format!("{:.0}", segment.start_time));
        vars.insert("end".to_string(), format!("{:.0}", segment.end_time));
        self.prompts
            .render_with_custom(&self.prompts.metadata.user, &vars)
    }
}

/// Scan lines for `Title:` / `Description:` markers. Empty values count as absent.
fn parse_labeled_lines(answer: &str) -> (Option<String>, Option<String>) {
    let mut title = None;
    let mut description = None;

    for line in answer.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix(TITLE_PREFIX) {
            title = non_empty(rest).or(title);
        } else if let Some(rest) = line.strip_prefix(DESCRIPTION_PREFIX) {
            description = non_empty(rest).or(description);
        }
    }

    (title, description)
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim().trim_matches('"').trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_video, ScriptedBackend};
    use std::path::PathBuf;

    fn video() -> VideoSource {
        sample_video(
            "abc123",
            "An Extremely Long Video Title About Rockets And Space",
            300.0,
            PathBuf::from("/tmp/abc123.mp4"),
        )
    }

    fn segment() -> CandidateSegment {
        CandidateSegment::new(10.0, 40.0, "The rocket lifts off", 0.9)
    }

    fn composer(backend: ScriptedBackend, titles: bool) -> (MetadataComposer, Arc<ScriptedBackend>) {
        let backend = Arc::new(backend);
        let features = FeatureSettings {
            auto_generate_titles: titles,
            auto_generate_descriptions: true,
        };
        (
            MetadataComposer::new(backend.clone(), Prompts::default(), &features),
            backend,
        )
    }

    #[tokio::test]
    async fn test_both_lines_override_defaults() {
        let answer = "Title: Liftoff!\nDescription: Watch the rocket leave the pad";
        let (composer, backend) = composer(ScriptedBackend::new().answering(answer), true);

        let composed = composer.compose(&video(), &segment()).await;
        assert_eq!(composed.title, "Liftoff!");
        assert_eq!(composed.description, "Watch the rocket leave the pad");
        assert!(composed.backend_error.is_none());

        let prompt = &backend.prompts()[0];
        assert!(prompt.contains("The rocket lifts off"));
        assert!(prompt.contains("10-40"));
    }

    #[tokio::test]
    async fn test_title_only_keeps_default_description() {
        let answer = "Sure, here it is.\n  Title: \"Rocket Go Up\"\n";
        let (composer, _) = composer(ScriptedBackend::new().answering(answer), true);

        let composed = composer.compose(&video(), &segment()).await;
        assert_eq!(composed.title, "Rocket Go Up");
        assert_eq!(composed.description, "The rocket lifts off");
    }

    #[tokio::test]
    async fn test_backend_failure_keeps_defaults() {
        let (composer, _) = composer(ScriptedBackend::new().failing("status 500"), true);

        let composed = composer.compose(&video(), &segment()).await;
        assert_eq!(composed.title, "Short from An Extremely Long Video Title");
        assert_eq!(composed.description, "The rocket lifts off");
        assert!(matches!(
            composed.backend_error,
            Some(ShortsError::AnalysisBackend(_))
        ));
    }

    #[tokio::test]
    async fn test_titles_off_skips_backend() {
        let (composer, backend) = composer(ScriptedBackend::new(), false);

        let composed = composer.compose(&video(), &segment()).await;
        assert_eq!(
            composed.title,
            "Short from An Extremely Long Video Title About Rockets And Space"
        );
        assert_eq!(composed.description, "The rocket lifts off");
        assert!(backend.prompts().is_empty());
    }

    #[test]
    fn test_parse_labeled_lines_ignores_empty_values() {
        let (title, description) = parse_labeled_lines("Title:\nDescription:   \n");
        assert!(title.is_none());
        assert!(description.is_none());
    }
}

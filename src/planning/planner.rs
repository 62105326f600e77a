//! Model-driven segment planning with all-or-nothing fallback.

use super::{
    fallback_segments, CandidateSegment, FallbackReason, Plan, PlanOrigin, SegmentValidator,
    FALLBACK_RELEVANCE, MAX_SHORTS_PER_VIDEO,
};
use crate::analysis::AnalysisBackend;
use crate::config::{Prompts, Settings};
use crate::transcription::Transcript;
use crate::video_source::VideoSource;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// One entry of the model's `segments` list. Missing text fields are tolerated.
#[derive(Debug, Deserialize)]
struct ProposedSegment {
    start_time: f64,
    end_time: f64,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    relevance_score: Option<f64>,
}

/// Asks the analysis backend for highlight windows.
pub struct SegmentPlanner {
    backend: Arc<dyn AnalysisBackend>,
    prompts: Prompts,
    validator: SegmentValidator,
    max_short_duration: f64,
    excerpt_chars: usize,
}

impl SegmentPlanner {
    pub fn new(backend: Arc<dyn AnalysisBackend>, prompts: Prompts, settings: &Settings) -> Self {
        Self {
            backend,
            prompts,
            validator: SegmentValidator::new(settings.video.min_short_duration),
            max_short_duration: settings.video.max_short_duration,
            excerpt_chars: settings.analysis.transcript_excerpt_chars,
        }
    }

    /// Choose up to five segments. Never fails: any backend or parse problem
    /// yields the uniform partition of the whole video instead.
    #[instrument(skip_all, fields(video_id = %video.id))]
    pub async fn plan(&self, video: &VideoSource, transcript: &Transcript) -> Plan {
        match self.ask_model(video, transcript).await {
            Ok(segments) => {
                info!("Analysis backend proposed {} usable segments", segments.len());
                Plan {
                    segments,
                    origin: PlanOrigin::Model,
                }
            }
            Err(reason) => {
                warn!("Falling back to uniform segments: {}", reason);
                Plan {
                    segments: self.fallback(video.duration),
                    origin: PlanOrigin::Fallback(reason),
                }
            }
        }
    }

    /// The deterministic partition this planner falls back to.
    pub fn fallback(&self, duration: f64) -> Vec<CandidateSegment> {
        fallback_segments(
            duration,
            self.validator.min_short_duration(),
            self.max_short_duration,
        )
    }

    fn build_prompt(&self, video: &VideoSource, transcript: &Transcript) -> String {
        let mut vars = HashMap::new();
        vars.insert("max_segments".to_string(), MAX_SHORTS_PER_VIDEO.to_string());
        vars.insert("title".to_string(), video.title.clone());
        vars.insert("duration".to_string(), format!("{:.0}", video.duration));
        vars.insert(
            "transcript".to_string(),
            transcript.excerpt(self.excerpt_chars).to_string(),
        );
        vars.insert(
            "min_duration".to_string(),
            format!("{}", self.validator.min_short_duration()),
        );
        vars.insert("max_duration".to_string(), format!("{}", self.max_short_duration));

        self.prompts
            .render_with_custom(&self.prompts.analysis.user, &vars)
    }

    async fn ask_model(
        &self,
        video: &VideoSource,
        transcript: &Transcript,
    ) -> Result<Vec<CandidateSegment>, FallbackReason> {
        let prompt = self.build_prompt(video, transcript);
        let answer = self
            .backend
            .generate(&prompt)
            .await
            .map_err(|e| FallbackReason::NoAnswer(e.to_string()))?;

        let segments = self.parse_answer(&answer, video.duration)?;
        if segments.is_empty() {
            return Err(FallbackReason::NoValidCandidates);
        }
        Ok(segments)
    }

    fn parse_answer(&self, answer: &str, duration: f64) -> Result<Vec<CandidateSegment>, FallbackReason> {
        let json = extract_json_object(answer)
            .ok_or_else(|| FallbackReason::Unparseable("no JSON object found".into()))?;

        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| FallbackReason::Unparseable(e.to_string()))?;

        let entries = value
            .get("segments")
            .and_then(|s| s.as_array())
            .ok_or_else(|| FallbackReason::Unparseable("missing \"segments\" list".into()))?;

        let segments: Vec<CandidateSegment> = entries
            .iter()
            .filter_map(|entry| serde_json::from_value::<ProposedSegment>(entry.clone()).ok())
            .filter(|p| self.validator.accepts(p.start_time, p.end_time, duration))
            .take(MAX_SHORTS_PER_VIDEO)
            .enumerate()
            .map(|(idx, p)| {
                CandidateSegment::new(
                    p.start_time,
                    p.end_time,
                    p.description
                        .filter(|d| !d.trim().is_empty())
                        .unwrap_or_else(|| format!("Segment {}", idx + 1)),
                    p.relevance_score.unwrap_or(FALLBACK_RELEVANCE),
                )
            })
            .collect();

        debug!(
            "{} of {} proposed segments accepted",
            segments.len(),
            entries.len()
        );
        Ok(segments)
    }
}

/// Return the first balanced `{...}` object embedded in free text.
///
/// Braces inside JSON strings are ignored. An opening brace that never
/// closes is skipped and the search resumes at the next one.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;

        for (i, &b) in bytes.iter().enumerate().skip(start) {
            if in_string {
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == b'"' {
                    in_string = false;
                }
                continue;
            }
            match b {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&text[start..=i]);
                    }
                }
                _ => {}
            }
        }

        search_from = start + 1;
    }

    None
}

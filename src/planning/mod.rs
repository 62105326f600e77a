//! Segment planning: choosing which time windows of a video become shorts.
//!
//! Candidates come from the analysis backend when it gives a usable answer,
//! otherwise from uniform partitioning of the video. Both paths pass through
//! the same [`SegmentValidator`] and produce identical [`CandidateSegment`]s.

mod fallback;
mod planner;
mod validator;

pub use fallback::{fallback_segments, FALLBACK_RELEVANCE};
pub use planner::{extract_json_object, SegmentPlanner};
pub use validator::{Rejection, SegmentValidator};

use serde::{Deserialize, Serialize};

/// Upper bound on shorts produced from one video.
pub const MAX_SHORTS_PER_VIDEO: usize = 5;

/// A proposed time window `[start_time, end_time)` within a source video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSegment {
    /// Start offset in seconds.
    pub start_time: f64,
    /// End offset in seconds.
    pub end_time: f64,
    /// What happens in this window.
    pub description: String,
    /// Advisory score in `[0, 1]`. Never used to filter or reorder.
    pub relevance_score: f64,
}

impl CandidateSegment {
    pub fn new(start_time: f64, end_time: f64, description: impl Into<String>, relevance_score: f64) -> Self {
        Self {
            start_time,
            end_time,
            description: description.into(),
            relevance_score: clamp_relevance(relevance_score),
        }
    }

    /// Length of the window in seconds.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

fn clamp_relevance(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        FALLBACK_RELEVANCE
    }
}

/// Why the planner substituted the uniform partition for the model's answer.
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    /// Backend unreachable, timed out, or answered with an error status.
    NoAnswer(String),
    /// The answer held no parseable JSON object with a `segments` list.
    Unparseable(String),
    /// Every proposed segment was rejected.
    NoValidCandidates,
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::NoAnswer(e) => write!(f, "no answer from analysis backend: {}", e),
            FallbackReason::Unparseable(e) => write!(f, "unparseable analysis response: {}", e),
            FallbackReason::NoValidCandidates => write!(f, "no valid segments in analysis response"),
        }
    }
}

/// Where a plan's segments came from.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanOrigin {
    Model,
    Fallback(FallbackReason),
}

/// Ordered segments chosen for one video.
#[derive(Debug, Clone)]
pub struct Plan {
    pub segments: Vec<CandidateSegment>,
    pub origin: PlanOrigin,
}

impl Plan {
    /// Whether the planner had to fall back.
    pub fn used_fallback(&self) -> bool {
        matches!(self.origin, PlanOrigin::Fallback(_))
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

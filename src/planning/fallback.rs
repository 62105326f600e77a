//! Uniform partitioning used when model-driven planning is unavailable.

use super::{CandidateSegment, SegmentValidator};

/// Neutral score given to every fallback window.
pub const FALLBACK_RELEVANCE: f64 = 0.5;

/// Split `[0, duration)` into consecutive windows of `max_short_duration`.
///
/// The last window is clipped to `duration` and dropped when shorter than
/// `min_short_duration`. Every window is checked by [`SegmentValidator`].
pub fn fallback_segments(
    duration: f64,
    min_short_duration: f64,
    max_short_duration: f64,
) -> Vec<CandidateSegment> {
    let mut segments = Vec::new();
    if max_short_duration.is_nan() || max_short_duration <= 0.0 || !duration.is_finite() || duration <= 0.0 {
        return segments;
    }

    let validator = SegmentValidator::new(min_short_duration);
    let mut index: u32 = 0;
    loop {
        // Multiply instead of accumulating so window bounds stay exact
        let start = f64::from(index) * max_short_duration;
        if start >= duration {
            break;
        }
        let end = (start + max_short_duration).min(duration);
        index += 1;

        if validator.accepts(start, end, duration) {
            segments.push(CandidateSegment::new(
                start,
                end,
                format!("Segment {}", segments.len() + 1),
                FALLBACK_RELEVANCE,
            ));
        }
    }

    segments
}

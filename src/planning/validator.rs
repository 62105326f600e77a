//! Acceptance rules for a candidate window.

/// Reason a window was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// A bound is NaN or infinite.
    NotFinite,
    NegativeStart,
    PastEnd,
    /// `start >= end`.
    Empty,
    TooShort,
}

/// Decides whether a `[start, end)` window is a usable short.
#[derive(Debug, Clone, Copy)]
pub struct SegmentValidator {
    min_short_duration: f64,
}

impl SegmentValidator {
    pub fn new(min_short_duration: f64) -> Self {
        Self { min_short_duration }
    }

    pub fn min_short_duration(&self) -> f64 {
        self.min_short_duration
    }

    /// Accepts iff `0 <= start < end <= duration` and `end - start >= min_short_duration`.
    pub fn check(&self, start: f64, end: f64, duration: f64) -> Result<(), Rejection> {
        if !start.is_finite() || !end.is_finite() {
            return Err(Rejection::NotFinite);
        }
        if start < 0.0 {
            return Err(Rejection::NegativeStart);
        }
        if end > duration {
            return Err(Rejection::PastEnd);
        }
        if start >= end {
            return Err(Rejection::Empty);
        }
        if end - start < self.min_short_duration {
            return Err(Rejection::TooShort);
        }
        Ok(())
    }

    pub fn accepts(&self, start: f64, end: f64, duration: f64) -> bool {
        self.check(start, end, duration).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_are_accepted() {
        let v = SegmentValidator::new(15.0);
        // exactly min length, starting at zero, ending at duration
        assert!(v.accepts(0.0, 15.0, 15.0));
        assert!(v.accepts(45.0, 60.0, 60.0));
        assert!(v.accepts(0.0, 60.0, 100.0));
    }

    #[test]
    fn test_rejections() {
        let v = SegmentValidator::new(15.0);
        assert_eq!(v.check(-1.0, 20.0, 100.0), Err(Rejection::NegativeStart));
        assert_eq!(v.check(90.0, 100.5, 100.0), Err(Rejection::PastEnd));
        assert_eq!(v.check(30.0, 30.0, 100.0), Err(Rejection::Empty));
        assert_eq!(v.check(40.0, 30.0, 100.0), Err(Rejection::Empty));
        assert_eq!(v.check(0.0, 14.99, 100.0), Err(Rejection::TooShort));
        assert_eq!(v.check(f64::NAN, 20.0, 100.0), Err(Rejection::NotFinite));
        assert_eq!(v.check(0.0, f64::INFINITY, 100.0), Err(Rejection::NotFinite));
    }

    #[test]
    fn test_acceptance_matches_predicate() {
        let v = SegmentValidator::new(10.0);
        let duration = 50.0;
        let points = [-5.0, 0.0, 5.0, 10.0, 25.0, 40.0, 49.0, 50.0, 55.0];
        for &start in &points {
            for &end in &points {
                let expected =
                    0.0 <= start && start < end && end <= duration && end - start >= 10.0;
                assert_eq!(v.accepts(start, end, duration), expected, "[{start}, {end})");
            }
        }
    }
}

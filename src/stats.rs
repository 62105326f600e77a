//! Run statistics, owned and mutated by the orchestrator only.

use chrono::{DateTime, Local};
use serde::Serialize;

/// Counters for one process run.
#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    pub videos_processed: u32,
    pub shorts_created: u32,
    /// Failure events, recovered or not.
    pub errors: u32,
    pub start_time: DateTime<Local>,
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            videos_processed: 0,
            shorts_created: 0,
            errors: 0,
            start_time: Local::now(),
        }
    }

    pub fn elapsed(&self) -> chrono::Duration {
        Local::now() - self.start_time
    }

    /// Multi-line report printed at the end of a run.
    pub fn summary(&self) -> String {
        format!(
            "Elapsed:          {}\nVideos processed: {}\nShorts created:   {}\nErrors:           {}",
            format_elapsed(self.elapsed()),
            self.videos_processed,
            self.shorts_created,
            self.errors
        )
    }
}

fn format_elapsed(elapsed: chrono::Duration) -> String {
    let secs = elapsed.num_seconds().max(0);
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}h {:02}m {:02}s", h, m, s)
    } else if m > 0 {
        format!("{}m {:02}s", m, s)
    } else {
        format!("{}s", s)
    }
}

//! Process command implementation.

use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::{PipelineOrchestrator, VideoOutcome};
use crate::stats::RunStats;
use anyhow::Result;

/// Run the process command. Returns whether the video produced shorts.
pub async fn run_process(input: &str, settings: Settings) -> Result<bool> {
    // Pre-flight checks
    if let Err(e) = preflight::check_process(&settings, input) {
        Output::error(&format!("{}", e));
        Output::info("Run 'shortsmith doctor' for detailed diagnostics.");
        return Ok(false);
    }

    Output::info(&format!("Processing: {}", input));

    let mut orchestrator = PipelineOrchestrator::new(settings)?;
    let report = orchestrator.process_video(input, RunStats::new()).await;

    match &report.outcome {
        VideoOutcome::Completed {
            title,
            output_dir,
            clips,
            used_fallback,
        } => {
            Output::success(&format!("Created {} shorts from '{}'", clips.len(), title));
            if *used_fallback {
                Output::warning("Analysis backend gave no usable answer; segments were cut uniformly.");
            }
            for clip in clips {
                Output::clip(clip);
            }
            Output::kv("Output", &output_dir.display().to_string());
        }
        VideoOutcome::Aborted { stage, error } => {
            Output::error(&format!("Failed while {}: {}", stage, error));
        }
    }

    Output::run_summary(&report.stats);
    Ok(report.succeeded())
}

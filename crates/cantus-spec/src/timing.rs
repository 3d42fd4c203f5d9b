//! Per-stage wall-clock timings.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Duration of one pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTiming {
    /// Stage name (e.g., "analyze", "harmony").
    pub stage: String,
    /// Elapsed time in microseconds.
    pub duration_us: u64,
}

impl StageTiming {
    pub fn new(stage: impl Into<String>, duration_us: u64) -> Self {
        Self {
            stage: stage.into(),
            duration_us,
        }
    }

    /// Elapsed time in milliseconds, rounded down.
    pub fn duration_ms(&self) -> u64 {
        self.duration_us / 1_000
    }
}

/// Running stopwatch for a stage.
///
/// ```
/// use cantus_spec::timing::StageTimer;
///
/// let timer = StageTimer::start("form");
/// let timing = timer.finish();
/// assert_eq!(timing.stage, "form");
/// ```
#[derive(Debug)]
pub struct StageTimer {
    stage: &'static str,
    started: Instant,
}

impl StageTimer {
    pub fn start(stage: &'static str) -> Self {
        Self {
            stage,
            started: Instant::now(),
        }
    }

    pub fn finish(self) -> StageTiming {
        let elapsed = self.started.elapsed().as_micros();
        StageTiming::new(self.stage, u64::try_from(elapsed).unwrap_or(u64::MAX))
    }
}

//! Stage timing for the transform pipeline.
//!
//! `StageTimer` is an RAII timer: it starts on construction and reports on
//! drop. Stages slower than their threshold are logged at warn level; with
//! the `profiling` feature every stage is logged at debug level as well.
//!
//! ```ignore
//! let _timer = StageTimer::new("filters", settings.slow_stage_warn_ms);
//! // ... stage work ...
//! ```

use crate::constants::SLOW_STAGE_WARN_MS;
use std::time::Instant;
use tracing::warn;
#[cfg(feature = "profiling")]
use tracing::debug;

/// RAII timer for a named pipeline stage.
#[derive(Debug)]
pub struct StageTimer {
    name: &'static str,
    start: Instant,
    threshold_ms: f64,
}

impl StageTimer {
    /// Create a new stage timer with a warning threshold.
    pub fn new(name: &'static str, threshold_ms: f64) -> Self {
        Self {
            name,
            start: Instant::now(),
            threshold_ms,
        }
    }

    /// Create a timer with the default slow-stage threshold.
    pub fn with_default_threshold(name: &'static str) -> Self {
        Self::new(name, SLOW_STAGE_WARN_MS)
    }

    /// Elapsed time without stopping the timer.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();

        #[cfg(feature = "profiling")]
        debug!(
            stage = self.name,
            elapsed_ms = format!("{:.2}", elapsed_ms),
            "[PERF] stage finished"
        );

        if elapsed_ms > self.threshold_ms {
            warn!(
                stage = self.name,
                elapsed_ms = format!("{:.2}", elapsed_ms),
                threshold_ms = format!("{:.2}", self.threshold_ms),
                "Slow pipeline stage"
            );
        }
    }
}

/// Measure execution time of a closure and return both the result and elapsed time.
#[inline]
pub fn measure<T, F: FnOnce() -> T>(f: F) -> (T, f64) {
    let start = Instant::now();
    let result = f();
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    (result, elapsed_ms)
}

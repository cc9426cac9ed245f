//! Log timer
//!
//! Scoped guard that logs the start and completion of a long-running step
//! (matrix construction, hybridization, Leontief solve) with its duration.

use std::time::{Duration, Instant};
use tracing::info;

/// Logs "Started <step>" on creation and "Completed <step> (mm:ss.mmm)" on drop
#[must_use = "the step is timed until the guard is dropped"]
pub struct LogTimer {
    step: String,
    start: Instant,
}

impl LogTimer {
    pub fn start(step: impl Into<String>) -> Self {
        let step = step.into();
        info!("Started {}", step);
        Self {
            step,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for LogTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        let minutes = elapsed.as_secs() / 60;
        let seconds = elapsed.as_secs_f64() - (minutes * 60) as f64;
        info!("Completed {} ({:02}:{:06.3} min:sec)", self.step, minutes, seconds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_measures_elapsed() {
        let timer = LogTimer::start("test step");
        std::thread::sleep(Duration::from_millis(2));
        assert!(timer.elapsed() >= Duration::from_millis(2));
    }
}

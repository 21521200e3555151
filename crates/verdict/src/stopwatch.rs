//! Monotonic stopwatch.

use std::time::{Duration, Instant};

/// Measures elapsed time from its creation.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::start()
    }
}

impl Stopwatch {
    /// Starts measuring now.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Time since the stopwatch started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time since the stopwatch started, in fractional milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        as_millis_f64(self.elapsed())
    }

    /// Restarts the stopwatch, returning the time measured so far.
    pub fn restart(&mut self) -> Duration {
        let elapsed = self.elapsed();
        self.start = Instant::now();
        elapsed
    }
}

/// Converts a duration to fractional milliseconds.
pub fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

//! Configuration for suites and float comparisons.
//!
//! [`Tolerance`] replaces a link-time epsilon symbol: it can be passed to a
//! comparator explicitly, or installed once for the whole process.
//! [`SuiteConfig`] carries the knobs of the parallel scheduler and is applied
//! by a [`Runner`](crate::Runner) to every suite it creates.

use once_cell::sync::OnceCell;
use std::env;
use std::num::NonZeroUsize;
use tracing::warn;

use crate::error::{Error, Result};

/// Environment variable overriding the worker count of parallel suites.
pub const WORKERS_ENV: &str = "VERDICT_WORKERS";

/// Environment variable overriding the parallel scheduler limit.
pub const SCHEDULER_LIMIT_ENV: &str = "VERDICT_SCHEDULER_LIMIT";

static INSTALLED_TOLERANCE: OnceCell<Tolerance> = OnceCell::new();

/// Relative epsilon used when comparing floating point values for equality.
///
/// Two floats `a` and `b` are equal when
/// `|a - b| <= max(|a|, |b|) * epsilon`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Epsilon applied to `f32` operands.
    pub f32: f32,
    /// Epsilon applied to `f64` operands.
    pub f64: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::machine()
    }
}

impl Tolerance {
    /// Machine epsilon for both float widths.
    pub const fn machine() -> Self {
        Self {
            f32: f32::EPSILON,
            f64: f64::EPSILON,
        }
    }

    /// Builds a tolerance with the same epsilon for both widths.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn uniform(epsilon: f64) -> Self {
        Self {
            f32: epsilon as f32,
            f64: epsilon,
        }
    }

    /// Installs the process-wide tolerance.
    ///
    /// Succeeds at most once per process; later calls return
    /// [`Error::ToleranceAlreadyInstalled`] and leave the first value active.
    pub fn install(self) -> Result<()> {
        INSTALLED_TOLERANCE
            .set(self)
            .map_err(|_| Error::ToleranceAlreadyInstalled)
    }

    /// The installed tolerance, or machine epsilon when none was installed.
    pub fn current() -> Self {
        INSTALLED_TOLERANCE.get().copied().unwrap_or_default()
    }
}

/// Settings applied to a suite when it runs.
#[derive(Debug, Clone, PartialEq)]
pub struct SuiteConfig {
    /// Number of workers a parallel suite spawns.
    pub workers: NonZeroUsize,
    /// Largest testcase count the parallel scheduler accepts. Capped at
    /// `u32::MAX`, the range of the scheduler cursor.
    pub scheduler_limit: usize,
    /// Tolerance for [`Equals`](crate::Equals) comparators built through
    /// [`Testsuite::equals`](crate::Testsuite::equals).
    pub tolerance: Tolerance,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            scheduler_limit: u32::MAX as usize,
            tolerance: Tolerance::current(),
        }
    }
}

impl SuiteConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads overrides from `VERDICT_WORKERS` and `VERDICT_SCHEDULER_LIMIT`.
    ///
    /// Unset variables keep their defaults. Unparsable values are ignored
    /// with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(workers) = read_env::<NonZeroUsize>(WORKERS_ENV) {
            config.workers = workers;
        }
        if let Some(limit) = read_env::<usize>(SCHEDULER_LIMIT_ENV) {
            config.scheduler_limit = limit;
        }
        config
    }

    /// Sets the worker count. Zero is clamped to one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = NonZeroUsize::new(workers).unwrap_or(NonZeroUsize::MIN);
        self
    }

    /// Sets the scheduler limit.
    pub fn with_scheduler_limit(mut self, limit: usize) -> Self {
        self.scheduler_limit = limit;
        self
    }

    /// Sets the float tolerance.
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// The limit actually enforced: the configured one, bounded by the
    /// range of the `u32` scheduler cursor.
    pub fn effective_scheduler_limit(&self) -> usize {
        self.scheduler_limit.min(u32::MAX as usize)
    }
}

fn default_workers() -> NonZeroUsize {
    std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

fn read_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = key, value = %raw, "Ignoring invalid configuration value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn machine_tolerance_is_epsilon() {
        let t = Tolerance::machine();
        assert_eq!(t.f32, f32::EPSILON);
        assert_eq!(t.f64, f64::EPSILON);
    }

    #[test]
    fn uniform_tolerance() {
        let t = Tolerance::uniform(0.5);
        assert_eq!(t.f32, 0.5);
        assert_eq!(t.f64, 0.5);
    }

    #[test]
    fn zero_workers_clamped() {
        let config = SuiteConfig::new().with_workers(0);
        assert_eq!(config.workers.get(), 1);
    }

    #[test]
    fn scheduler_limit_capped_to_cursor_range() {
        let config = SuiteConfig::new().with_scheduler_limit(usize::MAX);
        assert_eq!(config.effective_scheduler_limit(), u32::MAX as usize);

        let config = SuiteConfig::new().with_scheduler_limit(1024);
        assert_eq!(config.effective_scheduler_limit(), 1024);
    }

    #[test]
    fn default_workers_nonzero() {
        assert!(SuiteConfig::default().workers.get() >= 1);
    }
}

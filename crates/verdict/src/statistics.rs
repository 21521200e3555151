//! Statistics - aggregate counters for one testsuite.

use std::time::Duration;

use crate::stopwatch::as_millis_f64;
use crate::testcase::TestResult;

/// Counts of tests, failures and errors plus elapsed time.
///
/// Successes are derived: `tests - failures - errors`. Only the owning
/// testsuite mutates a `Statistics`; everyone else reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Statistics {
    tests: usize,
    failures: usize,
    errors: usize,
    elapsed: Duration,
}

impl Statistics {
    /// Number of testcases in the suite when it ran.
    pub fn tests(&self) -> usize {
        self.tests
    }

    /// Number of failed testcases.
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Number of errored testcases.
    pub fn errors(&self) -> usize {
        self.errors
    }

    /// Number of passed testcases.
    pub fn successes(&self) -> usize {
        self.tests.saturating_sub(self.failures + self.errors)
    }

    /// Elapsed time: the sum of testcase durations for a sequential suite,
    /// the slowest worker's total for a parallel one.
    pub fn elapsed_time(&self) -> Duration {
        self.elapsed
    }

    /// [`elapsed_time`](Self::elapsed_time) in fractional milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        as_millis_f64(self.elapsed)
    }

    /// True if no testcase failed or errored.
    pub fn is_success(&self) -> bool {
        self.failures == 0 && self.errors == 0
    }

    pub(crate) fn set_tests(&mut self, tests: usize) {
        self.tests = tests;
    }

    pub(crate) fn record(&mut self, result: TestResult) {
        match result {
            TestResult::Failed => self.failures += 1,
            TestResult::Errored => self.errors += 1,
            TestResult::Passed | TestResult::Undone => {}
        }
    }

    pub(crate) fn add_elapsed(&mut self, elapsed: Duration) {
        self.elapsed += elapsed;
    }

    /// Folds one worker's tally in. Elapsed time takes the maximum.
    pub(crate) fn absorb_worker(&mut self, tally: &WorkerTally) {
        self.failures += tally.failures;
        self.errors += tally.errors;
        self.elapsed = self.elapsed.max(tally.elapsed);
    }

    /// Adds another suite's statistics, summing every field.
    pub(crate) fn accumulate(&mut self, other: &Self) {
        self.tests += other.tests;
        self.failures += other.failures;
        self.errors += other.errors;
        self.elapsed += other.elapsed;
    }
}

/// Counters local to one parallel worker.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct WorkerTally {
    failures: usize,
    errors: usize,
    elapsed: Duration,
}

impl WorkerTally {
    pub(crate) fn record(&mut self, result: TestResult, duration: Duration) {
        match result {
            TestResult::Failed => self.failures += 1,
            TestResult::Errored => self.errors += 1,
            TestResult::Passed | TestResult::Undone => {}
        }
        self.elapsed += duration;
    }
}

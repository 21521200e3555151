//! Testcase - one named test function and its recorded outcome.
//!
//! A testcase starts [`TestResult::Undone`] and moves to exactly one terminal
//! state the first time [`Testcase::run`] is called. Later calls are no-ops,
//! so a reporter may trigger a run without duplicating work.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;
use tracing::trace;

use crate::assertion::{AssertionFailure, SourceLocation, UNKNOWN_ERROR, panic_message};
use crate::capture::CapturedOutput;
use crate::stopwatch::{Stopwatch, as_millis_f64};

/// Signature of a test body.
pub type TestFn = Box<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// State of a testcase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TestResult {
    /// Not executed yet.
    #[default]
    Undone,
    /// Returned `Ok(())`.
    Passed,
    /// Returned an [`AssertionFailure`].
    Failed,
    /// Returned any other error, or panicked.
    Errored,
}

impl TestResult {
    /// Get the string name of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            TestResult::Undone => "undone",
            TestResult::Passed => "passed",
            TestResult::Failed => "failed",
            TestResult::Errored => "errored",
        }
    }

    /// Returns true once the testcase has executed
    pub fn is_done(&self) -> bool {
        !matches!(self, TestResult::Undone)
    }

    /// Returns true if the test passed
    pub fn is_pass(&self) -> bool {
        matches!(self, TestResult::Passed)
    }

    /// Returns true if an assertion failed
    pub fn is_fail(&self) -> bool {
        matches!(self, TestResult::Failed)
    }

    /// Returns true if the test errored
    pub fn is_error(&self) -> bool {
        matches!(self, TestResult::Errored)
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single test function with its result, timing and captured output.
pub struct Testcase {
    name: String,
    suite_name: String,
    body: TestFn,
    result: TestResult,
    duration: Duration,
    reason: String,
    location: Option<SourceLocation>,
    output: CapturedOutput,
}

impl fmt::Debug for Testcase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Testcase")
            .field("name", &self.name)
            .field("suite_name", &self.suite_name)
            .field("result", &self.result)
            .field("duration", &self.duration)
            .field("reason", &self.reason)
            .field("location", &self.location)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

impl Testcase {
    /// Wraps `body` as testcase `name` of suite `suite_name`.
    pub fn new<F>(suite_name: impl Into<String>, name: impl Into<String>, body: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            suite_name: suite_name.into(),
            body: Box::new(body),
            result: TestResult::Undone,
            duration: Duration::ZERO,
            reason: String::new(),
            location: None,
            output: CapturedOutput::default(),
        }
    }

    /// Executes the body once and records the outcome.
    ///
    /// Output written by the body lands in whatever capture binding the
    /// calling thread holds; the owning suite moves it into the testcase
    /// afterwards. Calling this on a finished testcase returns the recorded
    /// result without running or re-timing anything.
    pub fn run(&mut self) -> TestResult {
        if self.result.is_done() {
            return self.result;
        }

        let watch = Stopwatch::start();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (self.body)()));
        self.duration = watch.elapsed();

        match outcome {
            Ok(Ok(())) => self.result = TestResult::Passed,
            Ok(Err(err)) => match err.downcast_ref::<AssertionFailure>() {
                Some(failure) => {
                    self.result = TestResult::Failed;
                    self.reason = failure.message().to_string();
                    self.location = Some(failure.location());
                }
                None => {
                    self.result = TestResult::Errored;
                    self.reason = format!("{err:#}");
                }
            },
            Err(payload) => {
                self.result = TestResult::Errored;
                self.reason =
                    panic_message(payload.as_ref()).unwrap_or_else(|| UNKNOWN_ERROR.to_string());
            }
        }

        trace!(
            suite = %self.suite_name,
            testcase = %self.name,
            result = %self.result,
            duration_ms = self.duration_ms(),
            "Testcase finished"
        );
        self.result
    }

    /// Name of the testcase.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the owning suite.
    pub fn suite_name(&self) -> &str {
        &self.suite_name
    }

    /// Alias of [`suite_name`](Self::suite_name), for contextual display.
    pub fn context(&self) -> &str {
        &self.suite_name
    }

    /// `suite/name`, the identifier filters match against.
    pub fn id(&self) -> String {
        format!("{}/{}", self.suite_name, self.name)
    }

    /// Current state.
    pub fn result(&self) -> TestResult {
        self.result
    }

    /// Time the body took; zero while undone.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// [`duration`](Self::duration) in fractional milliseconds.
    pub fn duration_ms(&self) -> f64 {
        as_millis_f64(self.duration)
    }

    /// Failure or error text; empty when passed or undone.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Where the failing assertion was made, for failed testcases.
    pub fn location(&self) -> Option<SourceLocation> {
        self.location
    }

    /// Captured stdout.
    pub fn cout(&self) -> &str {
        &self.output.stdout
    }

    /// Captured stderr.
    pub fn cerr(&self) -> &str {
        &self.output.stderr
    }

    /// Both captured streams.
    pub fn output(&self) -> &CapturedOutput {
        &self.output
    }

    pub(crate) fn record_output(&mut self, output: CapturedOutput) {
        self.output = output;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::assert_that;
    use crate::comparator::equals;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn passing_case() {
        let mut case = Testcase::new("suite", "ok", || Ok(()));
        assert_eq!(case.result(), TestResult::Undone);
        assert_eq!(case.run(), TestResult::Passed);
        assert!(case.reason().is_empty());
        assert_eq!(case.location(), None);
        assert_eq!(case.context(), "suite");
        assert_eq!(case.id(), "suite/ok");
    }

    #[test]
    fn assertion_failure_is_failed() {
        let mut case = Testcase::new("suite", "bad", || {
            assert_that(&1, equals(), &2)?;
            Ok(())
        });
        assert_eq!(case.run(), TestResult::Failed);
        assert_eq!(case.reason(), "Expected 1 to be equals 2");
        let location = case.location().unwrap();
        assert!(location.file.ends_with("testcase.rs"));
    }

    #[test]
    fn other_error_is_errored() {
        let mut case = Testcase::new("suite", "io", || {
            Err(anyhow::anyhow!("disk on fire"))
        });
        assert_eq!(case.run(), TestResult::Errored);
        assert_eq!(case.reason(), "disk on fire");
    }

    #[test]
    fn error_chain_is_kept() {
        let mut case = Testcase::new("suite", "ctx", || {
            let inner: anyhow::Result<()> = Err(anyhow::anyhow!("root cause"));
            anyhow::Context::context(inner, "loading fixture")
        });
        case.run();
        assert_eq!(case.reason(), "loading fixture: root cause");
    }

    #[test]
    fn panic_with_message_is_errored() {
        let mut case = Testcase::new("suite", "panic", || panic!("kaboom"));
        assert_eq!(case.run(), TestResult::Errored);
        assert_eq!(case.reason(), "kaboom");
    }

    #[test]
    fn panic_without_message_is_unknown() {
        let mut case = Testcase::new("suite", "opaque", || std::panic::panic_any(42_u32));
        assert_eq!(case.run(), TestResult::Errored);
        assert_eq!(case.reason(), UNKNOWN_ERROR);
    }

    #[test]
    fn second_run_is_noop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut case = Testcase::new("suite", "once", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(anyhow::anyhow!("first"))
        });
        case.run();
        let duration = case.duration();
        let reason = case.reason().to_string();

        assert_eq!(case.run(), TestResult::Errored);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(case.duration(), duration);
        assert_eq!(case.reason(), reason);
    }
}

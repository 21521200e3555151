//! Machine-readable JSON output.

use serde::Serialize;
use std::io::{self, Write};
use verdict::{Runner, Testcase, Testsuite};

use crate::Reporter;

/// Top-level JSON document.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    /// One entry per registered suite, in registration order.
    pub suites: Vec<SuiteReport<'a>>,
}

/// A suite entry.
#[derive(Debug, Serialize)]
pub struct SuiteReport<'a> {
    /// Suite name.
    pub name: &'a str,
    /// RFC 3339 creation time.
    pub timestamp: String,
    /// `sequential` or `parallel`.
    pub strategy: &'static str,
    /// Number of registered testcases.
    pub tests: usize,
    /// Testcases that failed an assertion.
    pub failures: usize,
    /// Testcases that errored or panicked.
    pub errors: usize,
    /// Testcases that passed.
    pub successes: usize,
    /// Additive for sequential suites, slowest worker for parallel ones.
    pub elapsed_ms: f64,
    /// Testcases in registration order.
    pub testcases: Vec<CaseReport<'a>>,
}

/// A testcase entry.
#[derive(Debug, Serialize)]
pub struct CaseReport<'a> {
    /// Testcase name.
    pub name: &'a str,
    /// Name of the owning suite.
    pub suite: &'a str,
    /// `undone`, `passed`, `failed` or `errored`.
    pub result: &'static str,
    /// Time spent in the test body.
    pub duration_ms: f64,
    /// Failure or error message; empty when passed.
    pub reason: &'a str,
    /// `file:line` of the failing assertion, `null` otherwise.
    pub location: Option<String>,
    /// Captured stdout.
    pub cout: &'a str,
    /// Captured stderr.
    pub cerr: &'a str,
}

impl<'a> Report<'a> {
    /// Builds the document from a runner's suites.
    pub fn from_runner(runner: &'a Runner) -> Self {
        Self {
            suites: runner.testsuites().iter().map(SuiteReport::from).collect(),
        }
    }
}

impl<'a> From<&'a Testsuite> for SuiteReport<'a> {
    fn from(suite: &'a Testsuite) -> Self {
        let stats = suite.statistics();
        Self {
            name: suite.name(),
            timestamp: suite.timestamp().to_rfc3339(),
            strategy: suite.strategy().as_str(),
            tests: stats.tests(),
            failures: stats.failures(),
            errors: stats.errors(),
            successes: stats.successes(),
            elapsed_ms: stats.elapsed_ms(),
            testcases: suite.testcases().iter().map(CaseReport::from).collect(),
        }
    }
}

impl<'a> From<&'a Testcase> for CaseReport<'a> {
    fn from(case: &'a Testcase) -> Self {
        Self {
            name: case.name(),
            suite: case.suite_name(),
            result: case.result().as_str(),
            duration_ms: case.duration_ms(),
            reason: case.reason(),
            location: case.location().map(|location| location.to_string()),
            cout: case.cout(),
            cerr: case.cerr(),
        }
    }
}

/// Writes the run as a single JSON document.
pub struct JsonReporter {
    writer: Box<dyn Write + Send>,
    pretty: bool,
}

impl JsonReporter {
    /// Pretty-printed JSON to `writer`.
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer,
            pretty: true,
        }
    }

    /// Pretty-printed JSON to stdout.
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Toggles pretty-printing.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Reporter for JsonReporter {
    fn report(&mut self, runner: &Runner) -> io::Result<()> {
        let report = Report::from_runner(runner);
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, &report)?;
        } else {
            serde_json::to_writer(&mut self.writer, &report)?;
        }
        writeln!(self.writer)?;
        self.writer.flush()
    }
}

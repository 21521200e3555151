//! Testsuite - an ordered collection of testcases plus fixture hooks,
//! executed as a unit either sequentially or across a worker pool.
//!
//! ```rust
//! use verdict::{Testsuite, TestResult, assert_eq, coutln};
//!
//! let mut suite = Testsuite::sequential("arith");
//! suite
//!     .test("adds", || {
//!         coutln!("checking addition");
//!         assert_eq(&(2 + 2), &4)?;
//!         Ok(())
//!     })
//!     .test("fails", || {
//!         assert_eq(&1, &2)?;
//!         Ok(())
//!     });
//!
//! suite.run().unwrap();
//! assert_eq!(suite.statistics().failures(), 1);
//! assert_eq!(suite.testcases()[0].cout(), "checking addition\n");
//! assert_eq!(suite.testcases()[1].result(), TestResult::Failed);
//! ```

mod hooks;
mod parallel;
mod sequential;

use chrono::{DateTime, Local};
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::capture;
use crate::comparator::Equals;
use crate::config::SuiteConfig;
use crate::error::Result;
use crate::runner::Filter;
use crate::statistics::Statistics;
use crate::testcase::Testcase;

pub use hooks::{Hook, HookErrorHandler, HookFailure, HookKind};

pub(crate) use hooks::{Fixture, Hooks};

/// How a suite executes its testcases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// One after another on the calling thread.
    Sequential,
    /// Distributed dynamically across a worker pool.
    Parallel,
}

impl Strategy {
    /// Get the string name of the strategy
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::Parallel => "parallel",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a suite has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SuiteState {
    /// Not run yet, or aborted before running.
    #[default]
    Pending,
    /// Run completed; further runs are no-ops.
    Done,
}

/// An ordered collection of testcases with optional hooks.
pub struct Testsuite {
    name: String,
    timestamp: DateTime<Local>,
    strategy: Strategy,
    config: SuiteConfig,
    testcases: Vec<Testcase>,
    statistics: Statistics,
    hooks: Hooks,
    on_hook_error: Option<HookErrorHandler>,
    state: SuiteState,
}

impl fmt::Debug for Testsuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Testsuite")
            .field("name", &self.name)
            .field("timestamp", &self.timestamp)
            .field("strategy", &self.strategy)
            .field("config", &self.config)
            .field("testcases", &self.testcases)
            .field("statistics", &self.statistics)
            .field("hooks", &self.hooks)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Testsuite {
    /// Creates an empty suite with the default configuration.
    pub fn new(name: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            name: name.into(),
            timestamp: Local::now(),
            strategy,
            config: SuiteConfig::default(),
            testcases: Vec::new(),
            statistics: Statistics::default(),
            hooks: Hooks::default(),
            on_hook_error: None,
            state: SuiteState::Pending,
        }
    }

    /// Creates an empty sequential suite.
    pub fn sequential(name: impl Into<String>) -> Self {
        Self::new(name, Strategy::Sequential)
    }

    /// Creates an empty parallel suite.
    pub fn parallel(name: impl Into<String>) -> Self {
        Self::new(name, Strategy::Parallel)
    }

    /// Replaces the suite's configuration.
    pub fn with_config(mut self, config: SuiteConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers a testcase. Insertion order is report order.
    pub fn test<F>(&mut self, name: impl Into<String>, body: F) -> &mut Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.testcases.push(Testcase::new(self.name.clone(), name, body));
        self
    }

    /// Sets the hook run once before the first testcase.
    pub fn setup<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.hooks.setup = Some(Box::new(hook));
        self
    }

    /// Sets the hook run once after the last testcase.
    pub fn teardown<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.hooks.teardown = Some(Box::new(hook));
        self
    }

    /// Sets the hook run before every testcase.
    pub fn before_each<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.hooks.before_each = Some(Box::new(hook));
        self
    }

    /// Sets the hook run after every testcase.
    pub fn after_each<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.hooks.after_each = Some(Box::new(hook));
        self
    }

    /// Receives every hook failure the suite swallows.
    pub fn on_hook_error<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&HookFailure) + Send + Sync + 'static,
    {
        self.on_hook_error = Some(Box::new(handler));
        self
    }

    /// An equality comparator using this suite's configured tolerance.
    pub fn equals(&self) -> Equals {
        Equals::within(self.config.tolerance)
    }

    /// Runs every undone testcase once.
    ///
    /// Returns immediately once the suite is [`SuiteState::Done`]. Assertion
    /// failures, errors, panics and hook failures are all recorded or
    /// swallowed, and panic reports from testcases land in their captured
    /// stderr; the only error returned is a scheduler or worker-pool
    /// failure of a parallel suite, in which case nothing ran and the suite
    /// stays pending.
    pub fn run(&mut self) -> Result<()> {
        if self.state == SuiteState::Done {
            return Ok(());
        }

        debug!(
            suite = %self.name,
            strategy = %self.strategy,
            cases = self.testcases.len(),
            "Running testsuite"
        );

        capture::route_panics();
        let fixture = Fixture {
            suite: &self.name,
            hooks: &self.hooks,
            on_error: self.on_hook_error.as_ref(),
        };
        match self.strategy {
            Strategy::Sequential => {
                sequential::run(&fixture, &mut self.testcases, &mut self.statistics);
            }
            Strategy::Parallel => {
                parallel::run(
                    &fixture,
                    &self.config,
                    &mut self.testcases,
                    &mut self.statistics,
                )?;
            }
        }
        self.state = SuiteState::Done;

        debug!(
            suite = %self.name,
            tests = self.statistics.tests(),
            failures = self.statistics.failures(),
            errors = self.statistics.errors(),
            elapsed_ms = self.statistics.elapsed_ms(),
            "Testsuite finished"
        );
        Ok(())
    }

    /// Drops pending testcases the filter rejects. Has no effect once done.
    pub(crate) fn retain(&mut self, filter: &Filter) {
        if self.state == SuiteState::Done {
            return;
        }
        let suite = &self.name;
        self.testcases
            .retain(|case| filter.accepts(suite, case.name()));
    }

    /// Name of the suite.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// When the suite was created.
    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// Execution strategy.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Configuration in effect.
    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Whether the suite has run.
    pub fn state(&self) -> SuiteState {
        self.state
    }

    /// Aggregate counters.
    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Elapsed time: additive for sequential suites, the slowest worker for
    /// parallel ones.
    pub fn execution_time(&self) -> Duration {
        self.statistics.elapsed_time()
    }

    /// Alias of [`execution_time`](Self::execution_time).
    pub fn duration(&self) -> Duration {
        self.execution_time()
    }

    /// Testcases in insertion order.
    pub fn testcases(&self) -> &[Testcase] {
        &self.testcases
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::assert_that;
    use crate::config::Tolerance;
    use crate::testcase::TestResult;

    #[test]
    fn registration_preserves_order() {
        let mut suite = Testsuite::sequential("order");
        suite.test("a", || Ok(())).test("b", || Ok(())).test("c", || Ok(()));
        let names: Vec<_> = suite.testcases().iter().map(Testcase::name).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert!(suite.testcases().iter().all(|c| c.suite_name() == "order"));
        assert_eq!(suite.state(), SuiteState::Pending);
    }

    #[test]
    fn run_marks_done() {
        let mut suite = Testsuite::sequential("done");
        suite.test("a", || Ok(()));
        suite.run().unwrap();
        assert_eq!(suite.state(), SuiteState::Done);
        assert_eq!(suite.testcases()[0].result(), TestResult::Passed);
    }

    #[test]
    fn suite_equals_uses_configured_tolerance() {
        let mut suite = Testsuite::sequential("tolerance")
            .with_config(SuiteConfig::new().with_tolerance(Tolerance::uniform(0.01)));
        let eq = suite.equals();
        suite.test("close enough", move || {
            assert_that(&1.0_f64, eq, &1.005)?;
            Ok(())
        });
        suite.run().unwrap();
        assert_eq!(suite.statistics().failures(), 0);
    }

    #[test]
    fn retain_drops_rejected_cases() {
        let mut suite = Testsuite::sequential("net");
        suite.test("fast", || Ok(())).test("slow", || Ok(()));
        suite.retain(&Filter::new().exclude("slow"));
        assert_eq!(suite.testcases().len(), 1);
        assert_eq!(suite.testcases()[0].name(), "fast");
    }

    #[test]
    fn strategy_names() {
        assert_eq!(Strategy::Parallel.to_string(), "parallel");
        assert_eq!(Strategy::Sequential.as_str(), "sequential");
    }
}

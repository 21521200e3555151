//! Ordered registry of testsuites.

use once_cell::sync::Lazy;
use parking_lot::{Mutex, MutexGuard};
use tracing::debug;

use crate::config::SuiteConfig;
use crate::error::Result;
use crate::statistics::Statistics;
use crate::suite::{Strategy, Testsuite};

static GLOBAL: Lazy<Mutex<Runner>> =
    Lazy::new(|| Mutex::new(Runner::with_config(SuiteConfig::from_env())));

/// Selects testcases by substring match on their `suite/test` identifier.
///
/// A testcase is accepted when it matches at least one include pattern (or
/// no include patterns are set) and matches no exclude pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    /// Patterns of which at least one must match.
    pub include: Vec<String>,
    /// Patterns of which none may match.
    pub exclude: Vec<String>,
}

impl Filter {
    /// A filter accepting everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an include pattern.
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include.push(pattern.into());
        self
    }

    /// Adds an exclude pattern.
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    /// Whether testcase `test` of suite `suite` passes the filter.
    pub fn accepts(&self, suite: &str, test: &str) -> bool {
        let id = format!("{suite}/{test}");
        let included =
            self.include.is_empty() || self.include.iter().any(|p| id.contains(p.as_str()));
        included && !self.exclude.iter().any(|p| id.contains(p.as_str()))
    }

    fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}

/// Runs registered testsuites in registration order.
#[derive(Debug, Default)]
pub struct Runner {
    suites: Vec<Testsuite>,
    config: SuiteConfig,
    filter: Filter,
}

impl Runner {
    /// An empty runner with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty runner whose described suites use `config`.
    pub fn with_config(config: SuiteConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Locks the process-wide runner, creating it on first use from
    /// [`SuiteConfig::from_env`].
    pub fn global() -> MutexGuard<'static, Runner> {
        GLOBAL.lock()
    }

    /// Registers a new sequential suite and returns it for chained
    /// registration.
    pub fn describe(&mut self, name: impl Into<String>) -> &mut Testsuite {
        self.push_new(name.into(), Strategy::Sequential)
    }

    /// Registers a new parallel suite and returns it for chained
    /// registration.
    pub fn describe_parallel(&mut self, name: impl Into<String>) -> &mut Testsuite {
        self.push_new(name.into(), Strategy::Parallel)
    }

    fn push_new(&mut self, name: String, strategy: Strategy) -> &mut Testsuite {
        let suite = Testsuite::new(name, strategy).with_config(self.config.clone());
        self.add(suite)
    }

    /// Appends `suite` to the registry. No de-duplication is performed.
    pub fn add(&mut self, suite: Testsuite) -> &mut Testsuite {
        let index = self.suites.len();
        self.suites.push(suite);
        &mut self.suites[index]
    }

    /// Sets the filter applied to pending suites on the next [`run`](Self::run).
    pub fn filter(&mut self, filter: Filter) -> &mut Self {
        self.filter = filter;
        self
    }

    /// Runs every registered suite in order.
    ///
    /// Stops at the first suite returning an error; suites after it stay
    /// pending. Suites that already ran are skipped, so calling this again
    /// is cheap.
    pub fn run(&mut self) -> Result<()> {
        debug!(suites = self.suites.len(), "Running testsuites");
        for suite in &mut self.suites {
            if !self.filter.is_empty() {
                suite.retain(&self.filter);
            }
            suite.run()?;
        }
        Ok(())
    }

    /// Registered suites in registration order.
    pub fn testsuites(&self) -> &[Testsuite] {
        &self.suites
    }

    /// Counters summed over every suite.
    pub fn totals(&self) -> Statistics {
        self.suites.iter().fold(Statistics::default(), |mut acc, suite| {
            acc.accumulate(suite.statistics());
            acc
        })
    }

    /// Whether no registered testcase failed or errored.
    pub fn is_success(&self) -> bool {
        self.suites.iter().all(|suite| suite.statistics().is_success())
    }
}

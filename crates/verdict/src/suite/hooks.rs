//! Fixture hooks and their failure policy.
//!
//! A hook that returns an error or panics never aborts the suite. The
//! failure is logged at `warn` level and handed to the suite's optional
//! [`HookErrorHandler`], then discarded.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use tracing::warn;

use crate::assertion::{UNKNOWN_ERROR, panic_message};

/// Signature of a setup, teardown, before-each or after-each hook.
pub type Hook = Box<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// Callback receiving every swallowed hook failure.
pub type HookErrorHandler = Box<dyn Fn(&HookFailure) + Send + Sync>;

/// Which hook a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// Runs once before the first testcase.
    Setup,
    /// Runs once after the last testcase.
    Teardown,
    /// Runs before every testcase.
    BeforeEach,
    /// Runs after every testcase.
    AfterEach,
}

impl HookKind {
    /// Get the string name of the hook
    pub fn as_str(&self) -> &'static str {
        match self {
            HookKind::Setup => "setup",
            HookKind::Teardown => "teardown",
            HookKind::BeforeEach => "before_each",
            HookKind::AfterEach => "after_each",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hook failure that was swallowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookFailure {
    /// The hook that failed.
    pub kind: HookKind,
    /// Suite the hook belongs to.
    pub suite: String,
    /// Testcase the hook ran around, for per-testcase hooks.
    pub testcase: Option<String>,
    /// Error text or panic message.
    pub reason: String,
}

/// The four optional hooks of a suite.
#[derive(Default)]
pub(crate) struct Hooks {
    pub(crate) setup: Option<Hook>,
    pub(crate) teardown: Option<Hook>,
    pub(crate) before_each: Option<Hook>,
    pub(crate) after_each: Option<Hook>,
}

impl Hooks {
    fn get(&self, kind: HookKind) -> Option<&Hook> {
        match kind {
            HookKind::Setup => self.setup.as_ref(),
            HookKind::Teardown => self.teardown.as_ref(),
            HookKind::BeforeEach => self.before_each.as_ref(),
            HookKind::AfterEach => self.after_each.as_ref(),
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("setup", &self.setup.is_some())
            .field("teardown", &self.teardown.is_some())
            .field("before_each", &self.before_each.is_some())
            .field("after_each", &self.after_each.is_some())
            .finish()
    }
}

/// Borrowed view of a suite's hooks used while it runs.
pub(crate) struct Fixture<'a> {
    pub(crate) suite: &'a str,
    pub(crate) hooks: &'a Hooks,
    pub(crate) on_error: Option<&'a HookErrorHandler>,
}

impl Fixture<'_> {
    /// Runs hook `kind` if registered, swallowing any failure.
    pub(crate) fn invoke(&self, kind: HookKind, testcase: Option<&str>) {
        let Some(hook) = self.hooks.get(kind) else {
            return;
        };
        let reason = match panic::catch_unwind(AssertUnwindSafe(|| hook())) {
            Ok(Ok(())) => return,
            Ok(Err(err)) => format!("{err:#}"),
            Err(payload) => {
                panic_message(payload.as_ref()).unwrap_or_else(|| UNKNOWN_ERROR.to_string())
            }
        };

        warn!(
            hook = %kind,
            suite = %self.suite,
            testcase = testcase.unwrap_or_default(),
            reason = %reason,
            "Hook failed; continuing"
        );
        if let Some(handler) = self.on_error {
            handler(&HookFailure {
                kind,
                suite: self.suite.to_string(),
                testcase: testcase.map(str::to_string),
                reason,
            });
        }
    }
}

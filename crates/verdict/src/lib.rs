#![forbid(unsafe_code)]
// Allow pedantic lints for early-stage API ergonomics.
#![allow(clippy::nursery)]
#![allow(clippy::pedantic)]

//! # Verdict
//!
//! A small test-assertion framework core.
//!
//! Verdict provides:
//! - Comparators with negation and readable diagnostics
//! - Assertion statements that record their source location
//! - Testcases that classify outcomes as passed, failed or errored
//! - Testsuites with fixture hooks, run sequentially or on a worker pool
//! - Per-testcase capture of output written through [`cout!`] and [`cerr!`]
//!
//! ## Example
//!
//! ```rust
//! use verdict::prelude::*;
//!
//! let mut runner = Runner::new();
//! runner
//!     .describe("strings")
//!     .test("contains", || {
//!         assert_in("ell", "hello")?;
//!         Ok(())
//!     })
//!     .test("matches", || {
//!         assert_match("2024-01-31", r"\d{4}-\d{2}-\d{2}")?;
//!         Ok(())
//!     });
//!
//! runner.run().unwrap();
//! assert!(runner.is_success());
//! assert_eq!(runner.totals().tests(), 2);
//! ```
//!
//! ## Outcomes
//!
//! - **Passed**: the body returned `Ok(())`
//! - **Failed**: the body returned an [`AssertionFailure`]
//! - **Errored**: the body returned any other error, or panicked

pub mod assertion;
pub mod capture;
pub mod comparator;
pub mod comparison;
pub mod config;
pub mod error;
pub mod runner;
pub mod statistics;
pub mod stopwatch;
pub mod suite;
pub mod testcase;

pub use assertion::{
    AssertionFailure, SourceLocation, UNKNOWN_ERROR, assert_eq, assert_false, assert_gt,
    assert_in, assert_like, assert_lt, assert_match, assert_ne, assert_no_throw, assert_panics,
    assert_runtime, assert_that, assert_throws, assert_true,
};
pub use capture::{CaptureProxy, CapturedOutput, ParallelCaptureProxy, Stream};
pub use comparator::{
    Comparator, Constraint, Equals, Equate, GreaterThan, Haystack, InRange, LessThan, Like,
    MatchGroups, MatchSlot, Matches, equals, greater_than, in_range, less_than, like, matches,
};
pub use comparison::Comparison;
pub use config::{SuiteConfig, Tolerance};
pub use error::{Error, Result};
pub use runner::{Filter, Runner};
pub use statistics::Statistics;
pub use suite::{HookFailure, HookKind, Strategy, SuiteState, Testsuite};
pub use testcase::{TestResult, Testcase};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::assertion::{
        AssertionFailure, assert_eq, assert_false, assert_gt, assert_in, assert_like, assert_lt,
        assert_match, assert_ne, assert_no_throw, assert_panics, assert_runtime, assert_that,
        assert_throws, assert_true,
    };
    pub use crate::comparator::{
        Comparator, equals, greater_than, in_range, less_than, like, matches,
    };
    pub use crate::config::{SuiteConfig, Tolerance};
    pub use crate::runner::{Filter, Runner};
    pub use crate::suite::{Strategy, Testsuite};
    pub use crate::testcase::TestResult;
    pub use crate::{cerr, cerrln, cout, coutln};
}

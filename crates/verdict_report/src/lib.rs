#![forbid(unsafe_code)]
// Allow pedantic lints for early-stage API ergonomics.
#![allow(clippy::nursery)]
#![allow(clippy::pedantic)]

//! # Verdict Report
//!
//! Reporters that render the results of a [`verdict::Runner`].
//!
//! - **Console**: colored human-readable lines, one per testcase
//! - **JSON**: a machine-readable document for CI tooling
//!
//! ## Example
//!
//! ```rust
//! use verdict::Runner;
//! use verdict_report::{ConsoleReporter, Reporter};
//!
//! let mut runner = Runner::new();
//! runner.describe("smoke").test("boots", || Ok(()));
//! runner.run().unwrap();
//!
//! let mut reporter = ConsoleReporter::with_writer(Box::new(std::io::sink()));
//! reporter.report(&runner).unwrap();
//! ```

mod console;
mod json;

use std::io;
use verdict::Runner;

pub use console::ConsoleReporter;
pub use json::{CaseReport, JsonReporter, Report, SuiteReport};

/// Renders a finished run.
///
/// Reporters only read through the runner's accessors.
pub trait Reporter {
    /// Writes the report for every suite registered with `runner`.
    fn report(&mut self, runner: &Runner) -> io::Result<()>;
}

//! Error types for suite execution and configuration.
//!
//! Assertion failures are not part of this enum: they are recovered at the
//! testcase boundary and never leave [`Testsuite::run`](crate::Testsuite::run).
//! Only the conditions below propagate to a caller.

use thiserror::Error;

/// Errors that escape a suite or runner.
#[derive(Debug, Error)]
pub enum Error {
    /// The parallel scheduler's cursor cannot address every testcase.
    ///
    /// Raised before any hook or testcase of the suite runs, so the suite's
    /// testcases are all still undone when the caller sees this error.
    #[error(
        "suite '{suite}' has {cases} testcases but the parallel scheduler can address at most {limit}"
    )]
    SchedulerOverflow {
        /// Name of the suite that refused to run.
        suite: String,
        /// Number of testcases the suite holds.
        cases: usize,
        /// Highest case count the scheduler accepts.
        limit: usize,
    },

    /// The worker pool for a parallel suite could not be built.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A process-wide tolerance was installed more than once.
    #[error("a process-wide float tolerance is already installed")]
    ToleranceAlreadyInstalled,
}

/// A specialized `Result` type for suite and runner operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_message_names_suite_and_limit() {
        let err = Error::SchedulerOverflow {
            suite: "big".to_string(),
            cases: 1025,
            limit: 1024,
        };
        let msg = err.to_string();
        assert!(msg.contains("'big'"));
        assert!(msg.contains("1025"));
        assert!(msg.contains("1024"));
    }

    #[test]
    fn tolerance_message() {
        assert_eq!(
            Error::ToleranceAlreadyInstalled.to_string(),
            "a process-wide float tolerance is already installed"
        );
    }
}

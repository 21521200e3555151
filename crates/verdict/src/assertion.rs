//! Assertion statements - the bridge from a [`Comparison`] to a testcase
//! outcome.
//!
//! Every assertion returns `Result<_, AssertionFailure>`. A test function
//! propagates the failure with `?`; the testcase recognizes the
//! [`AssertionFailure`] type and records the case as failed rather than
//! errored. The call site is captured with `#[track_caller]`.
//!
//! ```rust
//! use verdict::{assert_eq, assert_in, assert_that, less_than};
//!
//! fn body() -> anyhow::Result<()> {
//!     assert_eq(&(1 + 1), &2)?;
//!     assert_in("ell", "hello")?;
//!     assert_that(&3, !less_than(), &2)?;
//!     Ok(())
//! }
//!
//! assert!(body().is_ok());
//! ```

use regex::Regex;
use std::any::{Any, type_name};
use std::fmt::{self, Debug, Display};
use std::panic::{self, AssertUnwindSafe, Location};
use thiserror::Error;

use crate::comparator::{
    Comparator, Equate, Equals, GreaterThan, Haystack, InRange, LessThan, Like, Matches,
};
use crate::comparison::Comparison;
use crate::stopwatch::Stopwatch;

/// Source position of an assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Source file path as seen by the compiler.
    pub file: &'static str,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
}

impl SourceLocation {
    /// The location of the caller of the enclosing `#[track_caller]` function.
    #[track_caller]
    pub fn caller() -> Self {
        Location::caller().into()
    }
}

impl From<&'static Location<'static>> for SourceLocation {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A failed assertion: the comparison message plus where it was asserted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AssertionFailure {
    message: String,
    location: SourceLocation,
}

impl AssertionFailure {
    /// A failure located at the caller.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        Self::at(message, SourceLocation::caller())
    }

    /// A failure at an explicit location.
    pub fn at(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }

    /// The diagnostic message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Where the assertion was made.
    pub fn location(&self) -> SourceLocation {
        self.location
    }
}

/// Evaluates `comparator` on `(actual, expected)` and fails with the
/// comparison's message.
#[track_caller]
pub fn assert_that<A, E, C>(actual: &A, comparator: C, expected: &E) -> Result<(), AssertionFailure>
where
    A: ?Sized,
    E: ?Sized,
    C: Comparator<A, E>,
{
    match comparator.compare(actual, expected) {
        Comparison::Success => Ok(()),
        Comparison::Failure(message) => Err(AssertionFailure::new(message)),
    }
}

/// `actual` equals `expected` (float-tolerant).
#[track_caller]
pub fn assert_eq<A, E>(actual: &A, expected: &E) -> Result<(), AssertionFailure>
where
    A: Equate<E> + Debug + ?Sized,
    E: Debug + ?Sized,
{
    assert_that(actual, Equals::new(), expected)
}

/// `actual` does not equal `expected`.
#[track_caller]
pub fn assert_ne<A, E>(actual: &A, expected: &E) -> Result<(), AssertionFailure>
where
    A: Equate<E> + Debug + ?Sized,
    E: Debug + ?Sized,
{
    assert_that(actual, !Equals::new(), expected)
}

/// `actual > expected`.
#[track_caller]
pub fn assert_gt<A, E>(actual: &A, expected: &E) -> Result<(), AssertionFailure>
where
    A: PartialOrd<E> + Debug + ?Sized,
    E: Debug + ?Sized,
{
    assert_that(actual, GreaterThan::default(), expected)
}

/// `actual < expected`.
#[track_caller]
pub fn assert_lt<A, E>(actual: &A, expected: &E) -> Result<(), AssertionFailure>
where
    A: PartialOrd<E> + Debug + ?Sized,
    E: Debug + ?Sized,
{
    assert_that(actual, LessThan::default(), expected)
}

/// `actual` occurs in the `expected` container, string or range.
#[track_caller]
pub fn assert_in<A, E>(actual: &A, expected: &E) -> Result<(), AssertionFailure>
where
    A: Debug + ?Sized,
    E: Haystack<A> + Debug + ?Sized,
{
    assert_that(actual, InRange::default(), expected)
}

/// The whole of `actual` matches `pattern`.
#[track_caller]
pub fn assert_match<A>(actual: &A, pattern: &str) -> Result<(), AssertionFailure>
where
    A: AsRef<str> + Debug + ?Sized,
{
    let regex = compile(pattern)?;
    assert_that(actual, Matches::default(), &regex)
}

/// Some part of `actual` matches `pattern`.
#[track_caller]
pub fn assert_like<A>(actual: &A, pattern: &str) -> Result<(), AssertionFailure>
where
    A: AsRef<str> + Debug + ?Sized,
{
    let regex = compile(pattern)?;
    assert_that(actual, Like::default(), &regex)
}

/// `condition` is true.
#[track_caller]
pub fn assert_true(condition: bool) -> Result<(), AssertionFailure> {
    assert_that(&condition, Equals::new(), &true)
}

/// `condition` is false.
#[track_caller]
pub fn assert_false(condition: bool) -> Result<(), AssertionFailure> {
    assert_that(&condition, Equals::new(), &false)
}

#[track_caller]
fn compile(pattern: &str) -> Result<Regex, AssertionFailure> {
    Regex::new(pattern).map_err(|err| {
        AssertionFailure::at(format!("invalid pattern: {err}"), SourceLocation::caller())
    })
}

/// Requires `f` to fail with an error of type `E`, and returns that error.
///
/// An `Ok` result, an error of another type, or a panic is a failure.
#[track_caller]
pub fn assert_throws<E, T, F>(f: F) -> Result<E, AssertionFailure>
where
    E: Display + Debug + Send + Sync + 'static,
    F: FnOnce() -> anyhow::Result<T>,
{
    let location = SourceLocation::caller();
    let expected = type_name::<E>();
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(_)) => Err(AssertionFailure::at(
            format!("Expected error of type {expected}, but the call succeeded"),
            location,
        )),
        Ok(Err(err)) => err.downcast::<E>().map_err(|other| {
            AssertionFailure::at(
                format!("Expected error of type {expected}, but got: {other}"),
                location,
            )
        }),
        Err(payload) => Err(AssertionFailure::at(
            format!(
                "Expected error of type {expected}, but the call panicked: {}",
                panic_message(payload.as_ref()).unwrap_or_else(|| UNKNOWN_ERROR.to_string())
            ),
            location,
        )),
    }
}

/// Requires `f` to panic, and returns the panic message.
#[track_caller]
pub fn assert_panics<T, F>(f: F) -> Result<String, AssertionFailure>
where
    F: FnOnce() -> T,
{
    let location = SourceLocation::caller();
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(_) => Err(AssertionFailure::at(
            "Expected a panic, but the call returned",
            location,
        )),
        Err(payload) => {
            Ok(panic_message(payload.as_ref()).unwrap_or_else(|| UNKNOWN_ERROR.to_string()))
        }
    }
}

/// Requires `f` to return `Ok` without panicking, and returns its value.
#[track_caller]
pub fn assert_no_throw<T, E, F>(f: F) -> Result<T, AssertionFailure>
where
    E: Display,
    F: FnOnce() -> Result<T, E>,
{
    let location = SourceLocation::caller();
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(AssertionFailure::at(
            format!("Expected no error, but got: {err}"),
            location,
        )),
        Err(payload) => Err(AssertionFailure::at(
            format!(
                "Expected no error, but the call panicked: {}",
                panic_message(payload.as_ref()).unwrap_or_else(|| UNKNOWN_ERROR.to_string())
            ),
            location,
        )),
    }
}

/// Requires `f` to finish within `budget_ms` milliseconds, and returns its
/// value.
///
/// `f` always runs to completion; an overrun is detected afterwards.
#[track_caller]
pub fn assert_runtime<T, F>(budget_ms: u64, f: F) -> Result<T, AssertionFailure>
where
    F: FnOnce() -> T,
{
    let location = SourceLocation::caller();
    let watch = Stopwatch::start();
    let value = f();
    let elapsed = watch.elapsed_ms();
    #[allow(clippy::cast_precision_loss)]
    let budget = budget_ms as f64;
    if elapsed > budget {
        return Err(AssertionFailure::at(
            format!("Expected runtime {elapsed:.3}ms to be within {budget_ms}ms"),
            location,
        ));
    }
    Ok(value)
}

/// Reason recorded when a panic payload carries no message.
pub const UNKNOWN_ERROR: &str = "unknown error";

/// Extracts the message of a panic payload, when it is a string.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> Option<String> {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
}

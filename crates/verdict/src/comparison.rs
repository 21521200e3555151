//! Comparison - the outcome of one comparator invocation.

use std::fmt::{self, Debug, Display};

/// Success, or a failure carrying a rendered diagnostic.
///
/// The success path holds no payload and never allocates.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Comparison {
    /// The predicate held.
    Success,
    /// The predicate did not hold.
    Failure(String),
}

impl Comparison {
    /// Builds the standard failure message
    /// `Expected <actual> <phrase> <expected>`.
    pub fn failure<A, E>(actual: &A, phrase: &str, expected: &E) -> Self
    where
        A: Debug + ?Sized,
        E: Debug + ?Sized,
    {
        Self::Failure(format!("Expected {actual:?} {phrase} {expected:?}"))
    }

    /// Returns `Success` when `holds` is true, otherwise the standard failure.
    pub fn check<A, E>(holds: bool, actual: &A, phrase: &str, expected: &E) -> Self
    where
        A: Debug + ?Sized,
        E: Debug + ?Sized,
    {
        if holds {
            Self::Success
        } else {
            Self::failure(actual, phrase, expected)
        }
    }

    /// Returns true if the comparison passed.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns true if the comparison failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// The failure message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::Failure(message) => Some(message),
        }
    }
}

impl Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Failure(message) => f.write_str(message),
        }
    }
}

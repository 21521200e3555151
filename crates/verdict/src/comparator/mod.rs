//! Comparators - binary predicates producing a [`Comparison`].
//!
//! The set of comparator kinds is closed and enumerated by [`Constraint`],
//! which also owns the diagnostic phrase for both polarities. Each kind is a
//! small value type implementing [`Comparator`] for the operand types it
//! supports, and [`std::ops::Not`] to flip its polarity:
//!
//! ```rust
//! use verdict::{Comparator, equals, greater_than};
//!
//! assert!(equals().compare(&1, &1).is_success());
//! assert!((!equals()).compare(&1, &2).is_success());
//! assert_eq!(
//!     greater_than().compare(&1, &2).message(),
//!     Some("Expected 1 to be greater than 2"),
//! );
//! ```

mod equate;
mod haystack;
mod pattern;

use std::fmt::{self, Debug, Display};

use crate::comparison::Comparison;
use crate::config::Tolerance;

pub use equate::Equate;
pub use haystack::Haystack;
pub use pattern::{Like, MatchGroups, MatchSlot, Matches};

/// The closed set of comparator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    /// Equality, tolerance-aware for floats.
    Equals,
    /// Strict ordering, actual above expected.
    GreaterThan,
    /// Strict ordering, actual below expected.
    LessThan,
    /// Containment of actual within expected.
    InRange,
    /// Regex full match.
    Matches,
    /// Regex search.
    Like,
}

impl Constraint {
    /// The phrase placed between the operands of a failure message.
    pub fn phrase(self, negated: bool) -> &'static str {
        match (self, negated) {
            (Self::Equals, false) => "to be equals",
            (Self::Equals, true) => "to be not equals",
            (Self::GreaterThan, false) => "to be greater than",
            (Self::GreaterThan, true) => "to be not greater than",
            (Self::LessThan, false) => "to be less than",
            (Self::LessThan, true) => "to be not less than",
            (Self::InRange, false) => "to be in range",
            (Self::InRange, true) => "to be not in range",
            (Self::Matches, false) => "to be matching",
            (Self::Matches, true) => "to be not matching",
            (Self::Like, false) => "to be like",
            (Self::Like, true) => "to be not like",
        }
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phrase(false))
    }
}

/// A predicate over an `(actual, expected)` pair.
///
/// Implementations never panic on ordinary input; a failed predicate is
/// reported only through the returned [`Comparison`].
pub trait Comparator<A: ?Sized, E: ?Sized> {
    /// Evaluates the predicate.
    fn compare(&self, actual: &A, expected: &E) -> Comparison;
}

macro_rules! polarity {
    ($ty:ty, $constraint:expr) => {
        impl $ty {
            /// The kind of this comparator.
            pub fn constraint(&self) -> $crate::comparator::Constraint {
                $constraint
            }

            /// Whether the predicate is inverted.
            pub fn is_negated(&self) -> bool {
                self.negated
            }

            /// The phrase used in failure messages, honoring polarity.
            pub fn phrase(&self) -> &'static str {
                $constraint.phrase(self.negated)
            }
        }

        impl ::std::ops::Not for $ty {
            type Output = Self;

            fn not(mut self) -> Self {
                self.negated = !self.negated;
                self
            }
        }
    };
}

pub(crate) use polarity;

/// Equality. Floats compare with a relative epsilon taken from a
/// [`Tolerance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Equals {
    tolerance: Tolerance,
    negated: bool,
}

impl Default for Equals {
    fn default() -> Self {
        Self::new()
    }
}

impl Equals {
    /// Equality using the process-wide tolerance.
    pub fn new() -> Self {
        Self::within(Tolerance::current())
    }

    /// Equality using an explicit tolerance.
    pub fn within(tolerance: Tolerance) -> Self {
        Self {
            tolerance,
            negated: false,
        }
    }

    /// The tolerance applied to float operands.
    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }
}

polarity!(Equals, Constraint::Equals);

impl<A, E> Comparator<A, E> for Equals
where
    A: Equate<E> + Debug + ?Sized,
    E: Debug + ?Sized,
{
    fn compare(&self, actual: &A, expected: &E) -> Comparison {
        let holds = actual.equate(expected, &self.tolerance) != self.negated;
        Comparison::check(holds, actual, self.phrase(), expected)
    }
}

/// Strict `actual > expected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GreaterThan {
    negated: bool,
}

polarity!(GreaterThan, Constraint::GreaterThan);

impl<A, E> Comparator<A, E> for GreaterThan
where
    A: PartialOrd<E> + Debug + ?Sized,
    E: Debug + ?Sized,
{
    fn compare(&self, actual: &A, expected: &E) -> Comparison {
        let holds = (actual > expected) != self.negated;
        Comparison::check(holds, actual, self.phrase(), expected)
    }
}

/// Strict `actual < expected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LessThan {
    negated: bool,
}

polarity!(LessThan, Constraint::LessThan);

impl<A, E> Comparator<A, E> for LessThan
where
    A: PartialOrd<E> + Debug + ?Sized,
    E: Debug + ?Sized,
{
    fn compare(&self, actual: &A, expected: &E) -> Comparison {
        let holds = (actual < expected) != self.negated;
        Comparison::check(holds, actual, self.phrase(), expected)
    }
}

/// Containment: the actual value is the needle, the expected value the
/// haystack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InRange {
    negated: bool,
}

polarity!(InRange, Constraint::InRange);

impl<A, E> Comparator<A, E> for InRange
where
    A: Debug + ?Sized,
    E: Haystack<A> + Debug + ?Sized,
{
    fn compare(&self, actual: &A, expected: &E) -> Comparison {
        let holds = expected.contains_needle(actual) != self.negated;
        Comparison::check(holds, actual, self.phrase(), expected)
    }
}

/// Equality with the process-wide tolerance.
pub fn equals() -> Equals {
    Equals::new()
}

/// Strict greater-than.
pub fn greater_than() -> GreaterThan {
    GreaterThan::default()
}

/// Strict less-than.
pub fn less_than() -> LessThan {
    LessThan::default()
}

/// Containment of the actual value in the expected container or string.
pub fn in_range() -> InRange {
    InRange::default()
}

/// Regex full match.
pub fn matches() -> Matches {
    Matches::default()
}

/// Regex search.
pub fn like() -> Like {
    Like::default()
}

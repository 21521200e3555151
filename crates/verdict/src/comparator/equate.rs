//! Equate - type-directed equality used by [`Equals`](super::Equals).
//!
//! Integers, booleans, characters and strings compare exactly. `f32` and
//! `f64` compare with the relative formula
//! `|a - b| <= max(|a|, |b|) * epsilon`, epsilon coming from the
//! comparator's [`Tolerance`]. Containers equate element-wise, so a
//! `Vec<f64>` inherits the float rule.
//!
//! Types outside this list opt in with [`equate_by_partial_eq!`](crate::equate_by_partial_eq).

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Tolerance;

/// Equality that may consult a float tolerance.
pub trait Equate<Rhs: ?Sized = Self> {
    /// Returns true if `self` and `other` are considered equal.
    fn equate(&self, other: &Rhs, tolerance: &Tolerance) -> bool;
}

/// Implements [`Equate`] for types whose equality is plain `==`.
///
/// ```rust
/// use verdict::{Comparator, equals, equate_by_partial_eq};
///
/// #[derive(Debug, PartialEq)]
/// struct Point { x: i32, y: i32 }
///
/// equate_by_partial_eq!(Point);
///
/// assert!(equals().compare(&Point { x: 1, y: 2 }, &Point { x: 1, y: 2 }).is_success());
/// ```
#[macro_export]
macro_rules! equate_by_partial_eq {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Equate for $ty {
                fn equate(&self, other: &Self, _tolerance: &$crate::Tolerance) -> bool {
                    self == other
                }
            }
        )+
    };
}

equate_by_partial_eq!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char, (),
    Duration, Path, PathBuf,
);

impl Equate for f32 {
    fn equate(&self, other: &Self, tolerance: &Tolerance) -> bool {
        (self - other).abs() <= self.abs().max(other.abs()) * tolerance.f32
    }
}

impl Equate for f64 {
    fn equate(&self, other: &Self, tolerance: &Tolerance) -> bool {
        (self - other).abs() <= self.abs().max(other.abs()) * tolerance.f64
    }
}

macro_rules! equate_strings {
    ($(($lhs:ty, $rhs:ty)),+ $(,)?) => {
        $(
            impl Equate<$rhs> for $lhs {
                fn equate(&self, other: &$rhs, _tolerance: &Tolerance) -> bool {
                    AsRef::<str>::as_ref(self) == AsRef::<str>::as_ref(other)
                }
            }
        )+
    };
}

equate_strings!(
    (str, str),
    (str, String),
    (str, &str),
    (String, str),
    (String, String),
    (String, &str),
    (&str, str),
    (&str, String),
);

impl<A, B> Equate<&B> for &A
where
    A: Equate<B> + ?Sized,
    B: ?Sized,
{
    fn equate(&self, other: &&B, tolerance: &Tolerance) -> bool {
        (**self).equate(*other, tolerance)
    }
}

impl<A, B> Equate<Box<B>> for Box<A>
where
    A: Equate<B> + ?Sized,
    B: ?Sized,
{
    fn equate(&self, other: &Box<B>, tolerance: &Tolerance) -> bool {
        (**self).equate(&**other, tolerance)
    }
}

impl<A: Equate<B>, B> Equate<Option<B>> for Option<A> {
    fn equate(&self, other: &Option<B>, tolerance: &Tolerance) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.equate(b, tolerance),
            (None, None) => true,
            _ => false,
        }
    }
}

fn equate_slices<A: Equate<B>, B>(lhs: &[A], rhs: &[B], tolerance: &Tolerance) -> bool {
    lhs.len() == rhs.len() && lhs.iter().zip(rhs).all(|(a, b)| a.equate(b, tolerance))
}

impl<A: Equate<B>, B> Equate<[B]> for [A] {
    fn equate(&self, other: &[B], tolerance: &Tolerance) -> bool {
        equate_slices(self, other, tolerance)
    }
}

impl<A: Equate<B>, B> Equate<Vec<B>> for Vec<A> {
    fn equate(&self, other: &Vec<B>, tolerance: &Tolerance) -> bool {
        equate_slices(self, other, tolerance)
    }
}

impl<A: Equate<B>, B> Equate<[B]> for Vec<A> {
    fn equate(&self, other: &[B], tolerance: &Tolerance) -> bool {
        equate_slices(self, other, tolerance)
    }
}

impl<A: Equate<B>, B> Equate<Vec<B>> for [A] {
    fn equate(&self, other: &Vec<B>, tolerance: &Tolerance) -> bool {
        equate_slices(self, other, tolerance)
    }
}

impl<A: Equate<B>, B, const N: usize> Equate<[B; N]> for [A; N] {
    fn equate(&self, other: &[B; N], tolerance: &Tolerance) -> bool {
        equate_slices(self, other, tolerance)
    }
}

impl<A: Equate<B>, B, const N: usize> Equate<[B; N]> for Vec<A> {
    fn equate(&self, other: &[B; N], tolerance: &Tolerance) -> bool {
        equate_slices(self, other, tolerance)
    }
}

impl<A: Equate<B>, B> Equate<VecDeque<B>> for VecDeque<A> {
    fn equate(&self, other: &VecDeque<B>, tolerance: &Tolerance) -> bool {
        self.len() == other.len()
            && self.iter().zip(other).all(|(a, b)| a.equate(b, tolerance))
    }
}

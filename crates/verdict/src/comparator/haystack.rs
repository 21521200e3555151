//! Haystack - containment lookup used by [`InRange`](super::InRange).
//!
//! String haystacks search for substrings (or a `char`); sequences search
//! linearly; ranges test bounds.

use std::collections::VecDeque;
use std::ops::{Range, RangeInclusive};

/// A value that can be searched for a needle of type `N`.
pub trait Haystack<N: ?Sized> {
    /// Returns true if `needle` occurs in `self`.
    fn contains_needle(&self, needle: &N) -> bool;
}

macro_rules! string_haystack {
    ($hay:ty => $($needle:ty),+ $(,)?) => {
        $(
            impl Haystack<$needle> for $hay {
                fn contains_needle(&self, needle: &$needle) -> bool {
                    AsRef::<str>::as_ref(self).contains(AsRef::<str>::as_ref(needle))
                }
            }
        )+

        impl Haystack<char> for $hay {
            fn contains_needle(&self, needle: &char) -> bool {
                AsRef::<str>::as_ref(self).contains(*needle)
            }
        }
    };
}

string_haystack!(str => str, String, &str);
string_haystack!(String => str, String, &str);

impl<T: PartialEq<N>, N> Haystack<N> for [T] {
    fn contains_needle(&self, needle: &N) -> bool {
        self.iter().any(|item| item == needle)
    }
}

impl<T: PartialEq<N>, N, const K: usize> Haystack<N> for [T; K] {
    fn contains_needle(&self, needle: &N) -> bool {
        self.as_slice().contains_needle(needle)
    }
}

impl<T: PartialEq<N>, N> Haystack<N> for Vec<T> {
    fn contains_needle(&self, needle: &N) -> bool {
        self.as_slice().contains_needle(needle)
    }
}

impl<T: PartialEq<N>, N> Haystack<N> for VecDeque<T> {
    fn contains_needle(&self, needle: &N) -> bool {
        self.iter().any(|item| item == needle)
    }
}

impl<T, N> Haystack<N> for Range<T>
where
    T: PartialOrd + PartialOrd<N>,
    N: PartialOrd<T>,
{
    fn contains_needle(&self, needle: &N) -> bool {
        self.contains(needle)
    }
}

impl<T, N> Haystack<N> for RangeInclusive<T>
where
    T: PartialOrd + PartialOrd<N>,
    N: PartialOrd<T>,
{
    fn contains_needle(&self, needle: &N) -> bool {
        self.contains(needle)
    }
}

impl<H, N> Haystack<N> for &H
where
    H: Haystack<N> + ?Sized,
    N: ?Sized,
{
    fn contains_needle(&self, needle: &N) -> bool {
        (**self).contains_needle(needle)
    }
}

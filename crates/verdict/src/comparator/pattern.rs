//! Regex comparators.
//!
//! [`Matches`] requires the whole actual string to match; [`Like`] accepts a
//! match anywhere. Either can hand the capture groups of a successful match
//! back to the caller through a [`MatchSlot`].

use parking_lot::Mutex;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use super::{Comparator, Constraint, polarity};
use crate::comparison::Comparison;

/// Owned capture groups of one regex match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchGroups {
    groups: Vec<Option<String>>,
    names: HashMap<String, usize>,
}

impl MatchGroups {
    fn from_captures(regex: &Regex, captures: &Captures<'_>) -> Self {
        let groups = captures
            .iter()
            .map(|group| group.map(|m| m.as_str().to_string()))
            .collect();
        let names = regex
            .capture_names()
            .enumerate()
            .filter_map(|(index, name)| name.map(|n| (n.to_string(), index)))
            .collect();
        Self { groups, names }
    }

    /// The text of the whole match.
    pub fn whole(&self) -> &str {
        self.get(0).unwrap_or_default()
    }

    /// The text of group `index`, if it participated in the match.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.groups.get(index)?.as_deref()
    }

    /// The text of the named group, if it participated in the match.
    pub fn name(&self, name: &str) -> Option<&str> {
        self.get(*self.names.get(name)?)
    }

    /// Number of groups, including the implicit whole-match group.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True when no groups were recorded.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Shared cell a regex comparator fills with its last match.
///
/// Clone the slot, hand one clone to the comparator and keep the other:
///
/// ```rust
/// use regex::Regex;
/// use verdict::{Comparator, MatchSlot, like};
///
/// let slot = MatchSlot::new();
/// let re = Regex::new(r"(?P<year>\d{4})").unwrap();
/// assert!(like().capture_into(slot.clone()).compare("in 2024", &re).is_success());
/// assert_eq!(slot.get().unwrap().name("year"), Some("2024"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MatchSlot(Arc<Mutex<Option<MatchGroups>>>);

impl MatchSlot {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the recorded match, if the last comparison found one.
    pub fn get(&self) -> Option<MatchGroups> {
        self.0.lock().clone()
    }

    /// Removes and returns the recorded match.
    pub fn take(&self) -> Option<MatchGroups> {
        self.0.lock().take()
    }

    /// True when a match is recorded.
    pub fn is_filled(&self) -> bool {
        self.0.lock().is_some()
    }

    fn store(&self, groups: Option<MatchGroups>) {
        *self.0.lock() = groups;
    }
}

/// Regex full match.
#[derive(Debug, Clone, Default)]
pub struct Matches {
    negated: bool,
    slot: Option<MatchSlot>,
}

polarity!(Matches, Constraint::Matches);

impl Matches {
    /// Records the capture groups of each evaluation into `slot`.
    pub fn capture_into(mut self, slot: MatchSlot) -> Self {
        self.slot = Some(slot);
        self
    }
}

impl<A> Comparator<A, Regex> for Matches
where
    A: AsRef<str> + Debug + ?Sized,
{
    fn compare(&self, actual: &A, expected: &Regex) -> Comparison {
        // Wrapping in a non-capturing group keeps group indices and names.
        let anchored = match Regex::new(&format!(r"\A(?:{})\z", expected.as_str())) {
            Ok(regex) => regex,
            Err(err) => return Comparison::Failure(format!("invalid pattern: {err}")),
        };
        evaluate(
            &anchored,
            actual,
            expected,
            self.negated,
            self.phrase(),
            self.slot.as_ref(),
        )
    }
}

/// Regex search.
#[derive(Debug, Clone, Default)]
pub struct Like {
    negated: bool,
    slot: Option<MatchSlot>,
}

polarity!(Like, Constraint::Like);

impl Like {
    /// Records the capture groups of each evaluation into `slot`.
    pub fn capture_into(mut self, slot: MatchSlot) -> Self {
        self.slot = Some(slot);
        self
    }
}

impl<A> Comparator<A, Regex> for Like
where
    A: AsRef<str> + Debug + ?Sized,
{
    fn compare(&self, actual: &A, expected: &Regex) -> Comparison {
        evaluate(
            expected,
            actual,
            expected,
            self.negated,
            self.phrase(),
            self.slot.as_ref(),
        )
    }
}

fn evaluate<A>(
    regex: &Regex,
    actual: &A,
    pattern: &Regex,
    negated: bool,
    phrase: &str,
    slot: Option<&MatchSlot>,
) -> Comparison
where
    A: AsRef<str> + Debug + ?Sized,
{
    let captures = regex.captures(actual.as_ref());
    let found = captures.is_some();
    if let Some(slot) = slot {
        slot.store(captures.map(|c| MatchGroups::from_captures(regex, &c)));
    }
    Comparison::check(found != negated, actual, phrase, pattern.as_str())
}

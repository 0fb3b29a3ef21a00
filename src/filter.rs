//! Word filtering module
//!
//! One predicate per pipeline stage. Each predicate is built from the stage's raw
//! parameter (which is where its type check happens) and then answers `matches`
//! for single words. Letter presence and absence are plain membership tests, one per
//! letter; no pattern is ever compiled from user input.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::anagram::{parse_letters, AnagramFilter};
use crate::config::{expect_str, expect_str_list, expect_uint, value_kind};
use crate::error::{FilterError, Result};
use crate::normalize::capitalize;

/// Stage names, in execution order
pub const STAGE_NAMES: [&str; 8] = [
    "no_comp",
    "length",
    "not_contain",
    "contains",
    "start_with",
    "nth_letters",
    "end_with",
    "anagram",
];

/// A word predicate used as one pipeline stage
pub trait WordPredicate {
    /// Stage name reported in telemetry
    fn name(&self) -> &'static str;

    fn matches(&self, word: &str) -> bool;
}

/// Rejects compound words (whitespace or hyphen)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCompoundFilter;

impl WordPredicate for NoCompoundFilter {
    fn name(&self) -> &'static str {
        "no_comp"
    }

    #[inline]
    fn matches(&self, word: &str) -> bool {
        !word.chars().any(|c| c.is_whitespace() || c == '-')
    }
}

/// Exact length in characters
#[derive(Debug, Clone, Copy)]
pub struct LengthFilter {
    length: usize,
}

impl LengthFilter {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn from_param(value: &Value) -> Result<Self> {
        expect_uint("length", value).map(Self::new)
    }
}

impl WordPredicate for LengthFilter {
    fn name(&self) -> &'static str {
        "length"
    }

    #[inline]
    fn matches(&self, word: &str) -> bool {
        // Fast byte-length check first for ASCII-only words
        if word.is_ascii() {
            word.len() == self.length
        } else {
            word.chars().count() == self.length
        }
    }
}

/// Whether the letters must all be present or all be absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    All,
    None,
}

/// Presence (`contains`) or absence (`not_contain`) of a set of letters
#[derive(Debug, Clone)]
pub struct LetterSetFilter {
    letters: BTreeSet<String>,
    membership: Membership,
}

impl LetterSetFilter {
    pub fn new<I, S>(letters: I, membership: Membership) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            letters: letters.into_iter().map(Into::into).collect(),
            membership,
        }
    }

    pub fn contains_param(value: &Value) -> Result<Self> {
        expect_str_list("contains", value).map(|l| Self::new(l, Membership::All))
    }

    pub fn not_contain_param(value: &Value) -> Result<Self> {
        expect_str_list("not_contain", value).map(|l| Self::new(l, Membership::None))
    }

    /// Deduplicated letters
    pub fn letters(&self) -> &BTreeSet<String> {
        &self.letters
    }
}

impl WordPredicate for LetterSetFilter {
    fn name(&self) -> &'static str {
        match self.membership {
            Membership::All => "contains",
            Membership::None => "not_contain",
        }
    }

    #[inline]
    fn matches(&self, word: &str) -> bool {
        match self.membership {
            Membership::All => self.letters.iter().all(|l| word.contains(l.as_str())),
            Membership::None => !self.letters.iter().any(|l| word.contains(l.as_str())),
        }
    }
}

/// Required prefix, brought to corpus capitalization
#[derive(Debug, Clone)]
pub struct PrefixFilter {
    prefix: String,
}

impl PrefixFilter {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: capitalize(prefix),
        }
    }

    pub fn from_param(value: &Value) -> Result<Self> {
        expect_str("start_with", value).map(Self::new)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl WordPredicate for PrefixFilter {
    fn name(&self) -> &'static str {
        "start_with"
    }

    #[inline]
    fn matches(&self, word: &str) -> bool {
        word.starts_with(self.prefix.as_str())
    }
}

/// Required suffix, compared literally
#[derive(Debug, Clone)]
pub struct SuffixFilter {
    suffix: String,
}

impl SuffixFilter {
    pub fn new(suffix: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
        }
    }

    pub fn from_param(value: &Value) -> Result<Self> {
        expect_str("end_with", value).map(Self::new)
    }
}

impl WordPredicate for SuffixFilter {
    fn name(&self) -> &'static str {
        "end_with"
    }

    #[inline]
    fn matches(&self, word: &str) -> bool {
        word.ends_with(self.suffix.as_str())
    }
}

/// Letters required at 1-based positions
#[derive(Debug, Clone)]
pub struct PositionFilter {
    /// rank -> letter, a repeated rank keeps its last letter
    positions: BTreeMap<usize, char>,
}

impl PositionFilter {
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (usize, char)>,
    {
        Self {
            positions: entries.into_iter().collect(),
        }
    }

    /// Parse `[[rank, letter], ...]`
    pub fn from_param(value: &Value) -> Result<Self> {
        let entries = value.as_array().ok_or_else(|| {
            FilterError::invalid_param("nth_letters", "of type list", value_kind(value))
        })?;

        let parsed = entries
            .iter()
            .map(parse_position)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(parsed))
    }

    pub fn positions(&self) -> &BTreeMap<usize, char> {
        &self.positions
    }
}

fn parse_position(entry: &Value) -> Result<(usize, char)> {
    let shape_error = || FilterError::InvalidNthLettersShape(entry.to_string());

    let pair = entry.as_array().filter(|p| p.len() == 2).ok_or_else(shape_error)?;

    let rank = pair[0]
        .as_u64()
        .and_then(|r| usize::try_from(r).ok())
        .filter(|r| *r >= 1)
        .ok_or_else(shape_error)?;

    let mut letter = pair[1].as_str().ok_or_else(shape_error)?.chars();
    match (letter.next(), letter.next()) {
        (Some(c), None) => Ok((rank, c)),
        _ => Err(shape_error()),
    }
}

impl WordPredicate for PositionFilter {
    fn name(&self) -> &'static str {
        "nth_letters"
    }

    fn matches(&self, word: &str) -> bool {
        self.positions
            .iter()
            .all(|(&rank, &letter)| {
                // Rank 0 names no position and never matches
                rank.checked_sub(1).and_then(|i| word.chars().nth(i)) == Some(letter)
            })
    }
}

impl WordPredicate for AnagramFilter {
    fn name(&self) -> &'static str {
        "anagram"
    }

    #[inline]
    fn matches(&self, word: &str) -> bool {
        AnagramFilter::matches(self, word)
    }
}

/// Build the anagram stage from its raw parameter
pub fn anagram_from_param(value: &Value) -> Result<AnagramFilter> {
    parse_letters(value).map(|letters| AnagramFilter::new(&letters))
}

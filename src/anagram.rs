//! Anagram candidate generation
//!
//! The candidate set holds every arrangement of every non-empty selection of the input
//! letters, in corpus capitalization. Enumeration is exhaustive: `k` letters produce
//! `sum(k! / (k - i)!)` arrangements for `i` in `1..=k`, which is only practical for
//! word-sized inputs (around 10 letters and below). Branches that would place an already
//! tried letter at the same depth are skipped; they could only yield strings that are
//! already in the set.

use ahash::RandomState;
use hashbrown::HashSet;

use crate::config::expect_str_list;
use crate::error::{FilterError, Result};
use crate::normalize::{capitalize, normalize, strip_accents};

/// Candidate set, keyed by the normalized word form
pub type CandidateSet = HashSet<String, RandomState>;

/// Validate raw anagram parameters: every element must be a single-character string.
pub fn parse_letters(value: &serde_json::Value) -> Result<Vec<char>> {
    let items = expect_str_list("anagram", value)?;

    items
        .into_iter()
        .map(|item| {
            let mut chars = item.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(FilterError::invalid_param(
                    "anagram",
                    "a list of 1-character str",
                    format!("'{}'", item),
                )),
            }
        })
        .collect()
}

/// Every capitalized arrangement of every non-empty subset of `letters`.
///
/// Letters are accent-stripped and lower-cased first.
pub fn anagram_candidates(letters: &[char]) -> CandidateSet {
    let letters: Vec<String> = letters
        .iter()
        .map(|c| strip_accents(&c.to_string()).to_lowercase())
        .collect();

    let mut candidates = CandidateSet::with_hasher(RandomState::new());
    let mut used = vec![false; letters.len()];
    let mut current = String::new();

    arrange(&letters, &mut used, &mut current, &mut candidates);

    log::trace!(
        "{} anagram candidates from {} letters",
        candidates.len(),
        letters.len()
    );
    candidates
}

/// Depth-first walk over arrangements; every non-empty prefix is itself an arrangement.
fn arrange(letters: &[String], used: &mut [bool], current: &mut String, out: &mut CandidateSet) {
    let mut tried: Vec<&str> = Vec::with_capacity(letters.len());

    for i in 0..letters.len() {
        if used[i] || tried.contains(&letters[i].as_str()) {
            continue;
        }
        tried.push(&letters[i]);

        let mark = current.len();
        current.push_str(&letters[i]);
        used[i] = true;

        out.insert(capitalize(current));
        arrange(letters, used, current, out);

        used[i] = false;
        current.truncate(mark);
    }
}

/// Keeps words that are an arrangement of some of the given letters
#[derive(Debug, Clone)]
pub struct AnagramFilter {
    candidates: CandidateSet,
}

impl AnagramFilter {
    pub fn new(letters: &[char]) -> Self {
        Self {
            candidates: anagram_candidates(letters),
        }
    }

    /// Accent- and case-insensitive membership test
    #[inline]
    pub fn matches(&self, word: &str) -> bool {
        self.candidates.contains(&normalize(word))
    }

    pub fn candidates(&self) -> &CandidateSet {
        &self.candidates
    }
}

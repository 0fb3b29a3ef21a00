//! Word normalization
//!
//! Corpus words are stored capitalized ("Gratuit"), so comparisons bring user input
//! to the same convention. Accent-insensitive comparisons additionally drop diacritics.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Remove diacritics: canonical decomposition, then drop the combining marks.
pub fn strip_accents(word: &str) -> String {
    word.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// First character upper case, the rest lower case.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Accent-stripped, capitalized form used for accent-insensitive matching.
#[inline]
pub fn normalize(word: &str) -> String {
    capitalize(&strip_accents(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_accents() {
        assert_eq!(strip_accents("Été"), "Ete");
        assert_eq!(strip_accents("ça"), "ca");
        assert_eq!(strip_accents("naïveté"), "naivete");
        assert_eq!(strip_accents("plain"), "plain");
    }

    #[test]
    fn test_strip_accents_decomposed_input() {
        // "e" followed by a combining acute accent
        assert_eq!(strip_accents("e\u{301}t\u{301}"), "et");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("gRATUIT"), "Gratuit");
        assert_eq!(capitalize("g"), "G");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("éTÉ"), "Été");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("ÉTÉ"), "Ete");
        assert_eq!(normalize("tac"), "Tac");
        assert_eq!(normalize("Œuvre"), "Œuvre");
    }
}

//! Command-line interface definition for dictionary-filter
//!
//! Provides argument parsing and turns the flags into a [`FilterSpec`].

use clap::Parser;
use serde_json::Value;
use std::path::PathBuf;

use crate::config::{FilterSpec, LogLevel};

/// Dictionary word filter
///
/// Narrow a dictionary corpus by length, prefix, suffix, letter positions,
/// required or forbidden letters and anagrams.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "dictionary-filter",
    author = "m0h1nd4",
    version,
    about = "Filter a dictionary corpus with composable word constraints",
    long_about = r#"
Filter a dictionary corpus (CSV with a header row) with composable constraints.
Stages always run in this order: no_comp, length, not_contain, contains,
start_with, nth_letters, end_with, anagram.

EXAMPLES:
    # 7-letter words starting with "g", ending with "it", 4th letter "t"
    dictionary-filter -i dico.csv -l 7 --start-with g --end-with it --nth 4:t

    # Words containing both 'a' and 'u' but no 'b'
    dictionary-filter -i dico.csv --contains a,u --not-contain b

    # 5-letter anagrams of "carte" (accents ignored)
    dictionary-filter -i dico.csv --anagram carte -l 5

    # Filters from a JSON spec file, with per-stage statistics
    dictionary-filter -i dico.csv --spec filters.json --stats

    # Definitions of a word
    dictionary-filter -i dico.csv --define hallali
"#
)]
pub struct Args {
    /// Corpus file (delimited text with a header row)
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Column holding the words
    #[arg(short = 'C', long, value_name = "NAME", default_value = "Mot")]
    pub column: String,

    /// Field delimiter of the corpus file
    #[arg(long, value_name = "CHAR", default_value_t = ',')]
    pub delimiter: char,

    /// JSON filter spec; flags below override its fields
    #[arg(long, value_name = "PATH")]
    pub spec: Option<PathBuf>,

    /// Keep compound words (containing spaces or hyphens)
    #[arg(long, default_value_t = false)]
    pub allow_compound: bool,

    /// Exact word length
    #[arg(short, long, value_name = "LENGTH")]
    pub length: Option<usize>,

    /// Required beginning of the word
    #[arg(short, long, value_name = "PREFIX")]
    pub start_with: Option<String>,

    /// Required ending of the word
    #[arg(short, long, value_name = "SUFFIX")]
    pub end_with: Option<String>,

    /// Letter at a 1-based position, as RANK:LETTER (repeatable)
    #[arg(short, long = "nth", value_name = "RANK:LETTER", value_delimiter = ',')]
    pub nth: Vec<String>,

    /// Letters the word must contain (comma-separated)
    #[arg(short, long, value_name = "LETTERS", value_delimiter = ',')]
    pub contains: Vec<String>,

    /// Letters the word must not contain (comma-separated)
    #[arg(long, value_name = "LETTERS", value_delimiter = ',')]
    pub not_contain: Vec<String>,

    /// Letters the word must be an arrangement of (any subset)
    #[arg(short, long, value_name = "LETTERS")]
    pub anagram: Option<String>,

    /// Verbosity: debug, info, warning, critical or none
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Write the filtered corpus to this CSV file instead of printing words
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Write one word per line instead of the full CSV (with --output)
    #[arg(long, default_value_t = false)]
    pub words_only: bool,

    /// Write stage statistics as JSON
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Show per-stage statistics
    #[arg(long, default_value_t = false)]
    pub stats: bool,

    /// Look up the definitions of a word instead of filtering
    #[arg(long, value_name = "WORD")]
    pub define: Option<String>,

    /// Column holding the definitions (with --define)
    #[arg(long, value_name = "NAME", default_value = "Définitions")]
    pub definition_column: String,

    /// Quiet mode - minimal output
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// Verbose mode - same as --log-level debug
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Args {
    /// Log level requested on the command line, if any
    pub fn requested_log_level(&self) -> Option<LogLevel> {
        if self.verbose {
            Some(LogLevel::Debug)
        } else {
            self.log_level.as_deref().map(LogLevel::from_name)
        }
    }

    /// Delimiter as a single byte
    pub fn delimiter_byte(&self) -> anyhow::Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| anyhow::anyhow!("Delimiter must be an ASCII character: '{}'", self.delimiter))
    }

    /// Build the filter spec: spec file first, then flag overrides
    pub fn filter_spec(&self) -> anyhow::Result<FilterSpec> {
        let mut spec = match self.spec {
            Some(ref path) => FilterSpec::load(path)?,
            None => FilterSpec::default(),
        };

        if self.allow_compound {
            spec.no_comp = false;
        }
        if let Some(length) = self.length {
            spec.length = Some(Value::from(length));
        }
        if let Some(ref prefix) = self.start_with {
            spec.start_with = Some(Value::String(prefix.clone()));
        }
        if let Some(ref suffix) = self.end_with {
            spec.end_with = Some(Value::String(suffix.clone()));
        }
        if !self.nth.is_empty() {
            spec.nth_letters = Some(parse_nth_letters(&self.nth)?);
        }
        if !self.contains.is_empty() {
            spec.contains = Some(string_list(&self.contains));
        }
        if !self.not_contain.is_empty() {
            spec.not_contain = Some(string_list(&self.not_contain));
        }
        if let Some(ref letters) = self.anagram {
            let letters: Vec<String> = letters
                .chars()
                .filter(|c| !c.is_whitespace() && *c != ',')
                .map(String::from)
                .collect();
            spec.anagram = Some(string_list(&letters));
        }
        if let Some(level) = self.requested_log_level() {
            spec.log_level = level;
        }

        Ok(spec)
    }
}

fn string_list(items: &[String]) -> Value {
    Value::Array(items.iter().map(|s| Value::String(s.trim().to_string())).collect())
}

/// Parse `RANK:LETTER` items into `[[rank, "letter"], ...]`.
///
/// The shape of the letter is left to the pipeline, which reports it like any other
/// malformed `nth_letters` entry.
pub fn parse_nth_letters(items: &[String]) -> anyhow::Result<Value> {
    let mut entries = Vec::with_capacity(items.len());

    for item in items {
        let item = item.trim();
        let (rank, letter) = item
            .split_once(':')
            .ok_or_else(|| anyhow::anyhow!("Invalid --nth value '{}'. Use RANK:LETTER (e.g., 4:t)", item))?;

        let rank: u64 = rank
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid rank in --nth value '{}'", item))?;

        entries.push(Value::Array(vec![Value::from(rank), Value::String(letter.to_string())]));
    }

    Ok(Value::Array(entries))
}

//! # Dictionary Filter
//!
//! Narrow a dictionary corpus with composable word constraints.
//!
//! ## Features
//!
//! - **Compound words**: Drop words containing spaces or hyphens (on by default)
//! - **Length**: Keep words of an exact length
//! - **Letters**: Require or forbid letters, fix letters at given positions
//! - **Prefix / suffix**: Keep words starting or ending with a fragment
//! - **Anagrams**: Keep words spelled with any subset of a set of letters, accents ignored
//! - **Telemetry**: Per-stage timings and row counts, logged at the run's own level
//! - **Encoding detection**: Latin-1 and Windows-1252 exports are transcoded before parsing
//!
//! ## Usage
//!
//! ```bash
//! # 7-letter words starting with "g", ending with "it", 4th letter "t"
//! dictionary-filter -i dico.csv -l 7 --start-with g --end-with it --nth 4:t
//!
//! # Anagrams of "carte", with per-stage statistics
//! dictionary-filter -i dico.csv --anagram carte --stats
//! ```
//!
//! ## Example
//!
//! ```rust
//! use dictionary_filter::{multi_filter, Corpus, FilterSpec, LogLevel};
//!
//! let corpus = Corpus::from_words("Mot", ["Chat", "Chaton", "Chien", "Porte-clé"]);
//! let spec = FilterSpec::new()
//!     .with_start_with("ch")
//!     .with_length(4)
//!     .with_log_level(LogLevel::None);
//!
//! let result = multi_filter(&corpus, "Mot", &spec)?;
//! assert_eq!(result.words(), vec!["Chat"]);
//! assert_eq!(result.summary.filters_applied, vec!["no_comp", "length", "start_with"]);
//! # Ok::<(), dictionary_filter::FilterError>(())
//! ```

pub mod anagram;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod encoding;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod telemetry;

pub use anagram::anagram_candidates;
pub use cli::Args;
pub use config::{FilterSpec, LogLevel};
pub use corpus::{Corpus, WordRecord};
pub use error::{FilterError, Result};
pub use normalize::normalize;
pub use pipeline::{multi_filter, validate, FilteredCorpus};
pub use telemetry::{FilterRunStats, RunSummary, Telemetry};

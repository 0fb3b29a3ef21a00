//! Word corpus
//!
//! A [`Corpus`] is a small table: named columns and one [`WordRecord`] per row. The
//! filtering pipeline reads the words from one column and carries the other fields
//! (definitions, for instance) along untouched.
//!
//! Loading goes through [`Corpus::load_csv`] and [`Corpus::prepare`], which together hand
//! the pipeline a sorted, deduplicated corpus without empty fields.

use std::collections::HashSet;
use std::path::Path;

use crate::encoding::read_to_utf8;
use crate::normalize::capitalize;

/// One row of the corpus
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WordRecord {
    fields: Vec<String>,
}

impl WordRecord {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<&str> for WordRecord {
    fn from(word: &str) -> Self {
        Self::new(vec![word.to_string()])
    }
}

/// Ordered table of word records
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Corpus {
    columns: Vec<String>,
    records: Vec<WordRecord>,
}

impl Corpus {
    /// Build a corpus as-is. Shape is checked when the corpus is filtered.
    pub fn new(columns: Vec<String>, records: Vec<WordRecord>) -> Self {
        Self { columns, records }
    }

    /// Single-column corpus
    pub fn from_words<I, S>(column: &str, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let records = words
            .into_iter()
            .map(|w| WordRecord::from(w.as_ref()))
            .collect();
        Self::new(vec![column.to_string()], records)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[WordRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Words of a column, in corpus order. Empty if the column does not exist.
    pub fn words(&self, column: &str) -> Vec<&str> {
        match self.column_index(column) {
            Some(idx) => self.records.iter().filter_map(|r| r.field(idx)).collect(),
            None => Vec::new(),
        }
    }

    /// Describe the first structural defect, if any
    pub fn shape_error(&self) -> Option<String> {
        if self.columns.is_empty() {
            return Some("no columns".to_string());
        }

        self.records
            .iter()
            .position(|r| r.len() != self.columns.len())
            .map(|row| {
                format!(
                    "row {} has {} fields, expected {}",
                    row,
                    self.records[row].len(),
                    self.columns.len()
                )
            })
    }

    /// Load a delimited file whose first row holds the column names
    pub fn load_csv(path: &Path, delimiter: u8) -> anyhow::Result<Self> {
        let (text, source) = read_to_utf8(path)?;
        log::info!("Loading corpus {:?} ({})", path, source.name());
        Self::from_csv_str(&text, delimiter)
            .map_err(|e| anyhow::anyhow!("Cannot parse corpus {:?}: {}", path, e))
    }

    /// Parse delimited text whose first row holds the column names
    pub fn from_csv_str(text: &str, delimiter: u8) -> anyhow::Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_reader(text.as_bytes());

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if columns.is_empty() {
            anyhow::bail!("Missing header row");
        }

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            records.push(WordRecord::new(row.iter().map(str::to_string).collect()));
        }

        Ok(Self::new(columns, records))
    }

    /// Sort by `column`, drop records with an empty field, keep the first of each word.
    pub fn prepare(self, column: &str) -> anyhow::Result<Self> {
        if let Some(defect) = self.shape_error() {
            anyhow::bail!("Malformed corpus: {}", defect);
        }
        let idx = self.require_column(column)?;

        let before = self.records.len();
        let mut records: Vec<WordRecord> = self
            .records
            .into_iter()
            .filter(|r| r.fields().iter().all(|f| !f.trim().is_empty()))
            .collect();
        let incomplete = before - records.len();

        // Stable sort keeps the original order among equal words
        records.sort_by(|a, b| a.field(idx).cmp(&b.field(idx)));

        let mut seen = HashSet::with_capacity(records.len());
        records.retain(|r| r.field(idx).is_some_and(|w| seen.insert(w.to_string())));
        let duplicates = before - incomplete - records.len();

        log::debug!(
            "Corpus prepared: {} rows kept, {} incomplete, {} duplicates",
            records.len(),
            incomplete,
            duplicates
        );

        Ok(Self::new(self.columns, records))
    }

    /// Look up the definitions of `word` (capitalized before lookup).
    ///
    /// Returns `Ok(None)` when the word is not in the corpus.
    pub fn define(
        &self,
        word_column: &str,
        definition_column: &str,
        word: &str,
    ) -> anyhow::Result<Option<Vec<String>>> {
        let word_idx = self.require_column(word_column)?;
        let def_idx = self.require_column(definition_column)?;
        let word = capitalize(word.trim());

        let Some(record) = self.records.iter().find(|r| r.field(word_idx) == Some(word.as_str()))
        else {
            return Ok(None);
        };

        let cell = record.field(def_idx).unwrap_or_default();
        parse_definitions(cell)
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Malformed definitions for '{}': {}", word, e))
    }

    fn require_column(&self, column: &str) -> anyhow::Result<usize> {
        self.column_index(column).ok_or_else(|| {
            anyhow::anyhow!(
                "'{}' column doesn't exist. Columns present: {:?}",
                column,
                self.columns
            )
        })
    }
}

/// Parse a definitions cell.
///
/// Cells hold a bracketed list of quoted strings (`['Sens 1', "Sens 2"]`). A cell that
/// does not open with `[` is taken as one definition.
pub fn parse_definitions(cell: &str) -> anyhow::Result<Vec<String>> {
    let cell = cell.trim();
    let Some(list) = cell.strip_prefix('[') else {
        return Ok(if cell.is_empty() {
            Vec::new()
        } else {
            vec![cell.to_string()]
        });
    };
    let inner = list
        .strip_suffix(']')
        .ok_or_else(|| anyhow::anyhow!("unterminated list"))?;

    let mut definitions = Vec::new();
    let mut chars = inner.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let quote = match chars.next() {
            None => break,
            Some(q @ ('\'' | '"')) => q,
            Some(c) => anyhow::bail!("expected a quoted string, found '{}'", c),
        };

        let mut definition = String::new();
        loop {
            match chars.next() {
                None => anyhow::bail!("unterminated string"),
                Some('\\') => match chars.next() {
                    Some('n') => definition.push('\n'),
                    Some('t') => definition.push('\t'),
                    Some(c) => definition.push(c),
                    None => anyhow::bail!("unterminated string"),
                },
                Some(c) if c == quote => break,
                Some(c) => definition.push(c),
            }
        }
        definitions.push(definition);

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            None => break,
            Some(',') => continue,
            Some(c) => anyhow::bail!("expected ',' between definitions, found '{}'", c),
        }
    }

    Ok(definitions)
}

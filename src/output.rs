//! Output management module
//!
//! Writes filtered corpora (CSV with the original header, or one word per line) and
//! JSON run reports.

use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::corpus::Corpus;
use crate::pipeline::FilteredCorpus;
use crate::telemetry::{FilterRunStats, RunSummary};

/// Default buffer size for file writing (1MB)
const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Output file writer with buffering
pub struct OutputWriter {
    writer: BufWriter<File>,
    lines_written: u64,
}

impl OutputWriter {
    /// Create a new output writer, truncating any existing file
    pub fn new(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            ensure_output_dir(parent)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| anyhow::anyhow!("Cannot create {:?}: {}", path, e))?;

        Ok(Self {
            writer: BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file),
            lines_written: 0,
        })
    }

    /// Write a line to the output
    pub fn write_line(&mut self, line: &str) -> anyhow::Result<()> {
        writeln!(self.writer, "{}", line)?;
        self.lines_written += 1;
        Ok(())
    }

    /// Flush the buffer to disk
    pub fn flush(&mut self) -> anyhow::Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }
}

impl Drop for OutputWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// Write a corpus as delimited text, header first. Returns the number of records.
pub fn write_csv(path: &Path, corpus: &Corpus, delimiter: u8) -> anyhow::Result<u64> {
    if let Some(parent) = path.parent() {
        ensure_output_dir(parent)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| anyhow::anyhow!("Cannot create {:?}: {}", path, e))?;

    writer.write_record(corpus.columns())?;
    for record in corpus.records() {
        writer.write_record(record.fields())?;
    }
    writer.flush()?;

    Ok(corpus.len() as u64)
}

/// Write one word per line. Returns the number of words written.
pub fn write_words(path: &Path, result: &FilteredCorpus) -> anyhow::Result<u64> {
    let mut writer = OutputWriter::new(path)?;
    for word in result.words() {
        writer.write_line(word)?;
    }
    writer.flush()?;
    Ok(writer.lines_written())
}

/// Serializable view of a run
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub column: &'a str,
    pub stages: &'a [FilterRunStats],
    pub summary: &'a RunSummary,
}

impl<'a> RunReport<'a> {
    pub fn new(column: &'a str, result: &'a FilteredCorpus) -> Self {
        Self {
            column,
            stages: result.stages(),
            summary: &result.summary,
        }
    }
}

/// Write a pretty-printed JSON report
pub fn write_report(path: &Path, report: &RunReport<'_>) -> anyhow::Result<()> {
    let mut writer = OutputWriter::new(path)?;
    let json = serde_json::to_string_pretty(report)?;
    writer.write_line(&json)?;
    writer.flush()
}

/// Ensure output directory exists
pub fn ensure_output_dir(path: &Path) -> anyhow::Result<()> {
    if !path.as_os_str().is_empty() && !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

//! Terminal presentation
//!
//! Status lines, the corpus loading spinner, definition listings and the stage
//! statistics table.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::telemetry::{FilterRunStats, RunSummary};

const RULE_WIDTH: usize = 72;

/// Kind of a one-line status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Info,
    Done,
    Warn,
    Fail,
}

impl Status {
    fn marker(self) -> ColoredString {
        match self {
            Self::Info => "·".cyan(),
            Self::Done => "✔".green(),
            Self::Warn => "!".yellow().bold(),
            Self::Fail => "✖".red().bold(),
        }
    }

    fn paint(self, text: &str) -> ColoredString {
        match self {
            Self::Info => text.normal(),
            Self::Done => text.green(),
            Self::Warn => text.yellow(),
            Self::Fail => text.red(),
        }
    }
}

/// Print one status line; failures go to stderr
pub fn status(kind: Status, text: &str) {
    let line = format!("  {} {}", kind.marker(), kind.paint(text));
    match kind {
        Status::Fail => eprintln!("{}", line),
        _ => println!("{}", line),
    }
}

/// Title line printed once per run
pub fn print_title(input: &str) {
    println!(
        "{} {} {}",
        "dictionary-filter".green().bold(),
        env!("CARGO_PKG_VERSION").dimmed(),
        input.dimmed()
    );
}

/// Section heading followed by a rule
pub fn print_section(title: &str) {
    println!();
    println!("{}", title.green().bold());
    println!("{}", "─".repeat(RULE_WIDTH).dimmed());
}

/// Spinner shown while the corpus is read and decoded
pub fn loading_spinner(what: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["◐", "◓", "◑", "◒", "●"]),
    );
    spinner.set_message(format!("Reading {}", what));
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Numbered definitions of one word
pub fn print_definitions(word: &str, definitions: &[String]) {
    print_section(&format!("Definitions of '{}'", word));
    for (rank, definition) in definitions.iter().enumerate() {
        println!("  {:>2}. {}", (rank + 1).to_string().green(), definition);
    }
}

/// One row per executed stage
pub fn print_stage_table(stages: &[FilterRunStats]) {
    print_section("Stages");
    println!(
        "  {:<12} {:>9} {:>11} {:>11} {:>9} {:>9}",
        "filter", "time", "before", "after", "stage", "global"
    );

    for stage in stages {
        let row = format!(
            "  {:<12} {:>9} {:>11} {:>11} {:>9} {:>9}",
            stage.filter_name,
            format!("{:.3}s", stage.exec_time_seconds),
            group_thousands(stage.rows_before),
            group_thousands(stage.rows_after),
            format!("-{}%", stage.punctual_delta_pct),
            format!("-{}%", stage.global_delta_pct),
        );

        if stage.rows_after == 0 {
            println!("{}", row.red());
        } else {
            println!("{}", row);
        }
    }
}

/// Whole-run totals
pub fn print_summary(summary: &RunSummary) {
    print_section("Summary");
    println!(
        "  filters   {}/{} {}",
        summary.filters_applied.len(),
        summary.filters_available(),
        summary.filters_applied.join(" → ").dimmed()
    );
    println!(
        "  words     {} → {} (-{}%)",
        group_thousands(summary.initial_rows),
        group_thousands(summary.final_rows).green().bold(),
        summary.final_pct_delta
    );
    println!(
        "  time      {}",
        human_duration(Duration::from_secs_f64(summary.total_time_seconds))
    );
}

/// `1234567` → `1,234,567`
pub fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let head = digits.len() % 3;

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, d) in digits.char_indices() {
        if i > 0 && (i + 3 - head) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(d);
    }
    grouped
}

/// Milliseconds below one second, seconds below one minute, then `Xm Ys`
pub fn human_duration(duration: Duration) -> String {
    match duration.as_secs() {
        0 => format!("{}ms", duration.as_millis()),
        s if s < 60 => format!("{:.3}s", duration.as_secs_f64()),
        s => format!("{}m {:02}s", s / 60, s % 60),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(65432), "65,432");
        assert_eq!(group_thousands(336215), "336,215");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_human_duration() {
        assert_eq!(human_duration(Duration::from_millis(42)), "42ms");
        assert_eq!(human_duration(Duration::from_millis(2250)), "2.250s");
        assert_eq!(human_duration(Duration::from_secs(125)), "2m 05s");
    }

    #[test]
    fn test_status_markers() {
        colored::control::set_override(false);
        assert_eq!(Status::Done.marker().to_string(), "✔");
        assert_eq!(Status::Fail.paint("boom").to_string(), "boom");
    }
}

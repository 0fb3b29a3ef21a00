//! Run telemetry
//!
//! A [`Telemetry`] context belongs to exactly one pipeline run. It records row counts and
//! timings for each stage and emits log lines gated by the run's own [`LogLevel`], so
//! runs with different verbosities never touch shared logger state.

use serde::Serialize;
use std::time::{Duration, Instant};

use crate::config::LogLevel;
use crate::filter::STAGE_NAMES;

/// Statistics of one executed stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterRunStats {
    pub filter_name: &'static str,
    pub exec_time_seconds: f64,
    pub rows_before: usize,
    pub rows_after: usize,
    /// Rows removed by this stage, in percent of `rows_before`
    pub punctual_delta_pct: f64,
    /// Rows removed so far, in percent of the initial corpus
    pub global_delta_pct: f64,
}

impl FilterRunStats {
    pub fn rows_deleted(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

/// Whole-run statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub total_time_seconds: f64,
    pub filters_applied: Vec<&'static str>,
    pub initial_rows: usize,
    pub final_rows: usize,
    pub total_rows_deleted: usize,
    pub final_pct_delta: f64,
}

impl RunSummary {
    /// Number of stages that could have run
    pub fn filters_available(&self) -> usize {
        STAGE_NAMES.len()
    }
}

/// `partial / total` in percent, rounded to `precision` decimals. Zero when `total` is zero.
pub fn percent(partial: usize, total: usize, precision: i32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(partial as f64 / total as f64 * 100.0, precision)
}

fn round_to(value: f64, precision: i32) -> f64 {
    let factor = 10f64.powi(precision);
    (value * factor).round() / factor
}

/// Per-run statistics collector
#[derive(Debug, Clone)]
pub struct Telemetry {
    level: LogLevel,
    started: Instant,
    initial_rows: usize,
    stages: Vec<FilterRunStats>,
}

impl Telemetry {
    pub fn new(level: LogLevel, initial_rows: usize) -> Self {
        Self {
            level,
            started: Instant::now(),
            initial_rows,
            stages: Vec::new(),
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn initial_rows(&self) -> usize {
        self.initial_rows
    }

    pub fn stages(&self) -> &[FilterRunStats] {
        &self.stages
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Record one executed stage
    pub fn record(
        &mut self,
        filter_name: &'static str,
        start: Instant,
        end: Instant,
        rows_before: usize,
        rows_after: usize,
    ) -> &FilterRunStats {
        let exec_time = end.saturating_duration_since(start);
        let stats = FilterRunStats {
            filter_name,
            exec_time_seconds: round_to(exec_time.as_secs_f64(), 3),
            rows_before,
            rows_after,
            punctual_delta_pct: percent(rows_before.saturating_sub(rows_after), rows_before, 2),
            global_delta_pct: percent(
                self.initial_rows.saturating_sub(rows_after),
                self.initial_rows,
                2,
            ),
        };

        self.debug(format_args!(
            "--- '{}' FILTER --- time: {}s, rows before: {}, rows after: {}, \
             rows deleted: {}, punctual: -{}%, global: -{}%",
            stats.filter_name,
            stats.exec_time_seconds,
            stats.rows_before,
            stats.rows_after,
            stats.rows_deleted(),
            stats.punctual_delta_pct,
            stats.global_delta_pct,
        ));

        self.stages.push(stats);
        // Just pushed
        &self.stages[self.stages.len() - 1]
    }

    /// Close the run and build its summary
    pub fn summarize(&self, final_rows: usize) -> RunSummary {
        let deleted = self.initial_rows.saturating_sub(final_rows);
        let summary = RunSummary {
            total_time_seconds: round_to(self.elapsed().as_secs_f64(), 3),
            filters_applied: self.stages.iter().map(|s| s.filter_name).collect(),
            initial_rows: self.initial_rows,
            final_rows,
            total_rows_deleted: deleted,
            final_pct_delta: percent(deleted, self.initial_rows, 4),
        };

        if final_rows == 0 {
            self.info(format_args!("No words found"));
        }

        self.debug(format_args!(
            "-- FINAL STATS -- total time: {}s, filters crossed: {}/{} -> {:?}, \
             total rows deleted: {}, from {} to {} -> (-{}%)",
            summary.total_time_seconds,
            summary.filters_applied.len(),
            summary.filters_available(),
            summary.filters_applied,
            summary.total_rows_deleted,
            summary.initial_rows,
            summary.final_rows,
            summary.final_pct_delta,
        ));

        summary
    }

    pub fn debug(&self, args: std::fmt::Arguments<'_>) {
        if self.level.allows(log::Level::Debug) {
            log::debug!("{}", args);
        }
    }

    pub fn info(&self, args: std::fmt::Arguments<'_>) {
        if self.level.allows(log::Level::Info) {
            log::info!("{}", args);
        }
    }

    pub fn warning(&self, args: std::fmt::Arguments<'_>) {
        if self.level.allows(log::Level::Warn) {
            log::warn!("{}", args);
        }
    }

    /// Always emitted, whatever the run's level
    pub fn critical(&self, args: std::fmt::Arguments<'_>) {
        log::error!("{}", args);
    }
}

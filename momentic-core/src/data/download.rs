//! Batch download: fetch each symbol, merge into its raw history file.

use super::provider::{BatchProgress, DataError, DataProvider};
use super::raw_csv::{merge_bars, read_raw_bars, write_raw_bars};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome counts of a per-symbol batch. `errors` holds `(symbol, message)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub errors: Vec<(String, String)>,
}

impl BatchSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn record_failure(&mut self, symbol: &str, error: &dyn std::fmt::Display) {
        self.failed += 1;
        self.errors.push((symbol.to_string(), error.to_string()));
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    /// Nothing to do, or every item failed.
    pub fn no_useful_work(&self) -> bool {
        self.total == 0 || self.succeeded + self.skipped == 0
    }
}

/// Split a comma-separated list, trim and upper-case entries, drop blanks.
pub fn parse_symbol_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn raw_path(raw_dir: &Path, symbol: &str) -> PathBuf {
    raw_dir.join(format!("{symbol}.csv"))
}

/// True when both endpoints are already dates in the history.
fn has_coverage(dates: &BTreeSet<NaiveDate>, start: NaiveDate, end: NaiveDate) -> bool {
    dates.contains(&start) && dates.contains(&end)
}

/// Fetch window: explicit start, else the latest stored date.
fn resolve_start(dates: &BTreeSet<NaiveDate>, requested: Option<NaiveDate>) -> Option<NaiveDate> {
    requested.or_else(|| dates.iter().next_back().copied())
}

enum SymbolOutcome {
    Skipped(String),
    Written(String),
}

/// Download every symbol into `{raw_dir}/{SYMBOL}.csv`, one at a time.
///
/// A failed symbol is reported and the batch continues. Files are only
/// rewritten after a successful fetch. Once the provider becomes
/// unavailable the remaining symbols are marked failed without a request.
pub fn fetch_symbols(
    provider: &dyn DataProvider,
    raw_dir: &Path,
    symbols: &[String],
    start: Option<NaiveDate>,
    end: NaiveDate,
    progress: &dyn BatchProgress,
) -> BatchSummary {
    let total = symbols.len();
    let mut summary = BatchSummary::new(total);

    for (i, symbol) in symbols.iter().enumerate() {
        progress.on_start(symbol, i, total);

        match fetch_single(provider, raw_dir, symbol, start, end) {
            Ok(SymbolOutcome::Skipped(reason)) => {
                progress.on_skip(symbol, &reason);
                summary.skipped += 1;
            }
            Ok(SymbolOutcome::Written(detail)) => {
                progress.on_success(symbol, &detail);
                summary.succeeded += 1;
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "fetch failed");
                progress.on_failure(symbol, &e);
                summary.record_failure(symbol, &e);
            }
        }

        if !provider.is_available() {
            for rest in &symbols[(i + 1)..] {
                let e = DataError::CircuitBreakerTripped;
                progress.on_failure(rest, &e);
                summary.record_failure(rest, &e);
            }
            break;
        }
    }

    progress.on_batch_complete(summary.succeeded, summary.skipped, summary.failed, total);
    summary
}

fn fetch_single(
    provider: &dyn DataProvider,
    raw_dir: &Path,
    symbol: &str,
    requested_start: Option<NaiveDate>,
    end: NaiveDate,
) -> Result<SymbolOutcome, DataError> {
    let path = raw_path(raw_dir, symbol);
    let existing = read_raw_bars(&path)?;
    let dates: BTreeSet<NaiveDate> = existing.iter().map(|b| b.date).collect();

    let start = resolve_start(&dates, requested_start).ok_or_else(|| DataError::NoStartDate {
        symbol: symbol.to_string(),
    })?;

    if has_coverage(&dates, start, end) {
        return Ok(SymbolOutcome::Skipped(format!(
            "already has {start} → {end}; skipping {} call",
            provider.name()
        )));
    }

    info!(symbol, %start, %end, provider = provider.name(), "fetching");
    let fetched = provider.fetch(symbol, start, end)?;
    let new_rows = fetched.bars.len();
    let merged = merge_bars(existing, fetched.bars);
    write_raw_bars(&path, &merged)?;

    Ok(SymbolOutcome::Written(format!(
        "wrote {} ({new_rows} new rows)",
        path.display()
    )))
}

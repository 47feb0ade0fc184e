//! Data provider trait, structured data errors and batch progress reporting.
//!
//! The DataProvider trait abstracts over market-data sources so the batch
//! download can run against the Massive HTTP API or a mock in tests.

use crate::domain::Bar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no OHLCV data returned for {symbol} {start} → {end}")]
    EmptyResponse {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("missing credential: {0}")]
    MissingCredential(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path}: missing required column '{column}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("unparseable date '{0}'")]
    InvalidDate(String),

    #[error("unparseable number '{value}' in column '{column}'")]
    InvalidNumber { column: String, value: String },

    #[error("duplicate date {date} in {path}")]
    DuplicateDate { path: PathBuf, date: NaiveDate },

    #[error("no price history in {path}")]
    MissingHistory { path: PathBuf },

    #[error("history missing for {symbol}; provide a start date for the initial backfill")]
    NoStartDate { symbol: String },

    #[error("data error: {0}")]
    Other(String),
}

impl DataError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DataError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        DataError::Csv {
            path: path.into(),
            source,
        }
    }
}

/// Result of a successful data fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<Bar>,
    pub source: DataSource,
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    Massive,
    Synthetic,
}

/// Trait for market-data providers.
///
/// Providers only fetch; merging into the on-disk history happens in the
/// batch download above this trait.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for a symbol over an inclusive date range.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<FetchResult, DataError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool;
}

/// Progress callback for per-symbol batch operations (fetch, feature build).
pub trait BatchProgress {
    /// Called when starting work on an item.
    fn on_start(&self, item: &str, index: usize, total: usize);

    /// Called when an item needed no work.
    fn on_skip(&self, item: &str, reason: &str);

    /// Called when an item completed.
    fn on_success(&self, item: &str, detail: &str);

    /// Called when an item failed; the batch continues.
    fn on_failure(&self, item: &str, error: &dyn fmt::Display);

    /// Called when the entire batch is done.
    fn on_batch_complete(&self, succeeded: usize, skipped: usize, failed: usize, total: usize);
}

/// Progress reporter that prints scoped lines, failures to stderr.
#[derive(Debug, Clone, Copy)]
pub struct StdoutProgress {
    scope: &'static str,
}

impl StdoutProgress {
    pub fn new(scope: &'static str) -> Self {
        Self { scope }
    }
}

impl BatchProgress for StdoutProgress {
    fn on_start(&self, item: &str, index: usize, total: usize) {
        println!("[{}] [{}/{}] {item}", self.scope, index + 1, total);
    }

    fn on_skip(&self, item: &str, reason: &str) {
        println!("[{}] {item}: {reason}", self.scope);
    }

    fn on_success(&self, item: &str, detail: &str) {
        println!("[{}] {item}: {detail}", self.scope);
    }

    fn on_failure(&self, item: &str, error: &dyn fmt::Display) {
        eprintln!("[{}] {item}: ERROR {error}", self.scope);
    }

    fn on_batch_complete(&self, succeeded: usize, skipped: usize, failed: usize, total: usize) {
        println!(
            "[{}] done: {succeeded}/{total} succeeded, {skipped} skipped, {failed} failed",
            self.scope
        );
    }
}

/// Progress reporter that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl BatchProgress for SilentProgress {
    fn on_start(&self, _item: &str, _index: usize, _total: usize) {}
    fn on_skip(&self, _item: &str, _reason: &str) {}
    fn on_success(&self, _item: &str, _detail: &str) {}
    fn on_failure(&self, _item: &str, _error: &dyn fmt::Display) {}
    fn on_batch_complete(&self, _succeeded: usize, _skipped: usize, _failed: usize, _total: usize) {
    }
}

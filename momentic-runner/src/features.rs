//! Batch feature build: `{raw_dir}/{T}.csv` → `{processed_dir}/{T}_indicators.csv`.

use std::path::{Path, PathBuf};

use momentic_core::data::{
    load_price_series, raw_path, write_feature_rows, BatchProgress, BatchSummary,
};
use momentic_core::features::{build_features, validate_windows, REQUIRED_WINDOWS};
use tracing::{info, warn};

use crate::error::RunError;

/// Parse `50,120,280`. Blank entries are ignored.
pub fn parse_windows(raw: &str) -> Result<Vec<usize>, RunError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| RunError::InvalidInput(format!("invalid window '{s}'")))
        })
        .collect()
}

pub fn default_windows() -> Vec<usize> {
    REQUIRED_WINDOWS.to_vec()
}

pub fn feature_path(processed_dir: &Path, ticker: &str) -> PathBuf {
    processed_dir.join(format!("{ticker}_indicators.csv"))
}

/// Build one ticker's feature table. Returns the written path and row count.
pub fn build_feature_file(
    ticker: &str,
    windows: &[usize],
    raw_dir: &Path,
    processed_dir: &Path,
) -> Result<(PathBuf, usize), RunError> {
    let prices = load_price_series(&raw_path(raw_dir, ticker))?;
    let rows = build_features(&prices, windows)?;
    let out = feature_path(processed_dir, ticker);
    write_feature_rows(&out, &rows)?;
    info!(ticker, rows = rows.len(), path = %out.display(), "feature table written");
    Ok((out, rows.len()))
}

/// Build feature tables for every ticker, one at a time.
///
/// Window problems and an empty ticker list abort before any work; a failing
/// ticker is reported and the rest continue.
pub fn build_feature_files(
    tickers: &[String],
    windows: &[usize],
    raw_dir: &Path,
    processed_dir: &Path,
    progress: &dyn BatchProgress,
) -> Result<BatchSummary, RunError> {
    if tickers.is_empty() {
        return Err(RunError::InvalidInput("no tickers provided".into()));
    }
    validate_windows(windows)?;

    let total = tickers.len();
    let mut summary = BatchSummary::new(total);
    for (i, ticker) in tickers.iter().enumerate() {
        progress.on_start(ticker, i, total);
        match build_feature_file(ticker, windows, raw_dir, processed_dir) {
            Ok((path, rows)) => {
                progress.on_success(ticker, &format!("wrote {} ({rows} rows)", path.display()));
                summary.succeeded += 1;
            }
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "feature build failed");
                progress.on_failure(ticker, &e);
                summary.record_failure(ticker, &e);
            }
        }
    }
    progress.on_batch_complete(summary.succeeded, summary.skipped, summary.failed, total);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use momentic_core::data::{read_feature_rows, write_raw_bars, SilentProgress};
    use momentic_core::domain::Bar;
    use tempfile::TempDir;

    fn write_history(raw_dir: &Path, ticker: &str, n: usize) {
        let base = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        let bars: Vec<Bar> = (0..n)
            .map(|i| {
                let close = 50.0 + i as f64 * 0.1;
                Bar::from_close(ticker, base + Duration::days(i as i64), close)
            })
            .collect();
        write_raw_bars(&raw_path(raw_dir, ticker), &bars).unwrap();
    }

    #[test]
    fn parses_window_lists() {
        assert_eq!(parse_windows("50, 120,280,").unwrap(), vec![50, 120, 280]);
        assert!(parse_windows("50,abc").is_err());
        assert_eq!(default_windows(), vec![50, 120, 280]);
    }

    #[test]
    fn builds_each_ticker_and_isolates_failures() {
        let dir = TempDir::new().unwrap();
        let raw = dir.path().join("raw");
        let processed = dir.path().join("processed");
        write_history(&raw, "TQQQ", 300);

        let tickers = vec!["TQQQ".to_string(), "MISSING".to_string()];
        let summary =
            build_feature_files(&tickers, &default_windows(), &raw, &processed, &SilentProgress)
                .unwrap();

        assert_eq!((summary.succeeded, summary.failed), (1, 1));
        assert_eq!(summary.errors[0].0, "MISSING");
        assert!(!summary.no_useful_work());

        let rows = read_feature_rows(&feature_path(&processed, "TQQQ")).unwrap();
        assert_eq!(rows.len(), 300);
        assert!(rows[0].date > rows[1].date);
        assert!(!feature_path(&processed, "MISSING").exists());
    }

    #[test]
    fn missing_required_window_aborts() {
        let dir = TempDir::new().unwrap();
        let err = build_feature_files(
            &["TQQQ".to_string()],
            &[50, 120],
            dir.path(),
            dir.path(),
            &SilentProgress,
        )
        .unwrap_err();
        assert!(matches!(err, RunError::Feature(_)));
        assert!(err.to_string().contains("280"));
    }

    #[test]
    fn empty_ticker_list_is_invalid() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            build_feature_files(&[], &default_windows(), dir.path(), dir.path(), &SilentProgress),
            Err(RunError::InvalidInput(_))
        ));
    }
}

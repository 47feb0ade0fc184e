//! Canonical raw price history files (`{raw_dir}/{SYMBOL}.csv`).
//!
//! Header `Symbol,Date,Close/Last,Volume,Open,High,Low`, newest date first.
//! Reading tolerates legacy lower-case headers, several date layouts and
//! currency-formatted prices.

use super::provider::DataError;
use crate::domain::{Bar, PricePoint};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

pub const RAW_HEADER: [&str; 7] = ["Symbol", "Date", "Close/Last", "Volume", "Open", "High", "Low"];

/// Tried in order; the first that parses wins.
pub const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d"];

const SYMBOL_ALIASES: &[&str] = &["symbol", "ticker"];
const DATE_ALIASES: &[&str] = &["date"];
const CLOSE_ALIASES: &[&str] = &["close/last", "close"];

pub fn parse_date(raw: &str) -> Result<NaiveDate, DataError> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| DataError::InvalidDate(raw.to_string()))
}

/// Parse a price, ignoring currency symbols, thousands separators and whitespace.
pub fn parse_price(column: &str, raw: &str) -> Result<f64, DataError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | '¥' | ',') && !c.is_whitespace())
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DataError::InvalidNumber {
            column: column.to_string(),
            value: raw.to_string(),
        })
}

/// Empty and `NA` cells are absent.
pub(crate) fn is_blank(raw: &str) -> bool {
    let t = raw.trim();
    t.is_empty() || t.eq_ignore_ascii_case("na") || t.eq_ignore_ascii_case("nan")
}

fn parse_optional_price(column: &str, raw: Option<&str>) -> Result<Option<f64>, DataError> {
    match raw {
        Some(value) if !is_blank(value) => parse_price(column, value).map(Some),
        _ => Ok(None),
    }
}

/// Case-insensitive header lookup.
#[derive(Debug, Clone)]
pub(crate) struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    pub(crate) fn new(headers: &csv::StringRecord) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().trim_start_matches('\u{feff}').to_lowercase(), i))
            .collect();
        Self { positions }
    }

    pub(crate) fn find(&self, aliases: &[&str]) -> Option<usize> {
        aliases.iter().find_map(|a| self.positions.get(*a).copied())
    }

    pub(crate) fn require(&self, aliases: &[&str], path: &Path) -> Result<usize, DataError> {
        self.find(aliases).ok_or_else(|| DataError::MissingColumn {
            path: path.to_path_buf(),
            column: aliases[0].to_string(),
        })
    }
}

/// Read a raw history file in file order. A missing file is an empty history.
///
/// Rows without a symbol cell take the file stem as their symbol.
pub fn read_raw_bars(path: &Path) -> Result<Vec<Bar>, DataError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| DataError::csv(path, e))?;
    let headers = HeaderIndex::new(reader.headers().map_err(|e| DataError::csv(path, e))?);

    let date_idx = headers.require(DATE_ALIASES, path)?;
    let close_idx = headers.require(CLOSE_ALIASES, path)?;
    let symbol_idx = headers.find(SYMBOL_ALIASES);
    let volume_idx = headers.find(&["volume"]);
    let open_idx = headers.find(&["open"]);
    let high_idx = headers.find(&["high"]);
    let low_idx = headers.find(&["low"]);

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_uppercase())
        .unwrap_or_default();

    let mut bars = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DataError::csv(path, e))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i));

        let date = parse_date(record.get(date_idx).unwrap_or(""))?;
        let close = parse_price("Close/Last", record.get(close_idx).unwrap_or(""))?;
        let symbol = cell(symbol_idx)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_uppercase)
            .unwrap_or_else(|| stem.clone());

        bars.push(Bar {
            symbol,
            date,
            close,
            volume: parse_optional_price("Volume", cell(volume_idx))?,
            open: parse_optional_price("Open", cell(open_idx))?,
            high: parse_optional_price("High", cell(high_idx))?,
            low: parse_optional_price("Low", cell(low_idx))?,
        });
    }
    Ok(bars)
}

/// Overwrite `path` with `bars`, newest date first.
pub fn write_raw_bars(path: &Path, bars: &[Bar]) -> Result<(), DataError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| DataError::io(parent, e))?;
    }

    let mut ordered: Vec<&Bar> = bars.iter().collect();
    ordered.sort_by(|a, b| b.date.cmp(&a.date));

    let mut writer = csv::Writer::from_path(path).map_err(|e| DataError::csv(path, e))?;
    writer
        .write_record(RAW_HEADER)
        .map_err(|e| DataError::csv(path, e))?;
    for bar in ordered {
        let opt = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
        writer
            .write_record([
                bar.symbol.clone(),
                bar.date.format("%Y-%m-%d").to_string(),
                bar.close.to_string(),
                opt(bar.volume),
                opt(bar.open),
                opt(bar.high),
                opt(bar.low),
            ])
            .map_err(|e| DataError::csv(path, e))?;
    }
    writer.flush().map_err(|e| DataError::io(path, e))?;
    Ok(())
}

/// Union of two histories keyed by date; `fresh` wins on collisions. Ascending.
pub fn merge_bars(existing: Vec<Bar>, fresh: Vec<Bar>) -> Vec<Bar> {
    let mut merged: BTreeMap<NaiveDate, Bar> = BTreeMap::new();
    for bar in existing.into_iter().chain(fresh) {
        merged.insert(bar.date, bar);
    }
    merged.into_values().collect()
}

/// Ascending close series for the feature builder.
///
/// An empty history or a repeated date is a data error.
pub fn price_series(path: &Path, bars: &[Bar]) -> Result<Vec<PricePoint>, DataError> {
    if bars.is_empty() {
        return Err(DataError::MissingHistory {
            path: path.to_path_buf(),
        });
    }
    let mut points: Vec<PricePoint> = bars.iter().map(Bar::price_point).collect();
    points.sort_by_key(|p| p.date);
    if let Some(pair) = points.windows(2).find(|w| w[0].date == w[1].date) {
        return Err(DataError::DuplicateDate {
            path: path.to_path_buf(),
            date: pair[0].date,
        });
    }
    Ok(points)
}

/// Read a raw history file straight into an ascending close series.
pub fn load_price_series(path: &Path) -> Result<Vec<PricePoint>, DataError> {
    let bars = read_raw_bars(path)?;
    price_series(path, &bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn date_formats_in_order() {
        assert_eq!(parse_date("2024-03-05").unwrap(), d(2024, 3, 5));
        // day-first wins over month-first when both parse
        assert_eq!(parse_date("05/03/2024").unwrap(), d(2024, 3, 5));
        // only month-first parses
        assert_eq!(parse_date("03/25/2024").unwrap(), d(2024, 3, 25));
        assert_eq!(parse_date("2024/03/05").unwrap(), d(2024, 3, 5));
        assert!(matches!(parse_date("March 5"), Err(DataError::InvalidDate(_))));
    }

    #[test]
    fn price_strips_currency_formatting() {
        assert_eq!(parse_price("Close", "$1,234.50").unwrap(), 1234.5);
        assert_eq!(parse_price("Close", " 42 ").unwrap(), 42.0);
        assert!(parse_price("Close", "abc").is_err());
        assert!(parse_price("Close", "").is_err());
    }

    #[test]
    fn reads_legacy_headers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tqqq.csv");
        fs::write(
            &path,
            "ticker,date,close,volume\nTQQQ,2024-01-03,\"$51.20\",\nTQQQ,2024-01-02,50.10,1000\n",
        )
        .unwrap();

        let bars = read_raw_bars(&path).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, d(2024, 1, 3));
        assert_eq!(bars[0].close, 51.2);
        assert_eq!(bars[0].volume, None);
        assert_eq!(bars[1].volume, Some(1000.0));
    }

    #[test]
    fn missing_symbol_uses_file_stem() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sqqq.csv");
        fs::write(&path, "Date,Close/Last\n2024-01-02,10.5\n").unwrap();
        assert_eq!(read_raw_bars(&path).unwrap()[0].symbol, "SQQQ");
    }

    #[test]
    fn missing_file_is_empty_history() {
        let dir = TempDir::new().unwrap();
        assert!(read_raw_bars(&dir.path().join("NONE.csv")).unwrap().is_empty());
    }

    #[test]
    fn missing_close_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("X.csv");
        fs::write(&path, "Symbol,Date,Volume\nX,2024-01-02,5\n").unwrap();
        assert!(matches!(
            read_raw_bars(&path),
            Err(DataError::MissingColumn { ref column, .. }) if column == "close/last"
        ));
    }

    #[test]
    fn write_is_newest_first_and_reads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("TQQQ.csv");
        let bars = vec![
            Bar::from_close("TQQQ", d(2024, 1, 2), 50.1),
            Bar {
                volume: Some(1200.0),
                open: Some(50.0),
                high: Some(52.0),
                low: Some(49.5),
                ..Bar::from_close("TQQQ", d(2024, 1, 3), 51.2)
            },
        ];
        write_raw_bars(&path, &bars).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Symbol,Date,Close/Last,Volume,Open,High,Low"));
        assert_eq!(lines.next(), Some("TQQQ,2024-01-03,51.2,1200,50,52,49.5"));
        assert_eq!(lines.next(), Some("TQQQ,2024-01-02,50.1,,,,"));

        let back = read_raw_bars(&path).unwrap();
        assert_eq!(back[0], bars[1]);
        assert_eq!(back[1], bars[0]);
    }

    #[test]
    fn merge_prefers_fresh_rows() {
        let existing = vec![
            Bar::from_close("A", d(2024, 1, 3), 11.0),
            Bar::from_close("A", d(2024, 1, 2), 10.0),
        ];
        let fresh = vec![
            Bar::from_close("A", d(2024, 1, 3), 11.5),
            Bar::from_close("A", d(2024, 1, 4), 12.0),
        ];
        let merged = merge_bars(existing, fresh);
        let closes: Vec<f64> = merged.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![10.0, 11.5, 12.0]);
    }

    #[test]
    fn price_series_sorts_and_rejects_duplicates() {
        let path = Path::new("A.csv");
        let bars = vec![
            Bar::from_close("A", d(2024, 1, 3), 11.0),
            Bar::from_close("A", d(2024, 1, 2), 10.0),
        ];
        let series = price_series(path, &bars).unwrap();
        assert_eq!(series[0].date, d(2024, 1, 2));

        let dupes = vec![
            Bar::from_close("A", d(2024, 1, 2), 10.0),
            Bar::from_close("A", d(2024, 1, 2), 10.5),
        ];
        assert!(matches!(
            price_series(path, &dupes),
            Err(DataError::DuplicateDate { .. })
        ));
        assert!(matches!(
            price_series(path, &[]),
            Err(DataError::MissingHistory { .. })
        ));
    }
}

//! Feature table files (`{processed_dir}/{TICKER}_indicators.csv`).
//!
//! Written newest-first with a fixed lower-case header; read with
//! case-insensitive column names. Blank and `NA` cells are absent.

use super::provider::DataError;
use super::raw_csv::{is_blank, parse_date, parse_price, HeaderIndex};
use crate::domain::{Feature, FeatureRow};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub const FEATURE_HEADER: [&str; 14] = [
    "date",
    "close",
    "ma_50",
    "ma_120",
    "ma_280",
    "logistic_ma_spread_50_120",
    "logistic_ma_spread_50_280",
    "logistic_return_scaled_21",
    "momentum_positive_bonus",
    "logistic_ma_spread_50_120_complement",
    "logistic_ma_spread_50_280_complement",
    "logistic_return_scaled_21_complement",
    "momentum_positive_bonus_complement",
    "long_term_down",
];

fn optional_number(column: &str, raw: Option<&str>) -> Result<Option<f64>, DataError> {
    match raw {
        Some(value) if !is_blank(value) => parse_price(column, value).map(Some),
        _ => Ok(None),
    }
}

fn optional_flag(raw: Option<&str>) -> Result<Option<bool>, DataError> {
    let Some(value) = raw.filter(|v| !is_blank(v)) else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        return Ok(Some(true));
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Ok(Some(false));
    }
    // numeric 0/1, possibly written as 1.0
    parse_price("long_term_down", trimmed).map(|v| Some(v != 0.0))
}

/// Read a feature table. Row order is preserved; the engine sorts.
///
/// The table is keyed by date: a date appearing twice is an error.
pub fn read_feature_rows(path: &Path) -> Result<Vec<FeatureRow>, DataError> {
    if !path.exists() {
        return Err(DataError::MissingHistory {
            path: path.to_path_buf(),
        });
    }
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| DataError::csv(path, e))?;
    let headers = HeaderIndex::new(reader.headers().map_err(|e| DataError::csv(path, e))?);

    let date_idx = headers.require(&["date"], path)?;
    let close_idx = headers.require(&["close"], path)?;
    let ma_idx = [
        headers.find(&["ma_50"]),
        headers.find(&["ma_120"]),
        headers.find(&["ma_280"]),
    ];
    let feature_idx: Vec<(Feature, Option<usize>, Option<usize>)> = Feature::ALL
        .iter()
        .map(|&f| {
            (
                f,
                headers.find(&[f.column()]),
                headers.find(&[f.complement_column()]),
            )
        })
        .collect();
    let ltd_idx = headers.find(&["long_term_down"]);

    let mut rows = Vec::new();
    let mut seen = HashSet::new();
    for record in reader.records() {
        let record = record.map_err(|e| DataError::csv(path, e))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i));

        let date = parse_date(record.get(date_idx).unwrap_or(""))?;
        if !seen.insert(date) {
            return Err(DataError::DuplicateDate {
                path: path.to_path_buf(),
                date,
            });
        }
        let close_raw = record.get(close_idx).unwrap_or("");
        if is_blank(close_raw) {
            return Err(DataError::InvalidNumber {
                column: "close".into(),
                value: format!("<missing on {date}>"),
            });
        }
        let mut row = FeatureRow::bare(date, parse_price("close", close_raw)?);
        row.ma_50 = optional_number("ma_50", cell(ma_idx[0]))?;
        row.ma_120 = optional_number("ma_120", cell(ma_idx[1]))?;
        row.ma_280 = optional_number("ma_280", cell(ma_idx[2]))?;

        for &(feature, value_idx, complement_idx) in &feature_idx {
            let value = optional_number(feature.column(), cell(value_idx))?;
            let complement = optional_number(feature.complement_column(), cell(complement_idx))?;
            row.set_feature(feature, value);
            row.set_complement(feature, complement);
        }
        row.long_term_down = optional_flag(cell(ltd_idx))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Overwrite `path` with `rows` in the given order.
pub fn write_feature_rows(path: &Path, rows: &[FeatureRow]) -> Result<(), DataError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| DataError::io(parent, e))?;
    }
    let mut writer = csv::Writer::from_path(path).map_err(|e| DataError::csv(path, e))?;
    writer
        .write_record(FEATURE_HEADER)
        .map_err(|e| DataError::csv(path, e))?;

    let num = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
    for row in rows {
        let mut record = vec![
            row.date.format("%Y-%m-%d").to_string(),
            row.close.to_string(),
            num(row.ma_50),
            num(row.ma_120),
            num(row.ma_280),
        ];
        record.extend(Feature::ALL.iter().map(|&f| num(row.value(f))));
        record.extend(Feature::ALL.iter().map(|&f| num(row.complement(f))));
        record.push(match row.long_term_down {
            Some(true) => "1".to_string(),
            Some(false) => "0".to_string(),
            None => String::new(),
        });
        writer
            .write_record(&record)
            .map_err(|e| DataError::csv(path, e))?;
    }
    writer.flush().map_err(|e| DataError::io(path, e))?;
    Ok(())
}

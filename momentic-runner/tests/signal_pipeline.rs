//! End-to-end runner flow: raw history file → feature table → decision,
//! report and history, all inside a temp directory.

use chrono::{Duration, NaiveDate};
use momentic_core::data::{read_feature_rows, SilentProgress};
use momentic_core::domain::{Regime, Trend};
use momentic_core::Settings;
use momentic_runner::features::default_windows;
use momentic_runner::{
    build_feature_files, feature_path, run_signal, DecisionHistory, SignalOptions,
};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ── Fixtures ──

/// Rising series with alternating +1.2% / -0.6% days, written newest-first
/// in the provider's legacy layout (dollar-prefixed closes, no symbol column).
fn write_uptrend_raw(raw_dir: &Path, ticker: &str, n: usize) -> NaiveDate {
    let base = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    let mut close = 40.0;
    let mut rows = Vec::with_capacity(n);
    for i in 0..n {
        if i > 0 {
            close *= if i % 2 == 1 { 1.012 } else { 0.994 };
        }
        rows.push((base + Duration::days(i as i64), close));
    }

    let mut text = String::from("Date,Close/Last,Volume,Open,High,Low\n");
    for (date, close) in rows.iter().rev() {
        writeln!(text, "{date},${close:.4},1000000,,,").unwrap();
    }
    fs::create_dir_all(raw_dir).unwrap();
    fs::write(raw_dir.join(format!("{ticker}.csv")), text).unwrap();
    rows[n - 1].0
}

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .to_path_buf()
}

// ── Pipeline ──

#[test]
fn raw_history_to_long_decision() {
    let dir = TempDir::new().unwrap();
    let raw = dir.path().join("data/raw");
    let processed = dir.path().join("data/processed");
    let latest = write_uptrend_raw(&raw, "QQQ", 320);

    let summary = build_feature_files(
        &["QQQ".to_string()],
        &default_windows(),
        &raw,
        &processed,
        &SilentProgress,
    )
    .unwrap();
    assert!(summary.all_succeeded());

    let table = feature_path(&processed, "QQQ");
    let rows = read_feature_rows(&table).unwrap();
    assert_eq!(rows.len(), 320);
    assert_eq!(rows[0].date, latest);
    assert!(rows[0].ma_280.is_some());
    assert!(rows[279].ma_280.is_none(), "warmup rows keep blank MA cells");

    let report = dir.path().join("data/results/signal_report.txt");
    let history = dir.path().join("state/decisions.jsonl");
    let run = run_signal(&SignalOptions {
        csv: table.clone(),
        settings: Some(dir.path().join("config/settings.toml")),
        date: None,
        report: Some(report.clone()),
        history: Some(history.clone()),
    })
    .unwrap();

    let result = &run.result;
    assert_eq!(result.date, latest);
    assert_eq!(result.trend, Trend::Uptrend);
    assert_eq!(result.regime, Regime::LowVol);
    assert!(result.score_up > 0.60, "score_up = {}", result.score_up);
    assert!(result.take_long && !result.take_short);
    assert!(result.long_weight > 0.0 && result.long_weight < 1.0);
    assert_eq!(result.short_weight, 0.0);
    assert!((result.long_weight + result.cash_weight - 1.0).abs() < 1e-12);

    let text = fs::read_to_string(&report).unwrap();
    assert!(text.contains(&format!("Date: {latest}")));
    assert!(text.contains("Trend regime: UPTREND"));
    assert!(text.contains("- Taking LONG (TQQQ)"));

    let records = DecisionHistory::new(&history).read_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source, table.display().to_string());
    assert_eq!(records[0].settings_hash, run.settings_hash);
}

#[test]
fn rerun_appends_identical_fingerprints() {
    let dir = TempDir::new().unwrap();
    let raw = dir.path().join("raw");
    let processed = dir.path().join("processed");
    write_uptrend_raw(&raw, "QQQ", 300);
    build_feature_files(
        &["QQQ".to_string()],
        &default_windows(),
        &raw,
        &processed,
        &SilentProgress,
    )
    .unwrap();

    let history = dir.path().join("decisions.jsonl");
    let opts = SignalOptions {
        csv: feature_path(&processed, "QQQ"),
        history: Some(history.clone()),
        ..SignalOptions::default()
    };
    let first = run_signal(&opts).unwrap();
    let second = run_signal(&opts).unwrap();
    assert_eq!(first.result, second.result);

    let records = DecisionHistory::new(&history).read_all().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].dataset_hash, records[1].dataset_hash);
    assert_eq!(records[0].settings_hash, records[1].settings_hash);
}

// ── Configuration ──

#[test]
fn shipped_settings_file_matches_defaults() {
    let path = workspace_root().join("config/settings.toml");
    let loaded = Settings::from_file(&path).unwrap();
    assert_eq!(loaded, Settings::default());
}

#[test]
fn settings_override_changes_instrument_labels() {
    let dir = TempDir::new().unwrap();
    let raw = dir.path().join("raw");
    let processed = dir.path().join("processed");
    write_uptrend_raw(&raw, "SPY", 300);
    build_feature_files(
        &["SPY".to_string()],
        &default_windows(),
        &raw,
        &processed,
        &SilentProgress,
    )
    .unwrap();

    let settings = dir.path().join("settings.json");
    fs::write(&settings, r#"{"instruments": {"long": "UPRO", "short": "SPXU"}}"#).unwrap();
    let run = run_signal(&SignalOptions {
        csv: feature_path(&processed, "SPY"),
        settings: Some(settings),
        ..SignalOptions::default()
    })
    .unwrap();

    assert!(run.report_lines.iter().any(|l| l.starts_with("UPRO target: ")));
    assert!(run.report_lines.iter().any(|l| l.starts_with("SPXU target: 0.00%")));
}

//! End-to-end pipeline: raw history file → feature table → decision.

use chrono::{Duration, NaiveDate};
use momentic_core::data::{
    load_price_series, read_feature_rows, write_feature_rows, write_raw_bars,
};
use momentic_core::domain::{Bar, Feature, FeatureRow, Regime, Trend};
use momentic_core::features::{build_features, FeatureError};
use momentic_core::{EngineError, Settings, SignalEngine};
use tempfile::TempDir;

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 3).unwrap()
}

/// Steady uptrend with a small alternating wiggle so volatility is non-zero.
fn uptrend_bars(n: usize) -> Vec<Bar> {
    (0..n)
        .map(|i| {
            let drift = 100.0 * (1.0005f64).powi(i as i32);
            let wiggle = if i % 2 == 0 { 1.002 } else { 0.998 };
            Bar::from_close("TQQQ", base() + Duration::days(i as i64), drift * wiggle)
        })
        .collect()
}

#[test]
fn raw_file_to_decision() {
    let dir = TempDir::new().unwrap();
    let raw = dir.path().join("raw").join("TQQQ.csv");
    let processed = dir.path().join("processed").join("TQQQ_indicators.csv");

    write_raw_bars(&raw, &uptrend_bars(320)).unwrap();
    let prices = load_price_series(&raw).unwrap();
    assert_eq!(prices.len(), 320);
    assert!(prices[0].date < prices[319].date);

    let rows = build_features(&prices, &[50, 120, 280]).unwrap();
    write_feature_rows(&processed, &rows).unwrap();
    let reloaded = read_feature_rows(&processed).unwrap();
    assert_eq!(reloaded.len(), rows.len());
    assert_eq!(reloaded[0].date, rows[0].date);

    let latest = &reloaded[0];
    assert!(latest.moving_averages().is_some());
    assert_eq!(latest.long_term_down, Some(false));

    let result = SignalEngine::new(Settings::default())
        .evaluate(&reloaded, None)
        .unwrap();
    assert_eq!(result.date, base() + Duration::days(319));
    assert_eq!(result.trend, Trend::Uptrend);
    assert_eq!(result.regime, Regime::LowVol);
    assert!(result.score_up > result.score_dn);
    assert!(!(result.long_weight > 0.0 && result.short_weight > 0.0));
    assert!((result.long_weight + result.short_weight + result.cash_weight - 1.0).abs() < 1e-12);
}

#[test]
fn warmup_rows_are_empty() {
    let prices: Vec<_> = uptrend_bars(300).iter().map(Bar::price_point).collect();
    let rows = build_features(&prices, &[50, 120, 280, 200]).unwrap();
    // newest-first: the oldest row is last
    let oldest = &rows[rows.len() - 1];
    assert!(oldest.ma_50.is_none());
    for f in Feature::ALL {
        assert!(oldest.value(f).is_none());
    }
    assert!(oldest.long_term_down.is_none());

    // index 49 (oldest-first) is the first MA50 row
    let first_ma50 = &rows[rows.len() - 50];
    assert!(first_ma50.ma_50.is_some());
    assert!(first_ma50.ma_120.is_none());
}

#[test]
fn missing_required_window() {
    let prices: Vec<_> = uptrend_bars(10).iter().map(Bar::price_point).collect();
    match build_features(&prices, &[50, 120]) {
        Err(FeatureError::MissingWindows(missing)) => assert_eq!(missing, vec![280]),
        other => panic!("expected MissingWindows, got {other:?}"),
    }
}

#[test]
fn historical_date_uses_history_up_to_it() {
    let prices: Vec<_> = uptrend_bars(320).iter().map(Bar::price_point).collect();
    let rows = build_features(&prices, &[50, 120, 280]).unwrap();
    let engine = SignalEngine::new(Settings::default());

    let target = base() + Duration::days(300);
    let result = engine.evaluate(&rows, Some(target)).unwrap();
    assert_eq!(result.date, target);

    let err = engine
        .evaluate(&rows, Some(base() + Duration::days(400)))
        .unwrap_err();
    assert!(matches!(err, EngineError::DateBeyondData { .. }));
}

#[test]
fn downtrend_with_long_term_down_can_short_in_high_vol() {
    // hand-built snapshot: strongly bearish features, volatile history
    let mut rows: Vec<FeatureRow> = (0..100)
        .map(|i| {
            let close = if i % 2 == 0 { 100.0 } else { 97.0 };
            FeatureRow::bare(base() + Duration::days(i), close)
        })
        .collect();
    let last = rows.last_mut().unwrap();
    last.ma_50 = Some(90.0);
    last.ma_120 = Some(95.0);
    last.ma_280 = Some(100.0);
    last.set_feature(Feature::MaSpread50_120, Some(0.1));
    last.set_feature(Feature::MaSpread50_280, Some(0.05));
    last.set_feature(Feature::ReturnScaled21, Some(0.1));
    last.set_feature(Feature::MomentumBonus, Some(0.0));
    last.long_term_down = Some(true);

    let mut settings = Settings::default();
    // the ±3% chop alone breaches a tight stop; keep cooldown out of the way
    settings.max_drawdown_stop = 0.5;

    let result = SignalEngine::new(settings).evaluate(&rows, None).unwrap();
    assert_eq!(result.trend, Trend::Downtrend);
    assert_eq!(result.regime, Regime::HighVol);
    assert!(result.take_short);
    assert!(!result.take_long);
    assert!(result.short_weight > 0.0);
    assert_eq!(result.long_weight, 0.0);
    assert!(result.notes[3].starts_with("- Taking SHORT (SQQQ)"));
}

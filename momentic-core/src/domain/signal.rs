//! Decision output types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Volatility regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Regime {
    LowVol,
    HighVol,
}

impl Regime {
    /// `LowVol` when realized volatility is at or below the threshold.
    pub fn classify(realized_vol: f64, threshold: f64) -> Self {
        if realized_vol <= threshold {
            Regime::LowVol
        } else {
            Regime::HighVol
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Regime::LowVol => "LOW_VOL",
            Regime::HighVol => "HIGH_VOL",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Trend label derived from moving-average ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trend {
    Uptrend,
    Downtrend,
    Sideways,
}

impl Trend {
    pub fn label(self) -> &'static str {
        match self {
            Trend::Uptrend => "UPTREND",
            Trend::Downtrend => "DOWNTREND",
            Trend::Sideways => "SIDEWAYS",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The single allocation decision produced by one engine run.
///
/// `long_weight + short_weight + cash_weight == 1.0`, and at most one of
/// `long_weight` / `short_weight` is positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResult {
    pub date: NaiveDate,
    pub regime: Regime,
    pub trend: Trend,
    pub score_up: f64,
    pub score_dn: f64,
    pub take_long: bool,
    pub take_short: bool,
    pub long_weight: f64,
    pub short_weight: f64,
    pub cash_weight: f64,
    pub notes: Vec<String>,
}

//! Risk metrics: realized volatility, drawdown series, stop breaches and cooldown.

use crate::indicators::{annualized_volatility, drawdown_vs_peak, MathError, TRADING_DAYS};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Annualized realized volatility over a trailing window.
///
/// Fewer than `window + 1` prices is not an error: the result is 0.0.
pub fn realized_volatility(prices: &[f64], window: usize) -> Result<f64, MathError> {
    if prices.len() < window + 1 {
        return Ok(0.0);
    }
    annualized_volatility(prices, window, TRADING_DAYS)
}

/// Drawdown series aligned to `prices`.
pub fn drawdowns(prices: &[f64]) -> Vec<f64> {
    if prices.is_empty() {
        return Vec::new();
    }
    drawdown_vs_peak(prices)
}

/// Most recent index whose drawdown is at or below `-|stop_level|`.
pub fn last_stop_index(drawdowns: &[f64], stop_level: f64) -> Option<usize> {
    let trigger = -stop_level.abs();
    drawdowns.iter().rposition(|&dd| dd <= trigger)
}

/// Whether the post-stop cooldown is still running, and the positions elapsed.
///
/// Counts dataset positions, not calendar days: `days_since = len - (stop + 1)`.
pub fn cooldown_active(
    dates: &[NaiveDate],
    last_stop: Option<usize>,
    cooldown_days: u32,
) -> (bool, usize) {
    match last_stop {
        Some(idx) if !dates.is_empty() => {
            let days_since = dates.len().saturating_sub(idx + 1);
            (days_since < cooldown_days as usize, days_since)
        }
        _ => (false, 0),
    }
}

/// Risk state of a price history as of its last observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSnapshot {
    pub realized_vol: f64,
    pub drawdowns: Vec<f64>,
    pub last_stop_index: Option<usize>,
    pub cooldown_active: bool,
    pub days_since_stop: usize,
}

impl RiskSnapshot {
    /// Compute every risk metric for an oldest-to-newest series.
    pub fn compute(
        dates: &[NaiveDate],
        closes: &[f64],
        vol_window: usize,
        stop_level: f64,
        cooldown_days: u32,
    ) -> Result<Self, MathError> {
        let realized_vol = realized_volatility(closes, vol_window)?;
        let drawdowns = drawdowns(closes);
        let last_stop_index = last_stop_index(&drawdowns, stop_level);
        let (cooldown_active, days_since_stop) =
            cooldown_active(dates, last_stop_index, cooldown_days);
        Ok(Self {
            realized_vol,
            drawdowns,
            last_stop_index,
            cooldown_active,
            days_since_stop,
        })
    }
}

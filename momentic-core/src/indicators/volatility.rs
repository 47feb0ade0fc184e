//! Realized volatility from simple daily returns.

use super::MathError;

/// Trailing window (in returns) used for realized volatility.
pub const VOL_WINDOW: usize = 63;

/// Annualization factor.
pub const TRADING_DAYS: usize = 252;

/// Simple returns `p[i] / p[i-1] - 1`. A zero previous price yields a 0.0 return.
pub fn daily_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|pair| {
            if pair[0] == 0.0 {
                0.0
            } else {
                pair[1] / pair[0] - 1.0
            }
        })
        .collect()
}

/// Population standard deviation over each full trailing window.
///
/// Emits `values.len() - window + 1` outputs; nothing when the series is
/// shorter than the window.
pub fn rolling_std(values: &[f64], window: usize) -> Result<Vec<f64>, MathError> {
    if window == 0 {
        return Err(MathError::InvalidWindow(window));
    }
    Ok(values
        .windows(window)
        .map(|w| {
            let mean = w.iter().sum::<f64>() / window as f64;
            let variance = w.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / window as f64;
            variance.sqrt()
        })
        .collect())
}

/// Latest annualized realized volatility.
///
/// Returns 0.0 when there are fewer than `window` returns.
pub fn annualized_volatility(
    prices: &[f64],
    window: usize,
    trading_days: usize,
) -> Result<f64, MathError> {
    let returns = daily_returns(prices);
    if returns.len() < window {
        return Ok(0.0);
    }
    let std_values = rolling_std(&returns, window)?;
    Ok(std_values
        .last()
        .map_or(0.0, |std| std * (trading_days as f64).sqrt()))
}

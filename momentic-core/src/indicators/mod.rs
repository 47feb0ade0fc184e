//! Numeric kernels shared by the feature builder, risk metrics and engine.
//!
//! Every kernel is a pure function over plain `f64` slices. Warmup positions
//! are `None` rather than `NaN` so callers must handle insufficient history
//! explicitly.

pub mod drawdown;
pub mod logistic;
pub mod sma;
pub mod volatility;

pub use drawdown::drawdown_vs_peak;
pub use logistic::{clamp, logistic_spread_scaled, percentage_change, sigmoid};
pub use sma::moving_average;
pub use volatility::{annualized_volatility, daily_returns, rolling_std, TRADING_DAYS, VOL_WINDOW};

use thiserror::Error;

/// Errors raised by the math kernels on invalid input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MathError {
    #[error("window must be a positive integer, got {0}")]
    InvalidWindow(usize),

    #[error("division by zero: {0}")]
    DivisionByZero(&'static str),
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for kernel tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

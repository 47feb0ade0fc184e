//! Logistic transforms used to squash unbounded spreads into [0, 1].

use super::MathError;

/// Logistic sigmoid: 1 / (1 + e^-x).
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Relative change `(current - previous) / previous`.
pub fn percentage_change(current: f64, previous: f64) -> Result<f64, MathError> {
    if previous == 0.0 {
        return Err(MathError::DivisionByZero("previous value must be non-zero"));
    }
    Ok((current - previous) / previous)
}

/// `sigmoid((n - m) / (m * k))`.
pub fn logistic_spread_scaled(
    numerator: f64,
    denominator: f64,
    scale: f64,
) -> Result<f64, MathError> {
    if denominator == 0.0 || scale == 0.0 {
        return Err(MathError::DivisionByZero("denominator and scale must be non-zero"));
    }
    Ok(sigmoid((numerator - denominator) / (denominator * scale)))
}

/// Clamp a value between inclusive bounds.
pub fn clamp(value: f64, lower: f64, upper: f64) -> f64 {
    value.min(upper).max(lower)
}

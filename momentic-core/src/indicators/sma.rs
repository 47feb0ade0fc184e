//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices over a trailing window.
//! First valid value at index window-1; earlier positions are `None`.

use super::MathError;

/// Trailing simple moving average, one output per input.
///
/// Runs in O(n) with a running sum.
pub fn moving_average(values: &[f64], window: usize) -> Result<Vec<Option<f64>>, MathError> {
    if window == 0 {
        return Err(MathError::InvalidWindow(window));
    }

    let mut result = vec![None; values.len()];
    let mut sum = 0.0;

    for (i, &value) in values.iter().enumerate() {
        sum += value;
        if i >= window {
            sum -= values[i - window];
        }
        if i + 1 >= window {
            result[i] = Some(sum / window as f64);
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn sma_3_over_four_values() {
        let result = moving_average(&[1.0, 2.0, 3.0, 4.0], 3).unwrap();
        assert_eq!(result.len(), 4);
        assert!(result[0].is_none());
        assert!(result[1].is_none());
        assert_approx(result[2].unwrap(), 2.0, DEFAULT_EPSILON);
        assert_approx(result[3].unwrap(), 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_5_basic() {
        let result = moving_average(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0], 5).unwrap();
        for value in result.iter().take(4) {
            assert!(value.is_none());
        }
        // mean(10..=14) = 12, then 13, 14
        assert_approx(result[4].unwrap(), 12.0, DEFAULT_EPSILON);
        assert_approx(result[5].unwrap(), 13.0, DEFAULT_EPSILON);
        assert_approx(result[6].unwrap(), 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_1_is_identity() {
        let result = moving_average(&[100.0, 200.0, 300.0], 1).unwrap();
        assert_eq!(result, vec![Some(100.0), Some(200.0), Some(300.0)]);
    }

    #[test]
    fn sma_too_few_values() {
        let result = moving_average(&[10.0, 11.0], 5).unwrap();
        assert!(result.iter().all(Option::is_none));
    }

    #[test]
    fn sma_empty_input() {
        assert!(moving_average(&[], 3).unwrap().is_empty());
    }

    #[test]
    fn sma_zero_window_rejected() {
        assert_eq!(
            moving_average(&[1.0, 2.0], 0),
            Err(MathError::InvalidWindow(0))
        );
    }
}

//! Drawdown against the running peak.

/// `value / running_peak - 1` for each position; 0.0 while the peak is not positive.
pub fn drawdown_vs_peak(values: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    values
        .iter()
        .map(|&value| {
            peak = peak.max(value);
            if peak > 0.0 {
                value / peak - 1.0
            } else {
                0.0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn increasing_series_has_no_drawdown() {
        assert!(drawdown_vs_peak(&[1.0, 2.0, 3.0, 4.0]).iter().all(|&d| d == 0.0));
    }

    #[test]
    fn drop_from_peak() {
        let dd = drawdown_vs_peak(&[100.0, 120.0, 90.0, 130.0]);
        assert_eq!(dd[0], 0.0);
        assert_eq!(dd[1], 0.0);
        assert_approx(dd[2], -0.25, DEFAULT_EPSILON);
        assert_eq!(dd[3], 0.0);
    }

    #[test]
    fn non_positive_peak_is_zero() {
        assert_eq!(drawdown_vs_peak(&[0.0, -1.0]), vec![0.0, 0.0]);
    }
}

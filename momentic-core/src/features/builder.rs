use super::{
    FeatureError, LOGISTIC_K1, LOGISTIC_K2, MOMENTUM_SCALE, REQUIRED_WINDOWS, VELOCITY_LOOKBACK,
    VELOCITY_SCALE,
};
use crate::domain::{Feature, FeatureRow, PricePoint};
use crate::indicators::{
    clamp, logistic_spread_scaled, moving_average, percentage_change, sigmoid, MathError,
};

/// Build feature rows for an oldest-to-newest price series.
///
/// `windows` must contain 50, 120 and 280; additional windows are validated
/// but do not change the table layout. Rows are returned newest-first.
pub fn build_features(
    prices: &[PricePoint],
    windows: &[usize],
) -> Result<Vec<FeatureRow>, FeatureError> {
    validate_windows(windows)?;
    if let Some(pos) = prices.windows(2).position(|p| p[1].date <= p[0].date) {
        return Err(FeatureError::NotChronological { index: pos + 1 });
    }

    let closes: Vec<f64> = prices.iter().map(|p| p.close).collect();
    let ma_50 = moving_average(&closes, 50)?;
    let ma_120 = moving_average(&closes, 120)?;
    let ma_280 = moving_average(&closes, 280)?;

    let rows = (0..prices.len())
        .rev()
        .map(|i| {
            let mut row = FeatureRow::bare(prices[i].date, prices[i].close);
            row.ma_50 = ma_50[i];
            row.ma_120 = ma_120[i];
            row.ma_280 = ma_280[i];

            let spread_50_280 = logistic_spread(ma_50[i], ma_280[i], LOGISTIC_K2);
            row.set_feature(
                Feature::MaSpread50_120,
                logistic_spread(ma_50[i], ma_120[i], LOGISTIC_K1),
            );
            row.set_feature(Feature::MaSpread50_280, spread_50_280);
            row.set_feature(Feature::ReturnScaled21, logistic_return(&closes, i));
            row.set_feature(Feature::MomentumBonus, momentum_positive_bonus(&closes, i));
            row.long_term_down = spread_50_280.map(|s| s < 0.5);
            row
        })
        .collect();

    Ok(rows)
}

/// The requested windows must include 50, 120 and 280, and none may be zero.
pub fn validate_windows(windows: &[usize]) -> Result<(), FeatureError> {
    let missing: Vec<usize> = REQUIRED_WINDOWS
        .iter()
        .copied()
        .filter(|w| !windows.contains(w))
        .collect();
    if !missing.is_empty() {
        return Err(FeatureError::MissingWindows(missing));
    }
    if let Some(&w) = windows.iter().find(|&&w| w == 0) {
        return Err(MathError::InvalidWindow(w).into());
    }
    Ok(())
}

fn logistic_spread(a: Option<f64>, b: Option<f64>, scale: f64) -> Option<f64> {
    logistic_spread_scaled(a?, b?, scale).ok()
}

/// `sigmoid(r21 / VELOCITY_SCALE)` where r21 is the 21-row percentage change.
fn logistic_return(closes: &[f64], index: usize) -> Option<f64> {
    if index < VELOCITY_LOOKBACK {
        return None;
    }
    let change = percentage_change(closes[index], closes[index - VELOCITY_LOOKBACK]).ok()?;
    Some(sigmoid(change / VELOCITY_SCALE))
}

/// Acceleration of the 21-row return, floored at zero.
fn momentum_positive_bonus(closes: &[f64], index: usize) -> Option<f64> {
    if index < VELOCITY_LOOKBACK * 2 {
        return None;
    }
    let current = percentage_change(closes[index], closes[index - VELOCITY_LOOKBACK]).ok()?;
    let previous = percentage_change(
        closes[index - VELOCITY_LOOKBACK],
        closes[index - VELOCITY_LOOKBACK * 2],
    )
    .ok()?;
    let score = (sigmoid((current - previous) / MOMENTUM_SCALE) - 0.5) * 2.0;
    Some(clamp(score, 0.0, 1.0))
}

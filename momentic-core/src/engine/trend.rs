//! Trend classification.

use super::normalize::ResolvedFeatures;
use crate::domain::{Feature, FeatureRow, Trend};

/// Feature level at or above which the fallback calls an uptrend.
pub const TREND_UP_LEVEL: f64 = 0.55;

/// Feature level at or below which the fallback calls a downtrend.
pub const TREND_DOWN_LEVEL: f64 = 0.45;

/// Strict MA ordering when all three averages exist, otherwise the
/// 50/280 spread and 21-day return features.
pub fn classify_trend(row: &FeatureRow, features: &ResolvedFeatures) -> Trend {
    if let Some((ma50, ma120, ma280)) = row.moving_averages() {
        return if ma50 > ma120 && ma120 > ma280 {
            Trend::Uptrend
        } else if ma50 < ma120 && ma120 < ma280 {
            Trend::Downtrend
        } else {
            Trend::Sideways
        };
    }

    let spread = features.up.get(Feature::MaSpread50_280);
    let velocity = features.up.get(Feature::ReturnScaled21);
    if spread >= TREND_UP_LEVEL && velocity >= TREND_UP_LEVEL {
        Trend::Uptrend
    } else if spread <= TREND_DOWN_LEVEL && velocity <= TREND_DOWN_LEVEL {
        Trend::Downtrend
    } else {
        Trend::Sideways
    }
}

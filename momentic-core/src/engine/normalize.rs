//! Default resolution for a feature snapshot.
//!
//! This is the only place missing feature values are replaced. Missing
//! features become neutral (0.5); complements are taken verbatim when present
//! and mirrored (`1 - value`) otherwise.

use crate::domain::{Feature, FeatureRow, FeatureVector};
use serde::{Deserialize, Serialize};

/// Value substituted for a missing engineered feature.
pub const NEUTRAL_FEATURE: f64 = 0.5;

/// Fully populated bullish/bearish feature vectors for one row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedFeatures {
    pub up: FeatureVector,
    pub down: FeatureVector,
    pub long_term_down: bool,
}

impl ResolvedFeatures {
    pub fn resolve(row: &FeatureRow) -> Self {
        let up = FeatureVector::from_fn(|f| row.value(f).unwrap_or(NEUTRAL_FEATURE));
        let down = FeatureVector::from_fn(|f| row.complement(f).unwrap_or(1.0 - up.get(f)));
        let long_term_down = row
            .long_term_down
            .unwrap_or(up.get(Feature::MaSpread50_280) < 0.5);
        Self {
            up,
            down,
            long_term_down,
        }
    }
}

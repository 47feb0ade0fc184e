//! Engineered feature rows, one per trading date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four logistic features scored by the decision engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Feature {
    #[serde(rename = "logistic_ma_spread_50_120")]
    MaSpread50_120,
    #[serde(rename = "logistic_ma_spread_50_280")]
    MaSpread50_280,
    #[serde(rename = "logistic_return_scaled_21")]
    ReturnScaled21,
    #[serde(rename = "momentum_positive_bonus")]
    MomentumBonus,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::MaSpread50_120,
        Feature::MaSpread50_280,
        Feature::ReturnScaled21,
        Feature::MomentumBonus,
    ];

    /// Column name in the feature table.
    pub fn column(self) -> &'static str {
        match self {
            Feature::MaSpread50_120 => "logistic_ma_spread_50_120",
            Feature::MaSpread50_280 => "logistic_ma_spread_50_280",
            Feature::ReturnScaled21 => "logistic_return_scaled_21",
            Feature::MomentumBonus => "momentum_positive_bonus",
        }
    }

    /// Column name of the paired complement.
    pub fn complement_column(self) -> &'static str {
        match self {
            Feature::MaSpread50_120 => "logistic_ma_spread_50_120_complement",
            Feature::MaSpread50_280 => "logistic_ma_spread_50_280_complement",
            Feature::ReturnScaled21 => "logistic_return_scaled_21_complement",
            Feature::MomentumBonus => "momentum_positive_bonus_complement",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// One value per [`Feature`], used both for feature values and for weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureVector {
    pub logistic_ma_spread_50_120: f64,
    pub logistic_ma_spread_50_280: f64,
    pub logistic_return_scaled_21: f64,
    pub momentum_positive_bonus: f64,
}

impl FeatureVector {
    pub fn new(spread_50_120: f64, spread_50_280: f64, return_21: f64, momentum: f64) -> Self {
        Self {
            logistic_ma_spread_50_120: spread_50_120,
            logistic_ma_spread_50_280: spread_50_280,
            logistic_return_scaled_21: return_21,
            momentum_positive_bonus: momentum,
        }
    }

    /// Build from a per-feature closure, in [`Feature::ALL`] order.
    pub fn from_fn(mut f: impl FnMut(Feature) -> f64) -> Self {
        Self::new(
            f(Feature::MaSpread50_120),
            f(Feature::MaSpread50_280),
            f(Feature::ReturnScaled21),
            f(Feature::MomentumBonus),
        )
    }

    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::MaSpread50_120 => self.logistic_ma_spread_50_120,
            Feature::MaSpread50_280 => self.logistic_ma_spread_50_280,
            Feature::ReturnScaled21 => self.logistic_return_scaled_21,
            Feature::MomentumBonus => self.momentum_positive_bonus,
        }
    }

    /// Weighted sum `Σ weights[f] * self[f]`, matched by feature name.
    pub fn weighted_sum(&self, weights: &FeatureVector) -> f64 {
        Feature::ALL
            .iter()
            .map(|&f| weights.get(f) * self.get(f))
            .sum()
    }
}

/// Engineered features for a single date.
///
/// Moving averages and logistic features are `None` until enough history
/// exists. A complement is present iff its base value is present, and the
/// pair sums to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub close: f64,
    pub ma_50: Option<f64>,
    pub ma_120: Option<f64>,
    pub ma_280: Option<f64>,
    pub logistic_ma_spread_50_120: Option<f64>,
    pub logistic_ma_spread_50_280: Option<f64>,
    pub logistic_return_scaled_21: Option<f64>,
    pub momentum_positive_bonus: Option<f64>,
    pub logistic_ma_spread_50_120_complement: Option<f64>,
    pub logistic_ma_spread_50_280_complement: Option<f64>,
    pub logistic_return_scaled_21_complement: Option<f64>,
    pub momentum_positive_bonus_complement: Option<f64>,
    pub long_term_down: Option<bool>,
}

impl FeatureRow {
    /// Row with only date and close; every derived column empty.
    pub fn bare(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            close,
            ma_50: None,
            ma_120: None,
            ma_280: None,
            logistic_ma_spread_50_120: None,
            logistic_ma_spread_50_280: None,
            logistic_return_scaled_21: None,
            momentum_positive_bonus: None,
            logistic_ma_spread_50_120_complement: None,
            logistic_ma_spread_50_280_complement: None,
            logistic_return_scaled_21_complement: None,
            momentum_positive_bonus_complement: None,
            long_term_down: None,
        }
    }

    pub fn value(&self, feature: Feature) -> Option<f64> {
        match feature {
            Feature::MaSpread50_120 => self.logistic_ma_spread_50_120,
            Feature::MaSpread50_280 => self.logistic_ma_spread_50_280,
            Feature::ReturnScaled21 => self.logistic_return_scaled_21,
            Feature::MomentumBonus => self.momentum_positive_bonus,
        }
    }

    pub fn complement(&self, feature: Feature) -> Option<f64> {
        match feature {
            Feature::MaSpread50_120 => self.logistic_ma_spread_50_120_complement,
            Feature::MaSpread50_280 => self.logistic_ma_spread_50_280_complement,
            Feature::ReturnScaled21 => self.logistic_return_scaled_21_complement,
            Feature::MomentumBonus => self.momentum_positive_bonus_complement,
        }
    }

    /// Set a feature value and its complement together.
    pub fn set_feature(&mut self, feature: Feature, value: Option<f64>) {
        let complement = value.map(|v| 1.0 - v);
        match feature {
            Feature::MaSpread50_120 => {
                self.logistic_ma_spread_50_120 = value;
                self.logistic_ma_spread_50_120_complement = complement;
            }
            Feature::MaSpread50_280 => {
                self.logistic_ma_spread_50_280 = value;
                self.logistic_ma_spread_50_280_complement = complement;
            }
            Feature::ReturnScaled21 => {
                self.logistic_return_scaled_21 = value;
                self.logistic_return_scaled_21_complement = complement;
            }
            Feature::MomentumBonus => {
                self.momentum_positive_bonus = value;
                self.momentum_positive_bonus_complement = complement;
            }
        }
    }

    /// Overwrite only the complement column (used when reading tables verbatim).
    pub fn set_complement(&mut self, feature: Feature, complement: Option<f64>) {
        match feature {
            Feature::MaSpread50_120 => self.logistic_ma_spread_50_120_complement = complement,
            Feature::MaSpread50_280 => self.logistic_ma_spread_50_280_complement = complement,
            Feature::ReturnScaled21 => self.logistic_return_scaled_21_complement = complement,
            Feature::MomentumBonus => self.momentum_positive_bonus_complement = complement,
        }
    }

    /// All three moving averages, when every one is available.
    pub fn moving_averages(&self) -> Option<(f64, f64, f64)> {
        Some((self.ma_50?, self.ma_120?, self.ma_280?))
    }
}

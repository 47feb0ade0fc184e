//! Feature builder: close series in, engineered feature rows out.
//!
//! Produces one [`FeatureRow`](crate::domain::FeatureRow) per date with the
//! 50/120/280 moving averages, four logistic features, their complements and
//! the long-term-down flag. Output is newest-first, matching the on-disk
//! feature table.

pub mod builder;

pub use builder::{build_features, validate_windows};

use crate::indicators::MathError;
use thiserror::Error;

/// Moving-average windows every feature table must contain.
pub const REQUIRED_WINDOWS: [usize; 3] = [50, 120, 280];

/// Scale applied to the MA50 vs MA120 spread.
pub const LOGISTIC_K1: f64 = 0.05;

/// Scale applied to the MA50 vs MA280 spread.
pub const LOGISTIC_K2: f64 = 0.08;

/// Lookback (in rows) for return and momentum features.
pub const VELOCITY_LOOKBACK: usize = 21;

/// Scale applied to the 21-day return before the sigmoid.
pub const VELOCITY_SCALE: f64 = 0.07;

/// Scale applied to the change in 21-day return.
pub const MOMENTUM_SCALE: f64 = 0.10;

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("missing required moving-average windows: {0:?}")]
    MissingWindows(Vec<usize>),

    #[error("price series is not strictly chronological at position {index}")]
    NotChronological { index: usize },

    #[error(transparent)]
    Math(#[from] MathError),
}

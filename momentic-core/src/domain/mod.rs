//! Domain types: price history, engineered feature rows, decision output.

pub mod bar;
pub mod feature_row;
pub mod signal;

pub use bar::{Bar, PricePoint};
pub use feature_row::{Feature, FeatureRow, FeatureVector};
pub use signal::{Regime, SignalResult, Trend};

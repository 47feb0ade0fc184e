//! Daily price history rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of raw daily history for a symbol.
///
/// Only `close` is required; the other OHLCV columns are carried through
/// so a merged history file keeps whatever the provider supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub date: NaiveDate,
    pub close: f64,
    pub volume: Option<f64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
}

impl Bar {
    /// Bar with only a close, as produced by close-only sources and tests.
    pub fn from_close(symbol: impl Into<String>, date: NaiveDate, close: f64) -> Self {
        Self {
            symbol: symbol.into(),
            date,
            close,
            volume: None,
            open: None,
            high: None,
            low: None,
        }
    }

    pub fn price_point(&self) -> PricePoint {
        PricePoint {
            date: self.date,
            close: self.close,
        }
    }
}

/// A dated close, the only input the feature builder needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_close_leaves_optional_columns_empty() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let bar = Bar::from_close("TQQQ", date, 51.25);
        assert_eq!(bar.symbol, "TQQQ");
        assert!(bar.volume.is_none() && bar.open.is_none());
        assert_eq!(bar.price_point(), PricePoint::new(date, 51.25));
    }
}

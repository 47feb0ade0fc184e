//! Volatility-targeted position sizing.

use super::gates::GateDecision;
use crate::domain::Regime;
use crate::indicators::clamp;

/// Fixed multiplier from underlying volatility to leveraged-instrument volatility.
pub const LEVERAGE_PROXY: f64 = 3.0;

/// Sizing multiplier applied in `HIGH_VOL`.
pub const HIGH_VOL_SCALE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sizing {
    pub long_weight: f64,
    pub short_weight: f64,
    /// Estimated instrument volatility, 0.0 when unavailable.
    pub asset_vol: f64,
}

impl Sizing {
    pub fn vol_available(&self) -> bool {
        self.asset_vol > 0.0
    }
}

pub fn size_positions(
    realized_vol: f64,
    regime: Regime,
    gate: GateDecision,
    target_vol: f64,
) -> Sizing {
    let asset_vol = realized_vol * LEVERAGE_PROXY;
    if !(asset_vol > 0.0) {
        return Sizing {
            long_weight: 0.0,
            short_weight: 0.0,
            asset_vol: 0.0,
        };
    }

    let mut weight = (target_vol / asset_vol).min(1.0);
    if regime == Regime::HighVol {
        weight *= HIGH_VOL_SCALE;
    }

    Sizing {
        long_weight: if gate.take_long { weight } else { 0.0 },
        short_weight: if gate.take_short { weight } else { 0.0 },
        asset_vol,
    }
}

pub fn cash_weight(long_weight: f64, short_weight: f64) -> f64 {
    clamp(1.0 - (long_weight + short_weight), 0.0, 1.0)
}

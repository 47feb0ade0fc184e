//! Entry gating and long/short conflict resolution.
//!
//! Each gate can only clear a flag, never set one. Order:
//! entry threshold, HIGH_VOL floor, shared exit threshold, cooldown.

use crate::domain::Regime;
use crate::settings::ThresholdPair;
use serde::{Deserialize, Serialize};

/// Minimum `score_up` for a long entry in `HIGH_VOL`.
pub const HIGH_VOL_LONG_FLOOR: f64 = 0.70;

/// Minimum `score_dn` for a short entry in `HIGH_VOL` when the long-term trend is not down.
pub const HIGH_VOL_SHORT_FLOOR: f64 = 0.80;

/// Everything the gates look at for one decision.
#[derive(Debug, Clone, Copy)]
pub struct GateInputs {
    pub score_up: f64,
    pub score_dn: f64,
    pub regime: Regime,
    pub long_term_down: bool,
    pub cooldown_active: bool,
    pub entry: ThresholdPair,
    pub exit_threshold: f64,
}

/// Which sides survived gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GateDecision {
    pub take_long: bool,
    pub take_short: bool,
}

pub fn apply_gates(inputs: &GateInputs) -> GateDecision {
    let mut take_long = inputs.score_up >= inputs.entry.long;
    let mut take_short = inputs.score_dn >= inputs.entry.short;

    if inputs.regime == Regime::HighVol {
        take_long = take_long && inputs.score_up >= HIGH_VOL_LONG_FLOOR;
        take_short =
            take_short && (inputs.long_term_down || inputs.score_dn >= HIGH_VOL_SHORT_FLOOR);
    }

    if take_long && inputs.score_up < inputs.exit_threshold {
        take_long = false;
    }
    if take_short && inputs.score_dn < inputs.exit_threshold {
        take_short = false;
    }

    if inputs.cooldown_active {
        take_long = false;
        take_short = false;
    }

    GateDecision {
        take_long,
        take_short,
    }
}

/// Keep at most one positive side, picking the larger margin over its entry threshold.
///
/// Ties go to the long side. Returns `(long_weight, short_weight)`.
pub fn resolve_conflict(
    long_weight: f64,
    short_weight: f64,
    score_up: f64,
    score_dn: f64,
    entry: ThresholdPair,
) -> (f64, f64) {
    if long_weight > 0.0 && short_weight > 0.0 {
        let long_margin = score_up - entry.long;
        let short_margin = score_dn - entry.short;
        if long_margin >= short_margin {
            (long_weight, 0.0)
        } else {
            (0.0, short_weight)
        }
    } else {
        (long_weight, short_weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(score_up: f64, score_dn: f64, regime: Regime) -> GateInputs {
        GateInputs {
            score_up,
            score_dn,
            regime,
            long_term_down: false,
            cooldown_active: false,
            entry: ThresholdPair {
                long: 0.60,
                short: 0.65,
            },
            exit_threshold: 0.45,
        }
    }

    #[test]
    fn low_vol_entry_thresholds() {
        let g = apply_gates(&inputs(0.60, 0.64, Regime::LowVol));
        assert!(g.take_long);
        assert!(!g.take_short);
    }

    #[test]
    fn high_vol_long_floor() {
        let mut i = inputs(0.69, 0.0, Regime::HighVol);
        assert!(!apply_gates(&i).take_long);
        i.score_up = 0.70;
        assert!(apply_gates(&i).take_long);
    }

    #[test]
    fn high_vol_short_needs_long_term_down_or_floor() {
        let mut i = inputs(0.0, 0.79, Regime::HighVol);
        assert!(!apply_gates(&i).take_short);

        i.long_term_down = true;
        assert!(apply_gates(&i).take_short);

        i.long_term_down = false;
        i.score_dn = 0.80;
        assert!(apply_gates(&i).take_short);
    }

    #[test]
    fn exit_threshold_clears_low_entries() {
        let mut i = inputs(0.40, 0.40, Regime::LowVol);
        i.entry = ThresholdPair {
            long: 0.30,
            short: 0.30,
        };
        assert_eq!(apply_gates(&i), GateDecision::default());

        i.exit_threshold = 0.35;
        let g = apply_gates(&i);
        assert!(g.take_long && g.take_short);
    }

    #[test]
    fn cooldown_overrides_everything() {
        let mut i = inputs(0.95, 0.95, Regime::LowVol);
        i.cooldown_active = true;
        assert_eq!(apply_gates(&i), GateDecision::default());
    }

    #[test]
    fn conflict_keeps_larger_margin() {
        let entry = ThresholdPair {
            long: 0.60,
            short: 0.65,
        };
        assert_eq!(resolve_conflict(0.4, 0.4, 0.70, 0.80, entry), (0.0, 0.4));
        assert_eq!(resolve_conflict(0.4, 0.4, 0.80, 0.70, entry), (0.4, 0.0));
    }

    #[test]
    fn conflict_tie_goes_long() {
        let entry = ThresholdPair {
            long: 0.60,
            short: 0.60,
        };
        assert_eq!(resolve_conflict(0.3, 0.3, 0.75, 0.75, entry), (0.3, 0.0));
    }

    #[test]
    fn single_side_is_untouched() {
        let entry = ThresholdPair {
            long: 0.60,
            short: 0.65,
        };
        assert_eq!(resolve_conflict(0.4, 0.0, 0.0, 1.0, entry), (0.4, 0.0));
        assert_eq!(resolve_conflict(0.0, 0.2, 1.0, 0.0, entry), (0.0, 0.2));
    }
}

//! Narrative rationale lines for a decision.
//!
//! Output is a pure function of its inputs so reports reproduce byte-for-byte.

use super::sizing::Sizing;
use crate::domain::{Regime, Trend};
use crate::risk::RiskSnapshot;

/// Inputs to the notes block.
#[derive(Debug, Clone, Copy)]
pub struct NoteContext<'a> {
    pub regime: Regime,
    pub realized_vol: f64,
    pub vol_threshold: f64,
    pub risk: &'a RiskSnapshot,
    pub score_up: f64,
    pub score_dn: f64,
    pub long_term_down: bool,
    pub trend: Trend,
    pub sizing: Sizing,
    pub long_instrument: &'a str,
    pub short_instrument: &'a str,
}

pub fn volatility_note(realized_vol: f64) -> String {
    if realized_vol > 0.0 {
        format!("σ63={:.2}%", realized_vol * 100.0)
    } else {
        "σ63 unavailable".to_string()
    }
}

/// Regime, cooldown, scores, then the action taken.
pub fn build_notes(ctx: &NoteContext<'_>) -> Vec<String> {
    let mut notes = Vec::with_capacity(4);

    notes.push(format!(
        "- Regime: {} ({}, threshold={:.2}%)",
        ctx.regime,
        volatility_note(ctx.realized_vol),
        ctx.vol_threshold * 100.0
    ));

    notes.push(format!(
        "- Cooldown active: {} (days since stop: {})",
        if ctx.risk.cooldown_active { "yes" } else { "no" },
        ctx.risk.days_since_stop
    ));

    notes.push(format!(
        "- Scores: up={:.3}, down={:.3}, long_term_down={}, trend={}",
        ctx.score_up, ctx.score_dn, ctx.long_term_down, ctx.trend
    ));

    let sizing = ctx.sizing;
    let action = if sizing.long_weight > 0.0 {
        format!(
            "- Taking LONG ({}) at {:.2}% (σ≈{:.2}%)",
            ctx.long_instrument,
            sizing.long_weight * 100.0,
            sizing.asset_vol * 100.0
        )
    } else if sizing.short_weight > 0.0 {
        format!(
            "- Taking SHORT ({}) at {:.2}% (σ≈{:.2}%)",
            ctx.short_instrument,
            sizing.short_weight * 100.0,
            sizing.asset_vol * 100.0
        )
    } else if !sizing.vol_available() {
        "- Staying in cash (volatility unavailable)".to_string()
    } else {
        "- Staying in cash (no qualifying signal)".to_string()
    };
    notes.push(action);

    notes
}

//! Signal decision engine: one feature table and one settings object in, one
//! allocation decision out.
//!
//! Each evaluation is stateless and runs the same phases:
//!
//! 1. Select the snapshot row (requested date or latest) and its history
//! 2. Resolve missing features to neutral defaults
//! 3. Label the trend from MA ordering, or from features when an MA is missing
//! 4. Compute realized volatility, drawdown stop and cooldown; classify the regime
//! 5. Score both sides with the configured weight vectors
//! 6. Gate entries (threshold, HIGH_VOL floor, exit threshold, cooldown)
//! 7. Size with volatility targeting
//! 8. Resolve long/short conflicts
//! 9. Put the remainder in cash
//! 10. Write the notes block

pub mod gates;
pub mod normalize;
pub mod notes;
pub mod sizing;
pub mod snapshot;
pub mod trend;

pub use gates::{
    apply_gates, resolve_conflict, GateDecision, GateInputs, HIGH_VOL_LONG_FLOOR,
    HIGH_VOL_SHORT_FLOOR,
};
pub use normalize::{ResolvedFeatures, NEUTRAL_FEATURE};
pub use notes::{build_notes, volatility_note, NoteContext};
pub use sizing::{cash_weight, size_positions, Sizing, LEVERAGE_PROXY};
pub use snapshot::DecisionWindow;
pub use trend::classify_trend;

use crate::domain::{FeatureRow, Regime, SignalResult};
use crate::indicators::{MathError, VOL_WINDOW};
use crate::risk::RiskSnapshot;
use crate::settings::Settings;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("feature dataset is empty")]
    EmptyDataset,

    #[error("requested date {requested} is after the latest available date {latest}")]
    DateBeyondData {
        requested: NaiveDate,
        latest: NaiveDate,
    },

    #[error("feature dataset has more than one row dated {0}")]
    DuplicateDate(NaiveDate),

    #[error("no feature rows on or before {0}")]
    NoDataOnOrBefore(NaiveDate),

    #[error("close price on {date} is not a finite number")]
    InvalidClose { date: NaiveDate },

    #[error(transparent)]
    Math(#[from] MathError),
}

/// Evaluates feature tables against one settings object.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    settings: Settings,
}

impl SignalEngine {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Decide for `date`, or for the latest row when `None`.
    ///
    /// A date between rows uses the latest row on or before it.
    pub fn evaluate(
        &self,
        rows: &[FeatureRow],
        date: Option<NaiveDate>,
    ) -> Result<SignalResult, EngineError> {
        let settings = &self.settings;
        let window = DecisionWindow::select(rows, date)?;
        if let Some(bad) = window.rows().iter().find(|r| !r.close.is_finite()) {
            return Err(EngineError::InvalidClose { date: bad.date });
        }
        let row = window.latest();

        let features = ResolvedFeatures::resolve(row);
        let trend = classify_trend(row, &features);

        let risk = RiskSnapshot::compute(
            &window.dates(),
            &window.closes(),
            VOL_WINDOW,
            settings.max_drawdown_stop,
            settings.cooldown_days,
        )?;
        let regime = Regime::classify(risk.realized_vol, settings.vol_threshold);
        let entry = settings.entry_thresholds.for_regime(regime);

        let score_up = features.up.weighted_sum(&settings.weights.up);
        let score_dn = features.down.weighted_sum(&settings.weights.down);

        let gate = apply_gates(&GateInputs {
            score_up,
            score_dn,
            regime,
            long_term_down: features.long_term_down,
            cooldown_active: risk.cooldown_active,
            entry,
            exit_threshold: settings.exit_threshold,
        });

        let mut sizing = size_positions(risk.realized_vol, regime, gate, settings.target_vol);
        let (long_weight, short_weight) =
            resolve_conflict(sizing.long_weight, sizing.short_weight, score_up, score_dn, entry);
        sizing.long_weight = long_weight;
        sizing.short_weight = short_weight;
        let cash_weight = cash_weight(long_weight, short_weight);

        let notes = build_notes(&NoteContext {
            regime,
            realized_vol: risk.realized_vol,
            vol_threshold: settings.vol_threshold,
            risk: &risk,
            score_up,
            score_dn,
            long_term_down: features.long_term_down,
            trend,
            sizing,
            long_instrument: &settings.instruments.long,
            short_instrument: &settings.instruments.short,
        });

        debug!(
            date = %row.date,
            rows = window.len(),
            realized_vol = risk.realized_vol,
            %regime,
            %trend,
            score_up,
            score_dn,
            take_long = gate.take_long,
            take_short = gate.take_short,
            cooldown = risk.cooldown_active,
            "signal evaluated"
        );

        Ok(SignalResult {
            date: row.date,
            regime,
            trend,
            score_up,
            score_dn,
            take_long: gate.take_long,
            take_short: gate.take_short,
            long_weight,
            short_weight,
            cash_weight,
            notes,
        })
    }
}

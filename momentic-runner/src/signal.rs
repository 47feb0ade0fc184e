//! One signal run: settings and feature table in, decision plus its
//! fingerprints out, with the optional report and history side effects.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use momentic_core::data::read_feature_rows;
use momentic_core::domain::SignalResult;
use momentic_core::engine::DecisionWindow;
use momentic_core::fingerprint::{
    dataset_hash, settings_hash, DatasetHash, DecisionRecord, SettingsHash,
};
use momentic_core::{Settings, SignalEngine};
use tracing::info;

use crate::error::RunError;
use crate::history::DecisionHistory;
use crate::report::{format_report, write_report};

#[derive(Debug, Clone, Default)]
pub struct SignalOptions {
    pub csv: PathBuf,
    /// `None`, or a path that does not exist, means built-in defaults.
    pub settings: Option<PathBuf>,
    pub date: Option<NaiveDate>,
    pub report: Option<PathBuf>,
    pub history: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct SignalRun {
    pub source: String,
    pub settings: Settings,
    pub result: SignalResult,
    pub settings_hash: SettingsHash,
    pub dataset_hash: DatasetHash,
    pub report_lines: Vec<String>,
}

/// Strict `YYYY-MM-DD`.
pub fn parse_signal_date(raw: &str) -> Result<NaiveDate, RunError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| RunError::InvalidInput(format!("invalid date '{raw}', expected YYYY-MM-DD")))
}

pub fn run_signal(opts: &SignalOptions) -> Result<SignalRun, RunError> {
    let settings = Settings::load(opts.settings.as_deref())?;
    let rows = read_feature_rows(&opts.csv)?;
    let engine = SignalEngine::new(settings);
    let result = engine.evaluate(&rows, opts.date)?;

    let window = DecisionWindow::select(&rows, Some(result.date))?;
    let dataset_hash = dataset_hash(window.rows().iter().copied());
    let settings_hash = settings_hash(engine.settings())?;

    let source = opts.csv.display().to_string();
    let report_lines = format_report(&source, &result, &engine.settings().instruments);

    info!(
        source = %source,
        date = %result.date,
        settings_hash = %settings_hash,
        dataset_hash = %dataset_hash,
        "signal computed"
    );

    if let Some(path) = &opts.report {
        write_report(path, &report_lines)?;
        info!(path = %path.display(), "report written");
    }

    if let Some(path) = &opts.history {
        append_history(path, &source, &settings_hash, &dataset_hash, &result)?;
    }

    Ok(SignalRun {
        source,
        settings: engine.settings().clone(),
        result,
        settings_hash,
        dataset_hash,
        report_lines,
    })
}

fn append_history(
    path: &Path,
    source: &str,
    settings_hash: &SettingsHash,
    dataset_hash: &DatasetHash,
    result: &SignalResult,
) -> Result<(), RunError> {
    let record = DecisionRecord {
        recorded_at: Utc::now(),
        source: source.to_string(),
        settings_hash: settings_hash.clone(),
        dataset_hash: dataset_hash.clone(),
        result: result.clone(),
    };
    DecisionHistory::new(path)
        .append(&record)
        .map_err(|e| RunError::io(path, e))
}

//! Plain-text signal report and the one-line console summary.

use std::fs;
use std::path::Path;

use momentic_core::domain::SignalResult;
use momentic_core::settings::Instruments;

use crate::error::RunError;

/// Report lines, in file order. Weights are printed as percentages.
pub fn format_report(
    source: &str,
    result: &SignalResult,
    instruments: &Instruments,
) -> Vec<String> {
    let mut lines = vec![
        format!("Source file: {source}"),
        format!("Date: {}", result.date),
        format!("Trend regime: {}", result.trend),
        String::new(),
        format!("{} target: {:.2}%", instruments.long, result.long_weight * 100.0),
        format!("{} target: {:.2}%", instruments.short, result.short_weight * 100.0),
        format!("CASH target: {:.2}%", result.cash_weight * 100.0),
        String::new(),
        "Notes:".to_string(),
    ];
    lines.extend(result.notes.iter().cloned());
    lines
}

/// Write `lines` joined by newlines, creating the parent directory first.
pub fn write_report(path: &Path, lines: &[String]) -> Result<(), RunError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| RunError::io(parent, e))?;
    }
    fs::write(path, lines.join("\n")).map_err(|e| RunError::io(path, e))
}

/// `[signal] 2024-06-03 trend=UPTREND regime=LOW_VOL TQQQ=0.40 SQQQ=0.00 CASH=0.60`
pub fn console_summary(result: &SignalResult, instruments: &Instruments) -> String {
    format!(
        "[signal] {} trend={} regime={} {}={:.2} {}={:.2} CASH={:.2}",
        result.date,
        result.trend,
        result.regime,
        instruments.long,
        result.long_weight,
        instruments.short,
        result.short_weight,
        result.cash_weight,
    )
}

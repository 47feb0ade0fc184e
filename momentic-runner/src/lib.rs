//! Momentic Runner: file-level orchestration on top of `momentic-core`.
//!
//! This crate provides:
//! - Batch feature builds from raw history files
//! - Signal runs from a feature table and a settings file
//! - The plain-text signal report and console summary
//! - JSONL decision history with settings/dataset fingerprints

pub mod error;
pub mod features;
pub mod history;
pub mod report;
pub mod signal;

pub use error::RunError;
pub use features::{build_feature_file, build_feature_files, feature_path, parse_windows};
pub use history::DecisionHistory;
pub use report::{console_summary, format_report, write_report};
pub use signal::{parse_signal_date, run_signal, SignalOptions, SignalRun};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn signal_run_is_send_sync() {
        assert_send::<SignalRun>();
        assert_sync::<SignalRun>();
    }

    #[test]
    fn run_error_is_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }
}

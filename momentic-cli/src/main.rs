//! Momentic CLI: fetch, features, signal and connection check commands.
//!
//! Commands:
//! - `fetch`: download daily history from Massive into `{raw_dir}/{SYMBOL}.csv`
//! - `features`: build `{processed_dir}/{TICKER}_indicators.csv` from raw history
//! - `signal`: run the decision engine on one feature table
//! - `check`: probe the Massive API and write `state/connections.json`

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use momentic_core::data::{
    fetch_symbols, parse_date, parse_symbol_list, BatchSummary, CircuitBreaker,
    MassiveCredentials, MassiveProvider, ProbeStatus, StdoutProgress, DEFAULT_PROBE_TICKER,
};
use momentic_runner::features::default_windows;
use momentic_runner::{
    build_feature_files, console_summary, parse_signal_date, parse_windows, run_signal,
    SignalOptions,
};

#[derive(Parser)]
#[command(
    name = "momentic",
    about = "Momentic: trend/volatility allocation signals for a leveraged long/short pair"
)]
struct Cli {
    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download daily history and merge it into the raw CSV files.
    Fetch {
        /// Comma-separated symbols (e.g., TQQQ,SQQQ,QQQ).
        #[arg(long)]
        symbols: String,

        /// Start date. Defaults to the latest date already on disk.
        #[arg(long)]
        start: Option<String>,

        /// End date. Defaults to today (UTC).
        #[arg(long)]
        end: Option<String>,

        /// Raw history directory.
        #[arg(long, default_value = "data/raw")]
        raw_dir: PathBuf,
    },
    /// Build engineered feature tables from raw history.
    Features {
        /// Comma-separated tickers.
        #[arg(long)]
        tickers: String,

        /// Comma-separated moving-average windows; must include 50, 120 and 280.
        #[arg(long, default_value = "50,120,280")]
        windows: String,

        /// Raw history directory.
        #[arg(long, default_value = "data/raw")]
        raw_dir: PathBuf,

        /// Output directory for `{TICKER}_indicators.csv`.
        #[arg(long, default_value = "data/processed")]
        processed_dir: PathBuf,
    },
    /// Compute the allocation decision for one feature table.
    Signal {
        /// Feature table produced by `features`.
        #[arg(long)]
        csv: PathBuf,

        /// Settings file (TOML, or JSON by extension). Missing file means defaults.
        #[arg(long, default_value = "config/settings.toml")]
        settings: PathBuf,

        /// Report output path.
        #[arg(long, default_value = "data/results/signal_report.txt")]
        report: PathBuf,

        /// Skip writing the report file.
        #[arg(long, default_value_t = false)]
        no_report: bool,

        /// Decide as of this date (YYYY-MM-DD) instead of the latest row.
        #[arg(long)]
        date: Option<String>,

        /// Print the decision as JSON instead of the summary line.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Append the decision and its fingerprints to this JSONL file.
        #[arg(long)]
        history: Option<PathBuf>,
    },
    /// Probe the Massive API and record the result.
    Check {
        /// Ticker used for the probe request.
        #[arg(default_value = DEFAULT_PROBE_TICKER)]
        ticker: String,

        /// Directory for `connections.json`.
        #[arg(long, default_value = "state")]
        state_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Fetch {
            symbols,
            start,
            end,
            raw_dir,
        } => run_fetch(&symbols, start.as_deref(), end.as_deref(), raw_dir),
        Commands::Features {
            tickers,
            windows,
            raw_dir,
            processed_dir,
        } => run_features(&tickers, &windows, raw_dir, processed_dir),
        Commands::Signal {
            csv,
            settings,
            report,
            no_report,
            date,
            json,
            history,
        } => run_signal_cmd(SignalArgs {
            csv,
            settings,
            report: (!no_report).then_some(report),
            date,
            json,
            history,
        }),
        Commands::Check { ticker, state_dir } => run_check(&ticker, state_dir),
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn run_fetch(
    symbols: &str,
    start: Option<&str>,
    end: Option<&str>,
    raw_dir: PathBuf,
) -> Result<()> {
    let symbols = parse_symbol_list(symbols);
    if symbols.is_empty() {
        bail!("no symbols provided");
    }
    let start = start
        .map(parse_date)
        .transpose()
        .context("invalid --start")?;
    let end = end
        .map(parse_date)
        .transpose()
        .context("invalid --end")?
        .unwrap_or_else(|| Utc::now().date_naive());

    let credentials = MassiveCredentials::from_env().context("loading Massive credentials")?;
    let breaker = Arc::new(CircuitBreaker::default_provider());
    let provider = MassiveProvider::new(credentials, breaker)?;
    info!(symbols = symbols.len(), ?start, %end, raw_dir = %raw_dir.display(), "fetch starting");

    let summary = fetch_symbols(
        &provider,
        &raw_dir,
        &symbols,
        start,
        end,
        &StdoutProgress::new("fetch"),
    );
    exit_on_no_useful_work("fetch", &summary);
    Ok(())
}

fn run_features(
    tickers: &str,
    windows: &str,
    raw_dir: PathBuf,
    processed_dir: PathBuf,
) -> Result<()> {
    let tickers = parse_symbol_list(tickers);
    if tickers.is_empty() {
        bail!("no tickers provided");
    }
    let windows = parse_windows(windows)?;
    let windows = if windows.is_empty() {
        default_windows()
    } else {
        windows
    };
    info!(tickers = tickers.len(), ?windows, "feature build starting");

    let summary = build_feature_files(
        &tickers,
        &windows,
        &raw_dir,
        &processed_dir,
        &StdoutProgress::new("features"),
    )?;
    exit_on_no_useful_work("features", &summary);
    Ok(())
}

struct SignalArgs {
    csv: PathBuf,
    settings: PathBuf,
    report: Option<PathBuf>,
    date: Option<String>,
    json: bool,
    history: Option<PathBuf>,
}

fn run_signal_cmd(args: SignalArgs) -> Result<()> {
    let date: Option<NaiveDate> = args.date.as_deref().map(parse_signal_date).transpose()?;
    let report = args.report.clone();
    let run = run_signal(&SignalOptions {
        csv: args.csv.clone(),
        settings: Some(args.settings),
        date,
        report: args.report,
        history: args.history,
    })
    .with_context(|| format!("signal run on {}", args.csv.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&run.result)?);
    } else {
        println!("{}", console_summary(&run.result, &run.settings.instruments));
        println!("Notes:");
        for note in &run.result.notes {
            println!("{note}");
        }
    }
    if let Some(path) = report {
        eprintln!("[signal] report written to {}", path.display());
    }
    Ok(())
}

fn run_check(ticker: &str, state_dir: PathBuf) -> Result<()> {
    let credentials = MassiveCredentials::from_env().context("loading Massive credentials")?;
    eprintln!(
        "[check] base={} key={}",
        credentials.base_url(),
        credentials.masked_key()
    );
    let provider = MassiveProvider::new(credentials, Arc::new(CircuitBreaker::default_provider()))?;
    let status = provider.probe(ticker);

    fs::create_dir_all(&state_dir)
        .with_context(|| format!("creating {}", state_dir.display()))?;
    let out = state_dir.join("connections.json");
    fs::write(&out, serde_json::to_string_pretty(&status)?)
        .with_context(|| format!("writing {}", out.display()))?;

    match status.status {
        ProbeStatus::Ok => println!(
            "[check] {} ok (HTTP {})",
            status.ticker,
            code_label(status.code)
        ),
        ProbeStatus::Degraded => eprintln!(
            "[check] {} degraded (HTTP {}){}",
            status.ticker,
            code_label(status.code),
            status
                .error
                .as_deref()
                .map(|e| format!(": {e}"))
                .unwrap_or_default()
        ),
    }
    println!("[check] wrote {}", out.display());
    Ok(())
}

fn code_label(code: Option<u16>) -> String {
    code.map(|c| c.to_string()).unwrap_or_else(|| "-".into())
}

/// Per-item failures were already reported by `StdoutProgress`; this is the
/// one closing line for a batch where nothing completed.
fn no_useful_work_message(scope: &str, summary: &BatchSummary) -> Option<String> {
    summary.no_useful_work().then(|| {
        format!(
            "[{scope}] no items completed ({} failed of {})",
            summary.failed, summary.total
        )
    })
}

fn exit_on_no_useful_work(scope: &str, summary: &BatchSummary) {
    if let Some(message) = no_useful_work_message(scope, summary) {
        eprintln!("{message}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed_batch() -> BatchSummary {
        let mut summary = BatchSummary::new(2);
        summary.record_failure("TQQQ", &"history missing");
        summary.record_failure("SQQQ", &"history missing");
        summary
    }

    #[test]
    fn all_failed_batch_gets_one_scoped_line() {
        let message = no_useful_work_message("features", &failed_batch()).unwrap();
        assert_eq!(message, "[features] no items completed (2 failed of 2)");
        assert!(!message.contains("TQQQ") && !message.contains("Error for"));
    }

    #[test]
    fn partial_success_exits_zero() {
        let mut summary = failed_batch();
        summary.failed = 1;
        summary.succeeded = 1;
        assert!(no_useful_work_message("fetch", &summary).is_none());
    }

    #[test]
    fn cli_arguments_parse() {
        let cli = Cli::try_parse_from(["momentic", "check"]).unwrap();
        assert!(matches!(cli.command, Commands::Check { ref ticker, .. } if ticker == "AA"));
        assert_eq!(cli.log_level, "warn");

        let cli = Cli::try_parse_from([
            "momentic", "signal", "--csv", "x.csv", "--no-report", "--log-level", "debug",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "debug");
        assert!(matches!(cli.command, Commands::Signal { no_report: true, .. }));
    }
}

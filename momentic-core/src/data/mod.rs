//! Market data: provider seam, raw history and feature table files, batch download.

pub mod circuit_breaker;
pub mod credentials;
pub mod download;
pub mod feature_csv;
pub mod massive;
pub mod provider;
pub mod raw_csv;

pub use circuit_breaker::{BreakerState, CircuitBreaker};
pub use credentials::{mask_key, MassiveCredentials};
pub use download::{fetch_symbols, parse_symbol_list, raw_path, BatchSummary};
pub use feature_csv::{read_feature_rows, write_feature_rows, FEATURE_HEADER};
pub use massive::{ConnectionStatus, MassiveProvider, ProbeStatus, DEFAULT_PROBE_TICKER};
pub use provider::{
    BatchProgress, DataError, DataProvider, DataSource, FetchResult, SilentProgress,
    StdoutProgress,
};
pub use raw_csv::{
    load_price_series, merge_bars, parse_date, parse_price, price_series, read_raw_bars,
    write_raw_bars, RAW_HEADER,
};

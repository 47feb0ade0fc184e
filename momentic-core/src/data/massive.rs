//! Massive market-data provider.
//!
//! Fetches daily aggregates from the `/v2/aggs` endpoint with retry,
//! exponential backoff and the shared circuit breaker, and probes the
//! reference endpoint for connection checks.

use super::circuit_breaker::CircuitBreaker;
use super::credentials::MassiveCredentials;
use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::Bar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const USER_AGENT: &str = "momentic/0.0.1";
pub const DEFAULT_PROBE_TICKER: &str = "AA";

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
const PROBE_TIMEOUT: Duration = Duration::from_secs(6);

/// `/v2/aggs` response body. Only `results` matters.
#[derive(Debug, Deserialize)]
struct AggResponse {
    #[serde(default)]
    results: Option<Vec<AggBar>>,
}

#[derive(Debug, Deserialize)]
struct AggBar {
    /// Bar start, epoch milliseconds (UTC).
    t: Option<i64>,
    c: Option<f64>,
    v: Option<f64>,
    o: Option<f64>,
    h: Option<f64>,
    l: Option<f64>,
}

/// Outcome of a connection probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Ok,
    Degraded,
}

/// Result of probing the reference endpoint, persisted as `connections.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub base_url: String,
    pub ticker: String,
    pub path: String,
    pub ok: bool,
    pub code: Option<u16>,
    pub status: ProbeStatus,
    #[serde(default)]
    pub body: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What the retry loop does with one HTTP status.
#[derive(Debug)]
enum StatusAction {
    Accept,
    /// Counts toward the breaker and tries again.
    Retry(DataError),
    /// 403: opens the breaker immediately.
    Trip,
    Fail(DataError),
}

fn classify_status(
    status: reqwest::StatusCode,
    retry_after: Option<u64>,
    symbol: &str,
    credentials: &MassiveCredentials,
) -> StatusAction {
    use reqwest::StatusCode;

    match status {
        s if s.is_success() => StatusAction::Accept,
        StatusCode::FORBIDDEN => StatusAction::Trip,
        StatusCode::TOO_MANY_REQUESTS => StatusAction::Retry(DataError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(60),
        }),
        StatusCode::UNAUTHORIZED => StatusAction::Fail(DataError::AuthenticationRequired(
            format!("Massive rejected API key {}", credentials.masked_key()),
        )),
        StatusCode::NOT_FOUND => StatusAction::Fail(DataError::SymbolNotFound {
            symbol: symbol.to_uppercase(),
        }),
        s => StatusAction::Retry(DataError::Other(format!(
            "Massive returned HTTP {} for {symbol}",
            s.as_u16()
        ))),
    }
}

pub struct MassiveProvider {
    client: reqwest::blocking::Client,
    credentials: MassiveCredentials,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl MassiveProvider {
    pub fn new(
        credentials: MassiveCredentials,
        circuit_breaker: Arc<CircuitBreaker>,
    ) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            credentials,
            circuit_breaker,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    pub fn with_retry_policy(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.base_delay = base_delay;
        self
    }

    /// Aggregate path for a symbol and inclusive date range, without the key.
    pub fn aggregates_path(symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "/v2/aggs/ticker/{}/range/1/day/{start}/{end}?adjusted=true&sort=asc&limit=50000",
            symbol.to_uppercase()
        )
    }

    pub fn probe_path(ticker: &str) -> String {
        format!("/v3/reference/tickers?ticker={ticker}&limit=1")
    }

    fn url_with_key(&self, path: &str) -> String {
        let sep = if path.contains('?') { '&' } else { '?' };
        format!(
            "{}{path}{sep}apiKey={}",
            self.credentials.base_url(),
            self.credentials.api_key()
        )
    }

    /// Convert an aggregates body into bars. Entries without a timestamp or close are dropped.
    fn parse_response(
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        resp: AggResponse,
    ) -> Result<Vec<Bar>, DataError> {
        let symbol = symbol.to_uppercase();
        let mut bars = Vec::new();

        for entry in resp.results.unwrap_or_default() {
            let (Some(ts), Some(close)) = (entry.t, entry.c) else {
                warn!(%symbol, "dropping aggregate without timestamp or close");
                continue;
            };
            let date = chrono::DateTime::from_timestamp_millis(ts)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;
            bars.push(Bar {
                symbol: symbol.clone(),
                date,
                close,
                volume: entry.v,
                open: entry.o,
                high: entry.h,
                low: entry.l,
            });
        }

        if bars.is_empty() {
            return Err(DataError::EmptyResponse { symbol, start, end });
        }
        Ok(bars)
    }

    fn fetch_with_retry(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, DataError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(DataError::CircuitBreakerTripped);
        }

        let url = self.url_with_key(&Self::aggregates_path(symbol, start, end));
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                debug!(symbol, attempt, ?delay, "retrying");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            let request = self.client.get(&url).header("Accept", "application/json");
            let resp = match request.send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    self.circuit_breaker.record_failure();
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            match classify_status(resp.status(), retry_after, symbol, &self.credentials) {
                StatusAction::Accept => {}
                StatusAction::Trip => {
                    self.circuit_breaker.trip();
                    return Err(DataError::CircuitBreakerTripped);
                }
                StatusAction::Retry(err) => {
                    self.circuit_breaker.record_failure();
                    last_error = Some(err);
                    continue;
                }
                StatusAction::Fail(err) => return Err(err),
            }

            let body: AggResponse = resp.json().map_err(|e| {
                DataError::ResponseFormatChanged(format!(
                    "failed to parse response for {symbol}: {e}"
                ))
            })?;
            let bars = Self::parse_response(symbol, start, end, body)?;
            self.circuit_breaker.record_success();
            return Ok(bars);
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }

    /// Hit the reference endpoint once. Transport failures become a degraded status.
    pub fn probe(&self, ticker: &str) -> ConnectionStatus {
        let ticker = ticker.trim().to_uppercase();
        let path = Self::probe_path(&ticker);
        let url = self.url_with_key(&path);

        let (code, body, error) = match self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .timeout(PROBE_TIMEOUT)
            .send()
        {
            Ok(resp) => {
                let code = resp.status().as_u16();
                let body = resp
                    .text()
                    .ok()
                    .and_then(|text| serde_json::from_str(&text).ok())
                    .unwrap_or_else(|| serde_json::json!({}));
                (Some(code), body, None)
            }
            Err(e) => (None, serde_json::json!({}), Some(e.to_string())),
        };

        let ok = code.is_some_and(|c| c < 400);
        ConnectionStatus {
            base_url: self.credentials.base_url().to_string(),
            ticker,
            path,
            ok,
            code,
            status: if ok {
                ProbeStatus::Ok
            } else {
                ProbeStatus::Degraded
            },
            body,
            error,
        }
    }
}

impl DataProvider for MassiveProvider {
    fn name(&self) -> &str {
        "massive"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let bars = self.fetch_with_retry(symbol, start, end)?;
        Ok(FetchResult {
            symbol: symbol.to_uppercase(),
            bars,
            source: DataSource::Massive,
        })
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}

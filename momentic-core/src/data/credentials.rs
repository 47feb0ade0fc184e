//! Massive API credentials from the process environment, optionally seeded by `.env`.

use super::provider::DataError;
use std::fmt;
use tracing::debug;

pub const API_KEY_VAR: &str = "MASSIVE_API_KEY";
pub const BASE_URL_VAR: &str = "MASSIVE_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "https://api.massive.com";

/// Base URL and API key. The key is never printed unmasked.
#[derive(Clone, PartialEq, Eq)]
pub struct MassiveCredentials {
    base_url: String,
    api_key: String,
}

impl MassiveCredentials {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, DataError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(DataError::MissingCredential(format!(
                "{API_KEY_VAR} missing in .env or environment"
            )));
        }
        Ok(Self {
            base_url: normalize_base_url(base_url),
            api_key: api_key.to_string(),
        })
    }

    /// Load `.env` (if any) without overriding variables already set, then read the environment.
    pub fn from_env() -> Result<Self, DataError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => debug!(".env not found; using process environment only"),
            Err(e) => return Err(DataError::Other(format!("failed to read .env: {e}"))),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DataError> {
        let base_url = lookup(BASE_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let api_key = lookup(API_KEY_VAR).unwrap_or_default();
        Self::new(&base_url, &api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// `****` followed by the last four characters of the key.
    pub fn masked_key(&self) -> String {
        mask_key(&self.api_key)
    }
}

impl fmt::Debug for MassiveCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MassiveCredentials")
            .field("base_url", &self.base_url)
            .field("api_key", &self.masked_key())
            .finish()
    }
}

pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let tail: String = if chars.len() >= 4 {
        chars[chars.len() - 4..].iter().collect()
    } else {
        String::new()
    };
    format!("****{tail}")
}

fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    with_scheme.trim_end_matches('/').to_string()
}

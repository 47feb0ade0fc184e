//! Decision fingerprinting: deterministic identification of settings and datasets.
//!
//! - `SettingsHash`: BLAKE3 over the canonical JSON of a `Settings`.
//! - `DatasetHash`: BLAKE3 over the dated feature rows a decision saw.
//! - `DecisionRecord`: one line of the JSONL decision history.

use crate::domain::{Feature, FeatureRow, SignalResult};
use crate::settings::Settings;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hash of a settings object after defaults are merged in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SettingsHash(pub String);

impl SettingsHash {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }
}

impl fmt::Display for SettingsHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content hash of the feature rows used for a decision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Struct fields serialize in declaration order, so the JSON is canonical.
pub fn settings_hash(settings: &Settings) -> Result<SettingsHash, serde_json::Error> {
    let json = serde_json::to_vec(settings)?;
    Ok(SettingsHash::from_bytes(&json))
}

/// Order-sensitive: callers pass rows as the engine saw them (oldest first).
pub fn dataset_hash<'a>(rows: impl IntoIterator<Item = &'a FeatureRow>) -> DatasetHash {
    let mut hasher = blake3::Hasher::new();
    for row in rows {
        hasher.update(row.date.to_string().as_bytes());
        hasher.update(&row.close.to_le_bytes());
        for value in [row.ma_50, row.ma_120, row.ma_280] {
            update_optional(&mut hasher, value);
        }
        for feature in Feature::ALL {
            update_optional(&mut hasher, row.value(feature));
            update_optional(&mut hasher, row.complement(feature));
        }
        hasher.update(match row.long_term_down {
            Some(true) => b"1",
            Some(false) => b"0",
            None => b"-",
        });
        hasher.update(b"\n");
    }
    DatasetHash(hasher.finalize().to_hex().to_string())
}

fn update_optional(hasher: &mut blake3::Hasher, value: Option<f64>) {
    match value {
        Some(v) => {
            hasher.update(b"|");
            hasher.update(&v.to_le_bytes());
        }
        None => {
            hasher.update(b"|-");
        }
    }
}

/// One engine run, appended to the decision history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub recorded_at: DateTime<Utc>,
    pub source: String,
    pub settings_hash: SettingsHash,
    pub dataset_hash: DatasetHash,
    pub result: SignalResult,
}

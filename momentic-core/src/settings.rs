//! Strongly typed engine settings.
//!
//! A settings file (TOML, or JSON by `.json` extension) only needs the keys it
//! overrides. The file is merged key-by-key over the built-in defaults, then
//! deserialized with unknown keys rejected at every level, then range-checked.

use crate::domain::{FeatureVector, Regime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    Parse(String),

    #[error("malformed settings: {0}")]
    Malformed(String),

    #[error("invalid setting `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Long/short entry thresholds for one regime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdPair {
    pub long: f64,
    pub short: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryThresholds {
    #[serde(rename = "LOW_VOL")]
    pub low_vol: ThresholdPair,
    #[serde(rename = "HIGH_VOL")]
    pub high_vol: ThresholdPair,
}

impl EntryThresholds {
    pub fn for_regime(&self, regime: Regime) -> ThresholdPair {
        match regime {
            Regime::LowVol => self.low_vol,
            Regime::HighVol => self.high_vol,
        }
    }
}

/// Per-side feature weights. `down` weights apply to the complement features.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Weights {
    pub up: FeatureVector,
    pub down: FeatureVector,
}

/// Display labels for the traded pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Instruments {
    pub long: String,
    pub short: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Annualized volatility the position is sized to.
    pub target_vol: f64,
    /// Realized volatility above this is `HIGH_VOL`.
    pub vol_threshold: f64,
    /// Drawdown magnitude that counts as a stop breach.
    pub max_drawdown_stop: f64,
    /// Dataset positions with no new position after a breach.
    pub cooldown_days: u32,
    pub entry_thresholds: EntryThresholds,
    pub exit_threshold: f64,
    pub weights: Weights,
    pub instruments: Instruments,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_vol: 0.12,
            vol_threshold: 0.22,
            max_drawdown_stop: 0.15,
            cooldown_days: 10,
            entry_thresholds: EntryThresholds {
                low_vol: ThresholdPair {
                    long: 0.60,
                    short: 0.65,
                },
                high_vol: ThresholdPair {
                    long: 0.70,
                    short: 0.75,
                },
            },
            exit_threshold: 0.45,
            weights: Weights {
                up: FeatureVector::new(0.18, 0.57, 0.20, 0.05),
                down: FeatureVector::new(0.12, 0.68, 0.15, 0.05),
            },
            instruments: Instruments {
                long: "TQQQ".into(),
                short: "SQQQ".into(),
            },
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults when no file is given or it does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(p) if p.exists() => Self::from_file(p),
            _ => Ok(Self::default()),
        }
    }

    /// Load from an existing file. `.json` files are parsed as JSON, anything else as TOML.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let parsed: toml::Value =
            toml::from_str(content).map_err(|e| SettingsError::Parse(e.to_string()))?;
        let overrides =
            serde_json::to_value(parsed).map_err(|e| SettingsError::Parse(e.to_string()))?;
        Self::from_overrides(overrides)
    }

    pub fn from_json(content: &str) -> Result<Self, SettingsError> {
        let overrides: Value =
            serde_json::from_str(content).map_err(|e| SettingsError::Parse(e.to_string()))?;
        Self::from_overrides(overrides)
    }

    /// Merge a partial value tree over the defaults, deserialize and validate.
    pub fn from_overrides(overrides: Value) -> Result<Self, SettingsError> {
        let overrides = match overrides {
            Value::Null => Value::Object(Default::default()),
            obj @ Value::Object(_) => obj,
            other => {
                return Err(SettingsError::Malformed(format!(
                    "top level must be a table, got {other}"
                )))
            }
        };
        let mut merged = serde_json::to_value(Self::default())
            .map_err(|e| SettingsError::Malformed(e.to_string()))?;
        deep_merge(&mut merged, overrides);
        let settings: Settings =
            serde_json::from_value(merged).map_err(|e| SettingsError::Malformed(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Range checks; the error names the offending dotted key.
    pub fn validate(&self) -> Result<(), SettingsError> {
        require(self.target_vol.is_finite() && self.target_vol > 0.0, "target_vol", "must be > 0")?;
        require(
            self.vol_threshold.is_finite() && self.vol_threshold >= 0.0,
            "vol_threshold",
            "must be >= 0",
        )?;
        require(
            self.max_drawdown_stop > 0.0 && self.max_drawdown_stop <= 1.0,
            "max_drawdown_stop",
            "must be in (0, 1]",
        )?;
        for (regime, pair) in [
            ("LOW_VOL", self.entry_thresholds.low_vol),
            ("HIGH_VOL", self.entry_thresholds.high_vol),
        ] {
            unit_interval(pair.long, &format!("entry_thresholds.{regime}.long"))?;
            unit_interval(pair.short, &format!("entry_thresholds.{regime}.short"))?;
        }
        unit_interval(self.exit_threshold, "exit_threshold")?;
        for (side, weights) in [("up", &self.weights.up), ("down", &self.weights.down)] {
            for feature in crate::domain::Feature::ALL {
                let w = weights.get(feature);
                require(
                    w.is_finite() && w >= 0.0,
                    &format!("weights.{side}.{feature}"),
                    "must be a finite, non-negative number",
                )?;
            }
        }
        require(!self.instruments.long.trim().is_empty(), "instruments.long", "must not be empty")?;
        require(
            !self.instruments.short.trim().is_empty(),
            "instruments.short",
            "must not be empty",
        )?;
        Ok(())
    }
}

fn require(ok: bool, key: &str, reason: &str) -> Result<(), SettingsError> {
    if ok {
        Ok(())
    } else {
        Err(SettingsError::InvalidValue {
            key: key.to_string(),
            reason: reason.to_string(),
        })
    }
}

fn unit_interval(value: f64, key: &str) -> Result<(), SettingsError> {
    require((0.0..=1.0).contains(&value), key, "must be within [0, 1]")
}

/// Recursive merge: tables merge key-by-key, anything else replaces.
fn deep_merge(base: &mut Value, overrides: Value) {
    let Value::Object(override_map) = overrides else {
        *base = overrides;
        return;
    };
    if let Value::Object(base_map) = base {
        for (key, value) in override_map {
            let slot = base_map.entry(key).or_insert(Value::Null);
            if slot.is_object() && value.is_object() {
                deep_merge(slot, value);
            } else {
                *slot = value;
            }
        }
        return;
    }
    *base = Value::Object(override_map);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Settings::default().validate().unwrap();
    }

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(Settings::from_toml("").unwrap(), Settings::default());
    }

    #[test]
    fn partial_override_keeps_sibling_defaults() {
        let settings = Settings::from_toml(
            r#"
target_vol = 0.10
cooldown_days = 5

[entry_thresholds.HIGH_VOL]
long = 0.72

[weights.down]
momentum_positive_bonus = 0.10
"#,
        )
        .unwrap();

        let defaults = Settings::default();
        assert_eq!(settings.target_vol, 0.10);
        assert_eq!(settings.cooldown_days, 5);
        assert_eq!(settings.entry_thresholds.high_vol.long, 0.72);
        assert_eq!(settings.entry_thresholds.high_vol.short, 0.75);
        assert_eq!(settings.entry_thresholds.low_vol, defaults.entry_thresholds.low_vol);
        assert_eq!(settings.weights.down.momentum_positive_bonus, 0.10);
        assert_eq!(settings.weights.down.logistic_ma_spread_50_280, 0.68);
        assert_eq!(settings.weights.up, defaults.weights.up);
        assert_eq!(settings.vol_threshold, defaults.vol_threshold);
    }

    #[test]
    fn integer_values_are_accepted_for_floats() {
        let settings = Settings::from_toml("target_vol = 1").unwrap();
        assert_eq!(settings.target_vol, 1.0);
    }

    #[test]
    fn unknown_top_level_key_is_rejected() {
        let err = Settings::from_toml("target_volatility = 0.1").unwrap_err();
        assert!(matches!(err, SettingsError::Malformed(ref m) if m.contains("target_volatility")));
    }

    #[test]
    fn unknown_weight_key_is_rejected() {
        let err = Settings::from_toml("[weights.up]\nrsi_14 = 0.2").unwrap_err();
        assert!(matches!(err, SettingsError::Malformed(ref m) if m.contains("rsi_14")));
    }

    #[test]
    fn unknown_regime_is_rejected() {
        let err = Settings::from_toml("[entry_thresholds.MID_VOL]\nlong = 0.5").unwrap_err();
        assert!(matches!(err, SettingsError::Malformed(_)));
    }

    #[test]
    fn out_of_range_threshold_names_the_key() {
        let err = Settings::from_toml("[entry_thresholds.HIGH_VOL]\nshort = 1.5").unwrap_err();
        match err {
            SettingsError::InvalidValue { key, .. } => {
                assert_eq!(key, "entry_thresholds.HIGH_VOL.short")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn negative_weight_names_the_key() {
        let err = Settings::from_toml("[weights.up]\nmomentum_positive_bonus = -0.1").unwrap_err();
        match err {
            SettingsError::InvalidValue { key, .. } => {
                assert_eq!(key, "weights.up.momentum_positive_bonus")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_positive_target_vol_is_rejected() {
        assert!(matches!(
            Settings::from_toml("target_vol = 0.0"),
            Err(SettingsError::InvalidValue { ref key, .. }) if key == "target_vol"
        ));
    }

    #[test]
    fn negative_cooldown_is_malformed() {
        assert!(matches!(
            Settings::from_toml("cooldown_days = -1"),
            Err(SettingsError::Malformed(_))
        ));
    }

    #[test]
    fn json_settings_merge_the_same_way() {
        let settings =
            Settings::from_json(r#"{"exit_threshold": 0.5, "instruments": {"long": "UPRO"}}"#)
                .unwrap();
        assert_eq!(settings.exit_threshold, 0.5);
        assert_eq!(settings.instruments.long, "UPRO");
        assert_eq!(settings.instruments.short, "SQQQ");
    }

    #[test]
    fn json_non_object_is_malformed() {
        assert!(matches!(Settings::from_json("[1, 2]"), Err(SettingsError::Malformed(_))));
    }

    #[test]
    fn syntax_error_is_parse_error() {
        assert!(matches!(Settings::from_toml("target_vol = "), Err(SettingsError::Parse(_))));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = Path::new("/definitely/not/here/settings.toml");
        assert_eq!(Settings::load(Some(path)).unwrap(), Settings::default());
        assert_eq!(Settings::load(None).unwrap(), Settings::default());
    }

    #[test]
    fn file_extension_selects_format() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("settings.toml");
        std::fs::write(&toml_path, "vol_threshold = 0.30\n").unwrap();
        assert_eq!(Settings::from_file(&toml_path).unwrap().vol_threshold, 0.30);

        let json_path = dir.path().join("settings.json");
        std::fs::write(&json_path, r#"{"vol_threshold": 0.25}"#).unwrap();
        assert_eq!(Settings::from_file(&json_path).unwrap().vol_threshold, 0.25);
    }

    #[test]
    fn regime_selects_threshold_pair() {
        let t = Settings::default().entry_thresholds;
        assert_eq!(t.for_regime(Regime::LowVol).long, 0.60);
        assert_eq!(t.for_regime(Regime::HighVol).short, 0.75);
    }
}

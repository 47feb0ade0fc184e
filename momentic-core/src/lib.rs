//! Momentic Core: feature engineering, risk metrics and the signal decision engine.
//!
//! This crate contains everything a single decision needs:
//! - Math kernels (moving average, logistic transforms, volatility, drawdown)
//! - Feature builder turning a close series into engineered feature rows
//! - Risk metrics (realized volatility, drawdown stop, cooldown)
//! - Typed settings with defaults, merging and validation
//! - The stateless signal decision engine
//! - Raw history and feature table files, the Massive provider and batch download
//! - Fingerprints for the decision history

pub mod data;
pub mod domain;
pub mod engine;
pub mod features;
pub mod fingerprint;
pub mod indicators;
pub mod risk;
pub mod settings;

pub use engine::{EngineError, SignalEngine};
pub use settings::{Settings, SettingsError};

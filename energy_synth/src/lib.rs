//! # Energy Synth
//!
//! `energy_synth` generates synthetic hourly energy series for testing
//! dashboards and forecast models without a live meter feed.
//!
//! Four signal kinds are supported:
//!
//! - **Load curves**: daily demand bands, weekend reduction, yearly seasonality
//! - **Prices**: time-of-use bands with a weekend discount
//! - **Weather**: seasonal and diurnal temperature with humidity and wind
//! - **Carbon intensity**: fossil ramp-up at peaks, solar dip at midday
//!
//! Every run draws its noise from a `StdRng` seeded by the caller, so equal
//! requests produce equal series.
//!
//! ## Usage Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use energy_synth::{GenerationParameters, SeriesSynthesizer, SignalKind, SynthesisRequest};
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let end = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
//! let params = GenerationParameters::new().with("noiseLevel", 0.0);
//!
//! let request = SynthesisRequest::new(SignalKind::LoadCurve, start, end)
//!     .with_params(params)
//!     .with_seed(7);
//! let points = SeriesSynthesizer::default().synthesize(&request).unwrap();
//! assert_eq!(points.len(), 24);
//! ```

use energy_math::MathError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod dataset;
pub mod params;
pub mod profiles;
pub mod synthesizer;

pub use dataset::{generate_dataset, Dataset, DatasetStats};
pub use params::GenerationParameters;
pub use synthesizer::{SeriesSynthesizer, SynthesisRequest};

/// Errors that can occur while generating synthetic series
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthError {
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown signal kind: {0}")]
    UnknownKind(String),

    #[error(transparent)]
    Math(#[from] MathError),
}

/// Result type for synthesis operations
pub type Result<T> = std::result::Result<T, SynthError>;

/// The signal a synthetic series models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// Electrical demand in MW
    LoadCurve,
    /// Air temperature with humidity and wind speed
    Weather,
    /// Grid carbon intensity in gCO2/kWh
    CarbonIntensity,
    /// Wholesale price in $/MWh
    Prices,
}

impl SignalKind {
    pub const ALL: [SignalKind; 4] = [
        SignalKind::LoadCurve,
        SignalKind::Weather,
        SignalKind::CarbonIntensity,
        SignalKind::Prices,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::LoadCurve => "load_curve",
            SignalKind::Weather => "weather",
            SignalKind::CarbonIntensity => "carbon_intensity",
            SignalKind::Prices => "prices",
        }
    }

    /// Unit tag attached to every point of this kind
    pub fn unit(&self) -> &'static str {
        match self {
            SignalKind::LoadCurve => "MW",
            SignalKind::Weather => "°C",
            SignalKind::CarbonIntensity => "gCO2/kWh",
            SignalKind::Prices => "$/MWh",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalKind {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self> {
        SignalKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| SynthError::UnknownKind(s.to_string()))
    }
}

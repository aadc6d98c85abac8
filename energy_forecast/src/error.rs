//! Error types for the energy_forecast crate

use crate::gateway::GatewayError;
use energy_math::MathError;
use energy_synth::SynthError;
use thiserror::Error;

/// Custom error types for the energy_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Date range inverted or too long
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Fewer observations than the models need
    #[error("Insufficient history: {0}")]
    InsufficientHistory(String),

    /// Statistics requested over zero points
    #[error("Empty series: {0}")]
    EmptySeries(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Failure reported by the historical data store, passed through as is
    #[error("{operation}: {source}")]
    Gateway {
        operation: &'static str,
        #[source]
        source: GatewayError,
    },

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error reading or writing CSV
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error reading or writing JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error loading or validating configuration
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl ForecastError {
    /// Wrap a gateway failure with the operation that hit it
    pub fn gateway(operation: &'static str, source: GatewayError) -> Self {
        ForecastError::Gateway { operation, source }
    }
}

impl From<MathError> for ForecastError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::EmptySeries(msg) => ForecastError::EmptySeries(msg),
            MathError::InsufficientData(msg) => ForecastError::InsufficientHistory(msg),
            MathError::InvalidInput(msg) => ForecastError::InvalidParameter(msg),
        }
    }
}

impl From<SynthError> for ForecastError {
    fn from(err: SynthError) -> Self {
        match err {
            SynthError::InvalidRange(msg) => ForecastError::InvalidRange(msg),
            SynthError::InvalidParameter(msg) => ForecastError::InvalidParameter(msg),
            SynthError::UnknownKind(kind) => {
                ForecastError::InvalidParameter(format!("unknown signal kind '{}'", kind))
            }
            SynthError::Math(err) => err.into(),
        }
    }
}

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::Config(err.to_string())
    }
}

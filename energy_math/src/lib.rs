//! # Energy Math
//!
//! Numeric building blocks shared by the synthesis and forecasting crates.
//! This crate provides descriptive statistics over time-indexed series,
//! calendar field extraction and the smoothing primitives the forecast
//! models are assembled from.

use thiserror::Error;

pub mod calendar;
pub mod series;
pub mod smoothing;
pub mod statistics;

pub use calendar::CalendarFields;
pub use series::TimeSeriesPoint;
pub use statistics::{describe, describe_in, SeriesStatistics};

/// Errors that can occur in series calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Empty series: {0}")]
    EmptySeries(String),

    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for series math operations
pub type Result<T> = std::result::Result<T, MathError>;

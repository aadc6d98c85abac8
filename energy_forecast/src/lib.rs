//! # Energy Forecast
//!
//! Hour-ahead forecasting for load, price and carbon-intensity series,
//! with a persistent forecast log and accuracy tracking.
//!
//! ## Features
//!
//! - Two models: an exponentially weighted recent mean and a moving
//!   average with trend, both optionally scaled by hour-of-day and weekday
//!   profiles
//! - Heuristic confidence scores and bands for every predicted hour
//! - A [`HistoricalDataGateway`] seam for the observation store and forecast log
//! - Forecast history browsing and MAE / RMSE / MAPE evaluation
//! - CSV and JSON export, TOML configuration and the `gridcast` CLI
//!
//! ## Quick Start
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use energy_forecast::{
//!     ForecastRequest, ForecastService, Forecaster, InMemoryGateway, ModelType,
//!     ObservationRow, TargetMetric,
//! };
//! use energy_math::TimeSeriesPoint;
//!
//! let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
//! let rows = (0..48)
//!     .map(|h| {
//!         let point = TimeSeriesPoint::new(start + Duration::hours(h), 100.0, "MW")
//!             .with_location("plant-a");
//!         ObservationRow::new(TargetMetric::Load, point)
//!     })
//!     .collect();
//!
//! let gateway = InMemoryGateway::with_observations(rows);
//! let service = ForecastService::new(gateway, Forecaster::default());
//! let request = ForecastRequest::new(6, TargetMetric::Load)
//!     .with_location("plant-a")
//!     .with_model(ModelType::Hybrid);
//!
//! let run = service
//!     .generate_forecast_at(&request, start + Duration::hours(48))
//!     .unwrap();
//! assert_eq!(run.forecasts.len(), 6);
//! assert_eq!(service.latest_forecasts().unwrap().len(), 6);
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod forecaster;
pub mod gateway;
pub mod history;
pub mod memory;
pub mod metrics;
pub mod models;

// Re-export commonly used types
pub use crate::config::GridcastConfig;
pub use crate::data::DataLoader;
pub use crate::error::{ForecastError, Result};
pub use crate::forecaster::{
    confidence_band, ForecastMetadata, ForecastPoint, ForecastRequest, ForecastRun,
    ForecastService, ForecastType, Forecaster, TargetMetric,
};
pub use crate::gateway::{
    ForecastFilter, GatewayError, HistoricalDataGateway, ObservationFilter, ObservationRow, Query,
    SortKey, SortOrder,
};
pub use crate::history::{forecast_history, latest_forecasts, HistoryQuery};
pub use crate::memory::InMemoryGateway;
pub use crate::metrics::{evaluate, evaluate_at, ForecastMatch, PerformanceReport};
pub use crate::models::{FeatureFlags, ForecastModel, ModelType};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

//! # Gridcast
//!
//! `gridcast_workspace` ties the gridcast crates together:
//!
//! - [`math`]: descriptive statistics, calendar fields and smoothing
//! - [`synth`]: seeded synthetic load, price, weather and carbon series
//! - [`forecast`]: forecasting, forecast history and accuracy evaluation
//!
//! ## Example
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use gridcast_workspace::forecast::{ForecastRequest, Forecaster, TargetMetric};
//! use gridcast_workspace::synth::{SeriesSynthesizer, SignalKind, SynthesisRequest};
//!
//! let start = Utc.with_ymd_and_hms(2024, 5, 6, 0, 0, 0).unwrap();
//! let now = start + Duration::days(3);
//! let history = SeriesSynthesizer::default()
//!     .synthesize(&SynthesisRequest::new(SignalKind::Prices, start, now).with_seed(1))
//!     .unwrap();
//!
//! let run = Forecaster::default()
//!     .forecast(&history, &ForecastRequest::new(6, TargetMetric::Price), now)
//!     .unwrap();
//! assert_eq!(run.forecasts.len(), 6);
//! ```

pub use energy_forecast as forecast;
pub use energy_math as math;
pub use energy_synth as synth;

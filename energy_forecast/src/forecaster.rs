//! Hour-ahead forecasting over stored observations
//!
//! [`Forecaster`] is pure: given a history and a clock reading it produces a
//! [`ForecastRun`]. [`ForecastService`] wires it to a
//! [`HistoricalDataGateway`], fetching the history and persisting the batch.

use crate::error::{ForecastError, Result};
use crate::gateway::{
    ForecastFilter, HistoricalDataGateway, ObservationFilter, Query, SortKey, SortOrder,
};
use crate::history::{self, HistoryQuery};
use crate::metrics::{self, PerformanceReport};
use crate::models::{model_for, FeatureFlags, ForecastContext, ModelType};
use chrono::{DateTime, Duration, FixedOffset, Offset, Utc};
use energy_math::{describe_in, series, CalendarFields, SeriesStatistics, TimeSeriesPoint};
use energy_synth::SignalKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

pub const DEFAULT_MIN_HISTORY: usize = 24;
pub const DEFAULT_MAX_HORIZON: u32 = 24;
pub const DEFAULT_SHORT_TERM_MAX_HORIZON: u32 = 6;
/// One week of hourly observations
pub const DEFAULT_HISTORY_WINDOW: usize = 168;
pub const DEFAULT_LOOKBACK_LIMIT: usize = 200;
/// Location used when a request names none
pub const DEFAULT_LOCATION: &str = "default";

/// Metric a forecast predicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetMetric {
    Load,
    Price,
    Carbon,
}

impl TargetMetric {
    pub const ALL: [TargetMetric; 3] = [
        TargetMetric::Load,
        TargetMetric::Price,
        TargetMetric::Carbon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetMetric::Load => "load",
            TargetMetric::Price => "price",
            TargetMetric::Carbon => "carbon",
        }
    }

    /// Synthetic signal that produces observations of this metric
    pub fn signal_kind(&self) -> SignalKind {
        match self {
            TargetMetric::Load => SignalKind::LoadCurve,
            TargetMetric::Price => SignalKind::Prices,
            TargetMetric::Carbon => SignalKind::CarbonIntensity,
        }
    }

    pub fn unit(&self) -> &'static str {
        self.signal_kind().unit()
    }
}

impl fmt::Display for TargetMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetMetric {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        TargetMetric::ALL
            .into_iter()
            .find(|metric| metric.as_str() == s)
            .ok_or_else(|| {
                ForecastError::InvalidParameter(format!(
                    "unknown target metric '{}', expected load, price or carbon",
                    s
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastType {
    ShortTerm,
    LongTerm,
}

impl ForecastType {
    /// Short term when the requested horizon is at most `short_term_max`
    pub fn for_horizon(horizon: u32, short_term_max: u32) -> Self {
        if horizon <= short_term_max {
            ForecastType::ShortTerm
        } else {
            ForecastType::LongTerm
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastType::ShortTerm => "short_term",
            ForecastType::LongTerm => "long_term",
        }
    }
}

impl fmt::Display for ForecastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ForecastType {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "short_term" => Ok(ForecastType::ShortTerm),
            "long_term" => Ok(ForecastType::LongTerm),
            other => Err(ForecastError::InvalidParameter(format!(
                "unknown forecast type '{}', expected short_term or long_term",
                other
            ))),
        }
    }
}

/// One predicted hour, as stored in the forecast log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub target_timestamp: DateTime<Utc>,
    pub predicted_value: f64,
    pub confidence_score: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub forecast_type: ForecastType,
    pub model_version: String,
    /// Shared by every point of one run
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
    pub target_metric: TargetMetric,
}

/// Symmetric band `predicted ± predicted·(1 − confidence)·2`
///
/// A heuristic width, not a calibrated interval. Below a confidence of 0.5
/// the lower bound goes negative.
pub fn confidence_band(predicted: f64, confidence: f64) -> (f64, f64) {
    let half_width = predicted * (1.0 - confidence) * 2.0;
    (predicted - half_width, predicted + half_width)
}

/// Parameters of one forecast run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    /// Number of hourly steps
    pub horizon: u32,
    pub target_metric: TargetMetric,
    pub location: Option<String>,
    #[serde(default)]
    pub features: FeatureFlags,
    #[serde(default)]
    pub model: ModelType,
}

impl ForecastRequest {
    pub fn new(horizon: u32, target_metric: TargetMetric) -> Self {
        Self {
            horizon,
            target_metric,
            location: None,
            features: FeatureFlags::default(),
            model: ModelType::default(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_model(mut self, model: ModelType) -> Self {
        self.model = model;
        self
    }

    pub fn with_features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    /// Location the history is read for
    pub fn resolved_location(&self) -> &str {
        self.location.as_deref().unwrap_or(DEFAULT_LOCATION)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastMetadata {
    pub horizon: u32,
    pub target_metric: TargetMetric,
    pub location: String,
    pub model: ModelType,
    pub model_version: String,
    pub features: FeatureFlags,
    /// Summary of the history the run was computed from
    pub statistics: SeriesStatistics,
    pub history_points: usize,
    pub created_at: DateTime<Utc>,
}

/// Forecast points together with how they were produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRun {
    pub forecasts: Vec<ForecastPoint>,
    pub metadata: ForecastMetadata,
}

/// Computes forecasts from an in-memory history
#[derive(Debug, Clone)]
pub struct Forecaster {
    zone: FixedOffset,
    min_history: usize,
    max_horizon: u32,
    short_term_max_horizon: u32,
}

impl Default for Forecaster {
    fn default() -> Self {
        Self {
            zone: Utc.fix(),
            min_history: DEFAULT_MIN_HISTORY,
            max_horizon: DEFAULT_MAX_HORIZON,
            short_term_max_horizon: DEFAULT_SHORT_TERM_MAX_HORIZON,
        }
    }
}

impl Forecaster {
    /// Forecaster reading calendar fields at a fixed UTC offset
    pub fn new(zone: FixedOffset) -> Self {
        Self {
            zone,
            ..Self::default()
        }
    }

    pub fn with_min_history(mut self, min_history: usize) -> Self {
        self.min_history = min_history;
        self
    }

    pub fn with_max_horizon(mut self, max_horizon: u32) -> Self {
        self.max_horizon = max_horizon;
        self
    }

    pub fn with_short_term_max_horizon(mut self, horizon: u32) -> Self {
        self.short_term_max_horizon = horizon;
        self
    }

    pub fn zone(&self) -> FixedOffset {
        self.zone
    }

    /// Reject horizons outside `1..=max_horizon`
    pub fn validate_request(&self, request: &ForecastRequest) -> Result<()> {
        if request.horizon < 1 || request.horizon > self.max_horizon {
            return Err(ForecastError::InvalidParameter(format!(
                "forecast: horizon must be between 1 and {} hours, got {}",
                self.max_horizon, request.horizon
            )));
        }
        Ok(())
    }

    /// Forecast `request.horizon` hours past `now`
    ///
    /// `historical` must be ordered oldest first. Every point of the run
    /// carries `now` as its `created_at`.
    pub fn forecast(
        &self,
        historical: &[TimeSeriesPoint],
        request: &ForecastRequest,
        now: DateTime<Utc>,
    ) -> Result<ForecastRun> {
        self.validate_request(request)?;

        if historical.len() < self.min_history {
            return Err(ForecastError::InsufficientHistory(format!(
                "forecast: need at least {} historical points, got {}",
                self.min_history,
                historical.len()
            )));
        }

        let statistics = describe_in(historical, &self.zone)?;
        if statistics.std_dev == 0.0 {
            warn!(
                points = historical.len(),
                "flat history, confidence pinned to the model floor"
            );
        }

        let values = series::values(historical);
        let context = ForecastContext {
            values: &values,
            statistics: &statistics,
            features: request.features,
        };

        let model = model_for(request.model);
        let model_version = model.model_type().version();
        let forecast_type = ForecastType::for_horizon(request.horizon, self.short_term_max_horizon);
        let location = request.resolved_location().to_string();

        let mut forecasts = Vec::with_capacity(request.horizon as usize);
        for step in 1..=request.horizon {
            let target_timestamp = now
                .checked_add_signed(Duration::hours(i64::from(step)))
                .ok_or_else(|| {
                    ForecastError::InvalidParameter(format!(
                        "forecast: step {} past {} is out of range",
                        step, now
                    ))
                })?;
            let target = CalendarFields::at(&target_timestamp, &self.zone);
            let prediction = model.predict(&context, &target)?;
            let (lower_bound, upper_bound) =
                confidence_band(prediction.value, prediction.confidence);

            forecasts.push(ForecastPoint {
                target_timestamp,
                predicted_value: prediction.value,
                confidence_score: prediction.confidence,
                lower_bound,
                upper_bound,
                forecast_type,
                model_version: model_version.clone(),
                created_at: now,
                location: Some(location.clone()),
                target_metric: request.target_metric,
            });
        }

        debug!(
            model = %request.model,
            horizon = request.horizon,
            history = historical.len(),
            "computed forecast"
        );

        Ok(ForecastRun {
            forecasts,
            metadata: ForecastMetadata {
                horizon: request.horizon,
                target_metric: request.target_metric,
                location,
                model: request.model,
                model_version,
                features: request.features,
                statistics,
                history_points: historical.len(),
                created_at: now,
            },
        })
    }
}

/// Forecaster bound to a store
#[derive(Debug)]
pub struct ForecastService<G> {
    gateway: G,
    forecaster: Forecaster,
    history_window: usize,
    lookback_limit: usize,
}

impl<G: HistoricalDataGateway> ForecastService<G> {
    pub fn new(gateway: G, forecaster: Forecaster) -> Self {
        Self {
            gateway,
            forecaster,
            history_window: DEFAULT_HISTORY_WINDOW,
            lookback_limit: DEFAULT_LOOKBACK_LIMIT,
        }
    }

    /// Number of most recent observations fetched per run
    pub fn with_history_window(mut self, rows: usize) -> Self {
        self.history_window = rows;
        self
    }

    /// Number of past forecasts scored by [`Self::forecast_performance`]
    pub fn with_lookback_limit(mut self, rows: usize) -> Self {
        self.lookback_limit = rows;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn forecaster(&self) -> &Forecaster {
        &self.forecaster
    }

    pub fn into_gateway(self) -> G {
        self.gateway
    }

    pub fn generate_forecast(&self, request: &ForecastRequest) -> Result<ForecastRun> {
        self.generate_forecast_at(request, Utc::now())
    }

    /// Fetch history, forecast from `now`, and persist the batch
    ///
    /// The batch is written with a single bulk append; a failed write is
    /// reported and the computed run is dropped.
    pub fn generate_forecast_at(
        &self,
        request: &ForecastRequest,
        now: DateTime<Utc>,
    ) -> Result<ForecastRun> {
        self.forecaster.validate_request(request)?;

        let query = Query::new(ObservationFilter {
            location: Some(request.resolved_location().to_string()),
            metric: Some(request.target_metric),
            ..ObservationFilter::default()
        })
        .sort_by(SortKey::Timestamp, SortOrder::Descending)
        .limit(self.history_window);

        let rows = self
            .gateway
            .query_observations(&query)
            .map_err(|e| ForecastError::gateway("forecast", e))?;
        let historical: Vec<TimeSeriesPoint> =
            rows.into_iter().rev().map(|row| row.point).collect();

        let run = self.forecaster.forecast(&historical, request, now)?;

        self.gateway
            .append_forecasts(&run.forecasts)
            .map_err(|e| ForecastError::gateway("forecast", e))?;

        info!(
            location = %run.metadata.location,
            metric = %request.target_metric,
            model = %request.model,
            points = run.forecasts.len(),
            "stored forecast batch"
        );
        Ok(run)
    }

    /// Stored forecasts matching `query`, newest batch first
    pub fn forecast_history(&self, query: &HistoryQuery) -> Result<Vec<ForecastPoint>> {
        history::forecast_history(&self.gateway, query)
    }

    /// The most recently created batch, ordered by target time
    pub fn latest_forecasts(&self) -> Result<Vec<ForecastPoint>> {
        history::latest_forecasts(&self.gateway)
    }

    pub fn forecast_performance(&self) -> Result<PerformanceReport> {
        self.forecast_performance_at(Utc::now())
    }

    /// Score the latest past forecasts against realized observations
    ///
    /// Forecasts are matched only with observations of the same metric and
    /// location.
    pub fn forecast_performance_at(&self, now: DateTime<Utc>) -> Result<PerformanceReport> {
        let query = Query::new(ForecastFilter {
            target_before: Some(now),
            ..ForecastFilter::default()
        })
        .sort_by(SortKey::CreatedAt, SortOrder::Descending)
        .limit(self.lookback_limit);

        let log = self
            .gateway
            .query_forecasts(&query)
            .map_err(|e| ForecastError::gateway("forecast performance", e))?;
        if log.is_empty() {
            return Ok(PerformanceReport::default());
        }

        let mut groups: BTreeMap<(TargetMetric, Option<String>), Vec<&ForecastPoint>> =
            BTreeMap::new();
        for forecast in &log {
            groups
                .entry((forecast.target_metric, forecast.location.clone()))
                .or_default()
                .push(forecast);
        }

        let mut matches = Vec::new();
        for ((metric, location), forecasts) in groups {
            let (first, last) = target_span(&forecasts);
            let realized_query = Query::new(ObservationFilter {
                location,
                metric: Some(metric),
                from: Some(metrics::truncate_to_hour(first)),
                until: metrics::truncate_to_hour(last).checked_add_signed(Duration::hours(1)),
            });
            let realized: Vec<TimeSeriesPoint> = self
                .gateway
                .query_observations(&realized_query)
                .map_err(|e| ForecastError::gateway("forecast performance", e))?
                .into_iter()
                .map(|row| row.point)
                .collect();

            matches.extend(metrics::match_forecasts(forecasts, &realized, now));
        }

        Ok(PerformanceReport::from_matches(log.len(), matches))
    }
}

fn target_span(forecasts: &[&ForecastPoint]) -> (DateTime<Utc>, DateTime<Utc>) {
    let mut first = forecasts[0].target_timestamp;
    let mut last = first;
    for forecast in forecasts {
        first = first.min(forecast.target_timestamp);
        last = last.max(forecast.target_timestamp);
    }
    (first, last)
}

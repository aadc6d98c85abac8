//! Boundary to the store of observations and forecasts
//!
//! The forecaster and the performance evaluator never talk to a database
//! directly. They receive a [`HistoricalDataGateway`] and issue filtered,
//! ordered, optionally limited queries plus appends through it.

use crate::forecaster::{ForecastPoint, ForecastType, TargetMetric};
use chrono::{DateTime, Utc};
use energy_math::TimeSeriesPoint;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;

/// Failures reported by a gateway implementation
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    #[error("query failed: {0}")]
    Query(String),

    #[error("write failed: {0}")]
    Write(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result of a gateway call
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Field a query is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Observation timestamp; forecasts fall back to their target time
    #[default]
    Timestamp,
    CreatedAt,
    TargetTimestamp,
}

/// A filter with ordering and an optional row limit
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query<F> {
    pub filter: F,
    pub sort_key: SortKey,
    pub order: SortOrder,
    pub limit: Option<usize>,
}

impl<F> Query<F> {
    pub fn new(filter: F) -> Self {
        Self {
            filter,
            sort_key: SortKey::default(),
            order: SortOrder::default(),
            limit: None,
        }
    }

    pub fn sort_by(mut self, key: SortKey, order: SortOrder) -> Self {
        self.sort_key = key;
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One stored observation of a metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRow {
    pub metric: TargetMetric,
    pub point: TimeSeriesPoint,
}

impl ObservationRow {
    pub fn new(metric: TargetMetric, point: TimeSeriesPoint) -> Self {
        Self { metric, point }
    }
}

/// Observation filter; unset fields match everything
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObservationFilter {
    pub location: Option<String>,
    pub metric: Option<TargetMetric>,
    /// Inclusive lower bound on the timestamp
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on the timestamp
    pub until: Option<DateTime<Utc>>,
}

impl ObservationFilter {
    pub fn matches(&self, row: &ObservationRow) -> bool {
        if let Some(location) = &self.location {
            if row.point.location.as_ref() != Some(location) {
                return false;
            }
        }
        if let Some(metric) = self.metric {
            if row.metric != metric {
                return false;
            }
        }
        if let Some(from) = self.from {
            if row.point.timestamp < from {
                return false;
            }
        }
        if let Some(until) = self.until {
            if row.point.timestamp >= until {
                return false;
            }
        }
        true
    }
}

/// Forecast log filter; unset fields match everything
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForecastFilter {
    pub location: Option<String>,
    pub target_metric: Option<TargetMetric>,
    /// Inclusive lower bound on `created_at`
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`
    pub created_until: Option<DateTime<Utc>>,
    /// Exact `created_at`, selecting one batch
    pub created_at: Option<DateTime<Utc>>,
    /// Exclusive upper bound on the target time
    pub target_before: Option<DateTime<Utc>>,
    pub forecast_type: Option<ForecastType>,
}

impl ForecastFilter {
    pub fn matches(&self, forecast: &ForecastPoint) -> bool {
        if let Some(location) = &self.location {
            if forecast.location.as_ref() != Some(location) {
                return false;
            }
        }
        if let Some(metric) = self.target_metric {
            if forecast.target_metric != metric {
                return false;
            }
        }
        if let Some(from) = self.created_from {
            if forecast.created_at < from {
                return false;
            }
        }
        if let Some(until) = self.created_until {
            if forecast.created_at > until {
                return false;
            }
        }
        if let Some(created_at) = self.created_at {
            if forecast.created_at != created_at {
                return false;
            }
        }
        if let Some(before) = self.target_before {
            if forecast.target_timestamp >= before {
                return false;
            }
        }
        if let Some(forecast_type) = self.forecast_type {
            if forecast.forecast_type != forecast_type {
                return false;
            }
        }
        true
    }
}

/// Store of observations and the forecast log
///
/// Methods take `&self`; implementations handle their own synchronisation.
pub trait HistoricalDataGateway {
    fn query_observations(
        &self,
        query: &Query<ObservationFilter>,
    ) -> GatewayResult<Vec<ObservationRow>>;

    fn query_forecasts(&self, query: &Query<ForecastFilter>) -> GatewayResult<Vec<ForecastPoint>>;

    fn append_forecast(&self, forecast: &ForecastPoint) -> GatewayResult<()>;

    /// Persist a whole batch
    ///
    /// The default writes one row at a time and stops at the first failure,
    /// so earlier rows stay written. Stores that can write atomically should
    /// override it.
    fn append_forecasts(&self, forecasts: &[ForecastPoint]) -> GatewayResult<()> {
        for forecast in forecasts {
            self.append_forecast(forecast)?;
        }
        Ok(())
    }

    fn append_observations(&self, rows: &[ObservationRow]) -> GatewayResult<()>;
}

impl<G: HistoricalDataGateway + ?Sized> HistoricalDataGateway for &G {
    fn query_observations(
        &self,
        query: &Query<ObservationFilter>,
    ) -> GatewayResult<Vec<ObservationRow>> {
        (**self).query_observations(query)
    }

    fn query_forecasts(&self, query: &Query<ForecastFilter>) -> GatewayResult<Vec<ForecastPoint>> {
        (**self).query_forecasts(query)
    }

    fn append_forecast(&self, forecast: &ForecastPoint) -> GatewayResult<()> {
        (**self).append_forecast(forecast)
    }

    fn append_forecasts(&self, forecasts: &[ForecastPoint]) -> GatewayResult<()> {
        (**self).append_forecasts(forecasts)
    }

    fn append_observations(&self, rows: &[ObservationRow]) -> GatewayResult<()> {
        (**self).append_observations(rows)
    }
}

/// Order observations by timestamp
pub fn order_observations(rows: &mut [ObservationRow], order: SortOrder) {
    rows.sort_by(|a, b| directed(a.point.timestamp.cmp(&b.point.timestamp), order));
}

/// Order forecasts by `key`; ties keep insertion order
pub fn order_forecasts(forecasts: &mut [ForecastPoint], key: SortKey, order: SortOrder) {
    forecasts.sort_by(|a, b| {
        let ordering = match key {
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::Timestamp | SortKey::TargetTimestamp => {
                a.target_timestamp.cmp(&b.target_timestamp)
            }
        };
        directed(ordering, order)
    });
}

fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Ascending => ordering,
        SortOrder::Descending => ordering.reverse(),
    }
}

/// Truncate to the query's limit, if any
pub fn apply_limit<T>(rows: &mut Vec<T>, limit: Option<usize>) {
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
}

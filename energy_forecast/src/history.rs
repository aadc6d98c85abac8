//! Browsing the stored forecast log

use crate::error::{ForecastError, Result};
use crate::forecaster::{ForecastPoint, ForecastType};
use crate::gateway::{ForecastFilter, HistoricalDataGateway, Query, SortKey, SortOrder};
use chrono::{DateTime, Utc};
use tracing::debug;

pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Filter for [`forecast_history`]; bounds on `created_at` are inclusive
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryQuery {
    pub created_from: Option<DateTime<Utc>>,
    pub created_until: Option<DateTime<Utc>>,
    /// `None` returns both types
    pub forecast_type: Option<ForecastType>,
    pub limit: usize,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            created_from: None,
            created_until: None,
            forecast_type: None,
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl HistoryQuery {
    pub fn between(mut self, from: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        self.created_from = Some(from);
        self.created_until = Some(until);
        self
    }

    pub fn of_type(mut self, forecast_type: ForecastType) -> Self {
        self.forecast_type = Some(forecast_type);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Stored forecasts matching `query`, newest `created_at` first
pub fn forecast_history<G>(gateway: &G, query: &HistoryQuery) -> Result<Vec<ForecastPoint>>
where
    G: HistoricalDataGateway + ?Sized,
{
    if let (Some(from), Some(until)) = (query.created_from, query.created_until) {
        if from > until {
            return Err(ForecastError::InvalidRange(format!(
                "forecast history: start {} is after end {}",
                from.to_rfc3339(),
                until.to_rfc3339()
            )));
        }
    }

    let filter = ForecastFilter {
        created_from: query.created_from,
        created_until: query.created_until,
        forecast_type: query.forecast_type,
        ..ForecastFilter::default()
    };
    let rows = gateway
        .query_forecasts(
            &Query::new(filter)
                .sort_by(SortKey::CreatedAt, SortOrder::Descending)
                .limit(query.limit),
        )
        .map_err(|e| ForecastError::gateway("forecast history", e))?;

    debug!(rows = rows.len(), "read forecast history");
    Ok(rows)
}

/// Every point of the most recently created batch, by ascending target time
pub fn latest_forecasts<G>(gateway: &G) -> Result<Vec<ForecastPoint>>
where
    G: HistoricalDataGateway + ?Sized,
{
    let newest = gateway
        .query_forecasts(
            &Query::new(ForecastFilter::default())
                .sort_by(SortKey::CreatedAt, SortOrder::Descending)
                .limit(1),
        )
        .map_err(|e| ForecastError::gateway("latest forecasts", e))?;

    let created_at = match newest.first() {
        Some(forecast) => forecast.created_at,
        None => return Ok(Vec::new()),
    };

    gateway
        .query_forecasts(
            &Query::new(ForecastFilter {
                created_at: Some(created_at),
                ..ForecastFilter::default()
            })
            .sort_by(SortKey::TargetTimestamp, SortOrder::Ascending),
        )
        .map_err(|e| ForecastError::gateway("latest forecasts", e))
}

//! Time-indexed observations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single observation of a signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// Instant the value applies to
    pub timestamp: DateTime<Utc>,
    /// Primary value of the signal
    pub value: f64,
    /// Unit of `value` (MW, $/MWh, gCO2/kWh, °C)
    pub unit: String,
    /// Site or region the value belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Additional values measured at the same instant
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub secondary_metrics: BTreeMap<String, f64>,
}

impl TimeSeriesPoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            timestamp,
            value,
            unit: unit.into(),
            location: None,
            secondary_metrics: BTreeMap::new(),
        }
    }

    /// Tag the point with a site or region id
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Attach a secondary metric
    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.secondary_metrics.insert(name.into(), value);
        self
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.secondary_metrics.get(name).copied()
    }
}

/// Primary values of a series, in order
pub fn values(points: &[TimeSeriesPoint]) -> Vec<f64> {
    points.iter().map(|p| p.value).collect()
}

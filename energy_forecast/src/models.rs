//! Forecasting models for hourly energy series

use crate::error::{ForecastError, Result};
use energy_math::{CalendarFields, SeriesStatistics};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod hybrid;
pub mod weighted_recent;

pub use hybrid::Hybrid;
pub use weighted_recent::WeightedRecent;

/// Available forecasting models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    /// Exponentially weighted mean of the last 48 observations
    WeightedRecent,
    /// 24-point moving average plus trend
    #[default]
    Hybrid,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::WeightedRecent => "weighted_recent",
            ModelType::Hybrid => "hybrid",
        }
    }

    /// Version tag stored on every forecast point
    pub fn version(&self) -> String {
        format!("{}_v1.0", self.as_str())
    }

    /// Lowest confidence the model reports
    pub fn confidence_floor(&self) -> f64 {
        match self {
            ModelType::WeightedRecent => weighted_recent::CONFIDENCE_FLOOR,
            ModelType::Hybrid => hybrid::CONFIDENCE_FLOOR,
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "weighted_recent" => Ok(ModelType::WeightedRecent),
            "hybrid" => Ok(ModelType::Hybrid),
            other => Err(ForecastError::InvalidParameter(format!(
                "unknown model '{}', expected weighted_recent or hybrid",
                other
            ))),
        }
    }
}

/// Optional inputs a forecast may use
///
/// Only `time_features` changes the arithmetic. The other two flags are
/// carried through to the run metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlags {
    pub weather: bool,
    pub historical: bool,
    pub time_features: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            weather: false,
            historical: true,
            time_features: true,
        }
    }
}

/// Value and confidence for one horizon step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepForecast {
    pub value: f64,
    pub confidence: f64,
}

/// What a model sees for every step of a run
#[derive(Debug, Clone, Copy)]
pub struct ForecastContext<'a> {
    /// Observed values, oldest first
    pub values: &'a [f64],
    pub statistics: &'a SeriesStatistics,
    pub features: FeatureFlags,
}

/// Common interface for forecasting models
pub trait ForecastModel {
    fn model_type(&self) -> ModelType;

    /// Predict the value at the calendar position `target`
    fn predict(
        &self,
        context: &ForecastContext<'_>,
        target: &CalendarFields,
    ) -> Result<StepForecast>;
}

/// Model implementation for `model_type`
pub fn model_for(model_type: ModelType) -> Box<dyn ForecastModel> {
    match model_type {
        ModelType::WeightedRecent => Box::new(WeightedRecent),
        ModelType::Hybrid => Box::new(Hybrid),
    }
}

/// Blend of the hour-of-day and weekday factors of `target`
///
/// A missing bucket contributes a factor of 1.0.
pub fn seasonal_factor(
    statistics: &SeriesStatistics,
    target: &CalendarFields,
    hourly_weight: f64,
) -> f64 {
    let hourly = statistics.hourly_factor(target.hour).unwrap_or(1.0);
    let weekday = statistics.weekday_factor(target.weekday).unwrap_or(1.0);
    hourly * hourly_weight + weekday * (1.0 - hourly_weight)
}

/// `max(floor, 1 - volatility / scale)`, or `floor` when `scale` is not positive
pub fn volatility_confidence(volatility: f64, scale: f64, floor: f64) -> f64 {
    if scale <= 0.0 || !scale.is_finite() {
        return floor;
    }
    (1.0 - volatility / scale).max(floor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::BTreeMap;

    fn stats() -> SeriesStatistics {
        SeriesStatistics {
            mean: 100.0,
            std_dev: 10.0,
            min: 80.0,
            max: 120.0,
            count: 48,
            hourly_average: BTreeMap::from([(8, 120.0)]),
            weekday_average: BTreeMap::from([(1, 90.0)]),
        }
    }

    #[test]
    fn test_model_names() {
        assert_eq!(ModelType::Hybrid.version(), "hybrid_v1.0");
        assert_eq!(ModelType::WeightedRecent.version(), "weighted_recent_v1.0");
        assert_eq!("hybrid".parse::<ModelType>().unwrap(), ModelType::Hybrid);
        assert!("LSTM".parse::<ModelType>().is_err());
    }

    #[test]
    fn test_seasonal_factor() {
        let target = CalendarFields {
            hour: 8,
            weekday: 1,
            day_of_year: 10,
        };
        assert_relative_eq!(seasonal_factor(&stats(), &target, 0.7), 1.2 * 0.7 + 0.9 * 0.3);

        let unseen = CalendarFields {
            hour: 3,
            weekday: 5,
            day_of_year: 10,
        };
        assert_relative_eq!(seasonal_factor(&stats(), &unseen, 0.6), 1.0);
    }

    #[test]
    fn test_volatility_confidence() {
        assert_relative_eq!(volatility_confidence(2.0, 10.0, 0.5), 0.8);
        assert_relative_eq!(volatility_confidence(9.0, 10.0, 0.5), 0.5);
        assert_relative_eq!(volatility_confidence(0.0, 0.0, 0.6), 0.6);
        assert_relative_eq!(volatility_confidence(0.0, 10.0, 0.6), 1.0);
    }
}

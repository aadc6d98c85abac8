//! Metrics for evaluating forecast performance

use crate::forecaster::ForecastPoint;
use chrono::{DateTime, Duration, DurationRound, Utc};
use energy_math::TimeSeriesPoint;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// A past forecast paired with what actually happened in its hour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastMatch {
    pub target_timestamp: DateTime<Utc>,
    pub predicted: f64,
    pub actual: f64,
    /// `|predicted − actual|`
    pub error: f64,
    /// `error / actual · 100`, or 0 when `actual <= 0`
    pub percent_error: f64,
}

impl ForecastMatch {
    pub fn new(target_timestamp: DateTime<Utc>, predicted: f64, actual: f64) -> Self {
        let error = (predicted - actual).abs();
        let percent_error = if actual > 0.0 {
            error / actual * 100.0
        } else {
            0.0
        };
        Self {
            target_timestamp,
            predicted,
            actual,
            error,
            percent_error,
        }
    }
}

/// Accuracy of a forecast log against realized values
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// Mean Absolute Percentage Error
    pub mape: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Error
    pub mae: f64,
    /// `max(0, 100 − mape)`
    pub accuracy: f64,
    pub total_forecasts: usize,
    pub forecasts_with_actuals: usize,
    /// The pairs the metrics were computed from
    #[serde(default)]
    pub matches: Vec<ForecastMatch>,
}

impl PerformanceReport {
    /// Aggregate `matches` out of `total_forecasts` scored forecasts
    pub fn from_matches(total_forecasts: usize, matches: Vec<ForecastMatch>) -> Self {
        if matches.is_empty() {
            return Self {
                total_forecasts,
                ..Self::default()
            };
        }

        let mae = matches.iter().map(|m| m.error).mean();
        let rmse = matches.iter().map(|m| m.error * m.error).mean().sqrt();
        let mape = matches.iter().map(|m| m.percent_error).mean();

        Self {
            mape,
            rmse,
            mae,
            accuracy: (100.0 - mape).max(0.0),
            total_forecasts,
            forecasts_with_actuals: matches.len(),
            matches,
        }
    }
}

impl fmt::Display for PerformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MAPE: {:.2}%  RMSE: {:.2}  MAE: {:.2}  Accuracy: {:.2}%  ({} of {} forecasts matched)",
            self.mape,
            self.rmse,
            self.mae,
            self.accuracy,
            self.forecasts_with_actuals,
            self.total_forecasts
        )
    }
}

/// Start of the hour containing `timestamp`
pub fn truncate_to_hour(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    timestamp
        .duration_trunc(Duration::hours(1))
        .unwrap_or(timestamp)
}

/// Hourly mean of realized values, keyed by the start of the hour
fn hourly_actuals(realized: &[TimeSeriesPoint]) -> BTreeMap<DateTime<Utc>, f64> {
    let mut sums: BTreeMap<DateTime<Utc>, (f64, usize)> = BTreeMap::new();
    for point in realized {
        let entry = sums.entry(truncate_to_hour(point.timestamp)).or_insert((0.0, 0));
        entry.0 += point.value;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(hour, (sum, count))| (hour, sum / count as f64))
        .collect()
}

/// Pair each forecast targeted before `now` with the realized value of its hour
pub fn match_forecasts<'a, I>(
    log: I,
    realized: &[TimeSeriesPoint],
    now: DateTime<Utc>,
) -> Vec<ForecastMatch>
where
    I: IntoIterator<Item = &'a ForecastPoint>,
{
    let actuals = hourly_actuals(realized);
    log.into_iter()
        .filter(|forecast| forecast.target_timestamp < now)
        .filter_map(|forecast| {
            actuals
                .get(&truncate_to_hour(forecast.target_timestamp))
                .map(|&actual| {
                    ForecastMatch::new(forecast.target_timestamp, forecast.predicted_value, actual)
                })
        })
        .collect()
}

/// Evaluate a forecast log against realized values as of `now`
///
/// `total_forecasts` is the size of the log; only forecasts whose target is
/// before `now` and whose hour has a realized value are scored.
pub fn evaluate_at(
    log: &[ForecastPoint],
    realized: &[TimeSeriesPoint],
    now: DateTime<Utc>,
) -> PerformanceReport {
    if log.is_empty() {
        return PerformanceReport::default();
    }

    let matches = match_forecasts(log, realized, now);
    if matches.is_empty() {
        warn!(forecasts = log.len(), "no forecast has a realized value yet");
    } else {
        debug!(
            forecasts = log.len(),
            matched = matches.len(),
            "evaluated forecasts"
        );
    }
    PerformanceReport::from_matches(log.len(), matches)
}

/// Evaluate a forecast log against realized values as of the current time
pub fn evaluate(log: &[ForecastPoint], realized: &[TimeSeriesPoint]) -> PerformanceReport {
    evaluate_at(log, realized, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    #[test]
    fn test_truncate_to_hour() {
        let ts = Utc.with_ymd_and_hms(2024, 2, 3, 14, 59, 59).unwrap();
        assert_eq!(
            truncate_to_hour(ts),
            Utc.with_ymd_and_hms(2024, 2, 3, 14, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_percent_error_zero_for_non_positive_actual() {
        let ts = Utc.with_ymd_and_hms(2024, 2, 3, 14, 0, 0).unwrap();
        let m = ForecastMatch::new(ts, 5.0, 0.0);
        assert_eq!(m.error, 5.0);
        assert_eq!(m.percent_error, 0.0);
    }

    #[test]
    fn test_same_hour_actuals_averaged() {
        let hour = Utc.with_ymd_and_hms(2024, 2, 3, 14, 0, 0).unwrap();
        let realized = vec![
            TimeSeriesPoint::new(hour, 90.0, "MW"),
            TimeSeriesPoint::new(hour + Duration::minutes(30), 110.0, "MW"),
        ];
        let actuals = hourly_actuals(&realized);
        assert_eq!(actuals.len(), 1);
        assert_relative_eq!(actuals[&hour], 100.0);
    }

    #[test]
    fn test_display_two_decimals() {
        let report = PerformanceReport {
            mape: 10.0,
            rmse: 10.0,
            mae: 10.0,
            accuracy: 90.0,
            total_forecasts: 1,
            forecasts_with_actuals: 1,
            matches: Vec::new(),
        };
        assert_eq!(
            report.to_string(),
            "MAPE: 10.00%  RMSE: 10.00  MAE: 10.00  Accuracy: 90.00%  (1 of 1 forecasts matched)"
        );
    }
}

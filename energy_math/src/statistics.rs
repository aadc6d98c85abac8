//! Descriptive statistics over time-indexed series
//!
//! Contains:
//! - Mean / population standard deviation / min / max
//! - Hour-of-day and day-of-week bucket averages
//! - Volatility (population standard deviation of a window)

use crate::calendar::CalendarFields;
use crate::series::TimeSeriesPoint;
use crate::{MathError, Result};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Summary of a series, recomputed on every call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStatistics {
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// Number of points summarised
    pub count: usize,
    /// Mean value per local hour of day; only hours present in the input
    pub hourly_average: BTreeMap<u32, f64>,
    /// Mean value per local weekday (0 = Sunday); only weekdays present in the input
    pub weekday_average: BTreeMap<u32, f64>,
}

impl SeriesStatistics {
    /// Ratio of the hour's bucket average to the overall mean
    ///
    /// `None` when the hour never occurred in the input or the mean is zero.
    pub fn hourly_factor(&self, hour: u32) -> Option<f64> {
        self.factor(self.hourly_average.get(&hour))
    }

    /// Ratio of the weekday's bucket average to the overall mean
    pub fn weekday_factor(&self, weekday: u32) -> Option<f64> {
        self.factor(self.weekday_average.get(&weekday))
    }

    fn factor(&self, bucket: Option<&f64>) -> Option<f64> {
        match bucket {
            Some(avg) if self.mean != 0.0 => Some(avg / self.mean),
            _ => None,
        }
    }
}

/// Describe a series using UTC calendar fields for the buckets
pub fn describe(points: &[TimeSeriesPoint]) -> Result<SeriesStatistics> {
    describe_in(points, &Utc)
}

/// Describe a series, bucketing by the calendar fields of `zone`
pub fn describe_in<Tz: TimeZone>(
    points: &[TimeSeriesPoint],
    zone: &Tz,
) -> Result<SeriesStatistics> {
    if points.is_empty() {
        return Err(MathError::EmptySeries(
            "describe: cannot summarise a series with no points".to_string(),
        ));
    }

    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    // Running-mean rounding can land an ulp outside [min, max]
    let raw_mean = values.iter().mean();
    let mean = if min <= max {
        raw_mean.clamp(min, max)
    } else {
        raw_mean
    };
    let std_dev = population_std_dev(&values);

    let mut hourly: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    let mut weekday: BTreeMap<u32, (f64, usize)> = BTreeMap::new();

    for point in points {
        let fields = CalendarFields::at(&point.timestamp, zone);

        let bucket = hourly.entry(fields.hour).or_insert((0.0, 0));
        bucket.0 += point.value;
        bucket.1 += 1;

        let bucket = weekday.entry(fields.weekday).or_insert((0.0, 0));
        bucket.0 += point.value;
        bucket.1 += 1;
    }

    Ok(SeriesStatistics {
        mean,
        std_dev,
        min,
        max,
        count: values.len(),
        hourly_average: bucket_means(hourly),
        weekday_average: bucket_means(weekday),
    })
}

fn bucket_means(buckets: BTreeMap<u32, (f64, usize)>) -> BTreeMap<u32, f64> {
    buckets
        .into_iter()
        .map(|(key, (sum, count))| (key, sum / count as f64))
        .collect()
}

/// Population standard deviation, used as the volatility of a window
///
/// Fewer than two values have no spread and yield 0.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sd = values.iter().population_std_dev();
    if sd.is_finite() {
        sd.max(0.0)
    } else {
        0.0
    }
}

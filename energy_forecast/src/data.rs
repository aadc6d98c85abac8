//! Loading observations and forecasts from files

use crate::error::{ForecastError, Result};
use crate::forecaster::{ForecastPoint, TargetMetric};
use crate::gateway::ObservationRow;
use chrono::{DateTime, Utc};
use energy_math::TimeSeriesPoint;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const TIMESTAMP: &str = "timestamp";
const VALUE: &str = "value";
const UNIT: &str = "unit";
const LOCATION: &str = "location";

/// Data loader for series points and forecast logs
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load series points from a CSV file
    ///
    /// Requires `timestamp` (RFC 3339) and `value` columns. `unit` and
    /// `location` are optional; every other column is read as a numeric
    /// secondary metric, with empty cells skipped.
    pub fn points_from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<TimeSeriesPoint>> {
        let file = File::open(path)?;
        Self::points_from_reader(BufReader::new(file))
    }

    pub fn points_from_reader<R: Read>(reader: R) -> Result<Vec<TimeSeriesPoint>> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers = reader.headers()?.clone();

        let column = |name: &str| headers.iter().position(|h| h == name);
        let timestamp_idx = column(TIMESTAMP).ok_or_else(|| missing_column(TIMESTAMP))?;
        let value_idx = column(VALUE).ok_or_else(|| missing_column(VALUE))?;
        let unit_idx = column(UNIT);
        let location_idx = column(LOCATION);
        let extra: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(_, name)| ![TIMESTAMP, VALUE, UNIT, LOCATION].contains(name))
            .map(|(idx, name)| (idx, name.to_string()))
            .collect();

        let mut points = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            let row = line + 2;
            let field = |idx: usize| record.get(idx).unwrap_or("").trim();

            let timestamp = parse_timestamp(field(timestamp_idx), row)?;
            let value = parse_number(field(value_idx), VALUE, row)?;
            let unit = unit_idx.map(field).unwrap_or("");

            let mut point = TimeSeriesPoint::new(timestamp, value, unit);
            if let Some(location) = location_idx.map(field).filter(|l| !l.is_empty()) {
                point = point.with_location(location);
            }
            for (idx, name) in &extra {
                let raw = field(*idx);
                if !raw.is_empty() {
                    point = point.with_metric(name.clone(), parse_number(raw, name, row)?);
                }
            }
            points.push(point);
        }

        Ok(points)
    }

    /// Load observations of `metric` from a CSV file
    ///
    /// Rows without a location are assigned `default_location`; rows without
    /// a unit take the metric's unit.
    pub fn observations_from_csv<P: AsRef<Path>>(
        path: P,
        metric: TargetMetric,
        default_location: &str,
    ) -> Result<Vec<ObservationRow>> {
        let points = Self::points_from_csv(path)?;
        Ok(points
            .into_iter()
            .map(|mut point| {
                if point.location.is_none() {
                    point.location = Some(default_location.to_string());
                }
                if point.unit.is_empty() {
                    point.unit = metric.unit().to_string();
                }
                ObservationRow::new(metric, point)
            })
            .collect())
    }

    /// Load a forecast log written as a JSON array
    pub fn forecasts_from_json<P: AsRef<Path>>(path: P) -> Result<Vec<ForecastPoint>> {
        Self::json_from_file(path)
    }

    pub fn forecasts_from_reader<R: Read>(reader: R) -> Result<Vec<ForecastPoint>> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Deserialize any JSON document from a file
    pub fn json_from_file<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

fn missing_column(name: &str) -> ForecastError {
    ForecastError::InvalidParameter(format!("load: missing '{}' column", name))
}

fn parse_timestamp(raw: &str, row: usize) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| {
            ForecastError::InvalidParameter(format!(
                "load: row {}: invalid timestamp '{}': {}",
                row, raw, e
            ))
        })
}

fn parse_number(raw: &str, column: &str, row: usize) -> Result<f64> {
    raw.parse::<f64>().map_err(|_| {
        ForecastError::InvalidParameter(format!(
            "load: row {}: column '{}' is not a number: '{}'",
            row, column, raw
        ))
    })
}

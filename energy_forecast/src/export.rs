//! CSV and JSON export of series, forecasts and whole runs
//!
//! CSV output has a header row of field names and quotes every value.
//! Timestamps are written as RFC 3339 UTC with milliseconds.

use crate::error::Result;
use crate::forecaster::ForecastPoint;
use chrono::{DateTime, SecondsFormat, Utc};
use energy_math::TimeSeriesPoint;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const POINT_COLUMNS: [&str; 4] = ["timestamp", "value", "unit", "location"];

const FORECAST_COLUMNS: [&str; 10] = [
    "target_timestamp",
    "predicted_value",
    "confidence_score",
    "lower_bound",
    "upper_bound",
    "forecast_type",
    "model_version",
    "created_at",
    "location",
    "target_metric",
];

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn quoted_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(writer)
}

/// Write series points as CSV
///
/// Secondary metrics become extra columns after the fixed ones, in name
/// order; a point without a metric gets an empty cell.
pub fn write_points_csv<W: Write>(writer: W, points: &[TimeSeriesPoint]) -> Result<()> {
    let metric_names: BTreeSet<&str> = points
        .iter()
        .flat_map(|p| p.secondary_metrics.keys().map(String::as_str))
        .collect();

    let mut csv = quoted_writer(writer);
    csv.write_record(POINT_COLUMNS.iter().copied().chain(metric_names.iter().copied()))?;

    for point in points {
        let mut record = vec![
            format_timestamp(&point.timestamp),
            point.value.to_string(),
            point.unit.clone(),
            point.location.clone().unwrap_or_default(),
        ];
        record.extend(
            metric_names
                .iter()
                .map(|name| point.metric(name).map(|v| v.to_string()).unwrap_or_default()),
        );
        csv.write_record(&record)?;
    }

    csv.flush()?;
    Ok(())
}

/// Write forecast points as CSV
pub fn write_forecasts_csv<W: Write>(writer: W, forecasts: &[ForecastPoint]) -> Result<()> {
    let mut csv = quoted_writer(writer);
    csv.write_record(FORECAST_COLUMNS)?;

    for forecast in forecasts {
        csv.write_record([
            format_timestamp(&forecast.target_timestamp),
            forecast.predicted_value.to_string(),
            forecast.confidence_score.to_string(),
            forecast.lower_bound.to_string(),
            forecast.upper_bound.to_string(),
            forecast.forecast_type.to_string(),
            forecast.model_version.clone(),
            format_timestamp(&forecast.created_at),
            forecast.location.clone().unwrap_or_default(),
            forecast.target_metric.to_string(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

/// Series points as a CSV string
pub fn points_to_csv_string(points: &[TimeSeriesPoint]) -> Result<String> {
    let mut buffer = Vec::new();
    write_points_csv(&mut buffer, points)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Pretty-printed JSON of any serializable value
pub fn write_json<W: Write, T: Serialize + ?Sized>(mut writer: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    Ok(())
}

pub fn save_points_csv<P: AsRef<Path>>(path: P, points: &[TimeSeriesPoint]) -> Result<()> {
    write_points_csv(BufWriter::new(File::create(path)?), points)
}

pub fn save_forecasts_csv<P: AsRef<Path>>(path: P, forecasts: &[ForecastPoint]) -> Result<()> {
    write_forecasts_csv(BufWriter::new(File::create(path)?), forecasts)
}

pub fn save_json<P: AsRef<Path>, T: Serialize + ?Sized>(path: P, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_json(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

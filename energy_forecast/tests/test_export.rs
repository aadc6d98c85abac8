use chrono::{Duration, TimeZone, Utc};
use energy_forecast::export::{
    save_json, save_points_csv, write_forecasts_csv, write_json, write_points_csv,
};
use energy_forecast::{DataLoader, ForecastRequest, Forecaster, TargetMetric};
use energy_math::TimeSeriesPoint;
use energy_synth::{generate_dataset, Dataset, GenerationParameters, SeriesSynthesizer, SignalKind};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[test]
fn test_points_csv_reloads() {
    let start = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
    let dataset = generate_dataset(
        &SeriesSynthesizer::default(),
        SignalKind::Weather,
        start,
        start + Duration::hours(6),
        None,
        GenerationParameters::new(),
        Some(3),
    )
    .unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("weather.csv");
    save_points_csv(&path, &dataset.points).unwrap();

    let reloaded = DataLoader::points_from_csv(&path).unwrap();
    assert_eq!(reloaded.len(), dataset.points.len());
    for (original, loaded) in dataset.points.iter().zip(&reloaded) {
        assert_eq!(loaded.timestamp, original.timestamp);
        assert_eq!(loaded.value, original.value);
        assert_eq!(loaded.unit, "°C");
        assert_eq!(loaded.metric("humidity"), original.metric("humidity"));
    }
}

#[test]
fn test_forecast_csv_header_and_quoting() {
    let start = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
    let history: Vec<_> = (0..24)
        .map(|h| TimeSeriesPoint::new(start + Duration::hours(h), 40.0, "$/MWh"))
        .collect();
    let run = Forecaster::default()
        .forecast(
            &history,
            &ForecastRequest::new(2, TargetMetric::Price).with_location("nl"),
            start + Duration::hours(24),
        )
        .unwrap();

    let mut buffer = Vec::new();
    write_forecasts_csv(&mut buffer, &run.forecasts).unwrap();
    let csv = String::from_utf8(buffer).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        [
            r#""target_timestamp","predicted_value","confidence_score","lower_bound""#,
            r#""upper_bound","forecast_type","model_version","created_at","location""#,
            r#""target_metric""#,
        ]
        .join(",")
    );
    assert!(lines[1].starts_with(r#""2024-07-02T01:00:00.000Z","40","0.6","#));
    assert!(lines[1]
        .ends_with(r#""short_term","hybrid_v1.0","2024-07-02T00:00:00.000Z","nl","price""#));
}

#[test]
fn test_json_dump_round_trip() {
    let start = Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap();
    let dataset = generate_dataset(
        &SeriesSynthesizer::default(),
        SignalKind::LoadCurve,
        start,
        start + Duration::days(1),
        Some("grid-a".to_string()),
        GenerationParameters::new().with("baseLoad", 60.0),
        Some(21),
    )
    .unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("dataset.json");
    save_json(&path, &dataset).unwrap();

    let loaded: Dataset = DataLoader::json_from_file(&path).unwrap();
    assert_eq!(loaded.kind, dataset.kind);
    assert_eq!(loaded.seed, 21);
    assert_eq!(loaded.location.as_deref(), Some("grid-a"));
    assert_eq!(loaded.parameters, dataset.parameters);
    assert_eq!(loaded.points.len(), 24);
    for (original, reloaded) in dataset.points.iter().zip(&loaded.points) {
        assert_eq!(reloaded.timestamp, original.timestamp);
        assert!((reloaded.value - original.value).abs() < 1e-9);
    }
}

#[test]
fn test_write_json_is_pretty() {
    let mut buffer = Vec::new();
    write_json(&mut buffer, &vec![1, 2]).unwrap();
    assert_eq!(String::from_utf8(buffer).unwrap(), "[\n  1,\n  2\n]\n");
}

#[test]
fn test_empty_points_write_header_only() {
    let mut buffer = Vec::new();
    write_points_csv(&mut buffer, &[]).unwrap();
    assert_eq!(
        String::from_utf8(buffer).unwrap(),
        "\"timestamp\",\"value\",\"unit\",\"location\"\n"
    );
}

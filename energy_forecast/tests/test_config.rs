use chrono::Duration;
use energy_forecast::{ForecastError, ForecastRequest, GridcastConfig, ModelType, TargetMetric};
use energy_math::TimeSeriesPoint;
use rstest::rstest;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_config_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[forecast]
min_history = 12
history_window = 48
max_horizon = 12
short_term_max_horizon = 3
default_model = "weighted_recent"

[synthesis]
seed = 99

[calendar]
utc_offset_hours = 2

[logging]
filter = "energy_forecast=debug"
"#
    )
    .unwrap();

    let config = GridcastConfig::from_file(file.path()).unwrap();
    assert_eq!(config.forecast.min_history, 12);
    assert_eq!(config.forecast.default_model, ModelType::WeightedRecent);
    assert_eq!(config.synthesis.seed, Some(99));
    assert_eq!(config.synthesis.max_range_days, 365);
    assert_eq!(config.evaluation.lookback_limit, 200);
    assert_eq!(config.zone().unwrap().local_minus_utc(), 2 * 3600);

    // the configured limits reach the forecaster
    let forecaster = config.forecaster().unwrap();
    let start = chrono::DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let history: Vec<_> = (0..12)
        .map(|h| TimeSeriesPoint::new(start + Duration::hours(h), 5.0, "MW"))
        .collect();

    let run = forecaster
        .forecast(
            &history,
            &ForecastRequest::new(4, TargetMetric::Load),
            start + Duration::hours(12),
        )
        .unwrap();
    assert_eq!(run.forecasts[0].forecast_type.as_str(), "long_term");

    let err = forecaster
        .forecast(&history, &ForecastRequest::new(13, TargetMetric::Load), start)
        .unwrap_err();
    assert!(matches!(err, ForecastError::InvalidParameter(_)));
}

#[rstest]
#[case("[forecast]\nmin_history = 0\n")]
#[case("[forecast]\nmin_history = 48\nhistory_window = 24\n")]
#[case("[forecast]\nmax_horizon = 4\nshort_term_max_horizon = 6\n")]
#[case("[forecast]\ndefault_model = \"lstm\"\n")]
#[case("[synthesis]\nmax_range_days = 0\n")]
#[case("[synthesis]\nmax_range_days = 9000000000000000\n")]
#[case("[evaluation]\nhistory_limit = 0\n")]
#[case("[logging]\nfilter = \"  \"\n")]
#[case("[calendar]\nutc_offset_hours = -24\n")]
fn test_invalid_config_rejected(#[case] content: &str) {
    let err = GridcastConfig::from_toml_str(content).unwrap_err();
    assert!(matches!(err, ForecastError::Config(_)));
}

#[test]
fn test_missing_file() {
    let err = GridcastConfig::from_file("/nonexistent/gridcast.toml").unwrap_err();
    assert!(matches!(err, ForecastError::Config(_)));
}

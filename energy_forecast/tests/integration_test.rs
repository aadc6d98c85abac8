use chrono::{Duration, TimeZone, Utc};
use energy_forecast::export::save_points_csv;
use energy_forecast::{
    DataLoader, ForecastRequest, ForecastService, Forecaster, HistoricalDataGateway, HistoryQuery,
    InMemoryGateway, ModelType, ObservationRow, TargetMetric,
};
use energy_synth::{GenerationParameters, SeriesSynthesizer, SignalKind, SynthesisRequest};
use tempfile::tempdir;

#[test]
fn test_full_forecast_workflow() {
    // 1. Synthesize two weeks of load
    let start = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
    let now = start + Duration::days(14);
    let request = SynthesisRequest::new(SignalKind::LoadCurve, start, now)
        .with_params(GenerationParameters::new().with("noiseLevel", 0.05))
        .with_seed(2024);
    let points = SeriesSynthesizer::default().synthesize(&request).unwrap();
    assert_eq!(points.len(), 14 * 24);

    // 2. Round trip through CSV into the store
    let dir = tempdir().unwrap();
    let path = dir.path().join("load.csv");
    save_points_csv(&path, &points).unwrap();
    let rows = DataLoader::observations_from_csv(&path, TargetMetric::Load, "site-1").unwrap();

    let service = ForecastService::new(InMemoryGateway::new(), Forecaster::default());
    service.gateway().append_observations(&rows).unwrap();

    // 3. Forecast the next day with both models
    let runs = [
        (ModelType::WeightedRecent, now),
        (ModelType::Hybrid, now + Duration::minutes(1)),
    ];
    for (model, created) in runs {
        let run = service
            .generate_forecast_at(
                &ForecastRequest::new(24, TargetMetric::Load)
                    .with_location("site-1")
                    .with_model(model),
                created,
            )
            .unwrap();
        assert_eq!(run.forecasts.len(), 24);
        assert_eq!(run.metadata.history_points, 168);
        assert!(run.forecasts.iter().all(|f| f.predicted_value > 0.0));
    }

    // 4. Realized values arrive
    let realized = SynthesisRequest::new(SignalKind::LoadCurve, now, now + Duration::days(2))
        .with_params(GenerationParameters::new().with("noiseLevel", 0.05))
        .with_seed(7);
    let actuals: Vec<ObservationRow> = SeriesSynthesizer::default()
        .synthesize(&realized)
        .unwrap()
        .into_iter()
        .map(|p| ObservationRow::new(TargetMetric::Load, p.with_location("site-1")))
        .collect();
    service.gateway().append_observations(&actuals).unwrap();

    // 5. Score everything whose target has passed
    let report = service
        .forecast_performance_at(now + Duration::days(2))
        .unwrap();
    assert_eq!(report.total_forecasts, 48);
    assert_eq!(report.forecasts_with_actuals, 48);
    assert!(report.mape > 0.0);
    assert!(report.mape < 60.0, "{}", report);
    assert!(report.rmse >= report.mae);

    // 6. History and latest batch
    let history = service.forecast_history(&HistoryQuery::default()).unwrap();
    assert_eq!(history.len(), 48);
    let latest = service.latest_forecasts().unwrap();
    assert_eq!(latest.len(), 24);
    assert!(latest.iter().all(|f| f.model_version == "hybrid_v1.0"));
}

#[test]
fn test_performance_with_nothing_stored() {
    let service = ForecastService::new(InMemoryGateway::new(), Forecaster::default());
    let report = service.forecast_performance().unwrap();
    assert_eq!(report.total_forecasts, 0);
    assert_eq!(report.forecasts_with_actuals, 0);
    assert_eq!(report.accuracy, 0.0);
}

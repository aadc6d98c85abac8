use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
use energy_synth::profiles::weather::{HUMIDITY, WIND_SPEED};
use energy_synth::{
    generate_dataset, GenerationParameters, SeriesSynthesizer, SignalKind, SynthError,
    SynthesisRequest,
};
use rstest::rstest;

fn utc(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

#[test]
fn test_quiet_load_day() {
    let params = GenerationParameters::new()
        .with("baseLoad", 50.0)
        .with("peakLoad", 100.0)
        .with("seasonality", 0.0)
        .with("noiseLevel", 0.0)
        .with("weekendReduction", 0.0);
    let request =
        SynthesisRequest::new(SignalKind::LoadCurve, utc(2024, 1, 1, 0), utc(2024, 1, 2, 0))
            .with_params(params)
            .with_seed(42);

    let points = SeriesSynthesizer::default().synthesize(&request).unwrap();
    assert_eq!(points.len(), 24);

    for point in &points {
        assert!(point.value >= 50.0 && point.value <= 100.0);
        assert_eq!(point.unit, "MW");
        assert!(point.location.is_none());
    }

    let night = points[3].value;
    for hour in (9..=12).chain(17..=21) {
        assert!(
            points[hour].value > night,
            "hour {} should sit above the night trough",
            hour
        );
    }
    assert_eq!(points[23].timestamp.hour(), 23);
}

#[rstest]
#[case(SignalKind::LoadCurve)]
#[case(SignalKind::Prices)]
#[case(SignalKind::CarbonIntensity)]
fn test_primary_values_never_negative(#[case] kind: SignalKind) {
    // heavy noise would push raw values well below zero
    let params = GenerationParameters::new().with("noiseLevel", 3.0);
    let request = SynthesisRequest::new(kind, utc(2024, 6, 1, 0), utc(2024, 6, 8, 0))
        .with_params(params)
        .with_seed(9);

    let points = SeriesSynthesizer::default().synthesize(&request).unwrap();
    assert_eq!(points.len(), 7 * 24);
    assert!(points.iter().all(|p| p.value >= 0.0));
}

#[test]
fn test_weather_secondary_metrics() {
    let request = SynthesisRequest::new(SignalKind::Weather, utc(2024, 2, 1, 0), utc(2024, 2, 3, 0))
        .with_seed(5);
    let points = SeriesSynthesizer::default().synthesize(&request).unwrap();

    assert_eq!(points.len(), 48);
    for point in &points {
        let humidity = point.metric(HUMIDITY).unwrap();
        let wind = point.metric(WIND_SPEED).unwrap();
        assert!((20.0..=100.0).contains(&humidity));
        assert!(wind >= 0.0);
        assert_eq!(point.unit, "°C");
    }
}

#[rstest]
#[case(60.0, Duration::hours(5), 5)]
#[case(60.0, Duration::minutes(301), 6)]
#[case(15.0, Duration::hours(1), 4)]
#[case(45.0, Duration::hours(2), 3)]
fn test_point_count_is_ceiling(
    #[case] interval_minutes: f64,
    #[case] span: Duration,
    #[case] expected: usize,
) {
    let start = utc(2024, 4, 10, 0);
    let params = GenerationParameters::new().with("timeInterval", interval_minutes);
    let request = SynthesisRequest::new(SignalKind::CarbonIntensity, start, start + span)
        .with_params(params)
        .with_seed(1);

    let points = SeriesSynthesizer::default().synthesize(&request).unwrap();
    assert_eq!(points.len(), expected);
    assert!(points.iter().all(|p| p.timestamp < start + span));
}

#[rstest]
#[case(SignalKind::LoadCurve)]
#[case(SignalKind::Weather)]
#[case(SignalKind::CarbonIntensity)]
#[case(SignalKind::Prices)]
fn test_same_seed_same_series(#[case] kind: SignalKind) {
    let synth = SeriesSynthesizer::default();
    let request = SynthesisRequest::new(kind, utc(2024, 9, 1, 0), utc(2024, 9, 3, 0)).with_seed(77);

    let first = synth.synthesize(&request).unwrap();
    let second = synth.synthesize(&request).unwrap();
    assert_eq!(first, second);

    let other = synth.synthesize(&request.clone().with_seed(78)).unwrap();
    assert_ne!(first, other);
}

#[test]
fn test_dataset_envelope() {
    let synth = SeriesSynthesizer::default();
    let params = GenerationParameters::new().with("numCustomers", 2.0);

    let dataset = generate_dataset(
        &synth,
        SignalKind::Weather,
        utc(2024, 1, 1, 0),
        utc(2024, 1, 1, 6),
        Some("oslo".to_string()),
        params.clone(),
        Some(12),
    )
    .unwrap();

    assert_eq!(dataset.seed, 12);
    assert_eq!(dataset.parameters, params);
    assert_eq!(dataset.points.len(), 12);
    assert_eq!(dataset.stats.count, 12);
    assert!(dataset.points.iter().any(|p| p.location.as_deref() == Some("oslo-2")));

    let json = serde_json::to_value(&dataset).unwrap();
    assert_eq!(json["kind"], "weather");
    assert_eq!(json["parameters"]["numCustomers"], 2.0);
}

#[test]
fn test_invalid_requests() {
    let synth = SeriesSynthesizer::default();

    let inverted =
        SynthesisRequest::new(SignalKind::Prices, utc(2024, 1, 2, 0), utc(2024, 1, 1, 0));
    assert!(matches!(
        synth.synthesize(&inverted),
        Err(SynthError::InvalidRange(_))
    ));

    let zero_step =
        SynthesisRequest::new(SignalKind::Weather, utc(2024, 1, 1, 0), utc(2024, 1, 2, 0))
            .with_params(GenerationParameters::new().with("timeInterval", 0.2));
    assert!(matches!(
        synth.synthesize(&zero_step),
        Err(SynthError::InvalidParameter(_))
    ));
}

#[test]
fn test_interval_wider_than_calendar() {
    let synth = SeriesSynthesizer::default();
    let day = |params: GenerationParameters| {
        SynthesisRequest::new(SignalKind::CarbonIntensity, utc(2024, 1, 1, 0), utc(2024, 1, 2, 0))
            .with_params(params)
            .with_seed(5)
    };

    // the step fits in a duration but the second timestamp would overflow
    let wide = day(GenerationParameters::new().with("timeInterval", 1e12));
    let points = synth.synthesize(&wide).unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].timestamp, utc(2024, 1, 1, 0));

    let unrepresentable = day(GenerationParameters::new().with("timeInterval", 1e16));
    assert!(matches!(
        synth.synthesize(&unrepresentable),
        Err(SynthError::InvalidParameter(_))
    ));
}

#[test]
fn test_site_count_is_capped() {
    let request = SynthesisRequest::new(SignalKind::Weather, utc(2024, 1, 1, 0), utc(2024, 1, 1, 2))
        .with_params(GenerationParameters::new().with("numCustomers", 1e12));
    assert!(matches!(
        SeriesSynthesizer::default().synthesize(&request),
        Err(SynthError::InvalidParameter(_))
    ));
}

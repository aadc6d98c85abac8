//! # gridcast
//!
//! Command-line interface for synthetic energy series, forecasting and
//! forecast evaluation over CSV and JSON files.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use energy_forecast::config::LOG_ENV;
use energy_forecast::export::{save_forecasts_csv, save_json, save_points_csv, write_json};
use energy_forecast::{
    DataLoader, FeatureFlags, ForecastError, ForecastRequest, ForecastService, ForecastType,
    GridcastConfig, InMemoryGateway, ModelType, PerformanceReport, Result,
    TargetMetric,
};
use energy_synth::{generate_dataset, GenerationParameters, SignalKind};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "gridcast")]
#[command(about = "Synthetic energy series and short-horizon forecasting", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic series
    Synth {
        /// Signal kind (load_curve, weather, carbon_intensity, prices)
        #[arg(short, long)]
        kind: String,

        /// First timestamp (RFC 3339)
        #[arg(long)]
        start: String,

        /// End of the range, exclusive (RFC 3339)
        #[arg(long)]
        end: String,

        /// Generation parameters as a JSON object
        #[arg(short, long)]
        params: Option<String>,

        /// Site id prefix for multi-site runs
        #[arg(short, long)]
        location: Option<String>,

        /// Noise seed; overrides the configured seed
        #[arg(long)]
        seed: Option<u64>,

        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Forecast from a CSV history
    Forecast {
        /// Observation CSV (timestamp,value[,unit,location,...])
        #[arg(short, long)]
        input: PathBuf,

        /// Target metric (load, price, carbon)
        #[arg(short, long, default_value = "load")]
        metric: String,

        #[arg(short, long)]
        location: Option<String>,

        /// Number of hourly steps, 1 to 24
        #[arg(long, default_value = "24")]
        horizon: u32,

        /// Model type (weighted_recent, hybrid); defaults to the configured model
        #[arg(long)]
        model: Option<String>,

        /// Ignore hour-of-day and weekday profiles
        #[arg(long)]
        no_time_features: bool,

        /// Mark the run as using weather inputs
        #[arg(long)]
        weather: bool,

        /// Forecast as of this time instead of now (RFC 3339)
        #[arg(long)]
        now: Option<String>,

        /// Forecast log (JSON) to append the batch to
        #[arg(long)]
        log: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Score a forecast log against realized values
    Evaluate {
        /// Forecast log (JSON)
        #[arg(short, long)]
        forecasts: PathBuf,

        /// Realized observations (CSV)
        #[arg(short, long)]
        actuals: PathBuf,

        /// Metric of the realized observations
        #[arg(short, long, default_value = "load")]
        metric: String,

        /// Location assigned to realized rows without one
        #[arg(short, long)]
        location: Option<String>,

        /// Evaluate as of this time instead of now (RFC 3339)
        #[arg(long)]
        now: Option<String>,

        /// Output file for the full report (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Browse a forecast log
    History {
        /// Forecast log (JSON)
        #[arg(short, long)]
        forecasts: PathBuf,

        /// Earliest creation time, inclusive (RFC 3339)
        #[arg(long)]
        from: Option<String>,

        /// Latest creation time, inclusive (RFC 3339)
        #[arg(long)]
        until: Option<String>,

        /// Forecast type (short_term, long_term, all)
        #[arg(short = 't', long = "type", default_value = "all")]
        forecast_type: String,

        /// Maximum rows; defaults to the configured limit
        #[arg(long)]
        limit: Option<usize>,

        /// Only the most recent batch
        #[arg(long)]
        latest: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            EnvFilter::try_from_env(LOG_ENV)
                .unwrap_or_else(|_| EnvFilter::new(config.logging.filter.as_str())),
        )
        .init();

    let result = match cli.command {
        Commands::Synth {
            kind,
            start,
            end,
            params,
            location,
            seed,
            format,
            output,
        } => run_synth(&config, &kind, &start, &end, params, location, seed, format, output),

        Commands::Forecast {
            input,
            metric,
            location,
            horizon,
            model,
            no_time_features,
            weather,
            now,
            log,
            format,
            output,
        } => {
            let features = FeatureFlags {
                weather,
                historical: true,
                time_features: !no_time_features,
            };
            run_forecast(
                &config, input, &metric, location, horizon, model, features, now, log, format,
                output,
            )
        }

        Commands::Evaluate {
            forecasts,
            actuals,
            metric,
            location,
            now,
            output,
        } => run_evaluate(&config, forecasts, actuals, &metric, location, now, output),

        Commands::History {
            forecasts,
            from,
            until,
            forecast_type,
            limit,
            latest,
        } => run_history(&config, forecasts, from, until, &forecast_type, limit, latest),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<GridcastConfig> {
    match path {
        Some(path) => GridcastConfig::from_file(path),
        None => Ok(GridcastConfig::default()),
    }
}

fn parse_time(raw: &str, what: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| ForecastError::InvalidParameter(format!("{}: '{}': {}", what, raw, e)))
}

fn parse_optional_time(raw: Option<String>, what: &str) -> Result<Option<DateTime<Utc>>> {
    raw.map(|raw| parse_time(&raw, what)).transpose()
}

#[allow(clippy::too_many_arguments)]
fn run_synth(
    config: &GridcastConfig,
    kind: &str,
    start: &str,
    end: &str,
    params: Option<String>,
    location: Option<String>,
    seed: Option<u64>,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let kind: SignalKind = kind.parse()?;
    let start = parse_time(start, "start")?;
    let end = parse_time(end, "end")?;

    let raw_params: serde_json::Value = match params {
        Some(raw) => serde_json::from_str(&raw)?,
        None => serde_json::Value::Null,
    };
    let params = GenerationParameters::from_json(&raw_params, kind)?;

    let synthesizer = config.synthesizer()?;
    let dataset = generate_dataset(
        &synthesizer,
        kind,
        start,
        end,
        location,
        params,
        seed.or(config.synthesis.seed),
    )?;

    info!(kind = %kind, points = dataset.points.len(), seed = dataset.seed, "synthesized dataset");

    match (format, output) {
        (OutputFormat::Json, Some(path)) => save_json(path, &dataset),
        (OutputFormat::Json, None) => write_json(io::stdout().lock(), &dataset),
        (OutputFormat::Csv, Some(path)) => save_points_csv(path, &dataset.points),
        (OutputFormat::Csv, None) => {
            energy_forecast::export::write_points_csv(io::stdout().lock(), &dataset.points)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_forecast(
    config: &GridcastConfig,
    input: PathBuf,
    metric: &str,
    location: Option<String>,
    horizon: u32,
    model: Option<String>,
    features: FeatureFlags,
    now: Option<String>,
    log: Option<PathBuf>,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let metric: TargetMetric = metric.parse()?;
    let model = match model {
        Some(raw) => raw.parse::<ModelType>()?,
        None => config.forecast.default_model,
    };
    let now = parse_optional_time(now, "now")?.unwrap_or_else(Utc::now);

    let mut request = ForecastRequest::new(horizon, metric)
        .with_model(model)
        .with_features(features);
    request.location = location;

    let rows = DataLoader::observations_from_csv(&input, metric, request.resolved_location())?;
    info!(rows = rows.len(), path = %input.display(), "loaded observations");

    let mut gateway = InMemoryGateway::with_observations(rows);
    if let Some(path) = log.as_ref().filter(|p| p.exists()) {
        gateway = gateway.with_forecasts(DataLoader::forecasts_from_json(path)?);
    }

    let service = ForecastService::new(gateway, config.forecaster()?)
        .with_history_window(config.forecast.history_window)
        .with_lookback_limit(config.evaluation.lookback_limit);
    let run = service.generate_forecast_at(&request, now)?;

    if let Some(path) = log {
        let stored = service
            .gateway()
            .forecasts()
            .map_err(|e| ForecastError::gateway("forecast", e))?;
        save_json(&path, &stored)?;
        info!(rows = stored.len(), path = %path.display(), "saved forecast log");
    }

    match (format, output) {
        (OutputFormat::Json, Some(path)) => save_json(path, &run),
        (OutputFormat::Json, None) => write_json(io::stdout().lock(), &run),
        (OutputFormat::Csv, Some(path)) => save_forecasts_csv(path, &run.forecasts),
        (OutputFormat::Csv, None) => {
            energy_forecast::export::write_forecasts_csv(io::stdout().lock(), &run.forecasts)
        }
    }
}

fn run_evaluate(
    config: &GridcastConfig,
    forecasts: PathBuf,
    actuals: PathBuf,
    metric: &str,
    location: Option<String>,
    now: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let metric: TargetMetric = metric.parse()?;
    let now = parse_optional_time(now, "now")?.unwrap_or_else(Utc::now);
    let location =
        location.unwrap_or_else(|| energy_forecast::forecaster::DEFAULT_LOCATION.to_string());

    let log = DataLoader::forecasts_from_json(&forecasts)?;
    let rows = DataLoader::observations_from_csv(&actuals, metric, &location)?;

    let gateway = InMemoryGateway::with_observations(rows).with_forecasts(log);
    let service = ForecastService::new(gateway, config.forecaster()?)
        .with_lookback_limit(config.evaluation.lookback_limit);
    let report: PerformanceReport = service.forecast_performance_at(now)?;

    println!("{}", report);
    if let Some(path) = output {
        save_json(path, &report)?;
    }
    Ok(())
}

fn run_history(
    config: &GridcastConfig,
    forecasts: PathBuf,
    from: Option<String>,
    until: Option<String>,
    forecast_type: &str,
    limit: Option<usize>,
    latest: bool,
) -> Result<()> {
    let log = DataLoader::forecasts_from_json(&forecasts)?;
    let gateway = InMemoryGateway::new().with_forecasts(log);

    let rows = if latest {
        energy_forecast::latest_forecasts(&gateway)?
    } else {
        let mut query = config.history_query();
        query.created_from = parse_optional_time(from, "from")?;
        query.created_until = parse_optional_time(until, "until")?;
        if forecast_type != "all" {
            query.forecast_type = Some(forecast_type.parse::<ForecastType>()?);
        }
        if let Some(limit) = limit {
            query.limit = limit;
        }
        energy_forecast::forecast_history(&gateway, &query)?
    };

    info!(rows = rows.len(), "read forecast history");
    write_json(io::stdout().lock(), &rows)
}

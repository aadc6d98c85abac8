//! Configuration file parsing (TOML)
//!
//! Every field has a default, so an empty file is a valid configuration.
//!
//! ```toml
//! [forecast]
//! min_history = 24
//! history_window = 168
//! max_horizon = 24
//! short_term_max_horizon = 6
//! default_model = "hybrid"
//!
//! [synthesis]
//! max_range_days = 365
//! seed = 42
//!
//! [evaluation]
//! lookback_limit = 200
//! history_limit = 100
//!
//! [calendar]
//! utc_offset_hours = 0
//!
//! [logging]
//! filter = "info"
//! ```

use crate::error::{ForecastError, Result};
use crate::forecaster::{
    Forecaster, DEFAULT_HISTORY_WINDOW, DEFAULT_LOOKBACK_LIMIT, DEFAULT_MAX_HORIZON,
    DEFAULT_MIN_HISTORY, DEFAULT_SHORT_TERM_MAX_HORIZON,
};
use crate::history::{HistoryQuery, DEFAULT_HISTORY_LIMIT};
use crate::models::ModelType;
use chrono::{Duration, FixedOffset};
use energy_math::calendar::offset_from_hours;
use energy_synth::synthesizer::DEFAULT_MAX_RANGE_DAYS;
use energy_synth::SeriesSynthesizer;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable holding a tracing filter that overrides `[logging]`
pub const LOG_ENV: &str = "GRIDCAST_LOG";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GridcastConfig {
    pub forecast: ForecastSettings,
    pub synthesis: SynthesisSettings,
    pub evaluation: EvaluationSettings,
    pub calendar: CalendarSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    pub min_history: usize,
    /// Most recent observations fetched per run
    pub history_window: usize,
    pub max_horizon: u32,
    pub short_term_max_horizon: u32,
    pub default_model: ModelType,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            min_history: DEFAULT_MIN_HISTORY,
            history_window: DEFAULT_HISTORY_WINDOW,
            max_horizon: DEFAULT_MAX_HORIZON,
            short_term_max_horizon: DEFAULT_SHORT_TERM_MAX_HORIZON,
            default_model: ModelType::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisSettings {
    pub max_range_days: i64,
    /// Fixed seed for every run; fresh entropy when unset
    pub seed: Option<u64>,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            max_range_days: DEFAULT_MAX_RANGE_DAYS,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationSettings {
    /// Past forecasts scored per performance report
    pub lookback_limit: usize,
    /// Rows returned by a history query
    pub history_limit: usize,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            lookback_limit: DEFAULT_LOOKBACK_LIMIT,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Offset of the local calendar used for hour and weekday buckets
    pub utc_offset_hours: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl GridcastConfig {
    /// Load and validate a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ForecastError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GridcastConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let forecast = &self.forecast;
        if forecast.min_history == 0 {
            return Err(config_error("forecast.min_history must be at least 1"));
        }
        if forecast.history_window < forecast.min_history {
            return Err(config_error(
                "forecast.history_window must be at least forecast.min_history",
            ));
        }
        if forecast.max_horizon == 0 {
            return Err(config_error("forecast.max_horizon must be at least 1"));
        }
        if forecast.short_term_max_horizon > forecast.max_horizon {
            return Err(config_error(
                "forecast.short_term_max_horizon must not exceed forecast.max_horizon",
            ));
        }
        if self.synthesis.max_range_days < 1 {
            return Err(config_error("synthesis.max_range_days must be at least 1"));
        }
        self.max_range()?;
        if self.evaluation.lookback_limit == 0 || self.evaluation.history_limit == 0 {
            return Err(config_error("evaluation limits must be at least 1"));
        }
        if self.logging.filter.trim().is_empty() {
            return Err(config_error("logging.filter must not be empty"));
        }
        self.zone()?;
        Ok(())
    }

    pub fn zone(&self) -> Result<FixedOffset> {
        offset_from_hours(self.calendar.utc_offset_hours)
            .map_err(|e| config_error(&format!("calendar.utc_offset_hours: {}", e)))
    }

    pub fn forecaster(&self) -> Result<Forecaster> {
        Ok(Forecaster::new(self.zone()?)
            .with_min_history(self.forecast.min_history)
            .with_max_horizon(self.forecast.max_horizon)
            .with_short_term_max_horizon(self.forecast.short_term_max_horizon))
    }

    pub fn synthesizer(&self) -> Result<SeriesSynthesizer> {
        Ok(SeriesSynthesizer::new(self.zone()?).with_max_range(self.max_range()?))
    }

    fn max_range(&self) -> Result<Duration> {
        Duration::try_days(self.synthesis.max_range_days).ok_or_else(|| {
            config_error(&format!(
                "synthesis.max_range_days of {} is out of range",
                self.synthesis.max_range_days
            ))
        })
    }

    pub fn history_query(&self) -> HistoryQuery {
        HistoryQuery::default().limit(self.evaluation.history_limit)
    }
}

fn config_error(message: &str) -> ForecastError {
    ForecastError::Config(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config = GridcastConfig::from_toml_str("").unwrap();
        assert_eq!(config, GridcastConfig::default());
        assert_eq!(config.forecast.history_window, 168);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_rejects_unrepresentable_range_limit() {
        let content = "[synthesis]\nmax_range_days = 9000000000000000\n";
        let err = GridcastConfig::from_toml_str(content).unwrap_err();
        assert!(matches!(err, ForecastError::Config(_)));

        let mut config = GridcastConfig::default();
        config.synthesis.max_range_days = i64::MAX;
        assert!(matches!(config.synthesizer(), Err(ForecastError::Config(_))));
    }

    #[test]
    fn test_rejects_bad_offset() {
        let err = GridcastConfig::from_toml_str("[calendar]\nutc_offset_hours = 30\n").unwrap_err();
        assert!(matches!(err, ForecastError::Config(_)));
    }
}

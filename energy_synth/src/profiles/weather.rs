//! Weather: temperature with humidity and wind speed
//!
//! Temperature follows a yearly sine shifted a quarter cycle (coldest in
//! early January) plus a daily sine. Humidity falls as temperature rises
//! above the average; wind strengthens in summer and winter.

use super::{centred, interval_from_params, sites_from_params, Sample, SignalProfile};
use crate::params::GenerationParameters;
use crate::Result;
use chrono::Duration;
use energy_math::CalendarFields;
use rand::rngs::StdRng;
use std::f64::consts::PI;

/// Secondary metric key for relative humidity (%)
pub const HUMIDITY: &str = "humidity";
/// Secondary metric key for wind speed (km/h)
pub const WIND_SPEED: &str = "wind_speed";

const DIURNAL_AMPLITUDE: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherProfile {
    pub avg_temp: f64,
    pub temp_range: f64,
    pub seasonality: f64,
    pub noise_level: f64,
    pub interval: Duration,
    pub sites: u32,
    pub region_variation: f64,
}

impl Default for WeatherProfile {
    fn default() -> Self {
        Self {
            avg_temp: 20.0,
            temp_range: 15.0,
            seasonality: 0.8,
            noise_level: 0.15,
            interval: Duration::hours(1),
            sites: 1,
            region_variation: 0.1,
        }
    }
}

impl WeatherProfile {
    pub fn from_params(params: &GenerationParameters) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            avg_temp: params.get_or("avgTemp", defaults.avg_temp),
            temp_range: params.get_or("tempRange", defaults.temp_range),
            seasonality: params.get_or("seasonality", defaults.seasonality),
            noise_level: params.get_or("noiseLevel", defaults.noise_level),
            interval: interval_from_params(params)?,
            sites: sites_from_params(params)?,
            region_variation: params.get_or("regionVariation", defaults.region_variation),
        })
    }

    /// Noise-free temperature at `fields`
    pub fn shaped_temperature(&self, fields: &CalendarFields) -> f64 {
        let seasonal = self.avg_temp
            + self.temp_range * (fields.year_phase() - PI / 2.0).sin() * self.seasonality;
        let diurnal = DIURNAL_AMPLITUDE * ((fields.hour as f64 - 6.0) / 24.0 * 2.0 * PI).sin();
        seasonal + diurnal
    }
}

impl SignalProfile for WeatherProfile {
    fn interval(&self) -> Duration {
        self.interval
    }

    fn sites(&self) -> u32 {
        self.sites
    }

    fn region_variation(&self) -> f64 {
        self.region_variation
    }

    fn sample(&self, fields: &CalendarFields, site_factor: f64, rng: &mut StdRng) -> Sample {
        // A site factor of 1.1 runs the site 10% of the range warmer
        let site_shift = (site_factor - 1.0) * self.temp_range;
        let temperature = self.shaped_temperature(fields)
            + site_shift
            + centred(rng) * self.noise_level * 10.0;

        let base_humidity = 70.0 - (temperature - self.avg_temp) * 1.5;
        let humidity = (base_humidity + centred(rng) * 20.0).clamp(20.0, 100.0);

        let base_wind = 10.0 + fields.year_phase().sin().abs() * 5.0;
        let wind_speed = (base_wind + centred(rng) * 8.0).max(0.0);

        Sample {
            value: temperature,
            secondary: vec![(HUMIDITY, humidity), (WIND_SPEED, wind_speed)],
        }
    }
}

//! Electrical load curve
//!
//! Demand ramps up in the morning, plateaus through the working day, peaks
//! again in the evening and falls to a night trough. Weekends are reduced by
//! a fixed share and the whole curve rides a yearly sine.

use super::{proportional_noise, Sample, SignalProfile};
use crate::params::GenerationParameters;
use energy_math::CalendarFields;
use rand::rngs::StdRng;

/// Load curve shape
#[derive(Debug, Clone, PartialEq)]
pub struct LoadProfile {
    /// Night-time floor in MW
    pub base_load: f64,
    /// Level the daily bands are scaled towards, in MW
    pub peak_load: f64,
    /// Amplitude of the yearly sine
    pub seasonality: f64,
    /// Noise as a fraction of the current value
    pub noise_level: f64,
    /// Share of demand removed on Saturdays and Sundays
    pub weekend_reduction: f64,
}

impl Default for LoadProfile {
    fn default() -> Self {
        Self {
            base_load: 50.0,
            peak_load: 100.0,
            seasonality: 0.2,
            noise_level: 0.1,
            weekend_reduction: 0.3,
        }
    }
}

impl LoadProfile {
    pub fn from_params(params: &GenerationParameters) -> Self {
        let defaults = Self::default();
        Self {
            base_load: params.get_or("baseLoad", defaults.base_load),
            peak_load: params.get_or("peakLoad", defaults.peak_load),
            seasonality: params.get_or("seasonality", defaults.seasonality),
            noise_level: params.get_or("noiseLevel", defaults.noise_level),
            weekend_reduction: params.get_or("weekendReduction", defaults.weekend_reduction),
        }
    }

    /// Share of the base-to-peak span added at `hour`
    pub fn band_fraction(hour: u32) -> f64 {
        match hour {
            // morning ramp, 06:00 -> 09:00
            6..=9 => 0.8 * (hour as f64 - 6.0) / 3.0,
            10..=12 => 0.8,
            13..=14 => 0.9,
            15..=17 => 0.7,
            // evening peak
            18..=21 => 0.85,
            22..=23 => 0.4,
            _ => 0.1,
        }
    }

    /// Noise-free value at `fields`
    pub fn shaped_value(&self, fields: &CalendarFields) -> f64 {
        let mut load =
            self.base_load + (self.peak_load - self.base_load) * Self::band_fraction(fields.hour);

        if fields.is_weekend() {
            load *= 1.0 - self.weekend_reduction;
        }

        load * (1.0 + fields.year_phase().sin() * self.seasonality)
    }
}

impl SignalProfile for LoadProfile {
    fn sample(&self, fields: &CalendarFields, _site_factor: f64, rng: &mut StdRng) -> Sample {
        let load = self.shaped_value(fields);
        let noisy = load + proportional_noise(rng, self.noise_level, load);
        Sample::new(noisy.max(0.0))
    }
}

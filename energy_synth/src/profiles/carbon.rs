//! Grid carbon intensity

use super::{interval_from_params, proportional_noise, sites_from_params, Sample, SignalProfile};
use crate::params::GenerationParameters;
use crate::Result;
use chrono::Duration;
use energy_math::CalendarFields;
use rand::rngs::StdRng;

const WEEKEND_FACTOR: f64 = 0.9;

#[derive(Debug, Clone, PartialEq)]
pub struct CarbonProfile {
    pub base_intensity: f64,
    pub peak_intensity: f64,
    pub noise_level: f64,
    /// Share of the peak span displaced by solar around midday
    pub renewable_share: f64,
    pub interval: Duration,
    pub sites: u32,
    pub region_variation: f64,
}

impl Default for CarbonProfile {
    fn default() -> Self {
        Self {
            base_intensity: 400.0,
            peak_intensity: 600.0,
            noise_level: 0.1,
            renewable_share: 0.3,
            interval: Duration::hours(1),
            sites: 1,
            region_variation: 0.1,
        }
    }
}

impl CarbonProfile {
    pub fn from_params(params: &GenerationParameters) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            base_intensity: params.get_or("baseIntensity", defaults.base_intensity),
            peak_intensity: params.get_or("peakIntensity", defaults.peak_intensity),
            noise_level: params.get_or("noiseLevel", defaults.noise_level),
            renewable_share: params.get_or("renewableShare", defaults.renewable_share),
            interval: interval_from_params(params)?,
            sites: sites_from_params(params)?,
            region_variation: params.get_or("regionVariation", defaults.region_variation),
        })
    }

    pub fn shaped_value(&self, fields: &CalendarFields) -> f64 {
        let span = self.peak_intensity - self.base_intensity;
        let mut intensity = self.base_intensity;

        match fields.hour {
            // fossil ramp-up for the morning peak
            7..=9 => intensity += span * 0.7,
            17..=21 => intensity += span * 0.8,
            // solar
            12..=14 => intensity -= span * self.renewable_share * 0.5,
            _ => {}
        }

        if fields.is_weekend() {
            intensity *= WEEKEND_FACTOR;
        }

        intensity
    }
}

impl SignalProfile for CarbonProfile {
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
        let intensity = self.shaped_value(fields) * site_factor;
        let noisy = intensity + proportional_noise(rng, self.noise_level, intensity);
        Sample::new(noisy.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn weekday_at(hour: u32) -> CalendarFields {
        CalendarFields {
            hour,
            weekday: 2,
            day_of_year: 100,
        }
    }

    #[test]
    fn test_daily_shape() {
        let profile = CarbonProfile::default();
        assert_relative_eq!(profile.shaped_value(&weekday_at(3)), 400.0);
        assert_relative_eq!(profile.shaped_value(&weekday_at(8)), 540.0);
        assert_relative_eq!(profile.shaped_value(&weekday_at(13)), 370.0);
        assert_relative_eq!(profile.shaped_value(&weekday_at(19)), 560.0);
    }

    #[test]
    fn test_weekend_lower() {
        let profile = CarbonProfile::default();
        let saturday = CalendarFields {
            hour: 19,
            weekday: 6,
            day_of_year: 100,
        };
        assert_relative_eq!(profile.shaped_value(&saturday), 560.0 * 0.9);
    }
}

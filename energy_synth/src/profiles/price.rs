//! Wholesale price with time-of-use bands

use super::{proportional_noise, Sample, SignalProfile};
use crate::params::GenerationParameters;
use energy_math::CalendarFields;
use rand::rngs::StdRng;

const WEEKEND_DISCOUNT: f64 = 0.85;

/// Time-of-use price shape
#[derive(Debug, Clone, PartialEq)]
pub struct PriceProfile {
    pub base_price: f64,
    pub peak_price: f64,
    pub noise_level: f64,
    /// Amplitude of the yearly |sine|; summer and winter are both elevated
    pub seasonality: f64,
}

impl Default for PriceProfile {
    fn default() -> Self {
        Self {
            base_price: 50.0,
            peak_price: 150.0,
            noise_level: 0.1,
            seasonality: 0.3,
        }
    }
}

impl PriceProfile {
    pub fn from_params(params: &GenerationParameters) -> Self {
        let defaults = Self::default();
        Self {
            base_price: params.get_or("basePrice", defaults.base_price),
            peak_price: params.get_or("peakPrice", defaults.peak_price),
            noise_level: params.get_or("noiseLevel", defaults.noise_level),
            seasonality: params.get_or("seasonality", defaults.seasonality),
        }
    }

    /// Price of the time-of-use band containing `hour`
    pub fn band_price(&self, hour: u32) -> f64 {
        match hour {
            // off-peak night
            0..=5 => self.base_price * 0.6,
            // morning peak
            6..=8 => self.peak_price * 0.9,
            // mid-peak
            9..=16 => self.base_price * 1.2,
            // evening peak
            17..=20 => self.peak_price,
            _ => self.base_price * 0.8,
        }
    }

    pub fn shaped_value(&self, fields: &CalendarFields) -> f64 {
        let mut price = self.band_price(fields.hour);
        if fields.is_weekend() {
            price *= WEEKEND_DISCOUNT;
        }
        price * (1.0 + fields.year_phase().sin().abs() * self.seasonality)
    }
}

impl SignalProfile for PriceProfile {
    fn sample(&self, fields: &CalendarFields, _site_factor: f64, rng: &mut StdRng) -> Sample {
        let price = self.shaped_value(fields);
        let noisy = price + proportional_noise(rng, self.noise_level, price);
        Sample::new(noisy.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_time_of_use_bands() {
        let profile = PriceProfile::default();
        assert_relative_eq!(profile.band_price(2), 30.0);
        assert_relative_eq!(profile.band_price(7), 135.0);
        assert_relative_eq!(profile.band_price(12), 60.0);
        assert_relative_eq!(profile.band_price(18), 150.0);
        assert_relative_eq!(profile.band_price(22), 40.0);
    }

    #[test]
    fn test_weekend_discount() {
        let profile = PriceProfile {
            seasonality: 0.0,
            ..PriceProfile::default()
        };
        let sunday = CalendarFields {
            hour: 18,
            weekday: 0,
            day_of_year: 10,
        };
        assert_relative_eq!(profile.shaped_value(&sunday), 150.0 * 0.85);
    }

    #[test]
    fn test_summer_and_winter_elevated() {
        let profile = PriceProfile::default();
        let at = |day_of_year| CalendarFields {
            hour: 12,
            weekday: 3,
            day_of_year,
        };
        let trough = profile.shaped_value(&at(183));
        assert!(profile.shaped_value(&at(91)) > trough);
        assert!(profile.shaped_value(&at(274)) > trough);
    }
}

//! Deterministic signal shapes
//!
//! Each profile turns the local calendar position of a timestamp into a
//! value, then perturbs it with noise drawn from the run's generator.

use crate::params::GenerationParameters;
use crate::{Result, SignalKind, SynthError};
use chrono::Duration;
use energy_math::CalendarFields;
use rand::rngs::StdRng;
use rand::Rng;

pub mod carbon;
pub mod load;
pub mod price;
pub mod weather;

pub use carbon::CarbonProfile;
pub use load::LoadProfile;
pub use price::PriceProfile;
pub use weather::WeatherProfile;

/// One generated value plus any secondary metrics measured with it
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub value: f64,
    pub secondary: Vec<(&'static str, f64)>,
}

impl Sample {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            secondary: Vec::new(),
        }
    }
}

/// Shape of a synthetic signal
pub trait SignalProfile {
    /// Spacing between consecutive timestamps
    fn interval(&self) -> Duration {
        Duration::hours(1)
    }

    /// Number of sites emitted per timestamp
    fn sites(&self) -> u32 {
        1
    }

    /// Half-width of the per-site factor drawn around 1.0
    fn region_variation(&self) -> f64 {
        0.0
    }

    /// Produce the value at `fields` for a site scaled by `site_factor`
    fn sample(&self, fields: &CalendarFields, site_factor: f64, rng: &mut StdRng) -> Sample;
}

/// Build the profile for `kind` from its parameters
pub fn profile_for(
    kind: SignalKind,
    params: &GenerationParameters,
) -> Result<Box<dyn SignalProfile>> {
    Ok(match kind {
        SignalKind::LoadCurve => Box::new(LoadProfile::from_params(params)),
        SignalKind::Prices => Box::new(PriceProfile::from_params(params)),
        SignalKind::Weather => Box::new(WeatherProfile::from_params(params)?),
        SignalKind::CarbonIntensity => Box::new(CarbonProfile::from_params(params)?),
    })
}

/// Uniform draw in [-0.5, 0.5)
pub(crate) fn centred(rng: &mut StdRng) -> f64 {
    rng.gen::<f64>() - 0.5
}

/// Uniform noise of up to `±level·value`
pub(crate) fn proportional_noise(rng: &mut StdRng, level: f64, value: f64) -> f64 {
    centred(rng) * 2.0 * level * value
}

/// Step between samples, read from `timeInterval` in minutes
pub(crate) fn interval_from_params(params: &GenerationParameters) -> Result<Duration> {
    let minutes = params.get_or("timeInterval", 60.0);
    if !minutes.is_finite() || minutes.round() < 1.0 {
        return Err(SynthError::InvalidParameter(format!(
            "synthesize: timeInterval must be at least one minute, got {}",
            minutes
        )));
    }
    Duration::try_minutes(minutes.round() as i64).ok_or_else(|| {
        SynthError::InvalidParameter(format!(
            "synthesize: timeInterval of {} minutes is out of range",
            minutes
        ))
    })
}

/// Most sites a single run may emit
pub const MAX_SITES: u32 = 10_000;

/// Site count, read from `numCustomers`
pub(crate) fn sites_from_params(params: &GenerationParameters) -> Result<u32> {
    let n = params.get_or("numCustomers", 1.0);
    if !n.is_finite() || n <= 1.0 {
        return Ok(1);
    }
    if n.floor() > f64::from(MAX_SITES) {
        return Err(SynthError::InvalidParameter(format!(
            "synthesize: numCustomers must be at most {}, got {}",
            MAX_SITES, n
        )));
    }
    Ok(n.floor() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_noise_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            let n = proportional_noise(&mut rng, 0.1, 200.0);
            assert!((-20.0..=20.0).contains(&n));
        }
    }

    #[test]
    fn test_interval_parsing() {
        let params = GenerationParameters::new();
        assert_eq!(interval_from_params(&params).unwrap(), Duration::hours(1));

        let params = GenerationParameters::new().with("timeInterval", 15.0);
        assert_eq!(interval_from_params(&params).unwrap(), Duration::minutes(15));

        let params = GenerationParameters::new().with("timeInterval", 0.0);
        assert!(interval_from_params(&params).is_err());

        let params = GenerationParameters::new().with("timeInterval", 1e16);
        assert!(matches!(
            interval_from_params(&params),
            Err(SynthError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_sites_parsing() {
        let sites =
            |n: f64| sites_from_params(&GenerationParameters::new().with("numCustomers", n));
        assert_eq!(sites_from_params(&GenerationParameters::new()), Ok(1));
        assert_eq!(sites(3.7), Ok(3));
        assert_eq!(sites(-2.0), Ok(1));
        assert_eq!(sites(f64::from(MAX_SITES)), Ok(MAX_SITES));
        assert!(matches!(sites(4e9), Err(SynthError::InvalidParameter(_))));
    }
}

//! Moving average plus trend, scaled by the time-of-week profile

use super::{
    seasonal_factor, volatility_confidence, ForecastContext, ForecastModel, ModelType,
    StepForecast,
};
use crate::error::Result;
use energy_math::calendar::CalendarFields;
use energy_math::smoothing::{trailing_mean, trailing_window, window_trend};
use energy_math::statistics::population_std_dev;

pub const WINDOW: usize = 24;
pub const CONFIDENCE_FLOOR: f64 = 0.6;
const HOURLY_WEIGHT: f64 = 0.7;
/// Overall spread is widened by this much before comparing volatility
const SPREAD_SCALE: f64 = 1.5;

#[derive(Debug, Clone, Copy, Default)]
pub struct Hybrid;

impl Hybrid {
    /// Last-24 mean minus the 24 before it; zero with fewer than 48 points
    pub fn trend(values: &[f64]) -> f64 {
        window_trend(values, WINDOW).unwrap_or(0.0)
    }
}

impl ForecastModel for Hybrid {
    fn model_type(&self) -> ModelType {
        ModelType::Hybrid
    }

    fn predict(
        &self,
        context: &ForecastContext<'_>,
        target: &CalendarFields,
    ) -> Result<StepForecast> {
        let moving_average = trailing_mean(context.values, WINDOW)?;
        let trend = Self::trend(context.values);

        let seasonal = if context.features.time_features {
            seasonal_factor(context.statistics, target, HOURLY_WEIGHT)
        } else {
            1.0
        };
        let value = (moving_average + trend) * seasonal;

        let volatility = population_std_dev(trailing_window(context.values, WINDOW));
        let confidence = volatility_confidence(
            volatility,
            context.statistics.std_dev * SPREAD_SCALE,
            CONFIDENCE_FLOOR,
        );

        Ok(StepForecast {
            value: value.max(0.0),
            confidence,
        })
    }
}

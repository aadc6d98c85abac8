//! Exponentially weighted recent mean
//!
//! The last 48 observations are averaged with weight `exp(i/len)`, so the
//! newest point counts `e` times as much as the oldest. Confidence falls as
//! the window's volatility approaches the whole series' spread.

use super::{
    seasonal_factor, volatility_confidence, ForecastContext, ForecastModel, ModelType,
    StepForecast,
};
use crate::error::Result;
use energy_math::calendar::CalendarFields;
use energy_math::smoothing::{exponential_weighted_mean, trailing_window};
use energy_math::statistics::population_std_dev;

pub const WINDOW: usize = 48;
pub const CONFIDENCE_FLOOR: f64 = 0.5;
const HOURLY_WEIGHT: f64 = 0.6;

#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedRecent;

impl ForecastModel for WeightedRecent {
    fn model_type(&self) -> ModelType {
        ModelType::WeightedRecent
    }

    fn predict(
        &self,
        context: &ForecastContext<'_>,
        target: &CalendarFields,
    ) -> Result<StepForecast> {
        let recent = trailing_window(context.values, WINDOW);
        let mut value = exponential_weighted_mean(recent)?;

        if context.features.time_features {
            value *= seasonal_factor(context.statistics, target, HOURLY_WEIGHT);
        }

        let volatility = population_std_dev(recent);
        let confidence =
            volatility_confidence(volatility, context.statistics.std_dev, CONFIDENCE_FLOOR);

        Ok(StepForecast {
            value: value.max(0.0),
            confidence,
        })
    }
}

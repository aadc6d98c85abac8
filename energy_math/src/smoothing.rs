//! Window-based smoothing primitives
//!
//! Contains:
//! - Trailing (simple) moving average over the last `n` values
//! - Exponentially weighted mean favouring the most recent values
//! - Window trend (difference of two consecutive window means)

use crate::{MathError, Result};
use statrs::statistics::Statistics;

/// The last `window` values of `values` (all of them when shorter)
pub fn trailing_window(values: &[f64], window: usize) -> &[f64] {
    let start = values.len().saturating_sub(window);
    &values[start..]
}

/// Mean of the last `window` values
pub fn trailing_mean(values: &[f64], window: usize) -> Result<f64> {
    if window == 0 {
        return Err(MathError::InvalidInput(
            "Window must be greater than zero".to_string(),
        ));
    }
    let recent = trailing_window(values, window);
    if recent.is_empty() {
        return Err(MathError::InsufficientData(
            "trailing mean: no values".to_string(),
        ));
    }
    Ok(recent.iter().mean())
}

/// Weighted mean with weight `exp(i / len)` for the value at index `i`
///
/// The newest value weighs `e` times the oldest one.
pub fn exponential_weighted_mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "weighted mean: no values".to_string(),
        ));
    }

    let len = values.len() as f64;
    let (weighted_sum, weight_total) =
        values
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(sum, total), (i, &value)| {
                let weight = (i as f64 / len).exp();
                (sum + value * weight, total + weight)
            });

    Ok(weighted_sum / weight_total)
}

/// Mean of the last `window` values minus the mean of the `window` before them
///
/// `None` when fewer than `2 * window` values are available.
pub fn window_trend(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < 2 * window {
        return None;
    }
    let n = values.len();
    let newer = &values[n - window..];
    let older = &values[n - 2 * window..n - window];
    Some(newer.iter().mean() - older.iter().mean())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_trailing_window() {
        let data = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(trailing_window(&data, 2), &[3.0, 4.0]);
        assert_eq!(trailing_window(&data, 10), &data);
    }

    #[test]
    fn test_trailing_mean() {
        let data = [10.0, 20.0, 30.0, 40.0];
        assert_relative_eq!(trailing_mean(&data, 2).unwrap(), 35.0);
        assert_relative_eq!(trailing_mean(&data, 8).unwrap(), 25.0);
        assert!(trailing_mean(&data, 0).is_err());
        assert!(trailing_mean(&[], 3).is_err());
    }

    #[test]
    fn test_weighted_mean_leans_recent() {
        let rising: Vec<f64> = (0..48).map(|i| i as f64).collect();
        let weighted = exponential_weighted_mean(&rising).unwrap();
        let plain = rising.iter().sum::<f64>() / rising.len() as f64;
        assert!(weighted > plain);

        let flat = vec![7.5; 30];
        assert_relative_eq!(exponential_weighted_mean(&flat).unwrap(), 7.5, epsilon = 1e-12);
    }

    #[test]
    fn test_window_trend() {
        let mut data = vec![100.0; 24];
        data.extend(vec![110.0; 24]);
        assert_relative_eq!(window_trend(&data, 24).unwrap(), 10.0);
        assert!(window_trend(&data[..47], 24).is_none());
    }
}

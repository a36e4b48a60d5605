//! Weight-trend smoothing
//!
//! Exponentially weighted moving average with a constant-width noise band.
//!
//! # Formula
//!
//! > alpha = 2 / (window_size + 1)
//! > smoothed[0] = w[0]
//! > smoothed[i] = alpha * w[i] + (1 - alpha) * smoothed[i - 1]
//!
//! The band is `smoothed ± multiplier * sigma`, where sigma is the population
//! standard deviation of the residuals `w[i] - smoothed[i]` over the whole
//! input. It describes day-to-day scale noise, not a forecast interval, so it
//! does not widen over time.

use crate::config::SmoothingConfig;
use crate::stats::{linear_slope, population_std_dev};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Smoothed trend with its noise envelope; all series share the input length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EwmaBand {
    pub smoothed: Vec<f64>,
    pub upper_band: Vec<f64>,
    pub lower_band: Vec<f64>,
    /// Residual standard deviation the band was built from
    pub sigma: f64,
}

impl EwmaBand {
    /// Most recent trend value
    pub fn latest(&self) -> Option<f64> {
        self.smoothed.last().copied()
    }

    /// Least-squares slope over the last `points` smoothed values
    pub fn recent_slope(&self, points: usize) -> Option<f64> {
        if points < 2 || self.smoothed.len() < points {
            return None;
        }
        trend_slope(&self.smoothed[self.smoothed.len() - points..])
    }

    pub fn len(&self) -> usize {
        self.smoothed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.smoothed.is_empty()
    }
}

/// Smooth a weight series with the default minimum point count
pub fn ewma(weights: &[f64], window_size: usize, band_multiplier: f64) -> Option<EwmaBand> {
    ewma_with(
        weights,
        &SmoothingConfig {
            window_size,
            band_multiplier,
            ..SmoothingConfig::default()
        },
    )
}

/// Smooth a weight series
///
/// Returns `None` for fewer than `config.min_points` values, a zero window,
/// or any non-finite value.
pub fn ewma_with(weights: &[f64], config: &SmoothingConfig) -> Option<EwmaBand> {
    if weights.len() < config.min_points {
        trace!(points = weights.len(), "Too few points to smooth");
        return None;
    }
    if config.window_size == 0 || !config.band_multiplier.is_finite() {
        return None;
    }
    if weights.iter().any(|w| !w.is_finite()) {
        return None;
    }

    let alpha = 2.0 / (config.window_size as f64 + 1.0);

    let (&first, rest) = weights.split_first()?;
    let mut smoothed = Vec::with_capacity(weights.len());
    let mut previous = first;
    smoothed.push(previous);
    for &weight in rest {
        // Same as alpha * w + (1 - alpha) * prev, but exact for flat input
        previous += alpha * (weight - previous);
        smoothed.push(previous);
    }

    let residuals: Vec<f64> = weights
        .iter()
        .zip(&smoothed)
        .map(|(w, s)| w - s)
        .collect();
    let sigma = population_std_dev(&residuals)?;
    let half_width = config.band_multiplier * sigma;

    let upper_band = smoothed.iter().map(|s| s + half_width).collect();
    let lower_band = smoothed.iter().map(|s| s - half_width).collect();

    Some(EwmaBand {
        smoothed,
        upper_band,
        lower_band,
        sigma,
    })
}

/// Slope of a series per point, used to spot plateaus
pub fn trend_slope(values: &[f64]) -> Option<f64> {
    linear_slope(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_too_few_points() {
        assert!(ewma(&[], 7, 1.5).is_none());
        assert!(ewma(&[80.0, 79.9, 79.8, 79.7], 7, 1.5).is_none());
        assert!(ewma(&[80.0, 79.9, 79.8, 79.7, 79.6], 7, 1.5).is_some());
    }

    #[test]
    fn test_explicit_window_keeps_default_min_points() {
        assert!(ewma(&[80.0, 79.8, 79.9, 79.7], 2, 1.0).is_none());
        let band = ewma(&[80.0, 79.8, 79.9, 79.7, 79.6], 2, 1.0).unwrap();
        assert_eq!(band.len(), 5);
    }

    #[test]
    fn test_constant_series_has_zero_width_band() {
        let result = ewma(&[72.4; 5], 7, 1.5).unwrap();
        assert!(result.smoothed.iter().all(|s| *s == 72.4));
        assert_eq!(result.sigma, 0.0);
        assert_eq!(result.upper_band, result.smoothed);
        assert_eq!(result.lower_band, result.smoothed);
    }

    #[test]
    fn test_recurrence() {
        // window 3 -> alpha 0.5
        let result = ewma(&[10.0, 20.0, 20.0, 20.0, 20.0], 3, 1.0).unwrap();
        assert_eq!(result.smoothed, vec![10.0, 15.0, 17.5, 18.75, 19.375]);
    }

    #[test]
    fn test_band_is_constant_width() {
        let result = ewma(&[80.0, 80.6, 79.7, 80.2, 79.4, 79.9, 79.1], 7, 1.5).unwrap();
        assert!(result.sigma > 0.0);
        for i in 0..result.len() {
            let width = result.upper_band[i] - result.lower_band[i];
            assert!((width - 3.0 * result.sigma).abs() < 1e-9);
        }
    }

    #[test]
    fn test_non_finite_input_rejected() {
        assert!(ewma(&[80.0, f64::NAN, 79.8, 79.7, 79.6], 7, 1.5).is_none());
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(ewma(&[80.0; 6], 0, 1.5).is_none());
    }

    #[test]
    fn test_recent_slope() {
        let result = ewma(&[80.0, 80.0, 80.0, 80.0, 80.0, 80.0], 7, 1.5).unwrap();
        assert_eq!(result.recent_slope(4), Some(0.0));
        assert_eq!(result.recent_slope(10), None);
        assert_eq!(result.latest(), Some(80.0));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: every output series has the input length
        #[test]
        fn prop_lengths_match(
            weights in prop::collection::vec(40.0f64..200.0, 5..60),
            window in 1usize..30
        ) {
            let result = ewma(&weights, window, 1.5).unwrap();
            prop_assert_eq!(result.smoothed.len(), weights.len());
            prop_assert_eq!(result.upper_band.len(), weights.len());
            prop_assert_eq!(result.lower_band.len(), weights.len());
        }

        /// Property: the trend stays within the range of the input
        #[test]
        fn prop_smoothed_within_input_range(
            weights in prop::collection::vec(40.0f64..200.0, 5..60)
        ) {
            let result = ewma(&weights, 7, 1.5).unwrap();
            let min = weights.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = weights.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            for s in &result.smoothed {
                prop_assert!(*s >= min - 1e-9 && *s <= max + 1e-9);
            }
        }

        /// Property: repeated calls are bit-identical
        #[test]
        fn prop_idempotent(weights in prop::collection::vec(40.0f64..200.0, 5..30)) {
            prop_assert_eq!(ewma(&weights, 7, 1.5), ewma(&weights, 7, 1.5));
        }
    }
}

//! Correlation between intake and outcome series
//!
//! Series are paired by position; date alignment is the caller's job (see
//! [`crate::align::calorie_weight_change_pairs`]).

use crate::config::CorrelationConfig;
use crate::stats::pearson;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Qualitative strength of `|r|`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    None,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl CorrelationStrength {
    /// Bucket a coefficient using the configured lower bounds
    pub fn classify(coefficient: f64, config: &CorrelationConfig) -> Self {
        let magnitude = coefficient.abs();
        if magnitude < config.weak_threshold {
            CorrelationStrength::None
        } else if magnitude < config.moderate_threshold {
            CorrelationStrength::Weak
        } else if magnitude < config.strong_threshold {
            CorrelationStrength::Moderate
        } else if magnitude < config.very_strong_threshold {
            CorrelationStrength::Strong
        } else {
            CorrelationStrength::VeryStrong
        }
    }

    /// Capitalized label used at the start of a sentence
    pub fn description(&self) -> &'static str {
        match self {
            CorrelationStrength::None => "No meaningful",
            CorrelationStrength::Weak => "Weak",
            CorrelationStrength::Moderate => "Moderate",
            CorrelationStrength::Strong => "Strong",
            CorrelationStrength::VeryStrong => "Very strong",
        }
    }
}

/// Sign of the relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationDirection {
    Positive,
    Negative,
}

impl fmt::Display for CorrelationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrelationDirection::Positive => write!(f, "positive"),
            CorrelationDirection::Negative => write!(f, "negative"),
        }
    }
}

/// Correlation result
///
/// A `None` strength is still returned; callers decide whether to hide it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Correlation {
    pub coefficient: f64,
    pub strength: CorrelationStrength,
    pub direction: CorrelationDirection,
    pub description: String,
    /// Number of pairs the coefficient was computed over
    pub sample_size: usize,
}

/// Correlate two series with the default thresholds
pub fn correlate(
    series_a: &[f64],
    series_b: &[f64],
    label_a: &str,
    label_b: &str,
) -> Option<Correlation> {
    correlate_with(series_a, series_b, label_a, label_b, &CorrelationConfig::default())
}

/// Correlate two series
///
/// Both are truncated to the shorter length. `None` when fewer than
/// `config.min_points` pairs remain, a value is non-finite, or either side
/// has zero variance.
pub fn correlate_with(
    series_a: &[f64],
    series_b: &[f64],
    label_a: &str,
    label_b: &str,
    config: &CorrelationConfig,
) -> Option<Correlation> {
    let len = series_a.len().min(series_b.len());
    if len < config.min_points {
        trace!(pairs = len, "Too few pairs to correlate");
        return None;
    }
    let xs = &series_a[..len];
    let ys = &series_b[..len];
    if xs.iter().chain(ys).any(|v| !v.is_finite()) {
        return None;
    }

    let coefficient = pearson(xs, ys)?;
    let strength = CorrelationStrength::classify(coefficient, config);
    let direction = if coefficient >= 0.0 {
        CorrelationDirection::Positive
    } else {
        CorrelationDirection::Negative
    };

    let description = match strength {
        CorrelationStrength::None => format!(
            "No meaningful correlation between {} and {}",
            label_a, label_b
        ),
        _ => format!(
            "{} {} correlation between {} and {}",
            strength.description(),
            direction,
            label_a,
            label_b
        ),
    };

    Some(Correlation {
        coefficient,
        strength,
        direction,
        description,
        sample_size: len,
    })
}

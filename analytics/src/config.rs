//! Tunable engine parameters
//!
//! Every numeric policy constant the engine uses lives here, grouped per
//! component. Configuration is layered:
//! 1. Default values (in code, matching the documented policy)
//! 2. An optional TOML document supplied by the caller; any field it omits
//!    keeps its default
//!
//! The engine never reads files or the environment itself; callers load the
//! document however they like and hand over the text.

use crate::errors::Result;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EngineConfig {
    #[validate(nested)]
    pub alignment: AlignmentConfig,
    #[validate(nested)]
    pub smoothing: SmoothingConfig,
    #[validate(nested)]
    pub consistency: ConsistencyConfig,
    #[validate(nested)]
    pub correlation: CorrelationConfig,
    #[validate(nested)]
    pub adherence: AdherenceConfig,
    #[validate(nested)]
    pub projection: ProjectionConfig,
    #[validate(nested)]
    pub insights: InsightConfig,
}

impl EngineConfig {
    /// Parse a (possibly partial) TOML document and validate the result
    ///
    /// ```toml
    /// [smoothing]
    /// window_size = 10
    ///
    /// [adherence]
    /// calorie_tolerance = 0.15
    /// ```
    pub fn from_toml_str(document: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(document)?;
        config.validated()
    }

    /// Run all range and cross-field checks, returning the config unchanged
    pub fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }
}

// ============================================================================
// Series Alignment
// ============================================================================

/// Series aligner settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AlignmentConfig {
    /// Trailing window used when the caller does not pick one
    #[validate(range(min = 1))]
    pub default_window_days: u32,
    /// Windows up to this many days are labelled with weekday tokens,
    /// longer windows with `M/D`
    pub weekday_label_max_days: u32,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            default_window_days: 30,
            weekday_label_max_days: 7,
        }
    }
}

// ============================================================================
// EWMA Smoothing
// ============================================================================

/// Weight-trend smoothing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Span `N` in `alpha = 2 / (N + 1)`
    #[validate(range(min = 1))]
    pub window_size: usize,
    /// Band half-width in residual standard deviations
    #[validate(range(min = 0.0))]
    pub band_multiplier: f64,
    /// Fewer points than this produce no trend
    #[validate(range(min = 2))]
    pub min_points: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window_size: 7,
            band_multiplier: 1.5,
            min_points: 5,
        }
    }
}

// ============================================================================
// Consistency
// ============================================================================

/// Macro consistency settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ConsistencyConfig {
    #[validate(range(min = 2))]
    pub min_days: usize,
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        Self { min_days: 3 }
    }
}

// ============================================================================
// Correlation
// ============================================================================

/// Correlation settings; thresholds are lower bounds on `|r|`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_strength_thresholds"))]
pub struct CorrelationConfig {
    #[validate(range(min = 3))]
    pub min_points: usize,
    pub weak_threshold: f64,
    pub moderate_threshold: f64,
    pub strong_threshold: f64,
    pub very_strong_threshold: f64,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            min_points: 5,
            weak_threshold: 0.2,
            moderate_threshold: 0.4,
            strong_threshold: 0.6,
            very_strong_threshold: 0.8,
        }
    }
}

fn validate_strength_thresholds(config: &CorrelationConfig) -> std::result::Result<(), ValidationError> {
    let ordered = [
        0.0,
        config.weak_threshold,
        config.moderate_threshold,
        config.strong_threshold,
        config.very_strong_threshold,
        1.0,
    ];
    if ordered.windows(2).all(|pair| pair[0] < pair[1]) {
        Ok(())
    } else {
        Err(config_error(
            "correlation_thresholds",
            "correlation thresholds must be strictly increasing within (0, 1)",
        ))
    }
}

// ============================================================================
// Adherence
// ============================================================================

/// Adherence scoring settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_adherence"))]
pub struct AdherenceConfig {
    /// Allowed relative deviation from the calorie goal
    #[validate(range(min = 0.0, max = 1.0))]
    pub calorie_tolerance: f64,
    /// Fraction of the protein goal that counts as meeting it
    #[validate(range(min = 0.0, max = 2.0))]
    pub protein_threshold: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub calorie_weight: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub protein_weight: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub logging_weight: f64,
    /// Minimum overall score for A+, A, B, C and D, in that order
    pub grade_thresholds: [u8; 5],
}

impl Default for AdherenceConfig {
    fn default() -> Self {
        Self {
            calorie_tolerance: 0.10,
            protein_threshold: 0.90,
            calorie_weight: 0.40,
            protein_weight: 0.35,
            logging_weight: 0.25,
            grade_thresholds: [90, 80, 70, 60, 50],
        }
    }
}

fn validate_adherence(config: &AdherenceConfig) -> std::result::Result<(), ValidationError> {
    let total = config.calorie_weight + config.protein_weight + config.logging_weight;
    if (total - 1.0).abs() > 1e-6 {
        return Err(config_error(
            "adherence_weights",
            "adherence weights must sum to 1.0",
        ));
    }
    let thresholds = &config.grade_thresholds;
    if thresholds[0] > 100 || !thresholds.windows(2).all(|pair| pair[0] > pair[1]) {
        return Err(config_error(
            "grade_thresholds",
            "grade thresholds must be strictly decreasing and at most 100",
        ));
    }
    Ok(())
}

// ============================================================================
// Goal Projection
// ============================================================================

/// Goal progress projection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_status_thresholds"))]
pub struct ProjectionConfig {
    #[validate(range(min = 2))]
    pub min_entries: usize,
    /// Histories spanning less than this many weeks are too short to rate
    #[validate(range(min = 0.0))]
    pub min_weeks_elapsed: f64,
    pub ahead_percent: u32,
    pub on_track_percent: u32,
    pub behind_percent: u32,
    /// Weekly rates with a smaller magnitude count as "no movement"
    #[validate(range(min = 0.0))]
    pub rate_epsilon: f64,
    /// Projections further out than this are withheld
    #[validate(range(min = 1.0))]
    pub max_projection_weeks: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            min_entries: 3,
            min_weeks_elapsed: 0.1,
            ahead_percent: 100,
            on_track_percent: 70,
            behind_percent: 30,
            rate_epsilon: 1e-3,
            max_projection_weeks: 260.0,
        }
    }
}

fn validate_status_thresholds(config: &ProjectionConfig) -> std::result::Result<(), ValidationError> {
    if config.ahead_percent > config.on_track_percent && config.on_track_percent > config.behind_percent {
        Ok(())
    } else {
        Err(config_error(
            "status_thresholds",
            "status thresholds must satisfy ahead > on_track > behind",
        ))
    }
}

// ============================================================================
// Insights
// ============================================================================

/// Insight rule settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct InsightConfig {
    /// Below this many daily records no insight is generated
    #[validate(range(min = 1))]
    pub min_daily_records: usize,
    /// Consecutive days over the calorie goal that trigger a warning
    #[validate(range(min = 2))]
    pub overage_run_days: usize,
    /// Smoothed points examined for a plateau
    #[validate(range(min = 3))]
    pub plateau_points: usize,
    /// Absolute trend slope (weight units per entry) treated as flat
    #[validate(range(min = 0.0))]
    pub plateau_slope: f64,
    /// Trailing window (days) for adherence and logging-gap checks
    #[validate(range(min = 1))]
    pub recent_window_days: u32,
    /// Days logged inside the recent window below which a tip fires
    pub min_logged_in_window: u32,
    #[validate(range(max = 100))]
    pub protein_shortfall_percent: u8,
    #[validate(range(max = 100))]
    pub strong_adherence_score: u8,
    #[validate(range(max = 100))]
    pub steady_intake_percent: u8,
    #[validate(range(max = 100))]
    pub erratic_intake_percent: u8,
    #[validate(length(min = 1))]
    pub streak_milestones: Vec<u32>,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            min_daily_records: 5,
            overage_run_days: 3,
            plateau_points: 14,
            plateau_slope: 0.02,
            recent_window_days: 7,
            min_logged_in_window: 5,
            protein_shortfall_percent: 50,
            strong_adherence_score: 80,
            steady_intake_percent: 80,
            erratic_intake_percent: 50,
            streak_milestones: vec![7, 14, 30, 60, 100, 180, 365],
        }
    }
}

fn config_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.smoothing.window_size, 7);
        assert_eq!(config.smoothing.band_multiplier, 1.5);
        assert_eq!(config.consistency.min_days, 3);
        assert_eq!(config.adherence.grade_thresholds, [90, 80, 70, 60, 50]);
        assert_eq!(config.projection.ahead_percent, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [smoothing]
            window_size = 10

            [adherence]
            calorie_tolerance = 0.15
            "#,
        )
        .unwrap();

        assert_eq!(config.smoothing.window_size, 10);
        assert_eq!(config.smoothing.band_multiplier, 1.5);
        assert_eq!(config.adherence.calorie_tolerance, 0.15);
        assert_eq!(config.adherence.protein_threshold, 0.90);
        assert_eq!(config.insights, InsightConfig::default());
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_adherence_weights_must_sum_to_one() {
        let result = EngineConfig::from_toml_str(
            r#"
            [adherence]
            calorie_weight = 0.5
            protein_weight = 0.5
            logging_weight = 0.5
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_unordered_correlation_thresholds_rejected() {
        let mut config = EngineConfig::default();
        config.correlation.moderate_threshold = 0.1;
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_zero_window_rejected() {
        let mut config = EngineConfig::default();
        config.smoothing.window_size = 0;
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = EngineConfig::from_toml_str("[smoothing\nwindow_size = ").unwrap_err();
        assert!(matches!(err, crate::AnalyticsError::Parse(_)));
    }
}

//! Macro consistency scoring
//!
//! Consistency is the inverse of day-to-day dispersion. Each macro's
//! dispersion is its coefficient of variation (population stdev / mean),
//! which is scale-free, so grams of fat and kilocalories can be averaged.

use crate::config::ConsistencyConfig;
use crate::models::MacroDay;
use crate::stats::{clamp_percent, coefficient_of_variation};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Consistency of intake over a run of logged days
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroConsistency {
    /// 0-100, higher is steadier
    pub overall_consistency: u8,
    #[serde(rename = "calorieCV")]
    pub calorie_cv: f64,
    #[serde(rename = "proteinCV")]
    pub protein_cv: f64,
    #[serde(rename = "carbsCV")]
    pub carbs_cv: f64,
    #[serde(rename = "fatCV")]
    pub fat_cv: f64,
}

/// Per-macro consistency percentages shown next to each macro
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroPercentages {
    pub calories: u8,
    pub protein: u8,
    pub carbs: u8,
    pub fat: u8,
}

impl MacroConsistency {
    pub fn percentages(&self) -> MacroPercentages {
        MacroPercentages {
            calories: consistency_percent(self.calorie_cv),
            protein: consistency_percent(self.protein_cv),
            carbs: consistency_percent(self.carbs_cv),
            fat: consistency_percent(self.fat_cv),
        }
    }
}

/// `round((1 - cv) * 100)` clamped to `[0, 100]`
pub fn consistency_percent(cv: f64) -> u8 {
    clamp_percent((1.0 - cv) * 100.0)
}

/// Score macro consistency with the default minimum of three days
pub fn macro_consistency(days: &[MacroDay]) -> Option<MacroConsistency> {
    macro_consistency_with(days, &ConsistencyConfig::default())
}

/// Score macro consistency
///
/// Days with a non-finite or negative amount are skipped; `None` when fewer
/// than `config.min_days` usable days remain.
pub fn macro_consistency_with(
    days: &[MacroDay],
    config: &ConsistencyConfig,
) -> Option<MacroConsistency> {
    let usable: Vec<&MacroDay> = days.iter().filter(|d| is_usable(d)).collect();
    if usable.len() < config.min_days {
        trace!(days = usable.len(), "Too few days for consistency");
        return None;
    }

    let cv_of = |pick: fn(&MacroDay) -> f64| -> Option<f64> {
        let values: Vec<f64> = usable.iter().map(|d| pick(d)).collect();
        coefficient_of_variation(&values)
    };

    let calorie_cv = cv_of(|d| d.calories)?;
    let protein_cv = cv_of(|d| d.protein)?;
    let carbs_cv = cv_of(|d| d.carbs)?;
    let fat_cv = cv_of(|d| d.fat)?;

    let average_cv = (calorie_cv + protein_cv + carbs_cv + fat_cv) / 4.0;

    Some(MacroConsistency {
        overall_consistency: clamp_percent(100.0 * (1.0 - average_cv)),
        calorie_cv,
        protein_cv,
        carbs_cv,
        fat_cv,
    })
}

fn is_usable(day: &MacroDay) -> bool {
    [day.calories, day.protein, day.carbs, day.fat]
        .iter()
        .all(|v| v.is_finite() && *v >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn macros(calories: f64, protein: f64, carbs: f64, fat: f64) -> MacroDay {
        MacroDay {
            calories,
            protein,
            carbs,
            fat,
        }
    }

    #[test]
    fn test_requires_three_days() {
        let days = vec![macros(2000.0, 120.0, 200.0, 60.0); 2];
        assert!(macro_consistency(&days).is_none());
    }

    #[test]
    fn test_constant_intake_is_fully_consistent() {
        let days = vec![macros(2000.0, 120.0, 200.0, 60.0); 5];
        let result = macro_consistency(&days).unwrap();
        assert_eq!(result.overall_consistency, 100);
        assert_eq!(result.calorie_cv, 0.0);
        assert_eq!(result.percentages().fat, 100);
    }

    #[test]
    fn test_zero_mean_macro_counts_as_consistent() {
        // Never logs fat: CV defined as 0 rather than NaN
        let days = vec![
            macros(2000.0, 120.0, 200.0, 0.0),
            macros(2000.0, 120.0, 200.0, 0.0),
            macros(2000.0, 120.0, 200.0, 0.0),
        ];
        let result = macro_consistency(&days).unwrap();
        assert_eq!(result.fat_cv, 0.0);
        assert_eq!(result.overall_consistency, 100);
    }

    #[test]
    fn test_known_cv() {
        // Calories 1000/3000: mean 2000, stdev 1000, CV 0.5; others flat
        let days = vec![
            macros(1000.0, 100.0, 100.0, 50.0),
            macros(3000.0, 100.0, 100.0, 50.0),
            macros(1000.0, 100.0, 100.0, 50.0),
            macros(3000.0, 100.0, 100.0, 50.0),
        ];
        let result = macro_consistency(&days).unwrap();
        assert!((result.calorie_cv - 0.5).abs() < 1e-12);
        // average CV 0.125 -> 87.5 -> rounds to 88
        assert_eq!(result.overall_consistency, 88);
        assert_eq!(result.percentages().calories, 50);
    }

    #[test]
    fn test_wildly_varying_intake_clamps_to_zero() {
        let days = vec![
            macros(0.0, 0.0, 0.0, 0.0),
            macros(0.0, 0.0, 0.0, 0.0),
            macros(0.0, 0.0, 0.0, 0.0),
            macros(9000.0, 400.0, 900.0, 300.0),
        ];
        let result = macro_consistency(&days).unwrap();
        assert_eq!(result.overall_consistency, 0);
        assert_eq!(result.percentages().protein, 0);
    }

    #[test]
    fn test_malformed_days_skipped() {
        let days = vec![
            macros(2000.0, 120.0, 200.0, 60.0),
            macros(f64::NAN, 120.0, 200.0, 60.0),
            macros(2000.0, 120.0, 200.0, 60.0),
        ];
        assert!(macro_consistency(&days).is_none());
    }

    #[test]
    fn test_serialized_field_names() {
        let days = vec![macros(2000.0, 120.0, 200.0, 60.0); 3];
        let json = serde_json::to_value(macro_consistency(&days).unwrap()).unwrap();
        assert_eq!(json["overallConsistency"], 100);
        assert_eq!(json["calorieCV"], 0.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: the overall score is always a valid percentage
        #[test]
        fn prop_overall_in_range(
            days in prop::collection::vec(
                (0.0f64..5000.0, 0.0f64..300.0, 0.0f64..600.0, 0.0f64..200.0),
                3..30
            )
        ) {
            let days: Vec<MacroDay> = days
                .into_iter()
                .map(|(c, p, cb, f)| macros(c, p, cb, f))
                .collect();
            let result = macro_consistency(&days).unwrap();
            prop_assert!(result.overall_consistency <= 100);
        }
    }
}

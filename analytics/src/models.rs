//! Record types the engine consumes
//!
//! Callers build these at the boundary. The `new` constructors validate
//! finiteness and sign; struct literals remain possible, which is why the
//! aligner re-checks every record with [`DailyRecord::is_valid`] and
//! [`WeightEntry::is_valid`] before using it.

use crate::errors::{AnalyticsError, Result};
use crate::validation::{
    validate_calories, validate_finite, validate_goal, validate_grams, validate_weight,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Nutrition
// ============================================================================

/// One day of logged food with the goals that applied that day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub goal_calories: f64,
    pub goal_protein: f64,
}

impl DailyRecord {
    /// Build a record, rejecting non-finite or negative amounts
    pub fn new(
        date: NaiveDate,
        calories: f64,
        protein: f64,
        carbs: f64,
        fat: f64,
        goal_calories: f64,
        goal_protein: f64,
    ) -> Result<Self> {
        let record = Self {
            date,
            calories,
            protein,
            carbs,
            fat,
            goal_calories,
            goal_protein,
        };
        record.check().map_err(|reason| {
            AnalyticsError::InvalidRecord(format!("{} on {}", reason, date))
        })?;
        Ok(record)
    }

    fn check(&self) -> std::result::Result<(), String> {
        validate_calories(self.calories)?;
        validate_grams("Protein", self.protein)?;
        validate_grams("Carbs", self.carbs)?;
        validate_grams("Fat", self.fat)?;
        validate_goal("Calorie goal", self.goal_calories)?;
        validate_goal("Protein goal", self.goal_protein)?;
        Ok(())
    }

    /// Whether every field is finite and non-negative
    pub fn is_valid(&self) -> bool {
        self.check().is_ok()
    }

    /// Macro totals for consistency scoring
    pub fn macros(&self) -> MacroDay {
        MacroDay {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
        }
    }

    /// Intake against goals for adherence scoring
    pub fn adherence_day(&self) -> AdherenceDay {
        AdherenceDay {
            calories: self.calories,
            goal: self.goal_calories,
            protein: self.protein,
            protein_goal: self.goal_protein,
        }
    }

    /// Whether intake exceeded the calorie goal
    pub fn is_over_goal(&self) -> bool {
        self.goal_calories > 0.0 && self.calories > self.goal_calories
    }
}

/// Daily macro totals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroDay {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Daily intake paired with its goals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdherenceDay {
    pub calories: f64,
    pub goal: f64,
    pub protein: f64,
    pub protein_goal: f64,
}

// ============================================================================
// Body Weight
// ============================================================================

/// A body-weight measurement; the unit is whatever the profile uses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub date: NaiveDate,
    pub weight: f64,
}

impl WeightEntry {
    /// Build an entry, rejecting non-finite or non-positive weights
    pub fn new(date: NaiveDate, weight: f64) -> Result<Self> {
        validate_weight(weight).map_err(|reason| {
            AnalyticsError::InvalidRecord(format!("{} on {}", reason, date))
        })?;
        Ok(Self { date, weight })
    }

    pub fn is_valid(&self) -> bool {
        validate_weight(self.weight).is_ok()
    }
}

// ============================================================================
// Series
// ============================================================================

/// One slot of an aligned series
///
/// `value` is `None` only in dense series, for a day with no record. Such
/// slots keep their chart position but are excluded from statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub index: usize,
    pub value: Option<f64>,
    pub label: String,
}

// ============================================================================
// Goals
// ============================================================================

/// The user's weight goal for one analysis call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalContext {
    pub start_weight: f64,
    pub current_weight: f64,
    pub goal_weight: f64,
    /// Planned change per week; the sign is taken from the goal direction
    pub expected_rate_per_week: f64,
    pub start_date: NaiveDate,
}

impl GoalContext {
    /// Build a goal, rejecting non-positive weights or a non-finite rate
    pub fn new(
        start_weight: f64,
        current_weight: f64,
        goal_weight: f64,
        expected_rate_per_week: f64,
        start_date: NaiveDate,
    ) -> Result<Self> {
        for (name, weight) in [
            ("Start weight", start_weight),
            ("Current weight", current_weight),
            ("Goal weight", goal_weight),
        ] {
            validate_weight(weight)
                .map_err(|reason| AnalyticsError::Validation(reason.replacen("Weight", name, 1)))?;
        }
        validate_finite("Expected rate", expected_rate_per_week).map_err(AnalyticsError::Validation)?;
        Ok(Self {
            start_weight,
            current_weight,
            goal_weight,
            expected_rate_per_week,
            start_date,
        })
    }

    /// -1.0 when the goal is to lose, 1.0 to gain, 0.0 when start equals goal
    pub fn goal_direction(&self) -> f64 {
        let delta = self.goal_weight - self.start_weight;
        if delta > 0.0 {
            1.0
        } else if delta < 0.0 {
            -1.0
        } else {
            0.0
        }
    }

    /// Whether the current weight has reached or passed the goal
    pub fn is_goal_reached(&self) -> bool {
        match self.goal_direction() {
            d if d < 0.0 => self.current_weight <= self.goal_weight,
            d if d > 0.0 => self.current_weight >= self.goal_weight,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_daily_record_rejects_negative_calories() {
        let err = DailyRecord::new(day(1), -10.0, 100.0, 200.0, 50.0, 2000.0, 120.0).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidRecord(_)));
        assert!(err.to_string().contains("Calories cannot be negative"));
    }

    #[test]
    fn test_daily_record_rejects_nan_macro() {
        assert!(DailyRecord::new(day(1), 1800.0, f64::NAN, 200.0, 50.0, 2000.0, 120.0).is_err());
    }

    #[test]
    fn test_daily_record_projections() {
        let record = DailyRecord::new(day(2), 2100.0, 130.0, 220.0, 70.0, 2000.0, 120.0).unwrap();
        assert_eq!(record.macros().carbs, 220.0);
        let adherence = record.adherence_day();
        assert_eq!(adherence.goal, 2000.0);
        assert_eq!(adherence.protein_goal, 120.0);
        assert!(record.is_over_goal());
    }

    #[test]
    fn test_weight_entry_validation() {
        assert!(WeightEntry::new(day(1), 80.0).is_ok());
        assert!(WeightEntry::new(day(1), 0.0).is_err());
        assert!(WeightEntry::new(day(1), f64::INFINITY).is_err());
        assert!(!WeightEntry { date: day(1), weight: -1.0 }.is_valid());
    }

    #[test]
    fn test_goal_direction() {
        let mut goal = GoalContext {
            start_weight: 90.0,
            current_weight: 85.0,
            goal_weight: 80.0,
            expected_rate_per_week: 0.5,
            start_date: day(1),
        };
        assert_eq!(goal.goal_direction(), -1.0);
        assert!(!goal.is_goal_reached());

        goal.current_weight = 79.9;
        assert!(goal.is_goal_reached());

        goal.goal_weight = 95.0;
        assert_eq!(goal.goal_direction(), 1.0);
    }

    #[test]
    fn test_goal_context_validation() {
        assert!(GoalContext::new(90.0, 85.0, 80.0, 0.5, day(1)).is_ok());

        let err = GoalContext::new(90.0, 85.0, 0.0, 0.5, day(1)).unwrap_err();
        assert!(matches!(err, AnalyticsError::Validation(_)));
        assert!(err.to_string().contains("Goal weight must be positive"));

        assert!(GoalContext::new(90.0, 85.0, 80.0, f64::NAN, day(1)).is_err());
    }

    #[test]
    fn test_daily_record_json_shape() {
        let record = DailyRecord::new(day(3), 1900.0, 120.0, 200.0, 60.0, 2000.0, 120.0).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["goalCalories"], 2000.0);
        assert_eq!(json["date"], "2024-03-03");
    }
}

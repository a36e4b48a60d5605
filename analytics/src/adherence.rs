//! Goal adherence scoring
//!
//! Blends three percentages into a 0-100 score:
//! - calorie adherence: logged days within the tolerance band of the goal
//! - protein adherence: logged days reaching the protein threshold
//! - logging consistency: logged days over the days in the period

use crate::config::AdherenceConfig;
use crate::models::AdherenceDay;
use crate::stats::clamp_percent;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Letter grade for an adherence score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Grade a score against the configured minimums for A+, A, B, C, D
    pub fn from_score(score: u8, thresholds: &[u8; 5]) -> Self {
        const GRADES: [Grade; 5] = [Grade::APlus, Grade::A, Grade::B, Grade::C, Grade::D];
        GRADES
            .iter()
            .zip(thresholds)
            .find(|(_, minimum)| score >= **minimum)
            .map(|(grade, _)| *grade)
            .unwrap_or(Grade::F)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Adherence over a period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdherenceScore {
    pub overall_score: u8,
    pub grade: Grade,
    pub calorie_adherence: u8,
    pub protein_adherence: u8,
    pub logging_consistency: u8,
}

impl AdherenceScore {
    fn empty() -> Self {
        Self {
            overall_score: 0,
            grade: Grade::F,
            calorie_adherence: 0,
            protein_adherence: 0,
            logging_consistency: 0,
        }
    }
}

/// Score adherence with the default tolerances and weights
pub fn adherence(days: &[AdherenceDay], period_days: u32) -> AdherenceScore {
    adherence_with(days, period_days, &AdherenceConfig::default())
}

/// Score adherence
///
/// `days` holds one entry per logged day in the period. Entries with a
/// non-finite value are ignored. A zero-length period yields a logging
/// consistency of 0.
pub fn adherence_with(
    days: &[AdherenceDay],
    period_days: u32,
    config: &AdherenceConfig,
) -> AdherenceScore {
    let logged: Vec<&AdherenceDay> = days.iter().filter(|d| is_usable(d)).collect();
    if logged.is_empty() {
        return AdherenceScore::empty();
    }
    let logged_count = logged.len() as f64;

    let on_calories = logged
        .iter()
        .filter(|d| (d.calories - d.goal).abs() <= config.calorie_tolerance * d.goal)
        .count();
    let on_protein = logged
        .iter()
        .filter(|d| d.protein >= config.protein_threshold * d.protein_goal)
        .count();

    let calorie_adherence = clamp_percent(100.0 * on_calories as f64 / logged_count);
    let protein_adherence = clamp_percent(100.0 * on_protein as f64 / logged_count);
    let logging_consistency = if period_days == 0 {
        0
    } else {
        clamp_percent(100.0 * logged_count / f64::from(period_days))
    };

    let overall_score = clamp_percent(
        config.calorie_weight * f64::from(calorie_adherence)
            + config.protein_weight * f64::from(protein_adherence)
            + config.logging_weight * f64::from(logging_consistency),
    );

    AdherenceScore {
        overall_score,
        grade: Grade::from_score(overall_score, &config.grade_thresholds),
        calorie_adherence,
        protein_adherence,
        logging_consistency,
    }
}

fn is_usable(day: &AdherenceDay) -> bool {
    [day.calories, day.goal, day.protein, day.protein_goal]
        .iter()
        .all(|v| v.is_finite())
}

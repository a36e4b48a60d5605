//! Goal progress projection
//!
//! Provides:
//! - Actual weekly rate of change from the weigh-in history
//! - Progress against the planned weekly rate
//! - A calendar projection of when the goal weight is reached
//!
//! # Rate orientation
//! The planned rate is treated as a magnitude pointed toward the goal, so a
//! user losing weight may enter `0.5` or `-0.5` per week. Movement away from
//! the goal counts as zero progress and yields no projection.

use crate::align::clean_weight_history;
use crate::config::ProjectionConfig;
use crate::models::{GoalContext, WeightEntry};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Progress relative to plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Ahead,
    OnTrack,
    Behind,
    Stalled,
}

impl ProgressStatus {
    pub fn from_percent(percent: u32, config: &ProjectionConfig) -> Self {
        if percent >= config.ahead_percent {
            ProgressStatus::Ahead
        } else if percent >= config.on_track_percent {
            ProgressStatus::OnTrack
        } else if percent >= config.behind_percent {
            ProgressStatus::Behind
        } else {
            ProgressStatus::Stalled
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ProgressStatus::Ahead => "Ahead of schedule",
            ProgressStatus::OnTrack => "On track",
            ProgressStatus::Behind => "Behind schedule",
            ProgressStatus::Stalled => "Stalled",
        }
    }
}

/// Progress projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRate {
    /// `None` when not moving toward the goal or the date is too far out
    pub projected_date: Option<NaiveDate>,
    pub status: ProgressStatus,
    pub percent_of_expected: u32,
    /// Signed change per week over the history
    pub actual_rate_per_week: f64,
    /// Planned change per week, signed toward the goal
    pub expected_rate_per_week: f64,
    /// Weeks from the current weight to the goal at the actual rate
    pub weeks_remaining: Option<f64>,
}

/// Project goal progress with the default thresholds
pub fn progress_rate(goal: &GoalContext, history: &[WeightEntry]) -> Option<ProgressRate> {
    progress_rate_with(goal, history, &ProjectionConfig::default())
}

/// Project goal progress
///
/// `None` when fewer than `config.min_entries` valid weigh-ins remain, when
/// they span less than `config.min_weeks_elapsed`, or when a goal weight is
/// not finite.
pub fn progress_rate_with(
    goal: &GoalContext,
    history: &[WeightEntry],
    config: &ProjectionConfig,
) -> Option<ProgressRate> {
    let numbers = [
        goal.start_weight,
        goal.current_weight,
        goal.goal_weight,
        goal.expected_rate_per_week,
    ];
    if numbers.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let history = clean_weight_history(history);
    if history.len() < config.min_entries {
        trace!(entries = history.len(), "Too few weigh-ins to project");
        return None;
    }

    let first = history.first()?;
    let last = history.last()?;
    let weeks_elapsed = (last.date - first.date).num_days() as f64 / 7.0;
    if weeks_elapsed < config.min_weeks_elapsed {
        trace!(weeks_elapsed, "Weigh-ins span too little time to project");
        return None;
    }

    let actual_rate_per_week = (last.weight - first.weight) / weeks_elapsed;
    let direction = goal.goal_direction();
    let expected_rate_per_week = oriented_expected_rate(goal.expected_rate_per_week, direction);

    let percent_of_expected =
        percent_of_expected(actual_rate_per_week, expected_rate_per_week, direction, config);
    let status = ProgressStatus::from_percent(percent_of_expected, config);

    let toward_goal = moves_toward(actual_rate_per_week, direction, config);
    let projected_date = if toward_goal {
        let weeks = (goal.goal_weight - goal.start_weight) / actual_rate_per_week;
        project_date(goal.start_date, weeks, config)
    } else {
        None
    };
    let weeks_remaining = if toward_goal {
        Some(((goal.goal_weight - goal.current_weight) / actual_rate_per_week).max(0.0))
    } else {
        None
    };

    debug!(
        actual_rate_per_week,
        percent_of_expected,
        status = ?status,
        "Projected goal progress"
    );

    Some(ProgressRate {
        projected_date,
        status,
        percent_of_expected,
        actual_rate_per_week,
        expected_rate_per_week,
        weeks_remaining,
    })
}

fn oriented_expected_rate(expected: f64, direction: f64) -> f64 {
    if direction == 0.0 {
        expected
    } else {
        expected.abs() * direction
    }
}

fn moves_toward(rate: f64, direction: f64, config: &ProjectionConfig) -> bool {
    direction != 0.0 && rate.abs() >= config.rate_epsilon && rate.signum() == direction
}

fn percent_of_expected(actual: f64, expected: f64, direction: f64, config: &ProjectionConfig) -> u32 {
    if expected.abs() < config.rate_epsilon {
        // No planned movement: standing still is 0%, any movement the
        // right way is the full 100%
        return if actual.abs() < config.rate_epsilon {
            0
        } else if direction == 0.0 || actual.signum() == direction {
            100
        } else {
            0
        };
    }
    let percent = (100.0 * actual / expected).round();
    if percent <= 0.0 {
        0
    } else {
        percent.min(f64::from(u32::MAX)) as u32
    }
}

fn project_date(start: NaiveDate, weeks: f64, config: &ProjectionConfig) -> Option<NaiveDate> {
    if !weeks.is_finite() || weeks < 0.0 || weeks > config.max_projection_weeks {
        return None;
    }
    let days = (weeks * 7.0).round() as i64;
    start.checked_add_signed(Duration::days(days))
}

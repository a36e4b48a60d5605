//! Shared fixtures for integration tests

#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use nutrition_analytics::{DailyRecord, GoalContext, InsightContext, WeightEntry};
use tracing_subscriber::EnvFilter;

/// Route engine logs to the test harness; set `RUST_LOG=debug` to see them
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

pub fn date(offset: i64) -> NaiveDate {
    start_date() + Duration::days(offset)
}

/// `days` food logs slightly under a 2000 kcal goal with protein on target
pub fn cutting_records(days: i64) -> Vec<DailyRecord> {
    (0..days)
        .map(|d| {
            DailyRecord::new(
                date(d),
                1900.0 + (d % 4) as f64 * 25.0,
                155.0,
                190.0,
                62.0,
                2000.0,
                150.0,
            )
            .unwrap()
        })
        .collect()
}

/// One weigh-in per day, moving linearly from `from` to `to`
pub fn linear_weights(days: i64, from: f64, to: f64) -> Vec<WeightEntry> {
    let step = (to - from) / (days - 1) as f64;
    (0..days)
        .map(|d| WeightEntry::new(date(d), from + step * d as f64).unwrap())
        .collect()
}

/// One weigh-in per day bouncing between `high` (even days) and `low`
pub fn alternating_weights(days: i64, high: f64, low: f64) -> Vec<WeightEntry> {
    (0..days)
        .map(|d| WeightEntry::new(date(d), if d % 2 == 0 { high } else { low }).unwrap())
        .collect()
}

pub fn cutting_goal(current_weight: f64) -> GoalContext {
    GoalContext {
        start_weight: 80.0,
        current_weight,
        goal_weight: 75.0,
        expected_rate_per_week: 0.5,
        start_date: start_date(),
    }
}

pub fn insight_context(records: Vec<DailyRecord>, weights: Vec<WeightEntry>) -> InsightContext {
    let current_weight = weights.last().map(|w| w.weight).unwrap_or(80.0);
    let logged_dates = records.iter().map(|r| r.date).collect();
    InsightContext {
        daily_data: records,
        weight_history: weights,
        current_weight,
        goal_weight: 75.0,
        start_weight: 80.0,
        expected_weekly_rate: 0.5,
        logged_dates,
        streak: 0,
    }
}

//! Series alignment
//!
//! Turns caller-supplied dated records into index-ordered series for the
//! smoother, scorers and charts. Records arrive unsorted and possibly
//! malformed; alignment sorts them, drops anything non-finite or negative,
//! keeps one record per date (the last one supplied) and never invents
//! values for days without a record.

use crate::config::AlignmentConfig;
use crate::models::{DailyRecord, SeriesPoint, WeightEntry};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// A dated record with a primary numeric value
pub trait Observation {
    fn date(&self) -> NaiveDate;

    /// The value charted by default (calories for food logs, weight for
    /// weigh-ins)
    fn primary_value(&self) -> f64;

    /// Whether the record passes boundary validation
    fn is_well_formed(&self) -> bool;
}

impl Observation for DailyRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn primary_value(&self) -> f64 {
        self.calories
    }

    fn is_well_formed(&self) -> bool {
        self.is_valid()
    }
}

impl Observation for WeightEntry {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn primary_value(&self) -> f64 {
        self.weight
    }

    fn is_well_formed(&self) -> bool {
        self.is_valid()
    }
}

// ============================================================================
// Alignment
// ============================================================================

/// Align records on their primary value
///
/// Keeps the trailing `window_days` ending at `today` (inclusive). With
/// `dense_fill`, every calendar day in the window gets a slot and days
/// without a record hold `None`; otherwise only recorded days appear.
pub fn align<R: Observation>(
    records: &[R],
    window_days: u32,
    today: NaiveDate,
    dense_fill: bool,
) -> Vec<SeriesPoint> {
    align_by(records, window_days, today, dense_fill, R::primary_value)
}

/// Align records on an arbitrary extracted value (protein, fat, ...)
pub fn align_by<R, F>(
    records: &[R],
    window_days: u32,
    today: NaiveDate,
    dense_fill: bool,
    value_of: F,
) -> Vec<SeriesPoint>
where
    R: Observation,
    F: Fn(&R) -> f64,
{
    align_with(
        records,
        window_days,
        today,
        dense_fill,
        &AlignmentConfig::default(),
        value_of,
    )
}

/// [`align_by`] with explicit labelling settings
pub fn align_with<R, F>(
    records: &[R],
    window_days: u32,
    today: NaiveDate,
    dense_fill: bool,
    config: &AlignmentConfig,
    value_of: F,
) -> Vec<SeriesPoint>
where
    R: Observation,
    F: Fn(&R) -> f64,
{
    if window_days == 0 {
        return Vec::new();
    }
    let window_start = window_start(today, window_days);

    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut dropped = 0usize;
    for record in records {
        let date = record.date();
        if date < window_start || date > today {
            continue;
        }
        let value = value_of(record);
        if !record.is_well_formed() || !value.is_finite() || value < 0.0 {
            dropped += 1;
            continue;
        }
        // Later records for the same date replace earlier ones
        by_date.insert(date, value);
    }
    if dropped > 0 {
        debug!(dropped, window_days, "Dropped malformed records during alignment");
    }

    let weekday_labels = window_days <= config.weekday_label_max_days;
    let label_of = |date: NaiveDate| day_label(date, weekday_labels);

    if dense_fill {
        window_start
            .iter_days()
            .take_while(|date| *date <= today)
            .enumerate()
            .map(|(index, date)| SeriesPoint {
                index,
                value: by_date.get(&date).copied(),
                label: label_of(date),
            })
            .collect()
    } else {
        by_date
            .into_iter()
            .enumerate()
            .map(|(index, (date, value))| SeriesPoint {
                index,
                value: Some(value),
                label: label_of(date),
            })
            .collect()
    }
}

/// First day of the trailing `window_days` ending at `today`
///
/// Clamped to the earliest representable date when the window reaches
/// past it.
pub fn window_start(today: NaiveDate, window_days: u32) -> NaiveDate {
    let span = i64::from(window_days.max(1)) - 1;
    today
        .checked_sub_signed(Duration::days(span))
        .unwrap_or(NaiveDate::MIN)
}

/// Values present in a series, in order, skipping empty dense slots
pub fn present_values(points: &[SeriesPoint]) -> Vec<f64> {
    points.iter().filter_map(|p| p.value).collect()
}

/// Short chart label: weekday (`Mon`) or `M/D`
pub fn day_label(date: NaiveDate, weekday: bool) -> String {
    if weekday {
        date.format("%a").to_string()
    } else {
        format!("{}/{}", date.month(), date.day())
    }
}

// ============================================================================
// Record Cleaning
// ============================================================================

/// Valid daily records, ascending by date, one per date (last supplied wins)
pub fn sort_daily_records(records: &[DailyRecord]) -> Vec<DailyRecord> {
    dedupe_by_date(records)
}

/// Valid weight entries, ascending by date, one per date (last supplied wins)
pub fn clean_weight_history(entries: &[WeightEntry]) -> Vec<WeightEntry> {
    dedupe_by_date(entries)
}

fn dedupe_by_date<R: Observation + Clone>(records: &[R]) -> Vec<R> {
    let mut by_date: BTreeMap<NaiveDate, R> = BTreeMap::new();
    for record in records.iter().filter(|r| r.is_well_formed()) {
        by_date.insert(record.date(), record.clone());
    }
    let kept = by_date.len();
    if kept < records.len() {
        trace!(supplied = records.len(), kept, "Collapsed invalid or duplicate records");
    }
    by_date.into_values().collect()
}

// ============================================================================
// Cross-series Pairing
// ============================================================================

/// Position-aligned (calories, weight change) pairs
///
/// For each pair of consecutive weigh-ins, the calories logged on the
/// earlier weigh-in's date are paired with the change to the next
/// weigh-in. Weigh-ins without a food log that day contribute nothing.
pub fn calorie_weight_change_pairs(
    records: &[DailyRecord],
    weights: &[WeightEntry],
) -> (Vec<f64>, Vec<f64>) {
    let calories_by_date: BTreeMap<NaiveDate, f64> = sort_daily_records(records)
        .into_iter()
        .map(|r| (r.date, r.calories))
        .collect();
    let history = clean_weight_history(weights);

    history
        .windows(2)
        .filter_map(|pair| {
            calories_by_date
                .get(&pair[0].date)
                .map(|calories| (*calories, pair[1].weight - pair[0].weight))
        })
        .unzip()
}

// ============================================================================
// Streaks
// ============================================================================

/// Consecutive logged days ending at `as_of`
///
/// A streak that ended yesterday still counts, since today may simply not
/// be logged yet.
pub fn logging_streak(dates: &[NaiveDate], as_of: NaiveDate) -> u32 {
    let logged: std::collections::BTreeSet<NaiveDate> =
        dates.iter().copied().filter(|d| *d <= as_of).collect();

    let mut cursor = if logged.contains(&as_of) {
        as_of
    } else {
        match as_of.pred_opt() {
            Some(yesterday) if logged.contains(&yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut streak = 0;
    while logged.contains(&cursor) {
        streak += 1;
        match cursor.pred_opt() {
            Some(previous) => cursor = previous,
            None => break,
        }
    }
    streak
}

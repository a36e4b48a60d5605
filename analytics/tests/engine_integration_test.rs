//! End-to-end tests across the analysis pipeline

mod common;

use common::*;
use nutrition_analytics::{
    adherence, align, align_by, clean_weight_history, correlate, ewma_with, logging_streak,
    macro_consistency, present_values, progress_rate, sort_daily_records, DailyRecord,
    EngineConfig, Grade, ProgressStatus, WeightEntry,
};

#[test]
fn test_two_week_cut_scenario() {
    init_tracing();
    let records = cutting_records(14);
    let weights = linear_weights(14, 80.0, 78.5);
    let config = EngineConfig::default();

    let values: Vec<f64> = weights.iter().map(|w| w.weight).collect();
    let trend = ewma_with(&values, &config.smoothing).unwrap();
    assert_eq!(trend.len(), 14);
    assert!(trend.smoothed.windows(2).all(|w| w[1] <= w[0]));
    for i in 0..trend.len() {
        assert!(trend.lower_band[i] <= trend.smoothed[i]);
        assert!(trend.smoothed[i] <= trend.upper_band[i]);
    }

    let days: Vec<_> = records.iter().map(DailyRecord::adherence_day).collect();
    let score = adherence(&days, 14);
    assert!(score.overall_score >= 90);
    assert_eq!(score.grade, Grade::APlus);

    let progress = progress_rate(&cutting_goal(78.5), &weights).unwrap();
    assert!(matches!(
        progress.status,
        ProgressStatus::Ahead | ProgressStatus::OnTrack
    ));
    assert!(progress.actual_rate_per_week < 0.0);
    let projected = progress.projected_date.unwrap();
    assert!(projected > date(13));

    let macros: Vec<_> = records.iter().map(DailyRecord::macros).collect();
    let consistency = macro_consistency(&macros).unwrap();
    assert!(consistency.overall_consistency >= 90);
    assert_eq!(consistency.percentages().protein, 100);
}

#[test]
fn test_alignment_windows() {
    let records = cutting_records(14);

    let week = align(&records, 7, date(13), false);
    assert_eq!(week.len(), 7);
    assert_eq!(week[0].label, date(7).format("%a").to_string());
    assert_eq!(week[6].value, Some(records[13].calories));

    let month = align(&records, 30, date(13), true);
    assert_eq!(month.len(), 30);
    assert!(month[..16].iter().all(|p| p.value.is_none()));
    assert_eq!(month[16].label, "3/1");
    assert_eq!(present_values(&month).len(), 14);

    let protein = align_by(&records, 14, date(13), false, |r: &DailyRecord| r.protein);
    assert!(present_values(&protein).iter().all(|p| *p == 155.0));
}

#[test]
fn test_results_do_not_depend_on_input_order() {
    let records = cutting_records(14);
    let weights = linear_weights(14, 80.0, 78.5);
    let mut shuffled_records = records.clone();
    shuffled_records.reverse();
    let mut shuffled_weights = weights.clone();
    shuffled_weights.swap(0, 7);
    shuffled_weights.reverse();

    assert_eq!(sort_daily_records(&shuffled_records), records);
    assert_eq!(clean_weight_history(&shuffled_weights), weights);
    assert_eq!(
        progress_rate(&cutting_goal(78.5), &weights),
        progress_rate(&cutting_goal(78.5), &shuffled_weights)
    );
    assert_eq!(
        align(&records, 14, date(13), true),
        align(&shuffled_records, 14, date(13), true)
    );
}

#[test]
fn test_repeated_calls_are_identical() {
    let weights = linear_weights(21, 82.0, 80.0);
    let values: Vec<f64> = weights.iter().map(|w| w.weight).collect();
    let config = EngineConfig::default();

    assert_eq!(
        ewma_with(&values, &config.smoothing),
        ewma_with(&values, &config.smoothing)
    );
    let xs: Vec<f64> = (0..10).map(|i| 1800.0 + 37.0 * i as f64).collect();
    let ys: Vec<f64> = (0..10).map(|i| ((i * 7) % 5) as f64 * 0.1).collect();
    assert_eq!(correlate(&xs, &ys, "a", "b"), correlate(&xs, &ys, "a", "b"));
}

#[test]
fn test_malformed_input_is_skipped_not_fatal() {
    let mut records = cutting_records(6);
    records[2].calories = f64::NAN;
    records[4].fat = -3.0;
    let mut weights = linear_weights(6, 80.0, 79.5);
    weights.push(WeightEntry {
        date: date(6),
        weight: f64::INFINITY,
    });

    assert_eq!(sort_daily_records(&records).len(), 4);
    assert_eq!(clean_weight_history(&weights).len(), 6);
    assert_eq!(align(&records, 6, date(5), false).len(), 4);
}

#[test]
fn test_logging_streak_across_days() {
    let dates: Vec<_> = cutting_records(14).iter().map(|r| r.date).collect();
    assert_eq!(logging_streak(&dates, date(13)), 14);
    assert_eq!(logging_streak(&dates, date(14)), 14);
    assert_eq!(logging_streak(&dates, date(15)), 0);
}

#[test]
fn test_config_document_changes_behavior() {
    let config = EngineConfig::from_toml_str(
        r#"
        [smoothing]
        min_points = 20
        "#,
    )
    .unwrap();
    let values: Vec<f64> = linear_weights(14, 80.0, 78.5).iter().map(|w| w.weight).collect();
    assert!(ewma_with(&values, &config.smoothing).is_none());
    assert!(ewma_with(&values, &EngineConfig::default().smoothing).is_some());
}

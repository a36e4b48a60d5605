//! Insight generation
//!
//! Runs every analysis once over the caller's logs, then evaluates a fixed
//! table of rules against the results. Each rule pairs a predicate, which
//! extracts [`Evidence`] when the rule applies, with a template that turns
//! the evidence into text. Ranking and deduplication are one generic pass
//! over whatever fired, so adding a rule means adding a table row.
//!
//! Rules in one band share a priority: warnings > achievements > positive
//! feedback > tips. Inside a band, insights are ordered by the date of the
//! triggering data (newest first), then by table order.

use crate::adherence::{adherence_with, AdherenceScore};
use crate::align::{
    calorie_weight_change_pairs, clean_weight_history, sort_daily_records, window_start,
};
use crate::config::{EngineConfig, InsightConfig};
use crate::consistency::{macro_consistency_with, MacroConsistency};
use crate::correlation::{correlate_with, Correlation, CorrelationStrength};
use crate::models::{DailyRecord, GoalContext, WeightEntry};
use crate::projection::{progress_rate_with, ProgressRate, ProgressStatus};
use crate::smoothing::{ewma_with, EwmaBand};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashSet;
use tracing::debug;

// ============================================================================
// Public Types
// ============================================================================

/// Kind of insight, used by the UI for colour and icon treatment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Positive,
    Warning,
    Tip,
    Achievement,
}

/// A ranked, displayable insight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    /// Identity of the rule that produced it
    pub id: String,
    #[serde(rename = "type")]
    pub kind: InsightType,
    pub title: String,
    pub description: String,
    /// Whether the user can act on it (as opposed to pure feedback)
    pub actionable: bool,
    pub emoji: String,
}

/// Everything the rules look at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightContext {
    pub daily_data: Vec<DailyRecord>,
    pub weight_history: Vec<WeightEntry>,
    pub current_weight: f64,
    pub goal_weight: f64,
    pub start_weight: f64,
    pub expected_weekly_rate: f64,
    #[serde(default)]
    pub logged_dates: Vec<NaiveDate>,
    #[serde(default)]
    pub streak: u32,
}

/// Generate up to `max_count` insights with the default configuration
pub fn generate_insights(context: &InsightContext, max_count: usize) -> Vec<Insight> {
    generate_insights_with(context, max_count, &EngineConfig::default())
}

/// Generate up to `max_count` insights, highest priority first
///
/// Returns an empty list when fewer than `insights.min_daily_records` valid
/// daily records are supplied.
pub fn generate_insights_with(
    context: &InsightContext,
    max_count: usize,
    config: &EngineConfig,
) -> Vec<Insight> {
    if max_count == 0 || context.daily_data.len() < config.insights.min_daily_records {
        return Vec::new();
    }
    let Some(snapshot) = Snapshot::build(context, config) else {
        return Vec::new();
    };

    let candidates = RULES.iter().enumerate().filter_map(|(order, rule)| {
        (rule.detect)(&snapshot, &config.insights).map(|evidence| {
            debug!(rule = rule.id, priority = rule.priority, "Insight rule fired");
            Candidate {
                rule,
                order,
                evidence,
            }
        })
    });

    rank(candidates, max_count)
}

// ============================================================================
// Ranking
// ============================================================================

struct Candidate {
    rule: &'static Rule,
    order: usize,
    evidence: Evidence,
}

fn rank(candidates: impl Iterator<Item = Candidate>, max_count: usize) -> Vec<Insight> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Candidate> = candidates.filter(|c| seen.insert(c.rule.id)).collect();

    unique.sort_by_key(|c| (Reverse(c.rule.priority), Reverse(c.evidence.as_of), c.order));
    unique.truncate(max_count);

    unique
        .into_iter()
        .map(|c| {
            let (title, description) = (c.rule.render)(&c.evidence);
            Insight {
                id: c.rule.id.to_string(),
                kind: c.rule.kind,
                title,
                description,
                actionable: c.rule.actionable,
                emoji: c.rule.emoji.to_string(),
            }
        })
        .collect()
}

// ============================================================================
// Analysis Snapshot
// ============================================================================

/// Analyses computed once per call and shared by every rule
struct Snapshot<'a> {
    context: &'a InsightContext,
    records: Vec<DailyRecord>,
    weights: Vec<WeightEntry>,
    latest_day: NaiveDate,
    goal: Option<GoalContext>,
    trend: Option<EwmaBand>,
    consistency: Option<MacroConsistency>,
    recent_adherence: AdherenceScore,
    recent_logged_days: usize,
    correlation: Option<Correlation>,
    progress: Option<ProgressRate>,
}

impl<'a> Snapshot<'a> {
    fn build(context: &'a InsightContext, config: &EngineConfig) -> Option<Self> {
        let records = sort_daily_records(&context.daily_data);
        if records.len() < config.insights.min_daily_records {
            return None;
        }
        let latest_day = records.last()?.date;
        let weights = clean_weight_history(&context.weight_history);

        let window_start = window_start(latest_day, config.insights.recent_window_days);
        let recent: Vec<_> = records
            .iter()
            .filter(|r| r.date >= window_start)
            .map(DailyRecord::adherence_day)
            .collect();
        let recent_adherence = adherence_with(
            &recent,
            config.insights.recent_window_days,
            &config.adherence,
        );

        let logged: HashSet<NaiveDate> = context
            .logged_dates
            .iter()
            .copied()
            .chain(records.iter().map(|r| r.date))
            .filter(|d| *d >= window_start && *d <= latest_day)
            .collect();

        let goal = weights.first().and_then(|first| {
            let goal = GoalContext {
                start_weight: context.start_weight,
                current_weight: context.current_weight,
                goal_weight: context.goal_weight,
                expected_rate_per_week: context.expected_weekly_rate,
                start_date: first.date,
            };
            [goal.start_weight, goal.current_weight, goal.goal_weight]
                .iter()
                .all(|v| v.is_finite())
                .then_some(goal)
        });
        let progress = goal
            .as_ref()
            .and_then(|g| progress_rate_with(g, &weights, &config.projection));

        let weight_values: Vec<f64> = weights.iter().map(|w| w.weight).collect();
        let trend = ewma_with(&weight_values, &config.smoothing);

        let macros: Vec<_> = records.iter().map(DailyRecord::macros).collect();
        let consistency = macro_consistency_with(&macros, &config.consistency);

        let (calories, changes) = calorie_weight_change_pairs(&records, &weights);
        let correlation = correlate_with(
            &calories,
            &changes,
            "calorie intake",
            "next weigh-in change",
            &config.correlation,
        );

        Some(Self {
            context,
            records,
            latest_day,
            goal,
            trend,
            consistency,
            recent_adherence,
            recent_logged_days: logged.len(),
            correlation,
            progress,
            weights,
        })
    }

    fn latest_weigh_in(&self) -> Option<NaiveDate> {
        self.weights.last().map(|w| w.date)
    }
}

// ============================================================================
// Rule Table
// ============================================================================

/// Facts a predicate extracted; templates read only this
#[derive(Debug, Clone, Default)]
struct Evidence {
    /// Date of the newest data point behind the finding
    as_of: Option<NaiveDate>,
    value: f64,
    count: u32,
    detail: String,
}

const WARNING: u8 = 90;
const ACHIEVEMENT: u8 = 70;
const POSITIVE: u8 = 50;
const TIP: u8 = 30;

struct Rule {
    id: &'static str,
    kind: InsightType,
    priority: u8,
    emoji: &'static str,
    actionable: bool,
    detect: fn(&Snapshot<'_>, &InsightConfig) -> Option<Evidence>,
    render: fn(&Evidence) -> (String, String),
}

static RULES: [Rule; 13] = [
    Rule {
        id: "calorie_overage_streak",
        kind: InsightType::Warning,
        priority: WARNING,
        emoji: "⚠️",
        actionable: true,
        detect: detect_calorie_overage,
        render: |e| {
            (
                format!("Over your calorie goal {} days running", e.count),
                format!(
                    "You've gone over your calorie goal {} days in a row, by {:.0} kcal a day on average. Planning the next day's meals ahead can help you reset.",
                    e.count, e.value
                ),
            )
        },
    },
    Rule {
        id: "moving_away_from_goal",
        kind: InsightType::Warning,
        priority: WARNING,
        emoji: "📉",
        actionable: true,
        detect: detect_moving_away,
        render: |e| {
            (
                "Trend is moving away from your goal".to_string(),
                format!(
                    "Your weight is changing by {:.2} per week in the opposite direction of your goal. Revisit your calorie target.",
                    e.value
                ),
            )
        },
    },
    Rule {
        id: "weight_plateau",
        kind: InsightType::Warning,
        priority: WARNING,
        emoji: "⏸️",
        actionable: true,
        detect: detect_plateau,
        render: |e| {
            (
                "Weight plateau detected".to_string(),
                format!(
                    "Your weight trend has barely moved over the last {} weigh-ins. A small change to intake or activity can restart progress.",
                    e.count
                ),
            )
        },
    },
    Rule {
        id: "protein_shortfall",
        kind: InsightType::Warning,
        priority: WARNING,
        emoji: "🥩",
        actionable: true,
        detect: detect_protein_shortfall,
        render: |e| {
            (
                "Protein below target".to_string(),
                format!(
                    "You reached your protein goal on only {:.0}% of recent days. Adding a protein source to each meal makes the target easier to hit.",
                    e.value
                ),
            )
        },
    },
    Rule {
        id: "goal_reached",
        kind: InsightType::Achievement,
        priority: ACHIEVEMENT,
        emoji: "🏆",
        actionable: false,
        detect: detect_goal_reached,
        render: |e| {
            (
                "Goal weight reached!".to_string(),
                format!(
                    "You've reached your goal weight of {:.1}. Set a new goal or switch to maintenance.",
                    e.value
                ),
            )
        },
    },
    Rule {
        id: "streak_milestone",
        kind: InsightType::Achievement,
        priority: ACHIEVEMENT,
        emoji: "🔥",
        actionable: false,
        detect: detect_streak_milestone,
        render: |e| {
            (
                format!("{}-day logging streak!", e.count),
                format!(
                    "You've logged your food {:.0} days in a row. Consistency like this is what drives results.",
                    e.value
                ),
            )
        },
    },
    Rule {
        id: "ahead_of_schedule",
        kind: InsightType::Achievement,
        priority: ACHIEVEMENT,
        emoji: "🚀",
        actionable: false,
        detect: detect_ahead_of_schedule,
        render: |e| {
            (
                "Ahead of schedule".to_string(),
                format!("You're progressing at {:.0}% of your planned rate.", e.value),
            )
        },
    },
    Rule {
        id: "strong_adherence",
        kind: InsightType::Positive,
        priority: POSITIVE,
        emoji: "✅",
        actionable: false,
        detect: detect_strong_adherence,
        render: |e| {
            (
                "Great adherence this week".to_string(),
                format!(
                    "Your adherence score is {:.0} (grade {}). Keep it up!",
                    e.value, e.detail
                ),
            )
        },
    },
    Rule {
        id: "steady_intake",
        kind: InsightType::Positive,
        priority: POSITIVE,
        emoji: "📊",
        actionable: false,
        detect: detect_steady_intake,
        render: |e| {
            (
                "Consistent eating pattern".to_string(),
                format!(
                    "Your daily intake is {:.0}% consistent, which makes your progress more predictable.",
                    e.value
                ),
            )
        },
    },
    Rule {
        id: "logging_gaps",
        kind: InsightType::Tip,
        priority: TIP,
        emoji: "📝",
        actionable: true,
        detect: detect_logging_gaps,
        render: |e| {
            (
                "Log more consistently".to_string(),
                format!(
                    "You logged food on {} of the last {:.0} days. Logging every day makes these insights more accurate.",
                    e.count, e.value
                ),
            )
        },
    },
    Rule {
        id: "erratic_intake",
        kind: InsightType::Tip,
        priority: TIP,
        emoji: "🎯",
        actionable: true,
        detect: detect_erratic_intake,
        render: |e| {
            (
                "Intake varies a lot day to day".to_string(),
                format!(
                    "Your intake consistency is {:.0}%. Aiming for similar calories each day smooths out weight swings.",
                    e.value
                ),
            )
        },
    },
    Rule {
        id: "calorie_weight_link",
        kind: InsightType::Tip,
        priority: TIP,
        emoji: "🔗",
        actionable: false,
        detect: detect_calorie_weight_link,
        render: |e| {
            (
                "Your intake shows up on the scale".to_string(),
                format!("{}, based on {} paired days.", e.detail, e.count),
            )
        },
    },
    Rule {
        id: "projected_goal_date",
        kind: InsightType::Tip,
        priority: TIP,
        emoji: "📅",
        actionable: false,
        detect: detect_projected_goal_date,
        render: |e| {
            (
                "Goal date projected".to_string(),
                format!(
                    "At your current rate you could reach your goal weight around {}.",
                    e.detail
                ),
            )
        },
    },
];

// ============================================================================
// Predicates
// ============================================================================

fn detect_calorie_overage(snapshot: &Snapshot<'_>, config: &InsightConfig) -> Option<Evidence> {
    let mut best: Option<(NaiveDate, u32, f64)> = None;
    let mut run_len = 0u32;
    let mut run_excess = 0.0;
    let mut previous: Option<NaiveDate> = None;

    for record in &snapshot.records {
        let consecutive = previous.and_then(|p| p.succ_opt()) == Some(record.date);
        if record.is_over_goal() {
            if !consecutive {
                run_len = 0;
                run_excess = 0.0;
            }
            run_len += 1;
            run_excess += record.calories - record.goal_calories;
            if run_len as usize >= config.overage_run_days {
                best = Some((record.date, run_len, run_excess / f64::from(run_len)));
            }
        } else {
            run_len = 0;
            run_excess = 0.0;
        }
        previous = Some(record.date);
    }

    best.map(|(as_of, count, value)| Evidence {
        as_of: Some(as_of),
        value,
        count,
        ..Evidence::default()
    })
}

fn detect_moving_away(snapshot: &Snapshot<'_>, _config: &InsightConfig) -> Option<Evidence> {
    let goal = snapshot.goal.as_ref()?;
    let progress = snapshot.progress.as_ref()?;
    let direction = goal.goal_direction();
    let rate = progress.actual_rate_per_week;
    if direction == 0.0 || goal.is_goal_reached() || rate == 0.0 || rate.signum() == direction {
        return None;
    }
    Some(Evidence {
        as_of: snapshot.latest_weigh_in(),
        value: rate.abs(),
        ..Evidence::default()
    })
}

fn detect_plateau(snapshot: &Snapshot<'_>, config: &InsightConfig) -> Option<Evidence> {
    let goal = snapshot.goal.as_ref()?;
    if goal.goal_direction() == 0.0 || goal.is_goal_reached() {
        return None;
    }
    let slope = snapshot.trend.as_ref()?.recent_slope(config.plateau_points)?;
    if slope.abs() >= config.plateau_slope {
        return None;
    }
    Some(Evidence {
        as_of: snapshot.latest_weigh_in(),
        value: slope,
        count: config.plateau_points as u32,
        ..Evidence::default()
    })
}

fn detect_protein_shortfall(snapshot: &Snapshot<'_>, config: &InsightConfig) -> Option<Evidence> {
    let adherence = &snapshot.recent_adherence;
    if adherence.protein_adherence >= config.protein_shortfall_percent {
        return None;
    }
    Some(Evidence {
        as_of: Some(snapshot.latest_day),
        value: f64::from(adherence.protein_adherence),
        ..Evidence::default()
    })
}

fn detect_goal_reached(snapshot: &Snapshot<'_>, _config: &InsightConfig) -> Option<Evidence> {
    let goal = snapshot.goal.as_ref()?;
    if goal.goal_direction() == 0.0 || !goal.is_goal_reached() {
        return None;
    }
    Some(Evidence {
        as_of: snapshot.latest_weigh_in(),
        value: goal.goal_weight,
        ..Evidence::default()
    })
}

fn detect_streak_milestone(snapshot: &Snapshot<'_>, config: &InsightConfig) -> Option<Evidence> {
    let streak = snapshot.context.streak;
    let milestone = config
        .streak_milestones
        .iter()
        .copied()
        .filter(|m| *m > 0 && *m <= streak)
        .max()?;
    Some(Evidence {
        as_of: Some(snapshot.latest_day),
        value: f64::from(streak),
        count: milestone,
        ..Evidence::default()
    })
}

fn detect_ahead_of_schedule(snapshot: &Snapshot<'_>, _config: &InsightConfig) -> Option<Evidence> {
    let goal = snapshot.goal.as_ref()?;
    let progress = snapshot.progress.as_ref()?;
    if progress.status != ProgressStatus::Ahead || goal.is_goal_reached() {
        return None;
    }
    Some(Evidence {
        as_of: snapshot.latest_weigh_in(),
        value: f64::from(progress.percent_of_expected),
        ..Evidence::default()
    })
}

fn detect_strong_adherence(snapshot: &Snapshot<'_>, config: &InsightConfig) -> Option<Evidence> {
    let adherence = &snapshot.recent_adherence;
    if adherence.overall_score < config.strong_adherence_score {
        return None;
    }
    Some(Evidence {
        as_of: Some(snapshot.latest_day),
        value: f64::from(adherence.overall_score),
        detail: adherence.grade.to_string(),
        ..Evidence::default()
    })
}

fn detect_steady_intake(snapshot: &Snapshot<'_>, config: &InsightConfig) -> Option<Evidence> {
    let consistency = snapshot.consistency.as_ref()?;
    if consistency.overall_consistency < config.steady_intake_percent {
        return None;
    }
    Some(Evidence {
        as_of: Some(snapshot.latest_day),
        value: f64::from(consistency.overall_consistency),
        ..Evidence::default()
    })
}

fn detect_logging_gaps(snapshot: &Snapshot<'_>, config: &InsightConfig) -> Option<Evidence> {
    let logged = snapshot.recent_logged_days as u32;
    if logged >= config.min_logged_in_window {
        return None;
    }
    Some(Evidence {
        as_of: Some(snapshot.latest_day),
        value: f64::from(config.recent_window_days),
        count: logged,
        ..Evidence::default()
    })
}

fn detect_erratic_intake(snapshot: &Snapshot<'_>, config: &InsightConfig) -> Option<Evidence> {
    let consistency = snapshot.consistency.as_ref()?;
    if consistency.overall_consistency >= config.erratic_intake_percent {
        return None;
    }
    Some(Evidence {
        as_of: Some(snapshot.latest_day),
        value: f64::from(consistency.overall_consistency),
        ..Evidence::default()
    })
}

fn detect_calorie_weight_link(snapshot: &Snapshot<'_>, _config: &InsightConfig) -> Option<Evidence> {
    let correlation = snapshot.correlation.as_ref()?;
    if correlation.strength == CorrelationStrength::None {
        return None;
    }
    Some(Evidence {
        as_of: snapshot.latest_weigh_in(),
        value: correlation.coefficient,
        count: correlation.sample_size as u32,
        detail: correlation.description.clone(),
    })
}

fn detect_projected_goal_date(snapshot: &Snapshot<'_>, _config: &InsightConfig) -> Option<Evidence> {
    let progress = snapshot.progress.as_ref()?;
    if progress.status == ProgressStatus::Stalled {
        return None;
    }
    let date = progress.projected_date?;
    if date <= snapshot.latest_day {
        return None;
    }
    Some(Evidence {
        as_of: snapshot.latest_weigh_in(),
        detail: date.format("%b %-d, %Y").to_string(),
        ..Evidence::default()
    })
}

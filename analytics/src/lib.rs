//! Nutrition Analytics Engine
//!
//! Pure analysis over a user's food and weight logs: date alignment,
//! trend smoothing, consistency and adherence scoring, correlation, goal
//! projection, and ranked insights. Every operation takes plain records and
//! returns plain values, so the same code runs natively and in the browser
//! via the WASM bindings.

pub mod adherence;
pub mod align;
pub mod config;
pub mod consistency;
pub mod correlation;
pub mod errors;
pub mod insights;
pub mod models;
pub mod projection;
pub mod smoothing;
pub mod stats;
pub mod validation;

// Re-export commonly used items
pub use adherence::{adherence, adherence_with, AdherenceScore, Grade};
pub use align::{
    align, align_by, align_with, calorie_weight_change_pairs, clean_weight_history, day_label,
    logging_streak, present_values, sort_daily_records, Observation,
};
pub use config::EngineConfig;
pub use consistency::{
    consistency_percent, macro_consistency, macro_consistency_with, MacroConsistency,
    MacroPercentages,
};
pub use correlation::{
    correlate, correlate_with, Correlation, CorrelationDirection, CorrelationStrength,
};
pub use errors::{AnalyticsError, Result};
pub use insights::{generate_insights, generate_insights_with, Insight, InsightContext, InsightType};
pub use models::*;
pub use projection::{progress_rate, progress_rate_with, ProgressRate, ProgressStatus};
pub use smoothing::{ewma, ewma_with, trend_slope, EwmaBand};

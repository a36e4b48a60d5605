//! Nutrition Analytics WASM Module
//!
//! JSON-in/JSON-out bindings so the browser dashboard can run the analysis
//! engine locally. Every export has a plain-Rust `*_json` twin returning
//! [`BindingError`]; the `#[wasm_bindgen]` layer only converts that error
//! into a `JsValue`, so the twins are what native tests exercise.
//!
//! Results that the engine reports as "not enough data" serialize as
//! `null`.

pub mod cache;

use cache::{cache_key, MemoCache};
use chrono::NaiveDate;
use nutrition_analytics::{
    self as engine, AdherenceDay, AnalyticsError, DailyRecord, EngineConfig, GoalContext,
    InsightContext, MacroDay, WeightEntry,
};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use wasm_bindgen::prelude::*;

/// Errors crossing the JS boundary
#[derive(Error, Debug)]
pub enum BindingError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    Date(String),
}

impl From<BindingError> for JsValue {
    fn from(err: BindingError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

type BindingResult<T> = std::result::Result<T, BindingError>;

fn to_json<T: Serialize>(value: &T) -> BindingResult<String> {
    Ok(serde_json::to_string(value)?)
}

fn parse_date(text: &str) -> BindingResult<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| BindingError::Date(text.to_string()))
}

fn parse_config(toml: &str) -> BindingResult<EngineConfig> {
    Ok(EngineConfig::from_toml_str(toml)?)
}

// ============================================================================
// Alignment
// ============================================================================

/// Align daily food logs on calories
#[wasm_bindgen]
pub fn align_daily_records(
    records_json: &str,
    window_days: u32,
    today: &str,
    dense_fill: bool,
) -> Result<String, JsValue> {
    Ok(align_daily_records_json(records_json, window_days, today, dense_fill)?)
}

pub fn align_daily_records_json(
    records_json: &str,
    window_days: u32,
    today: &str,
    dense_fill: bool,
) -> BindingResult<String> {
    let records: Vec<DailyRecord> = serde_json::from_str(records_json)?;
    let series = engine::align(&records, window_days, parse_date(today)?, dense_fill);
    to_json(&series)
}

/// Align weigh-ins on weight
#[wasm_bindgen]
pub fn align_weight_history(
    history_json: &str,
    window_days: u32,
    today: &str,
    dense_fill: bool,
) -> Result<String, JsValue> {
    Ok(align_weight_history_json(history_json, window_days, today, dense_fill)?)
}

pub fn align_weight_history_json(
    history_json: &str,
    window_days: u32,
    today: &str,
    dense_fill: bool,
) -> BindingResult<String> {
    let history: Vec<WeightEntry> = serde_json::from_str(history_json)?;
    let series = engine::align(&history, window_days, parse_date(today)?, dense_fill);
    to_json(&series)
}

// ============================================================================
// Analyses
// ============================================================================

/// Smoothed weight trend with its noise band
#[wasm_bindgen]
pub fn weight_trend(weights: &[f64], window_size: usize, band_multiplier: f64) -> Result<String, JsValue> {
    Ok(weight_trend_json(weights, window_size, band_multiplier)?)
}

pub fn weight_trend_json(
    weights: &[f64],
    window_size: usize,
    band_multiplier: f64,
) -> BindingResult<String> {
    to_json(&engine::ewma(weights, window_size, band_multiplier))
}

#[wasm_bindgen]
pub fn macro_consistency(days_json: &str) -> Result<String, JsValue> {
    Ok(macro_consistency_json(days_json)?)
}

pub fn macro_consistency_json(days_json: &str) -> BindingResult<String> {
    let days: Vec<MacroDay> = serde_json::from_str(days_json)?;
    to_json(&engine::macro_consistency(&days))
}

#[wasm_bindgen]
pub fn correlate(
    series_a: &[f64],
    series_b: &[f64],
    label_a: &str,
    label_b: &str,
) -> Result<String, JsValue> {
    Ok(correlate_json(series_a, series_b, label_a, label_b)?)
}

pub fn correlate_json(
    series_a: &[f64],
    series_b: &[f64],
    label_a: &str,
    label_b: &str,
) -> BindingResult<String> {
    to_json(&engine::correlate(series_a, series_b, label_a, label_b))
}

#[wasm_bindgen]
pub fn adherence_score(days_json: &str, period_days: u32) -> Result<String, JsValue> {
    Ok(adherence_score_json(days_json, period_days)?)
}

pub fn adherence_score_json(days_json: &str, period_days: u32) -> BindingResult<String> {
    let days: Vec<AdherenceDay> = serde_json::from_str(days_json)?;
    to_json(&engine::adherence(&days, period_days))
}

#[wasm_bindgen]
pub fn progress_rate(goal_json: &str, history_json: &str) -> Result<String, JsValue> {
    Ok(progress_rate_json(goal_json, history_json)?)
}

pub fn progress_rate_json(goal_json: &str, history_json: &str) -> BindingResult<String> {
    let goal: GoalContext = serde_json::from_str(goal_json)?;
    let history: Vec<WeightEntry> = serde_json::from_str(history_json)?;
    to_json(&engine::progress_rate(&goal, &history))
}

#[wasm_bindgen]
pub fn logging_streak(dates_json: &str, as_of: &str) -> Result<u32, JsValue> {
    Ok(logging_streak_value(dates_json, as_of)?)
}

pub fn logging_streak_value(dates_json: &str, as_of: &str) -> BindingResult<u32> {
    let dates: Vec<NaiveDate> = serde_json::from_str(dates_json)?;
    Ok(engine::logging_streak(&dates, parse_date(as_of)?))
}

#[wasm_bindgen]
pub fn generate_insights(context_json: &str, max_count: usize) -> Result<String, JsValue> {
    Ok(generate_insights_json(context_json, max_count, &EngineConfig::default())?)
}

pub fn generate_insights_json(
    context_json: &str,
    max_count: usize,
    config: &EngineConfig,
) -> BindingResult<String> {
    let context: InsightContext = serde_json::from_str(context_json)?;
    to_json(&engine::generate_insights_with(&context, max_count, config))
}

/// Validate a TOML configuration document and return the effective config
#[wasm_bindgen]
pub fn effective_config(toml: &str) -> Result<String, JsValue> {
    Ok(effective_config_json(toml)?)
}

pub fn effective_config_json(toml: &str) -> BindingResult<String> {
    to_json(&parse_config(toml)?)
}

// ============================================================================
// Insight Session
// ============================================================================

const DEFAULT_CACHE_CAPACITY: usize = 16;
const DEFAULT_CACHE_TTL_MS: f64 = 60_000.0;

/// Long-lived handle the dashboard keeps between renders
///
/// Holds one configuration and memoizes insight lists by input, so
/// re-rendering unchanged data is a lookup.
#[wasm_bindgen]
pub struct InsightSession {
    config: EngineConfig,
    cache: MemoCache<String>,
}

#[wasm_bindgen]
impl InsightSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> InsightSession {
        Self::with_engine_config(EngineConfig::default())
    }

    /// Session using a TOML configuration document
    pub fn from_toml(toml: &str) -> Result<InsightSession, JsValue> {
        Ok(Self::with_engine_config(parse_config(toml)?))
    }

    /// Insights for `context_json`, cached for a minute of caller time
    pub fn insights(
        &mut self,
        context_json: &str,
        max_count: usize,
        now_ms: f64,
    ) -> Result<String, JsValue> {
        Ok(self.insights_json(context_json, max_count, now_ms)?)
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

impl InsightSession {
    pub fn with_engine_config(config: EngineConfig) -> Self {
        Self {
            config,
            cache: MemoCache::new(DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_MS),
        }
    }

    pub fn insights_json(
        &mut self,
        context_json: &str,
        max_count: usize,
        now_ms: f64,
    ) -> BindingResult<String> {
        let key = cache_key(&[context_json, &max_count.to_string()]);
        let config = &self.config;
        self.cache.get_or_try_insert_with(key, now_ms, || {
            debug!(max_count, "Computing insights");
            generate_insights_json(context_json, max_count, config)
        })
    }
}

impl Default for InsightSession {
    fn default() -> Self {
        Self::new()
    }
}

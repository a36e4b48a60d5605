//! Browser-side checks of the exported bindings
//!
//! Run with `wasm-pack test --headless --firefox wasm`.

#![cfg(target_arch = "wasm32")]

use nutrition_analytics_wasm::{generate_insights, weight_trend, InsightSession};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const CONTEXT: &str = r#"{
    "dailyData": [
        {"date": "2024-05-01", "calories": 1950, "protein": 150, "carbs": 200, "fat": 60, "goalCalories": 2000, "goalProtein": 140},
        {"date": "2024-05-02", "calories": 1950, "protein": 150, "carbs": 200, "fat": 60, "goalCalories": 2000, "goalProtein": 140},
        {"date": "2024-05-03", "calories": 1950, "protein": 150, "carbs": 200, "fat": 60, "goalCalories": 2000, "goalProtein": 140},
        {"date": "2024-05-04", "calories": 1950, "protein": 150, "carbs": 200, "fat": 60, "goalCalories": 2000, "goalProtein": 140},
        {"date": "2024-05-05", "calories": 1950, "protein": 150, "carbs": 200, "fat": 60, "goalCalories": 2000, "goalProtein": 140}
    ],
    "weightHistory": [],
    "currentWeight": 82.0,
    "goalWeight": 78.0,
    "startWeight": 84.0,
    "expectedWeeklyRate": 0.5
}"#;

#[wasm_bindgen_test]
fn test_trend_export() {
    let json = weight_trend(&[80.0, 79.8, 79.9, 79.5, 79.4], 7, 1.5).unwrap();
    assert!(json.contains("\"smoothed\""));
}

#[wasm_bindgen_test]
fn test_malformed_json_rejected() {
    assert!(generate_insights("{", 3).is_err());
}

#[wasm_bindgen_test]
fn test_session_round_trip() {
    let mut session = InsightSession::new();
    let first = session.insights(CONTEXT, 3, 0.0).unwrap();
    let second = session.insights(CONTEXT, 3, 10.0).unwrap();
    assert_eq!(first, second);
    assert_eq!(session.cached_entries(), 1);
}

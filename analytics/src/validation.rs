//! Input validation functions
//!
//! Shared by the validating record constructors (which report the first
//! problem) and by the series aligner (which silently drops bad records).

/// Validate that a value is a real number
pub fn validate_finite(field: &str, value: f64) -> Result<(), String> {
    if value.is_nan() || value.is_infinite() {
        return Err(format!("{} must be a valid number", field));
    }
    Ok(())
}

/// Validate that a value is finite and not negative
pub fn validate_non_negative(field: &str, value: f64) -> Result<(), String> {
    validate_finite(field, value)?;
    if value < 0.0 {
        return Err(format!("{} cannot be negative", field));
    }
    Ok(())
}

/// Validate calorie value
pub fn validate_calories(calories: f64) -> Result<(), String> {
    validate_non_negative("Calories", calories)
}

/// Validate a body-weight value in whatever unit the profile uses
pub fn validate_weight(weight: f64) -> Result<(), String> {
    validate_finite("Weight", weight)?;
    if weight <= 0.0 {
        return Err("Weight must be positive".to_string());
    }
    Ok(())
}

/// Validate a macro amount in grams
pub fn validate_grams(field: &str, grams: f64) -> Result<(), String> {
    validate_non_negative(field, grams)
}

/// Validate a daily goal (calories or protein)
pub fn validate_goal(field: &str, goal: f64) -> Result<(), String> {
    validate_non_negative(field, goal)
}

// ABOUTME: Payload schema validator converting untrusted model JSON into typed payloads
// ABOUTME: Single trust boundary: field presence, types, enum membership, numeric bounds, shape rules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriLens

//! # Payload Schema & Validator
//!
//! Every inference response is an untrusted, loosely-typed external input.
//! The functions here are the single trust boundary converting a raw
//! `serde_json::Value` into the closed typed payload set. Pure functions:
//! no I/O, deterministic, and the error always names the first offending
//! field by dotted path together with the rule it broke.
//!
//! Numeric fields reject negative values and implausible magnitudes as
//! validation failures; nothing is silently clamped. Integer fields accept
//! JSON floats with a zero fraction because models emit `350` and `350.0`
//! interchangeably; a true fractional value for an integer field is a type
//! error.

use serde_json::Value;

use crate::errors::ValidationError;
use crate::models::{
    Confidence, MealPlan, MealType, NutritionEstimate, PlanDay, PlanMealItem, RecipeSuggestion,
};

/// Upper bound for a single analyzed meal's calories.
pub const MAX_ESTIMATE_CALORIES: u32 = 5_000;
/// Blanket upper bound for any calorie figure.
pub const MAX_CALORIES: u32 = 10_000;
/// Upper bound for prep/cook minutes.
pub const MAX_MINUTES: u32 = 600;
/// Upper bound for recipe servings.
pub const MAX_SERVINGS: u32 = 50;
/// Upper bound for plan length in days.
pub const MAX_PLAN_DAYS: u32 = 30;
/// Upper bound for recipes in one suggestion set.
pub const MAX_RECIPES: usize = 5;

/// Reject a day count outside 1..=[`MAX_PLAN_DAYS`].
///
/// # Errors
///
/// Returns [`ValidationError::OutOfRange`] when the count is 0 or too large.
pub fn check_day_count(day_count: u32) -> Result<(), ValidationError> {
    if day_count == 0 || day_count > MAX_PLAN_DAYS {
        return Err(ValidationError::OutOfRange {
            path: "day_count".into(),
            detail: format!("must be between 1 and {MAX_PLAN_DAYS}, got {day_count}"),
        });
    }
    Ok(())
}

/// Validate a single-meal nutrition estimate payload.
///
/// # Errors
///
/// Returns the first schema violation encountered, naming the field path.
pub fn validate_estimate(candidate: &Value) -> Result<NutritionEstimate, ValidationError> {
    let obj = as_object(candidate, "$")?;

    let meal_name = non_empty_str(field(obj, "", "meal_name")?, "meal_name")?;
    let calories = bounded_int(field(obj, "", "calories")?, "calories", MAX_ESTIMATE_CALORIES)?;
    let protein_g = non_negative(field(obj, "", "protein_g")?, "protein_g")?;
    let carbs_g = non_negative(field(obj, "", "carbs_g")?, "carbs_g")?;
    let fat_g = non_negative(field(obj, "", "fat_g")?, "fat_g")?;
    let fiber_g = non_negative(field(obj, "", "fiber_g")?, "fiber_g")?;
    let confidence = confidence_value(field(obj, "", "confidence")?, "confidence")?;
    let ingredients = string_list(field(obj, "", "ingredients")?, "ingredients", true)?;
    let suggestions = str_value(field(obj, "", "suggestions")?, "suggestions")?;

    Ok(NutritionEstimate {
        meal_name,
        calories,
        protein_g,
        carbs_g,
        fat_g,
        fiber_g,
        confidence,
        ingredients,
        suggestions,
    })
}

/// Validate a multi-day meal plan payload against an expected day count.
///
/// Enforces exactly `expected_days` entries with distinct `day_number`
/// values covering 1..=N, at least one meal per day, and no duplicate
/// breakfast/lunch/dinner within a day (snacks may repeat).
///
/// # Errors
///
/// Returns the first schema violation encountered, naming the field path.
pub fn validate_meal_plan(
    candidate: &Value,
    expected_days: u32,
) -> Result<MealPlan, ValidationError> {
    check_day_count(expected_days)?;
    let obj = as_object(candidate, "$")?;

    let plan_name = non_empty_str(field(obj, "", "plan_name")?, "plan_name")?;
    let days_value = field(obj, "", "days")?;
    let days_array = as_array(days_value, "days")?;

    if days_array.len() != expected_days as usize {
        return Err(ValidationError::ScheduleShape {
            path: "days".into(),
            detail: format!("expected {expected_days} days, found {}", days_array.len()),
        });
    }

    let mut seen = vec![false; expected_days as usize];
    let mut days = Vec::with_capacity(days_array.len());
    for (i, day_value) in days_array.iter().enumerate() {
        let path = format!("days[{i}]");
        let day = validate_plan_day(day_value, &path, expected_days)?;
        let slot = (day.day_number - 1) as usize;
        if seen[slot] {
            return Err(ValidationError::ScheduleShape {
                path: format!("{path}.day_number"),
                detail: format!("duplicate day_number {}", day.day_number),
            });
        }
        seen[slot] = true;
        days.push(day);
    }

    Ok(MealPlan { plan_name, days })
}

fn validate_plan_day(
    candidate: &Value,
    path: &str,
    expected_days: u32,
) -> Result<PlanDay, ValidationError> {
    let obj = as_object(candidate, path)?;

    let day_number = bounded_int(
        field(obj, path, "day_number")?,
        &format!("{path}.day_number"),
        u32::MAX,
    )?;
    if day_number == 0 || day_number > expected_days {
        return Err(ValidationError::OutOfRange {
            path: format!("{path}.day_number"),
            detail: format!("must be between 1 and {expected_days}, got {day_number}"),
        });
    }

    let meals_path = format!("{path}.meals");
    let meals_array = as_array(field(obj, path, "meals")?, &meals_path)?;
    if meals_array.is_empty() {
        return Err(ValidationError::EmptyValue { path: meals_path });
    }

    let mut used = Vec::with_capacity(meals_array.len());
    let mut meals = Vec::with_capacity(meals_array.len());
    for (j, meal_value) in meals_array.iter().enumerate() {
        let meal_path = format!("{meals_path}[{j}]");
        let meal = validate_plan_meal(meal_value, &meal_path)?;
        if !meal.meal_type.allows_repeats() && used.contains(&meal.meal_type) {
            return Err(ValidationError::ScheduleShape {
                path: format!("{meal_path}.meal_type"),
                detail: format!(
                    "duplicate {} in day {day_number}",
                    meal.meal_type.as_str()
                ),
            });
        }
        used.push(meal.meal_type);
        meals.push(meal);
    }

    Ok(PlanDay { day_number, meals })
}

fn validate_plan_meal(candidate: &Value, path: &str) -> Result<PlanMealItem, ValidationError> {
    let obj = as_object(candidate, path)?;

    let meal_type = meal_type_value(
        field(obj, path, "meal_type")?,
        &format!("{path}.meal_type"),
    )?;
    let meal_name = non_empty_str(
        field(obj, path, "meal_name")?,
        &format!("{path}.meal_name"),
    )?;
    let calories = bounded_int(
        field(obj, path, "calories")?,
        &format!("{path}.calories"),
        MAX_CALORIES,
    )?;
    let protein_g = non_negative(field(obj, path, "protein_g")?, &format!("{path}.protein_g"))?;
    let carbs_g = non_negative(field(obj, path, "carbs_g")?, &format!("{path}.carbs_g"))?;
    let fat_g = non_negative(field(obj, path, "fat_g")?, &format!("{path}.fat_g"))?;
    let ingredients = string_list(
        field(obj, path, "ingredients")?,
        &format!("{path}.ingredients"),
        false,
    )?;
    let instructions = str_value(
        field(obj, path, "instructions")?,
        &format!("{path}.instructions"),
    )?;

    Ok(PlanMealItem {
        meal_type,
        meal_name,
        calories,
        protein_g,
        carbs_g,
        fat_g,
        ingredients,
        instructions,
    })
}

/// Validate a recipe suggestion set (`{"recipes": [...]}`, 1..=5 entries).
///
/// # Errors
///
/// Returns the first schema violation encountered, naming the field path.
pub fn validate_recipes(candidate: &Value) -> Result<Vec<RecipeSuggestion>, ValidationError> {
    let obj = as_object(candidate, "$")?;
    let recipes_array = as_array(field(obj, "", "recipes")?, "recipes")?;

    if recipes_array.is_empty() {
        return Err(ValidationError::EmptyValue {
            path: "recipes".into(),
        });
    }
    if recipes_array.len() > MAX_RECIPES {
        return Err(ValidationError::OutOfRange {
            path: "recipes".into(),
            detail: format!(
                "must contain at most {MAX_RECIPES} entries, found {}",
                recipes_array.len()
            ),
        });
    }

    let mut recipes = Vec::with_capacity(recipes_array.len());
    for (i, recipe_value) in recipes_array.iter().enumerate() {
        recipes.push(validate_recipe(recipe_value, &format!("recipes[{i}]"))?);
    }
    Ok(recipes)
}

fn validate_recipe(candidate: &Value, path: &str) -> Result<RecipeSuggestion, ValidationError> {
    let obj = as_object(candidate, path)?;

    let name = non_empty_str(field(obj, path, "name")?, &format!("{path}.name"))?;
    let description = str_value(
        field(obj, path, "description")?,
        &format!("{path}.description"),
    )?;
    let prep_time_minutes = bounded_int(
        field(obj, path, "prep_time_minutes")?,
        &format!("{path}.prep_time_minutes"),
        MAX_MINUTES,
    )?;
    let cook_time_minutes = bounded_int(
        field(obj, path, "cook_time_minutes")?,
        &format!("{path}.cook_time_minutes"),
        MAX_MINUTES,
    )?;
    let servings_path = format!("{path}.servings");
    let servings = bounded_int(field(obj, path, "servings")?, &servings_path, MAX_SERVINGS)?;
    if servings == 0 {
        return Err(ValidationError::OutOfRange {
            path: servings_path,
            detail: "must be at least 1".into(),
        });
    }
    let calories_per_serving = bounded_int(
        field(obj, path, "calories_per_serving")?,
        &format!("{path}.calories_per_serving"),
        MAX_CALORIES,
    )?;
    let protein_g = non_negative(field(obj, path, "protein_g")?, &format!("{path}.protein_g"))?;
    let carbs_g = non_negative(field(obj, path, "carbs_g")?, &format!("{path}.carbs_g"))?;
    let fat_g = non_negative(field(obj, path, "fat_g")?, &format!("{path}.fat_g"))?;
    let ingredients = string_list(
        field(obj, path, "ingredients")?,
        &format!("{path}.ingredients"),
        true,
    )?;
    let instructions = string_list(
        field(obj, path, "instructions")?,
        &format!("{path}.instructions"),
        true,
    )?;

    // Models emit "tips": null for recipes without tips; treat null as absent.
    let tips = match obj.get("tips") {
        None | Some(Value::Null) => None,
        Some(v) => Some(str_value(v, &format!("{path}.tips"))?),
    };

    Ok(RecipeSuggestion {
        name,
        description,
        prep_time_minutes,
        cook_time_minutes,
        servings,
        calories_per_serving,
        protein_g,
        carbs_g,
        fat_g,
        ingredients,
        instructions,
        tips,
    })
}

// ============================================================================
// Field helpers
// ============================================================================

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}.{name}")
    }
}

fn as_object<'a>(
    value: &'a Value,
    path: &str,
) -> Result<&'a serde_json::Map<String, Value>, ValidationError> {
    value.as_object().ok_or_else(|| ValidationError::WrongType {
        path: path.to_owned(),
        expected: "object",
    })
}

fn as_array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>, ValidationError> {
    value.as_array().ok_or_else(|| ValidationError::WrongType {
        path: path.to_owned(),
        expected: "array",
    })
}

fn field<'a>(
    obj: &'a serde_json::Map<String, Value>,
    prefix: &str,
    name: &str,
) -> Result<&'a Value, ValidationError> {
    obj.get(name).ok_or_else(|| ValidationError::MissingField {
        path: join(prefix, name),
    })
}

fn str_value(value: &Value, path: &str) -> Result<String, ValidationError> {
    value
        .as_str()
        .map(ToOwned::to_owned)
        .ok_or_else(|| ValidationError::WrongType {
            path: path.to_owned(),
            expected: "string",
        })
}

fn non_empty_str(value: &Value, path: &str) -> Result<String, ValidationError> {
    let s = str_value(value, path)?;
    if s.trim().is_empty() {
        return Err(ValidationError::EmptyValue {
            path: path.to_owned(),
        });
    }
    Ok(s)
}

/// Non-negative integer with an inclusive upper bound. Accepts JSON floats
/// with zero fraction; rejects negatives and fractional values.
fn bounded_int(value: &Value, path: &str, max: u32) -> Result<u32, ValidationError> {
    let n = value.as_f64().ok_or_else(|| ValidationError::WrongType {
        path: path.to_owned(),
        expected: "integer",
    })?;
    if n.fract() != 0.0 || !n.is_finite() {
        return Err(ValidationError::WrongType {
            path: path.to_owned(),
            expected: "integer",
        });
    }
    if n < 0.0 {
        return Err(ValidationError::OutOfRange {
            path: path.to_owned(),
            detail: "must not be negative".into(),
        });
    }
    if n > f64::from(max) {
        return Err(ValidationError::OutOfRange {
            path: path.to_owned(),
            detail: format!("must be at most {max}"),
        });
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(n as u32)
}

fn non_negative(value: &Value, path: &str) -> Result<f64, ValidationError> {
    let n = value.as_f64().ok_or_else(|| ValidationError::WrongType {
        path: path.to_owned(),
        expected: "number",
    })?;
    if !n.is_finite() || n < 0.0 {
        return Err(ValidationError::OutOfRange {
            path: path.to_owned(),
            detail: "must not be negative".into(),
        });
    }
    Ok(n)
}

fn string_list(
    value: &Value,
    path: &str,
    require_nonempty: bool,
) -> Result<Vec<String>, ValidationError> {
    let array = as_array(value, path)?;
    if require_nonempty && array.is_empty() {
        return Err(ValidationError::EmptyValue {
            path: path.to_owned(),
        });
    }
    let mut out = Vec::with_capacity(array.len());
    for (i, item) in array.iter().enumerate() {
        out.push(non_empty_str(item, &format!("{path}[{i}]"))?);
    }
    Ok(out)
}

fn confidence_value(value: &Value, path: &str) -> Result<Confidence, ValidationError> {
    let s = str_value(value, path)?;
    match s.as_str() {
        "high" => Ok(Confidence::High),
        "medium" => Ok(Confidence::Medium),
        "low" => Ok(Confidence::Low),
        _ => Err(ValidationError::InvalidEnum {
            path: path.to_owned(),
            value: s,
            allowed: "high, medium, low",
        }),
    }
}

fn meal_type_value(value: &Value, path: &str) -> Result<MealType, ValidationError> {
    let s = str_value(value, path)?;
    match s.as_str() {
        "breakfast" => Ok(MealType::Breakfast),
        "lunch" => Ok(MealType::Lunch),
        "dinner" => Ok(MealType::Dinner),
        "snack" => Ok(MealType::Snack),
        _ => Err(ValidationError::InvalidEnum {
            path: path.to_owned(),
            value: s,
            allowed: "breakfast, lunch, dinner, snack",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_estimate() -> Value {
        json!({
            "meal_name": "Grilled chicken salad",
            "calories": 430,
            "protein_g": 38.5,
            "carbs_g": 18.0,
            "fat_g": 22.0,
            "fiber_g": 6.5,
            "confidence": "high",
            "ingredients": ["chicken breast", "romaine", "olive oil"],
            "suggestions": "Swap the dressing for lemon juice to cut fat."
        })
    }

    #[test]
    fn test_estimate_accepts_valid_payload() {
        let estimate = validate_estimate(&valid_estimate()).unwrap();
        assert_eq!(estimate.meal_name, "Grilled chicken salad");
        assert_eq!(estimate.calories, 430);
        assert_eq!(estimate.confidence, crate::models::Confidence::High);
    }

    #[test]
    fn test_estimate_is_idempotent() {
        let estimate = validate_estimate(&valid_estimate()).unwrap();
        let reserialized = serde_json::to_value(&estimate).unwrap();
        let again = validate_estimate(&reserialized).unwrap();
        assert_eq!(estimate, again);
    }

    #[test]
    fn test_estimate_missing_field_names_it() {
        let mut payload = valid_estimate();
        payload.as_object_mut().unwrap().remove("protein_g");
        let err = validate_estimate(&payload).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField {
                path: "protein_g".into()
            }
        );
    }

    #[test]
    fn test_estimate_accepts_integer_valued_float() {
        let mut payload = valid_estimate();
        payload["calories"] = json!(430.0);
        assert_eq!(validate_estimate(&payload).unwrap().calories, 430);
    }

    #[test]
    fn test_estimate_rejects_fractional_calories() {
        let mut payload = valid_estimate();
        payload["calories"] = json!(430.5);
        let err = validate_estimate(&payload).unwrap_err();
        assert!(matches!(err, ValidationError::WrongType { .. }));
        assert_eq!(err.path(), "calories");
    }

    #[test]
    fn test_estimate_rejects_implausible_calories() {
        let mut payload = valid_estimate();
        payload["calories"] = json!(9000);
        let err = validate_estimate(&payload).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { .. }));
    }

    #[test]
    fn test_estimate_rejects_empty_ingredients() {
        let mut payload = valid_estimate();
        payload["ingredients"] = json!([]);
        let err = validate_estimate(&payload).unwrap_err();
        assert_eq!(
            err,
            ValidationError::EmptyValue {
                path: "ingredients".into()
            }
        );
    }

    #[test]
    fn test_estimate_rejects_unknown_confidence() {
        let mut payload = valid_estimate();
        payload["confidence"] = json!("certain");
        let err = validate_estimate(&payload).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidEnum { .. }));
    }

    #[test]
    fn test_day_count_bounds() {
        assert!(check_day_count(1).is_ok());
        assert!(check_day_count(30).is_ok());
        assert!(check_day_count(0).is_err());
        assert!(check_day_count(31).is_err());
    }
}

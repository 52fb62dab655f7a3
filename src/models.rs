// ABOUTME: Domain data model for nutrition estimates, meal plans, and recipe suggestions
// ABOUTME: Field and enum names match the wire contract embedded verbatim in prompts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriLens

//! # Domain Data Model
//!
//! Typed payloads produced by the pipeline and the caller-supplied input
//! descriptors. Serde field names here are the single source of truth for
//! the wire contract: the prompt builder embeds them verbatim and the
//! validator checks candidates against them, so a validated value
//! round-trips through `serde_json` unchanged.

use serde::{Deserialize, Serialize};

/// Coarse self-reported reliability tag attached to a nutrition estimate
/// by the inference service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Clearly visible portions, common dish.
    High,
    /// Partially occluded or ambiguous portions.
    Medium,
    /// Guesswork; treat the numbers as rough.
    Low,
}

impl Confidence {
    /// Wire string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// One analyzed meal. Immutable once validated; the caller owns persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionEstimate {
    /// Name of the dish as identified from the image.
    pub meal_name: String,
    /// Estimated energy in kcal.
    pub calories: u32,
    /// Estimated protein in grams.
    pub protein_g: f64,
    /// Estimated carbohydrates in grams.
    pub carbs_g: f64,
    /// Estimated fat in grams.
    pub fat_g: f64,
    /// Estimated fiber in grams.
    pub fiber_g: f64,
    /// Self-reported reliability of the estimate.
    pub confidence: Confidence,
    /// Main ingredients identified in the image, in order of prominence.
    pub ingredients: Vec<String>,
    /// Brief health tips or alternatives; may be empty.
    pub suggestions: String,
}

/// Caller gender, as supplied to plan prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
    /// Other or undisclosed.
    Other,
}

impl Gender {
    /// Wire string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }
}

/// Self-reported activity level, ordered from least to most active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise.
    Sedentary,
    /// Light exercise 1-3 days per week.
    Light,
    /// Moderate exercise 3-5 days per week.
    Moderate,
    /// Hard exercise 6-7 days per week.
    Active,
    /// Athlete-level daily training.
    VeryActive,
}

impl ActivityLevel {
    /// Wire string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sedentary => "sedentary",
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::Active => "active",
            Self::VeryActive => "very_active",
        }
    }
}

/// The caller's dietary goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    /// Caloric deficit.
    LoseWeight,
    /// Hold current weight.
    Maintain,
    /// Caloric surplus with protein emphasis.
    GainMuscle,
}

impl Goal {
    /// Wire string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LoseWeight => "lose_weight",
            Self::Maintain => "maintain",
            Self::GainMuscle => "gain_muscle",
        }
    }
}

/// Input-only profile descriptor for plan generation. Never mutated by the
/// core; the daily calorie target is supplied, not derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Age in years; positive.
    pub age: u32,
    /// Gender.
    pub gender: Gender,
    /// Current weight in kilograms; positive.
    pub weight_kg: f64,
    /// Height in centimeters; positive.
    pub height_cm: f64,
    /// Self-reported activity level.
    pub activity_level: ActivityLevel,
    /// Dietary goal.
    pub goal: Goal,
    /// Daily calorie budget in kcal; positive.
    pub daily_calorie_target: u32,
    /// Free-text restriction tags (e.g. "vegetarian", "no shellfish"); may be empty.
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
}

/// Slot a plan meal occupies within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    /// Morning meal; at most one per day.
    Breakfast,
    /// Midday meal; at most one per day.
    Lunch,
    /// Evening meal; at most one per day.
    Dinner,
    /// May appear multiple times per day.
    Snack,
}

impl MealType {
    /// Wire string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }

    /// Whether this slot may repeat within a single day.
    #[must_use]
    pub const fn allows_repeats(&self) -> bool {
        matches!(self, Self::Snack)
    }
}

/// One meal within a plan day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanMealItem {
    /// Slot this meal occupies.
    pub meal_type: MealType,
    /// Name of the meal.
    pub meal_name: String,
    /// Energy in kcal.
    pub calories: u32,
    /// Protein in grams.
    pub protein_g: f64,
    /// Carbohydrates in grams.
    pub carbs_g: f64,
    /// Fat in grams.
    pub fat_g: f64,
    /// Ingredients with quantities.
    pub ingredients: Vec<String>,
    /// Preparation instructions.
    pub instructions: String,
}

/// One day of a meal plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDay {
    /// Position within the plan, 1-based and unique.
    pub day_number: u32,
    /// Ordered meals for the day; at least one.
    pub meals: Vec<PlanMealItem>,
}

impl PlanDay {
    /// Aggregate calories across the day's meals.
    #[must_use]
    pub fn total_calories(&self) -> u32 {
        self.meals.iter().map(|m| m.calories).sum()
    }
}

/// A multi-day meal plan produced by one generate-plan invocation.
/// Atomic: partial plans are rejected during validation, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    /// Descriptive name for the plan.
    pub plan_name: String,
    /// Exactly `day_count` entries with `day_number` covering 1..=N.
    pub days: Vec<PlanDay>,
}

/// One suggested recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSuggestion {
    /// Recipe name.
    pub name: String,
    /// Brief description.
    pub description: String,
    /// Preparation time in minutes.
    pub prep_time_minutes: u32,
    /// Cooking time in minutes.
    pub cook_time_minutes: u32,
    /// Number of servings the recipe yields.
    pub servings: u32,
    /// Energy per serving in kcal.
    pub calories_per_serving: u32,
    /// Protein per serving in grams.
    pub protein_g: f64,
    /// Carbohydrates per serving in grams.
    pub carbs_g: f64,
    /// Fat per serving in grams.
    pub fat_g: f64,
    /// Ingredients with quantities.
    pub ingredients: Vec<String>,
    /// Ordered preparation steps.
    pub instructions: Vec<String>,
    /// Optional cooking tips.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tips: Option<String>,
}

/// Advisory filters for recipe suggestion. Embedded into the prompt only;
/// never enforced programmatically on the output beyond the standard
/// numeric bounds checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipePreferences {
    /// Preferred cuisine (e.g. "thai").
    pub cuisine: Option<String>,
    /// Free-text restriction tags; may be empty.
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    /// Advisory calorie ceiling per serving.
    pub max_calories: Option<u32>,
    /// Advisory total cooking time ceiling in minutes.
    pub max_cooking_time_minutes: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_level_is_ordinal() {
        assert!(ActivityLevel::Sedentary < ActivityLevel::Light);
        assert!(ActivityLevel::Light < ActivityLevel::Moderate);
        assert!(ActivityLevel::Moderate < ActivityLevel::Active);
        assert!(ActivityLevel::Active < ActivityLevel::VeryActive);
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_value(ActivityLevel::VeryActive).unwrap(),
            serde_json::json!("very_active")
        );
        assert_eq!(
            serde_json::to_value(Goal::LoseWeight).unwrap(),
            serde_json::json!("lose_weight")
        );
        assert_eq!(
            serde_json::to_value(Confidence::Medium).unwrap(),
            serde_json::json!("medium")
        );
        assert_eq!(
            serde_json::to_value(MealType::Breakfast).unwrap(),
            serde_json::json!("breakfast")
        );
    }

    #[test]
    fn test_plan_day_total_calories() {
        let day = PlanDay {
            day_number: 1,
            meals: vec![
                PlanMealItem {
                    meal_type: MealType::Breakfast,
                    meal_name: "Oatmeal".into(),
                    calories: 350,
                    protein_g: 12.0,
                    carbs_g: 60.0,
                    fat_g: 8.0,
                    ingredients: vec!["1 cup oats".into()],
                    instructions: "Cook oats".into(),
                },
                PlanMealItem {
                    meal_type: MealType::Snack,
                    meal_name: "Apple".into(),
                    calories: 95,
                    protein_g: 0.5,
                    carbs_g: 25.0,
                    fat_g: 0.3,
                    ingredients: vec!["1 apple".into()],
                    instructions: String::new(),
                },
            ],
        };
        assert_eq!(day.total_calories(), 445);
    }
}

// ABOUTME: Deterministic prompt builders embedding the wire contract the validator enforces
// ABOUTME: Pure string assembly; image bytes travel separately and are never touched here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriLens

//! # Prompt Builder
//!
//! Each builder produces a deterministic instruction document declaring the
//! exact payload shape the extractor and validator expect, a minimally
//! valid example, and generation constraints (no prose wrapper, no
//! formatting markers). The schema embedded here is an informal contract
//! with the inference service; compliance is checked downstream, never
//! assumed.
//!
//! The image-analysis document is text-only. Image bytes and their media
//! type travel alongside it as an untouched binary attachment.

use crate::models::{RecipePreferences, UserProfile};

/// Shared tail constraint appended to every document.
const OUTPUT_RULES: &str = "NO markdown, NO code blocks, ONLY the JSON object";

const ANALYZE_IMAGE_PROMPT: &str = r#"You are a nutrition expert. Analyze this food image and provide detailed nutritional information.

IMPORTANT: Respond ONLY with valid JSON in this exact format:
{
  "meal_name": "Name of the dish",
  "calories": 500,
  "protein_g": 25,
  "carbs_g": 60,
  "fat_g": 15,
  "fiber_g": 5,
  "confidence": "high",
  "ingredients": ["ingredient1", "ingredient2"],
  "suggestions": "Brief health tips or alternatives"
}

Rules:
- Be as accurate as possible based on visible portion sizes
- "confidence" must be one of: "high", "medium", "low"; if unsure, use "medium" or "low"
- "calories" must be a whole number between 0 and 5000
- All gram values must be non-negative numbers
- "ingredients" must list at least one main ingredient you can identify
- NO markdown, NO code blocks, ONLY the JSON object"#;

/// Instruction document for analyzing a food image.
///
/// Static: the same document is issued for every image, so a re-issued
/// prompt after a malformed generation is byte-identical.
#[must_use]
pub const fn analyze_image_prompt() -> &'static str {
    ANALYZE_IMAGE_PROMPT
}

/// Instruction document for generating a multi-day meal plan from a
/// profile. Deterministic for equal inputs.
#[must_use]
pub fn meal_plan_prompt(profile: &UserProfile, day_count: u32, tolerance_pct: f64) -> String {
    let restrictions = if profile.dietary_restrictions.is_empty() {
        String::new()
    } else {
        format!(
            "- Dietary restrictions: {}\n",
            profile.dietary_restrictions.join(", ")
        )
    };

    format!(
        r#"Create a {day_count}-day personalized meal plan for:
- Age: {age}, Gender: {gender}
- Current weight: {weight_kg}kg, Height: {height_cm}cm
- Activity level: {activity}
- Goal: {goal}
- Daily calorie target: {target} calories
{restrictions}
IMPORTANT: Respond ONLY with valid JSON in this exact format:
{{
  "plan_name": "Descriptive name for this meal plan",
  "days": [
    {{
      "day_number": 1,
      "meals": [
        {{
          "meal_type": "breakfast",
          "meal_name": "Oatmeal with Berries",
          "calories": 350,
          "protein_g": 12,
          "carbs_g": 60,
          "fat_g": 8,
          "ingredients": ["1 cup oats", "1 cup berries", "1 tbsp honey"],
          "instructions": "Cook oats, top with berries and honey"
        }}
      ]
    }}
  ]
}}

Requirements:
- "days" must contain exactly {day_count} entries with "day_number" values 1 through {day_count}, each exactly once
- Each day must have breakfast, lunch, dinner, and 1-2 snacks; breakfast, lunch and dinner at most once per day
- "meal_type" must be one of: "breakfast", "lunch", "dinner", "snack"
- Total calories per day must stay within {tolerance:.0}% of {target}
- Include variety across days and realistic, achievable meals
- Include cooking instructions and balanced macronutrients
- {rules}"#,
        age = profile.age,
        gender = profile.gender.as_str(),
        weight_kg = profile.weight_kg,
        height_cm = profile.height_cm,
        activity = profile.activity_level.as_str(),
        goal = profile.goal.as_str(),
        target = profile.daily_calorie_target,
        tolerance = tolerance_pct,
        rules = OUTPUT_RULES,
    )
}

/// Instruction document for suggesting recipes from available ingredients.
/// Preferences are advisory filters woven into the text; they are never
/// enforced on the output. Deterministic for equal inputs.
#[must_use]
pub fn recipe_prompt(ingredients: &[String], preferences: Option<&RecipePreferences>) -> String {
    let mut advisory = String::new();
    if let Some(prefs) = preferences {
        if let Some(cuisine) = &prefs.cuisine {
            advisory.push_str(&format!("Cuisine preference: {cuisine}\n"));
        }
        if !prefs.dietary_restrictions.is_empty() {
            advisory.push_str(&format!(
                "Dietary restrictions: {}\n",
                prefs.dietary_restrictions.join(", ")
            ));
        }
        if let Some(max_calories) = prefs.max_calories {
            advisory.push_str(&format!("Max calories per serving: {max_calories}\n"));
        }
        if let Some(max_minutes) = prefs.max_cooking_time_minutes {
            advisory.push_str(&format!("Max cooking time: {max_minutes} minutes\n"));
        }
    }

    format!(
        r#"Suggest 3 healthy recipes using these ingredients: {ingredients}

{advisory}
IMPORTANT: Respond ONLY with valid JSON in this exact format:
{{
  "recipes": [
    {{
      "name": "Recipe Name",
      "description": "Brief description",
      "prep_time_minutes": 15,
      "cook_time_minutes": 30,
      "servings": 4,
      "calories_per_serving": 400,
      "protein_g": 25,
      "carbs_g": 45,
      "fat_g": 12,
      "ingredients": ["ingredient with amount"],
      "instructions": ["Step 1", "Step 2"],
      "tips": "Optional cooking tips"
    }}
  ]
}}

Rules:
- "recipes" must contain between 1 and 5 entries
- Time values are whole minutes, at most 600; "servings" is between 1 and 50
- "calories_per_serving" is a whole number; all gram values are non-negative
- "instructions" is an ordered list of steps; "tips" may be omitted
- {rules}"#,
        ingredients = ingredients.join(", "),
        advisory = advisory,
        rules = OUTPUT_RULES,
    )
}

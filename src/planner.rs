// ABOUTME: Meal plan assembler checking day coverage and flagging calorie-budget deviations
// ABOUTME: Deterministic post-validation pass; performs no inference calls
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriLens

//! # Meal Plan Assembler
//!
//! Takes a validated [`MealPlan`] and arranges it into a day-indexed
//! schedule: days are ordered by `day_number` regardless of the order the
//! service emitted them, coverage 1..=N is confirmed contiguous, and every
//! day whose aggregate calories fall outside the tolerance band around the
//! target is flagged. Flags are warnings carried on the result, never hard
//! failures: model output is advisory.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AssemblyError;
use crate::models::MealPlan;

/// Non-fatal marker for a day whose aggregate calories fall outside the
/// tolerance band around the daily target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalorieFlag {
    /// Day the deviation occurred on.
    pub day_number: u32,
    /// Aggregate calories across the day's meals.
    pub total_calories: u32,
    /// Signed deviation from the target, in percent.
    pub deviation_pct: f64,
}

/// A schedulable plan: days ordered 1..=N plus any calorie deviation flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssembledPlan {
    /// The ordered plan.
    pub plan: MealPlan,
    /// Days outside the calorie tolerance band; empty when all conform.
    pub flags: Vec<CalorieFlag>,
}

/// Arrange a validated plan into a day-indexed schedule and check calorie
/// conformance against the target budget.
///
/// # Errors
///
/// - [`AssemblyError::EmptyPlan`] when the plan has no days.
/// - [`AssemblyError::IncompleteSchedule`] when day numbers do not cover
///   1..=`day_count` exactly (gaps, duplicates, or out-of-range values),
///   naming the offending day numbers.
pub fn assemble(
    mut plan: MealPlan,
    target_calories: u32,
    day_count: u32,
    tolerance_pct: f64,
) -> Result<AssembledPlan, AssemblyError> {
    if plan.days.is_empty() {
        return Err(AssemblyError::EmptyPlan);
    }

    plan.days.sort_by_key(|d| d.day_number);

    let mut counts = vec![0_usize; day_count as usize];
    let mut out_of_range = Vec::new();
    for day in &plan.days {
        if day.day_number == 0 || day.day_number > day_count {
            out_of_range.push(day.day_number);
        } else {
            counts[(day.day_number - 1) as usize] += 1;
        }
    }

    let missing: Vec<u32> = counts
        .iter()
        .enumerate()
        .filter(|(_, &c)| c == 0)
        .map(|(i, _)| i as u32 + 1)
        .collect();
    let duplicated: Vec<u32> = counts
        .iter()
        .enumerate()
        .filter(|(_, &c)| c > 1)
        .map(|(i, _)| i as u32 + 1)
        .collect();

    if !missing.is_empty() || !duplicated.is_empty() || !out_of_range.is_empty() {
        let mut parts = Vec::new();
        if !missing.is_empty() {
            parts.push(format!("missing day(s) {missing:?}"));
        }
        if !duplicated.is_empty() {
            parts.push(format!("duplicate day(s) {duplicated:?}"));
        }
        if !out_of_range.is_empty() {
            parts.push(format!("day number(s) {out_of_range:?} outside 1..={day_count}"));
        }
        return Err(AssemblyError::IncompleteSchedule {
            detail: parts.join("; "),
        });
    }

    let mut flags = Vec::new();
    if target_calories > 0 {
        for day in &plan.days {
            let total = day.total_calories();
            let deviation_pct = (f64::from(total) - f64::from(target_calories))
                / f64::from(target_calories)
                * 100.0;
            if deviation_pct.abs() > tolerance_pct {
                warn!(
                    day_number = day.day_number,
                    total_calories = total,
                    target_calories,
                    deviation_pct,
                    "plan day outside calorie tolerance band"
                );
                flags.push(CalorieFlag {
                    day_number: day.day_number,
                    total_calories: total,
                    deviation_pct,
                });
            }
        }
    }

    Ok(AssembledPlan { plan, flags })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MealType, PlanDay, PlanMealItem};

    fn meal(meal_type: MealType, calories: u32) -> PlanMealItem {
        PlanMealItem {
            meal_type,
            meal_name: "meal".into(),
            calories,
            protein_g: 20.0,
            carbs_g: 40.0,
            fat_g: 10.0,
            ingredients: vec!["stuff".into()],
            instructions: "cook".into(),
        }
    }

    fn day(day_number: u32, calories_per_meal: u32) -> PlanDay {
        PlanDay {
            day_number,
            meals: vec![
                meal(MealType::Breakfast, calories_per_meal),
                meal(MealType::Lunch, calories_per_meal),
                meal(MealType::Dinner, calories_per_meal),
                meal(MealType::Snack, calories_per_meal),
            ],
        }
    }

    fn plan(day_numbers: &[u32]) -> MealPlan {
        MealPlan {
            plan_name: "Test plan".into(),
            days: day_numbers.iter().map(|&n| day(n, 500)).collect(),
        }
    }

    #[test]
    fn test_conforming_week_has_no_flags() {
        // 4 meals x 500 kcal = 2000 kcal/day, dead on target.
        let assembled = assemble(plan(&[1, 2, 3, 4, 5, 6, 7]), 2000, 7, 15.0).unwrap();
        assert!(assembled.flags.is_empty());
        assert_eq!(assembled.plan.days.len(), 7);
    }

    #[test]
    fn test_days_are_ordered_regardless_of_emission_order() {
        let assembled = assemble(plan(&[3, 1, 2]), 2000, 3, 15.0).unwrap();
        let numbers: Vec<u32> = assembled.plan.days.iter().map(|d| d.day_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_duplicate_and_missing_days_fail() {
        let err = assemble(plan(&[1, 2, 2, 4, 5, 6, 7]), 2000, 7, 15.0).unwrap_err();
        match err {
            AssemblyError::IncompleteSchedule { detail } => {
                assert!(detail.contains("missing day(s) [3]"), "{detail}");
                assert!(detail.contains("duplicate day(s) [2]"), "{detail}");
            }
            AssemblyError::EmptyPlan => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_out_of_range_day_number_fails() {
        let err = assemble(plan(&[1, 2, 9]), 2000, 3, 15.0).unwrap_err();
        assert!(matches!(err, AssemblyError::IncompleteSchedule { .. }));
    }

    #[test]
    fn test_empty_plan_fails() {
        let err = assemble(plan(&[]), 2000, 7, 15.0).unwrap_err();
        assert_eq!(err, AssemblyError::EmptyPlan);
    }

    #[test]
    fn test_deviating_day_is_flagged_not_rejected() {
        let mut p = plan(&[1, 2, 3]);
        // Day 2 runs hot: 4 x 700 = 2800 kcal against a 2000 target (+40%).
        p.days[1] = day(2, 700);
        let assembled = assemble(p, 2000, 3, 15.0).unwrap();
        assert_eq!(assembled.flags.len(), 1);
        let flag = &assembled.flags[0];
        assert_eq!(flag.day_number, 2);
        assert_eq!(flag.total_calories, 2800);
        assert!((flag.deviation_pct - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_deviation_inside_band_is_not_flagged() {
        let mut p = plan(&[1]);
        // 4 x 540 = 2160 kcal, +8% of 2000: inside the 15% band.
        p.days[0] = day(1, 540);
        let assembled = assemble(p, 2000, 1, 15.0).unwrap();
        assert!(assembled.flags.is_empty());
    }
}

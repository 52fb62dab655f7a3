// ABOUTME: Integration tests for payload extraction and the extract-then-validate round trip
// ABOUTME: Covers fenced output, prose wrappers, truncation, and numeric precision preservation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriLens

// Test modules don't need documentation
#![allow(missing_docs)]
// Allow unwrap in tests - tests should panic on failure
#![allow(clippy::unwrap_used)]

use nutrilens::errors::ExtractionError;
use nutrilens::extract::extract_payload;
use nutrilens::models::Confidence;
use nutrilens::schema::validate_estimate;

const FENCED_ESTIMATE: &str = r#"Sure, here is the analysis you asked for!

```json
{
  "meal_name": "Avocado toast",
  "calories": 420,
  "protein_g": 11.25,
  "carbs_g": 38.5,
  "fat_g": 24.75,
  "fiber_g": 9.0,
  "confidence": "medium",
  "ingredients": ["sourdough bread", "avocado", "olive oil"],
  "suggestions": "Add an egg for extra protein."
}
```

Let me know if you want alternatives."#;

#[test]
fn test_extract_simple_fenced_object() {
    let raw = "Sure! ```json\n{\"a\":1}\n```";
    let value = extract_payload(raw).unwrap();
    assert_eq!(value, serde_json::json!({"a": 1}));
}

#[test]
fn test_extract_without_structure_fails() {
    let result = extract_payload("I see a plate of food but cannot estimate it.");
    assert_eq!(result.unwrap_err(), ExtractionError::NoStructureFound);
}

#[test]
fn test_extract_truncated_generation_fails() {
    let result = extract_payload("{\"a\": [1,2,");
    assert!(matches!(
        result.unwrap_err(),
        ExtractionError::MalformedSyntax(_)
    ));
}

#[test]
fn test_roundtrip_preserves_field_values_exactly() {
    let value = extract_payload(FENCED_ESTIMATE).unwrap();
    let estimate = validate_estimate(&value).unwrap();

    assert_eq!(estimate.meal_name, "Avocado toast");
    assert_eq!(estimate.calories, 420);
    // Fractional gram values must survive without precision loss.
    assert_eq!(estimate.protein_g, 11.25);
    assert_eq!(estimate.carbs_g, 38.5);
    assert_eq!(estimate.fat_g, 24.75);
    assert_eq!(estimate.fiber_g, 9.0);
    assert_eq!(estimate.confidence, Confidence::Medium);
    assert_eq!(
        estimate.ingredients,
        vec!["sourdough bread", "avocado", "olive oil"]
    );
    assert_eq!(estimate.suggestions, "Add an egg for extra protein.");
}

#[test]
fn test_roundtrip_is_idempotent_through_serialization() {
    let value = extract_payload(FENCED_ESTIMATE).unwrap();
    let estimate = validate_estimate(&value).unwrap();

    let reserialized = serde_json::to_value(&estimate).unwrap();
    let again = validate_estimate(&reserialized).unwrap();
    assert_eq!(estimate, again);
}

// ABOUTME: Nutrition inference and planning pipeline over generative vision models
// ABOUTME: Turns unstructured model output into validated, bounded, schedulable nutrition data
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriLens

//! # NutriLens
//!
//! A nutrition inference and planning pipeline: prompts a generative
//! vision/text model, extracts the structured payload from its free-form
//! reply, validates it against a closed schema, and — for meal plans —
//! assembles a day-indexed schedule under a caloric budget.
//!
//! Model output is treated as untrusted input end to end: malformed or
//! out-of-bounds payloads are detected and rejected, never silently
//! persisted or clamped. Persistence, identity, and rendering belong to
//! the embedding application; the pipeline returns typed results and
//! performs exactly one outbound network call per invocation.
//!
//! ## Example
//!
//! ```rust,no_run
//! use nutrilens::llm::GeminiProvider;
//! use nutrilens::pipeline::NutritionPipeline;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = GeminiProvider::from_env()?;
//! let pipeline = NutritionPipeline::new(provider);
//!
//! let image = std::fs::read("lunch.jpg")?;
//! let estimate = pipeline.analyze_image(&image, "image/jpeg").await?;
//! println!("{}: {} kcal", estimate.meal_name, estimate.calories);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Environment-driven pipeline configuration.
pub mod config;

/// Stage error taxonomy and the unified pipeline error.
pub mod errors;

/// Structured payload extraction from free-form model text.
pub mod extract;

/// Inference provider abstraction and the Gemini implementation.
pub mod llm;

/// Logging setup for embedding applications.
pub mod logging;

/// Domain data model shared across the pipeline.
pub mod models;

/// Pipeline orchestration and retry policy.
pub mod pipeline;

/// Meal plan assembly and calorie conformance flags.
pub mod planner;

/// Prompt builders embedding the wire contract.
pub mod prompts;

/// Payload schema validation.
pub mod schema;

pub use config::PipelineConfig;
pub use errors::{
    AssemblyError, ExtractionError, GatewayError, PipelineError, PipelineStage, ValidationError,
};
pub use models::{
    ActivityLevel, Confidence, Gender, Goal, MealPlan, MealType, NutritionEstimate, PlanDay,
    PlanMealItem, RecipePreferences, RecipeSuggestion, UserProfile,
};
pub use pipeline::NutritionPipeline;
pub use planner::{AssembledPlan, CalorieFlag};

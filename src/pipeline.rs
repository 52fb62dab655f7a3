// ABOUTME: Pipeline orchestrator composing prompt, gateway, extractor, validator, and assembler
// ABOUTME: Owns the retry policy; every invocation is an independent unit of work with one network call
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriLens

//! # Pipeline Orchestrator
//!
//! Three user-facing operations share one skeleton: build prompt → invoke
//! gateway → extract payload → validate → (assemble, for plans) → typed
//! result. The orchestrator is the only place retries happen:
//!
//! - Transient gateway failures (quota, rate limit, unavailable) are
//!   retried up to `transport_retries` with linear backoff.
//! - `Unauthenticated` and `InvalidRequest` surface immediately.
//! - Extraction and validation failures re-issue the same deterministic
//!   prompt up to `content_retries` times; a repeat failure surfaces as-is
//!   and is never coerced into a default payload.
//! - Assembly failures never retry.
//!
//! No stage performs a persistent side effect, so dropping the returned
//! future mid-flight is always safe and needs no compensation.

use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::config::PipelineConfig;
use crate::errors::{GatewayError, PipelineError, ValidationError};
use crate::extract::extract_payload;
use crate::llm::{ImageAttachment, InferenceProvider, InferenceRequest};
use crate::models::{NutritionEstimate, RecipePreferences, RecipeSuggestion, UserProfile};
use crate::planner::{assemble, AssembledPlan};
use crate::prompts::{analyze_image_prompt, meal_plan_prompt, recipe_prompt};
use crate::schema::{check_day_count, validate_estimate, validate_meal_plan, validate_recipes};

/// Sampling temperature for plan generation; variety across days matters
/// more than strict determinism there.
const PLAN_TEMPERATURE: f32 = 0.7;

/// The nutrition inference and planning pipeline.
///
/// Stateless between invocations: each call carries its own prompt,
/// response, and validation context, so concurrent invocations need no
/// coordination.
#[derive(Debug)]
pub struct NutritionPipeline<P> {
    provider: P,
    config: PipelineConfig,
}

impl<P: InferenceProvider> NutritionPipeline<P> {
    /// Create a pipeline with default configuration.
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, PipelineConfig::default())
    }

    /// Create a pipeline with explicit configuration.
    #[must_use]
    pub const fn with_config(provider: P, config: PipelineConfig) -> Self {
        Self { provider, config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Analyze a food image into a validated nutrition estimate.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] with the originating stage on any
    /// failure; empty image bytes or media type are rejected before any
    /// network call.
    #[instrument(skip(self, image), fields(media_type, image_bytes = image.len()))]
    pub async fn analyze_image(
        &self,
        image: &[u8],
        media_type: &str,
    ) -> Result<NutritionEstimate, PipelineError> {
        if image.is_empty() {
            return Err(ValidationError::EmptyValue {
                path: "image".into(),
            }
            .into());
        }
        if media_type.trim().is_empty() {
            return Err(ValidationError::EmptyValue {
                path: "media_type".into(),
            }
            .into());
        }

        let request = InferenceRequest::new(analyze_image_prompt())
            .with_attachment(ImageAttachment::new(media_type, image.to_vec()))
            .with_timeout(self.config.image_timeout);

        let estimate = self.run(&request, validate_estimate).await?;
        info!(
            meal_name = %estimate.meal_name,
            calories = estimate.calories,
            confidence = estimate.confidence.as_str(),
            "image analysis complete"
        );
        Ok(estimate)
    }

    /// Generate a multi-day meal plan for a profile.
    ///
    /// The returned [`AssembledPlan`] carries the ordered plan and any
    /// calorie deviation flags so the caller can surface them.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] with the originating stage; a `day_count`
    /// outside 1..=30 is rejected before any network call.
    #[instrument(skip(self, profile), fields(day_count, target = profile.daily_calorie_target))]
    pub async fn generate_plan(
        &self,
        profile: &UserProfile,
        day_count: u32,
    ) -> Result<AssembledPlan, PipelineError> {
        check_day_count(day_count)?;

        let prompt = meal_plan_prompt(profile, day_count, self.config.calorie_tolerance_pct);
        let request = InferenceRequest::new(prompt)
            .with_temperature(PLAN_TEMPERATURE)
            .with_timeout(self.config.plan_timeout);

        let plan = self
            .run(&request, |value| validate_meal_plan(value, day_count))
            .await?;

        let assembled = assemble(
            plan,
            profile.daily_calorie_target,
            day_count,
            self.config.calorie_tolerance_pct,
        )?;
        info!(
            plan_name = %assembled.plan.plan_name,
            days = assembled.plan.days.len(),
            flagged_days = assembled.flags.len(),
            "meal plan generated"
        );
        Ok(assembled)
    }

    /// Suggest recipes for the given ingredients and advisory preferences.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] with the originating stage; an empty
    /// ingredient list is rejected before any network call.
    #[instrument(skip(self, ingredients, preferences), fields(ingredient_count = ingredients.len()))]
    pub async fn suggest_recipes(
        &self,
        ingredients: &[String],
        preferences: Option<&RecipePreferences>,
    ) -> Result<Vec<RecipeSuggestion>, PipelineError> {
        if ingredients.is_empty() {
            return Err(ValidationError::EmptyValue {
                path: "ingredients".into(),
            }
            .into());
        }

        let request = InferenceRequest::new(recipe_prompt(ingredients, preferences))
            .with_timeout(self.config.recipe_timeout);

        let recipes = self.run(&request, validate_recipes).await?;
        info!(count = recipes.len(), "recipe suggestions ready");
        Ok(recipes)
    }

    /// One invoke → extract → validate pass with the content retry policy:
    /// the same deterministic prompt is re-issued when the model emits an
    /// unusable generation, on the presumption of generation noise rather
    /// than structural mismatch.
    async fn run<T, F>(&self, request: &InferenceRequest, validate: F) -> Result<T, PipelineError>
    where
        F: Fn(&Value) -> Result<T, ValidationError>,
    {
        let mut content_attempt: u32 = 0;
        loop {
            let raw = self.invoke_with_retry(request).await?;
            let outcome = extract_payload(&raw)
                .map_err(PipelineError::from)
                .and_then(|value| validate(&value).map_err(PipelineError::from));

            match outcome {
                Ok(payload) => return Ok(payload),
                Err(err) if content_attempt < self.config.content_retries => {
                    content_attempt += 1;
                    warn!(
                        stage = %err.stage(),
                        attempt = content_attempt,
                        error = %err,
                        "model output rejected, re-issuing prompt"
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// One logical gateway call with the transport retry policy.
    async fn invoke_with_retry(
        &self,
        request: &InferenceRequest,
    ) -> Result<String, GatewayError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.provider.invoke(request).await {
                Ok(text) => {
                    debug!(provider = self.provider.name(), attempt, "inference call succeeded");
                    return Ok(text);
                }
                Err(err) if err.is_retryable() && attempt <= self.config.transport_retries => {
                    let backoff = self.config.retry_backoff * attempt;
                    warn!(
                        provider = self.provider.name(),
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "transient gateway failure, retrying"
                    );
                    sleep(backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

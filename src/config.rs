// ABOUTME: Environment-driven pipeline configuration with sane defaults
// ABOUTME: Timeouts, retry bounds, and the calorie tolerance band are configuration, not constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriLens

//! # Pipeline Configuration
//!
//! Environment-only configuration: every knob has a default and an
//! environment variable override. Unparseable values log a warning and
//! keep the default; `from_env` never panics.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `NUTRILENS_IMAGE_TIMEOUT_SECS` | 30 | Image analysis call bound |
//! | `NUTRILENS_PLAN_TIMEOUT_SECS` | 60 | Plan generation call bound |
//! | `NUTRILENS_RECIPE_TIMEOUT_SECS` | 30 | Recipe suggestion call bound |
//! | `NUTRILENS_TRANSPORT_RETRIES` | 2 | Retries for transient gateway failures |
//! | `NUTRILENS_CONTENT_RETRIES` | 1 | Prompt re-issues for rejected model output |
//! | `NUTRILENS_RETRY_BACKOFF_MS` | 500 | Linear backoff unit between retries |
//! | `NUTRILENS_CALORIE_TOLERANCE_PCT` | 15.0 | Daily calorie tolerance band |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

/// Tunable bounds for the pipeline orchestrator.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Wall-clock bound for an image analysis inference call.
    pub image_timeout: Duration,
    /// Wall-clock bound for a plan generation inference call (larger
    /// output, proportionally larger bound).
    pub plan_timeout: Duration,
    /// Wall-clock bound for a recipe suggestion inference call.
    pub recipe_timeout: Duration,
    /// Retries for quota/rate-limit/availability gateway failures.
    pub transport_retries: u32,
    /// Re-issues of the same prompt after extraction or validation
    /// failures (transient model non-compliance).
    pub content_retries: u32,
    /// Linear backoff unit: the n-th retry waits n times this.
    pub retry_backoff: Duration,
    /// Allowed percentage deviation between a day's aggregate calories and
    /// the daily target before the day is flagged.
    pub calorie_tolerance_pct: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            image_timeout: Duration::from_secs(30),
            plan_timeout: Duration::from_secs(60),
            recipe_timeout: Duration::from_secs(30),
            transport_retries: 2,
            content_retries: 1,
            retry_backoff: Duration::from_millis(500),
            calorie_tolerance_pct: 15.0,
        }
    }
}

impl PipelineConfig {
    /// Build a configuration from environment variables, falling back to
    /// defaults for anything missing or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            image_timeout: env_secs("NUTRILENS_IMAGE_TIMEOUT_SECS", defaults.image_timeout),
            plan_timeout: env_secs("NUTRILENS_PLAN_TIMEOUT_SECS", defaults.plan_timeout),
            recipe_timeout: env_secs("NUTRILENS_RECIPE_TIMEOUT_SECS", defaults.recipe_timeout),
            transport_retries: env_parse("NUTRILENS_TRANSPORT_RETRIES", defaults.transport_retries),
            content_retries: env_parse("NUTRILENS_CONTENT_RETRIES", defaults.content_retries),
            retry_backoff: env_millis("NUTRILENS_RETRY_BACKOFF_MS", defaults.retry_backoff),
            calorie_tolerance_pct: env_parse(
                "NUTRILENS_CALORIE_TOLERANCE_PCT",
                defaults.calorie_tolerance_pct,
            ),
        }
    }
}

fn env_parse<T: FromStr + Copy>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(variable = name, value = %raw, "unparseable value, using default");
            default
        }),
        Err(_) => default,
    }
}

fn env_secs(name: &str, default: Duration) -> Duration {
    Duration::from_secs(env_parse(name, default.as_secs()))
}

fn env_millis(name: &str, default: Duration) -> Duration {
    #[allow(clippy::cast_possible_truncation)]
    Duration::from_millis(env_parse(name, default.as_millis() as u64))
}

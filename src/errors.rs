// ABOUTME: Stage error taxonomy for the nutrition inference pipeline
// ABOUTME: Defines per-stage error types and the unified PipelineError surfaced to callers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriLens

//! # Pipeline Error Taxonomy
//!
//! Every pipeline stage owns a dedicated error type so the orchestrator can
//! dispatch its retry policy on typed variants instead of string matching:
//!
//! - [`GatewayError`] — transport, credential, and quota failures from the
//!   inference service (syntactically fine request, call itself failed).
//! - [`ExtractionError`] — the model replied, but no parseable structured
//!   payload could be isolated from the text (syntactic).
//! - [`ValidationError`] — a payload parsed, but violates the schema
//!   contract (semantic).
//! - [`AssemblyError`] — a validated plan is structurally unschedulable.
//!
//! [`PipelineError`] unifies the four at the crate boundary and carries the
//! originating [`PipelineStage`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Failures from the external inference service.
///
/// Classification drives the orchestrator's retry-vs-fail decision:
/// quota, rate-limit, and availability failures are transient and worth
/// retrying; credential and request-shape failures are not.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// Missing or rejected credential; never retried.
    #[error("inference credential missing or rejected: {0}")]
    Unauthenticated(String),
    /// Usage quota exhausted on the service side.
    #[error("inference quota exceeded: {0}")]
    QuotaExceeded(String),
    /// Request rate throttled by the service.
    #[error("inference service rate limited: {0}")]
    RateLimited(String),
    /// Transport failure, timeout, or 5xx-equivalent service condition.
    #[error("inference service unavailable: {0}")]
    ServiceUnavailable(String),
    /// The service rejected the prompt or attachment as malformed; never retried.
    #[error("inference service rejected the request: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    /// Whether the orchestrator may retry this failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::QuotaExceeded(_) | Self::RateLimited(_) | Self::ServiceUnavailable(_)
        )
    }
}

/// Syntactic failures isolating a structured payload from free-form model text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    /// The response text contains no object-like span at all.
    #[error("no structured payload found in model output")]
    NoStructureFound,
    /// An object span was found but does not parse (truncated generation,
    /// unbalanced braces, or invalid syntax inside the span).
    #[error("structured payload is malformed: {0}")]
    MalformedSyntax(String),
}

/// Semantic failures validating an extracted payload against the schema.
///
/// Each variant names the first offending field by dotted path
/// (e.g. `days[2].meals[0].calories`) and the rule violated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is absent.
    #[error("{path}: required field is missing")]
    MissingField {
        /// Dotted path of the missing field.
        path: String,
    },
    /// A field is present with the wrong primitive type.
    #[error("{path}: expected {expected}")]
    WrongType {
        /// Dotted path of the offending field.
        path: String,
        /// Human-readable expected type.
        expected: &'static str,
    },
    /// A string field holds a value outside its closed enum.
    #[error("{path}: `{value}` is not one of {allowed}")]
    InvalidEnum {
        /// Dotted path of the offending field.
        path: String,
        /// The rejected value.
        value: String,
        /// Allowed values, for the error message.
        allowed: &'static str,
    },
    /// A numeric field is negative or implausibly large.
    #[error("{path}: {detail}")]
    OutOfRange {
        /// Dotted path of the offending field.
        path: String,
        /// Bound that was violated.
        detail: String,
    },
    /// A required text or list field is empty.
    #[error("{path}: must not be empty")]
    EmptyValue {
        /// Dotted path of the offending field.
        path: String,
    },
    /// A meal plan violates its day/meal shape rules.
    #[error("{path}: {detail}")]
    ScheduleShape {
        /// Dotted path of the offending field.
        path: String,
        /// Shape rule that was violated.
        detail: String,
    },
}

impl ValidationError {
    /// Dotted path of the first offending field.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::MissingField { path }
            | Self::WrongType { path, .. }
            | Self::InvalidEnum { path, .. }
            | Self::OutOfRange { path, .. }
            | Self::EmptyValue { path }
            | Self::ScheduleShape { path, .. } => path,
        }
    }
}

/// Schedule-shape failures assembling a validated plan.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssemblyError {
    /// Day coverage 1..=N is not complete and contiguous.
    #[error("incomplete schedule: {detail}")]
    IncompleteSchedule {
        /// Missing, duplicated, or out-of-range day numbers.
        detail: String,
    },
    /// The plan carries no days at all.
    #[error("plan contains no days")]
    EmptyPlan,
}

/// The pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    /// Inference service invocation.
    Gateway,
    /// Structured payload extraction from raw text.
    Extraction,
    /// Schema validation of the extracted payload.
    Validation,
    /// Meal plan schedule assembly.
    Assembly,
}

impl PipelineStage {
    /// Stable string form used in logs and error messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gateway => "gateway",
            Self::Extraction => "extraction",
            Self::Validation => "validation",
            Self::Assembly => "assembly",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error surfaced by the orchestrator, carrying the originating
/// stage and the human-readable cause.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// Inference call failed.
    #[error("gateway: {0}")]
    Gateway(#[from] GatewayError),
    /// No structured payload could be isolated.
    #[error("extraction: {0}")]
    Extraction(#[from] ExtractionError),
    /// Extracted payload violates the schema.
    #[error("validation: {0}")]
    Validation(#[from] ValidationError),
    /// Validated plan is unschedulable.
    #[error("assembly: {0}")]
    Assembly(#[from] AssemblyError),
}

impl PipelineError {
    /// The stage this error originated from.
    #[must_use]
    pub const fn stage(&self) -> PipelineStage {
        match self {
            Self::Gateway(_) => PipelineStage::Gateway,
            Self::Extraction(_) => PipelineStage::Extraction,
            Self::Validation(_) => PipelineStage::Validation,
            Self::Assembly(_) => PipelineStage::Assembly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_retryable_partition() {
        assert!(GatewayError::QuotaExceeded("q".into()).is_retryable());
        assert!(GatewayError::RateLimited("r".into()).is_retryable());
        assert!(GatewayError::ServiceUnavailable("s".into()).is_retryable());
        assert!(!GatewayError::Unauthenticated("u".into()).is_retryable());
        assert!(!GatewayError::InvalidRequest("i".into()).is_retryable());
    }

    #[test]
    fn test_pipeline_error_carries_stage() {
        let err = PipelineError::from(ExtractionError::NoStructureFound);
        assert_eq!(err.stage(), PipelineStage::Extraction);
        assert!(err.to_string().starts_with("extraction:"));

        let err = PipelineError::from(GatewayError::RateLimited("slow down".into()));
        assert_eq!(err.stage(), PipelineStage::Gateway);
        assert!(err.to_string().contains("slow down"));
    }

    #[test]
    fn test_validation_error_exposes_field_path() {
        let err = ValidationError::OutOfRange {
            path: "days[2].meals[0].calories".into(),
            detail: "must be at most 10000".into(),
        };
        assert_eq!(err.path(), "days[2].meals[0].calories");
        assert!(err.to_string().contains("days[2].meals[0].calories"));
    }
}

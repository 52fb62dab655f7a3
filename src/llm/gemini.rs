// ABOUTME: Google Gemini inference provider with vision support via inline image data
// ABOUTME: Classifies API failures into the gateway taxonomy that drives orchestrator retries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriLens

//! # Gemini Provider
//!
//! Implementation of [`InferenceProvider`] for Google's Gemini models via
//! the Generative Language REST API.
//!
//! ## Configuration
//!
//! Set the `GEMINI_API_KEY` environment variable with your API key from
//! Google AI Studio. `NUTRILENS_MODEL` overrides the default model.
//!
//! ## Failure classification
//!
//! - 401/403 → [`GatewayError::Unauthenticated`]
//! - 429 → [`GatewayError::QuotaExceeded`] when the service reports quota
//!   exhaustion, otherwise [`GatewayError::RateLimited`]
//! - 400 → [`GatewayError::InvalidRequest`]
//! - 5xx, transport errors, timeouts → [`GatewayError::ServiceUnavailable`]

use std::env;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{InferenceProvider, InferenceRequest};
use crate::errors::GatewayError;

/// Environment variable for the Gemini API key.
const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable overriding the default model.
const MODEL_ENV: &str = "NUTRILENS_MODEL";

/// Default model to use.
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Base URL for the Gemini API.
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// ============================================================================
// API Request/Response Types
// ============================================================================

/// Gemini API request structure.
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

/// Content structure for the Gemini API.
#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<ContentPart>,
}

/// Part of content: text or inline binary data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    /// Text content.
    Text { text: String },
    /// Inline binary attachment (base64-encoded).
    InlineData { inline_data: InlineData },
}

/// Base64-encoded attachment with its declared media type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

/// Generation configuration.
#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    candidate_count: u32,
}

/// Gemini API response structure.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<GeminiError>,
}

/// Response candidate.
#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

/// API error object from Gemini.
#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
    status: Option<String>,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Google Gemini inference provider.
pub struct GeminiProvider {
    api_key: String,
    client: Client,
    default_model: String,
}

impl GeminiProvider {
    /// Create a new provider with an API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            default_model: DEFAULT_MODEL.to_owned(),
        }
    }

    /// Create a provider from the `GEMINI_API_KEY` environment variable,
    /// honoring `NUTRILENS_MODEL` as a model override.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unauthenticated`] when the key is not set.
    pub fn from_env() -> Result<Self, GatewayError> {
        let api_key = env::var(GEMINI_API_KEY_ENV).map_err(|_| {
            GatewayError::Unauthenticated(format!(
                "{GEMINI_API_KEY_ENV} environment variable not set"
            ))
        })?;
        let mut provider = Self::new(api_key);
        if let Ok(model) = env::var(MODEL_ENV) {
            if !model.trim().is_empty() {
                provider = provider.with_default_model(model);
            }
        }
        Ok(provider)
    }

    /// Set a custom default model.
    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Build the API URL for a model.
    fn build_url(&self, model: &str) -> String {
        format!("{API_BASE_URL}/models/{model}:generateContent?key={}", self.api_key)
    }

    /// Build a Gemini API request from an [`InferenceRequest`].
    fn build_gemini_request(request: &InferenceRequest) -> GeminiRequest {
        let mut parts = vec![ContentPart::Text {
            text: request.prompt.clone(),
        }];
        if let Some(attachment) = &request.attachment {
            parts.push(ContentPart::InlineData {
                inline_data: InlineData {
                    mime_type: attachment.media_type.clone(),
                    data: BASE64.encode(&attachment.data),
                },
            });
        }

        let generation_config =
            if request.temperature.is_some() || request.max_output_tokens.is_some() {
                Some(GenerationConfig {
                    temperature: request.temperature,
                    max_output_tokens: request.max_output_tokens,
                    candidate_count: 1,
                })
            } else {
                None
            };

        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_owned()),
                parts,
            }],
            generation_config,
        }
    }

    /// Extract the text of the first candidate from a Gemini response.
    fn extract_text(response: GeminiResponse) -> Result<String, GatewayError> {
        if let Some(error) = response.error {
            return Err(GatewayError::ServiceUnavailable(format!(
                "Gemini API error: {}",
                error.message
            )));
        }

        let candidate = response
            .candidates
            .and_then(|mut c| if c.is_empty() { None } else { Some(c.remove(0)) })
            .ok_or_else(|| {
                GatewayError::ServiceUnavailable("no candidates in Gemini response".to_owned())
            })?;

        if let Some(reason) = &candidate.finish_reason {
            debug!(finish_reason = %reason, "Gemini candidate finished");
        }

        let text = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| match p {
                        ContentPart::Text { text } => Some(text),
                        ContentPart::InlineData { .. } => None,
                    })
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GatewayError::ServiceUnavailable(
                "no content in Gemini response".to_owned(),
            ));
        }
        Ok(text)
    }

    /// Map an API error status to the gateway taxonomy.
    fn map_api_error(status: u16, response_text: &str) -> GatewayError {
        let parsed = serde_json::from_str::<GeminiResponse>(response_text)
            .ok()
            .and_then(|r| r.error);
        let (message, api_status) = parsed.map_or_else(
            || (response_text.to_owned(), None),
            |e| (e.message, e.status),
        );

        match status {
            400 => GatewayError::InvalidRequest(message),
            401 | 403 => GatewayError::Unauthenticated(message),
            429 => {
                let friendly = Self::quota_message(&message);
                let quota = api_status.as_deref() == Some("RESOURCE_EXHAUSTED")
                    || message.to_lowercase().contains("quota");
                if quota {
                    GatewayError::QuotaExceeded(friendly)
                } else {
                    GatewayError::RateLimited(friendly)
                }
            }
            _ => GatewayError::ServiceUnavailable(format!(
                "Gemini API error ({status}): {message}"
            )),
        }
    }

    /// Extract a user-friendly retry hint from a quota/rate-limit message.
    ///
    /// Looks for "Please retry in X" and rounds the seconds value up.
    /// Example input: "Please retry in 6.406453963s."
    fn quota_message(message: &str) -> String {
        if let Some(retry_pos) = message.find("Please retry in ") {
            let after_prefix = &message[retry_pos + 16..];
            if let Some(s_pos) = after_prefix.find('s') {
                let time_str = &after_prefix[..s_pos];
                if let Ok(seconds) = time_str.parse::<f64>() {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let seconds_int = seconds.ceil() as u64;
                    return format!(
                        "AI service quota exceeded. Please try again in {seconds_int} seconds."
                    );
                }
            }
        }
        "AI service quota exceeded. Please wait a moment and try again.".to_owned()
    }
}

#[async_trait]
impl InferenceProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    #[instrument(
        skip(self, request),
        fields(
            model = %self.default_model,
            has_attachment = request.attachment.is_some(),
            timeout_secs = request.timeout.as_secs()
        )
    )]
    async fn invoke(&self, request: &InferenceRequest) -> Result<String, GatewayError> {
        let url = self.build_url(&self.default_model);
        let gemini_request = Self::build_gemini_request(request);

        debug!("Sending request to Gemini API");

        let response = self
            .client
            .post(&url)
            .timeout(request.timeout)
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::ServiceUnavailable(format!(
                        "inference call timed out after {}s",
                        request.timeout.as_secs()
                    ))
                } else {
                    GatewayError::ServiceUnavailable(format!("transport error: {e}"))
                }
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            GatewayError::ServiceUnavailable(format!("failed to read response body: {e}"))
        })?;

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            return Err(Self::map_api_error(status.as_u16(), &response_text));
        }

        let gemini_response: GeminiResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                error!(error = %e, "Failed to parse Gemini response body");
                GatewayError::ServiceUnavailable(format!(
                    "unparseable Gemini response body: {e}"
                ))
            })?;

        let text = Self::extract_text(gemini_response)?;
        debug!(chars = text.len(), "Successfully received Gemini response");
        Ok(text)
    }
}

impl Debug for GeminiProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiProvider")
            .field("default_model", &self.default_model)
            .field("api_key", &"[REDACTED]")
            // Omit `client` field as HTTP clients are not useful to debug
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ImageAttachment;

    #[test]
    fn test_map_api_error_classification() {
        assert!(matches!(
            GeminiProvider::map_api_error(401, "key rejected"),
            GatewayError::Unauthenticated(_)
        ));
        assert!(matches!(
            GeminiProvider::map_api_error(403, "forbidden"),
            GatewayError::Unauthenticated(_)
        ));
        assert!(matches!(
            GeminiProvider::map_api_error(400, "bad image payload"),
            GatewayError::InvalidRequest(_)
        ));
        assert!(matches!(
            GeminiProvider::map_api_error(503, "overloaded"),
            GatewayError::ServiceUnavailable(_)
        ));
    }

    #[test]
    fn test_429_splits_quota_from_rate_limit() {
        let quota_body = r#"{"error": {"message": "You exceeded your current quota. Please retry in 6.4s.", "status": "RESOURCE_EXHAUSTED"}}"#;
        assert!(matches!(
            GeminiProvider::map_api_error(429, quota_body),
            GatewayError::QuotaExceeded(_)
        ));

        let rate_body = r#"{"error": {"message": "Too many requests", "status": "UNAVAILABLE"}}"#;
        assert!(matches!(
            GeminiProvider::map_api_error(429, rate_body),
            GatewayError::RateLimited(_)
        ));
    }

    #[test]
    fn test_quota_message_extracts_retry_hint() {
        let message = "Resource exhausted. Please retry in 6.406453963s.";
        assert_eq!(
            GeminiProvider::quota_message(message),
            "AI service quota exceeded. Please try again in 7 seconds."
        );
        assert!(GeminiProvider::quota_message("opaque failure").contains("wait a moment"));
    }

    #[test]
    fn test_build_request_encodes_attachment() {
        let request = InferenceRequest::new("analyze this")
            .with_attachment(ImageAttachment::new("image/jpeg", vec![1, 2, 3]));
        let gemini_request = GeminiProvider::build_gemini_request(&request);
        let json = serde_json::to_value(&gemini_request).unwrap();
        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["text"], "analyze this");
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/jpeg");
        assert_eq!(parts[1]["inline_data"]["data"], BASE64.encode([1u8, 2, 3]));
    }

    #[test]
    fn test_build_request_omits_config_without_settings() {
        let request = InferenceRequest::new("plain");
        let gemini_request = GeminiProvider::build_gemini_request(&request);
        assert!(gemini_request.generation_config.is_none());
    }

    #[test]
    fn test_extract_text_requires_content() {
        let empty = GeminiResponse {
            candidates: Some(vec![]),
            error: None,
        };
        assert!(matches!(
            GeminiProvider::extract_text(empty),
            Err(GatewayError::ServiceUnavailable(_))
        ));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let provider = GeminiProvider::new("secret-key");
        let debug = format!("{provider:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret-key"));
    }
}

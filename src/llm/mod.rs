// ABOUTME: Inference provider abstraction for pluggable generative model integration
// ABOUTME: Defines the single-invoke contract, request/attachment types, and gateway semantics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriLens

//! # Inference Gateway Service Provider Interface
//!
//! The gateway is a single-call abstraction over the external generative
//! service: submit one prompt (optionally with a binary image attachment
//! and declared media type), get back raw free-form text. Providers
//! classify transport, credential, and quota failures into
//! [`GatewayError`] variants; they never retry internally (retry policy
//! belongs to the orchestrator) and keep no state between calls.
//!
//! The provider is an injected collaborator rather than ambient state, so
//! tests substitute a deterministic fake.
//!
//! ## Example
//!
//! ```rust,no_run
//! use nutrilens::llm::{GeminiProvider, InferenceProvider, InferenceRequest};
//!
//! # async fn example() -> Result<(), nutrilens::errors::GatewayError> {
//! let provider = GeminiProvider::from_env()?;
//! let request = InferenceRequest::new("Describe a balanced breakfast.");
//! let text = provider.invoke(&request).await?;
//! println!("{text}");
//! # Ok(())
//! # }
//! ```

mod gemini;

pub use gemini::GeminiProvider;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::GatewayError;

/// Default per-request timeout when the caller does not set one.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Binary image attachment with an explicit media-type tag.
///
/// The bytes travel untouched from the caller to the provider; only the
/// provider encodes them for its wire format.
#[derive(Clone)]
pub struct ImageAttachment {
    /// Declared media type, e.g. `image/jpeg`.
    pub media_type: String,
    /// Raw image bytes.
    pub data: Vec<u8>,
}

impl ImageAttachment {
    /// Create an attachment from raw bytes and a media-type tag.
    #[must_use]
    pub fn new(media_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            media_type: media_type.into(),
            data,
        }
    }
}

impl fmt::Debug for ImageAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAttachment")
            .field("media_type", &self.media_type)
            .field("data", &format!("{} bytes", self.data.len()))
            .finish()
    }
}

/// Configuration for a single inference invocation.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    /// Instruction document produced by the prompt builder.
    pub prompt: String,
    /// Optional binary image attachment.
    pub attachment: Option<ImageAttachment>,
    /// Sampling temperature (0.0 - 2.0).
    pub temperature: Option<f32>,
    /// Generation length cap.
    pub max_output_tokens: Option<u32>,
    /// Enforced wall-clock bound for the call.
    pub timeout: Duration,
}

impl InferenceRequest {
    /// Create a request with a prompt and default settings.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            attachment: None,
            temperature: None,
            max_output_tokens: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Attach image bytes with their media type.
    #[must_use]
    pub fn with_attachment(mut self, attachment: ImageAttachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the generation length cap.
    #[must_use]
    pub const fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    /// Set the per-call timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Inference provider trait: one outbound call per `invoke`, no internal
/// retries, no state across calls.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Unique provider identifier (e.g. "gemini").
    fn name(&self) -> &'static str;

    /// Model issued when the request does not override it.
    fn default_model(&self) -> &str;

    /// Submit the prompt (and optional attachment) and return the raw
    /// response text.
    ///
    /// # Errors
    ///
    /// Returns a classified [`GatewayError`]; the classification drives
    /// the orchestrator's retry-vs-fail decision.
    async fn invoke(&self, request: &InferenceRequest) -> Result<String, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder_defaults() {
        let request = InferenceRequest::new("hello");
        assert_eq!(request.prompt, "hello");
        assert!(request.attachment.is_none());
        assert_eq!(request.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_attachment_debug_redacts_bytes() {
        let attachment = ImageAttachment::new("image/png", vec![0u8; 2048]);
        let debug = format!("{attachment:?}");
        assert!(debug.contains("image/png"));
        assert!(debug.contains("2048 bytes"));
        assert!(!debug.contains("[0,"));
    }
}

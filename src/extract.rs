// ABOUTME: Response extractor isolating the first JSON object span from free-form model text
// ABOUTME: String-and-escape-aware brace scanner tolerant of prose, code fences, and whitespace
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 NutriLens

//! # Response Extractor
//!
//! Models are instructed to reply with a bare JSON object, but they wrap
//! output in prose and code fences anyway, and long generations truncate
//! mid-list. This module isolates the first top-level object span from the
//! raw text and parses it, surfacing syntactic failures distinct from the
//! validator's semantic ones.

use serde_json::Value;

use crate::errors::ExtractionError;

/// Isolate and parse the first top-level JSON object embedded in `raw`.
///
/// Scans for the first `{`, then walks a brace balance that is aware of
/// string literals and escapes (braces inside string values do not count).
/// The balanced span is handed to `serde_json`.
///
/// # Errors
///
/// - [`ExtractionError::NoStructureFound`] when the text contains no `{`.
/// - [`ExtractionError::MalformedSyntax`] when a span opens but never
///   balances (truncated generation) or balances but is not valid JSON.
pub fn extract_payload(raw: &str) -> Result<Value, ExtractionError> {
    let start = raw.find('{').ok_or(ExtractionError::NoStructureFound)?;

    let mut depth: u32 = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let span = &raw[start..start + offset + ch.len_utf8()];
                    return serde_json::from_str(span)
                        .map_err(|e| ExtractionError::MalformedSyntax(e.to_string()));
                }
            }
            _ => {}
        }
    }

    Err(ExtractionError::MalformedSyntax(
        "object span never balances; generation likely truncated".into(),
    ))
}

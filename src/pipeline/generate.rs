//! Shared generation/validation client: one backend round trip plus the
//! parse-or-fail boundary applied to its reply.
//!
//! ## Why extraction instead of trusting the reply?
//!
//! The backend is prompted to output "ONLY valid JSON", but generative
//! models routinely disobey: they wrap the object in ```json fences, or
//! preface it with "Here is the analysis:" and close with a remark. The
//! reply is therefore treated as untrusted text from which the first
//! top-level brace-delimited object is recovered by a balanced scan —
//! aware of string literals and escapes, so braces inside values never
//! confuse it. Anything less than a full typed parse of that slice fails
//! the stage as a unit.
//!
//! This operation is stateless and safe to re-invoke; a repeat round trip
//! may produce different (still valid) output, which is why the pipeline
//! leaves retry policy to the caller.

use crate::backend::{GenerationRequest, GenerativeBackend};
use crate::error::StageError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Run one generation round trip and parse the reply into `T`.
///
/// The expected schema shape *is* the target type: serde enforces field
/// presence, and any mismatch surfaces as
/// [`StageError::MalformedOutput`] with the parse detail attached.
pub async fn generate_structured<T: DeserializeOwned>(
    backend: &dyn GenerativeBackend,
    prompt: &str,
    system: &str,
    temperature: f32,
) -> Result<T, StageError> {
    let reply = backend
        .generate(GenerationRequest {
            prompt,
            system,
            temperature,
        })
        .await?;

    debug!(reply_len = reply.len(), "received backend reply");

    let json = extract_json_object(&reply).ok_or_else(|| StageError::MalformedOutput {
        detail: "no JSON object found in backend reply".into(),
    })?;

    serde_json::from_str(json).map_err(|e| StageError::MalformedOutput {
        detail: format!("reply JSON did not match the expected shape: {e}"),
    })
}

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json)?\s*\n(.*)\n```\s*$").unwrap());

/// Locate the first top-level JSON object in free-form reply text.
///
/// An outer code fence wrapping the whole reply is stripped first. The
/// scan then walks from the first `{` tracking brace depth, skipping
/// string literals and escape sequences, and returns the slice up to the
/// matching close brace. Surrounding prose on either side is ignored.
pub fn extract_json_object(reply: &str) -> Option<&str> {
    let text = match RE_OUTER_FENCES.captures(reply.trim()) {
        Some(caps) => caps.get(1)?.as_str(),
        None => reply,
    };

    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

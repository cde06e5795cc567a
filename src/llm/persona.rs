//! Persona instruction and Gemini request-body construction.
//!
//! The assistant has exactly one persona and one set of sampling parameters;
//! both are fixed per run and travel in every `generateContent` request.
//! Keeping the body builder here makes the wire shape unit-testable without
//! a network.

use serde_json::{json, Value};

use crate::config::LlmConfig;

// ---------------------------------------------------------------------------
// Persona
// ---------------------------------------------------------------------------

/// System instruction sent with every generation request.
pub const PERSONA: &str =
    "You are a silly goofy assistant who speaks succinctly. Answer in 1–2 sentences.";

// ---------------------------------------------------------------------------
// build_request
// ---------------------------------------------------------------------------

/// Build the JSON body for a Gemini `generateContent` call.
///
/// Shape (v1beta wire format):
///
/// ```json
/// {
///   "systemInstruction": { "parts": [{ "text": "<persona>" }] },
///   "contents": [{ "role": "user", "parts": [{ "text": "<user text>" }] }],
///   "generationConfig": {
///     "temperature": 0.7, "topP": 0.9, "topK": 40, "maxOutputTokens": 70
///   }
/// }
/// ```
pub fn build_request(user_text: &str, config: &LlmConfig) -> Value {
    json!({
        "systemInstruction": {
            "parts": [{ "text": PERSONA }]
        },
        "contents": [{
            "role": "user",
            "parts": [{ "text": user_text }]
        }],
        "generationConfig": {
            "temperature": config.temperature,
            "topP": config.top_p,
            "topK": config.top_k,
            "maxOutputTokens": config.max_output_tokens,
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

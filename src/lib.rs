//! Personal voice assistant — record, transcribe, reply, speak.
//!
//! One linear pipeline per invocation:
//!
//! ```text
//! select device → record 5 s → Whisper (local) → Gemini (remote) → speech output
//! ```
//!
//! Each stage hands an immutable value to the next (device → samples →
//! transcript → reply); nothing persists between runs.  See
//! [`pipeline::run_assistant`] for the orchestration and the per-stage
//! modules for the contracts.

pub mod audio;
pub mod config;
pub mod llm;
pub mod pipeline;
pub mod speech;
pub mod stt;

//! STT (Speech-to-Text) engine module.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use voice_assistant::stt::{SttEngine, TranscribeParams, WhisperEngine};
//!
//! let params = TranscribeParams::default(); // language = "en", beam_size = 5
//! let engine = WhisperEngine::load("models/ggml-small.bin", params)
//!     .expect("model file missing");
//!
//! // audio: 16 kHz, mono, f32 PCM from the audio module
//! let audio: Vec<f32> = vec![0.0; 80_000]; // 5 s of silence
//! let text = engine.transcribe(&audio).unwrap();
//! // `text` may legitimately be empty — no speech detected.
//! ```

pub mod engine;
pub mod transcribe;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use engine::{SttEngine, SttError, WhisperEngine};
pub use transcribe::TranscribeParams;

// test-only re-export so the pipeline test module can import MockSttEngine
// without `use voice_assistant::stt::engine::MockSttEngine`.
#[cfg(test)]
pub use engine::MockSttEngine;

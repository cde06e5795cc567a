//! Reply-generation module.
//!
//! This module provides:
//! * [`ReplyGenerator`] — async trait the pipeline depends on.
//! * [`GeminiClient`] — Gemini `generateContent` backend.
//! * [`PERSONA`] / [`build_request`] — fixed persona instruction and the
//!   request-body builder.
//! * [`GenerationError`] — error variants for generation operations.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use voice_assistant::config::AppConfig;
//! use voice_assistant::llm::{GeminiClient, ReplyGenerator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let api_key = config.resolve_api_key().expect("GEMINI_API_KEY not set");
//!
//!     let client = GeminiClient::new(&config.llm, api_key);
//!     let reply = client.reply("What's the capital of France?").await.unwrap();
//!     println!("{reply}");
//! }
//! ```

pub mod persona;
pub mod replier;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use persona::{build_request, PERSONA};
pub use replier::{GeminiClient, GenerationError, ReplyGenerator};

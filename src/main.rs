//! Application entry point — voice assistant.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load `.env` (if present) and [`AppConfig`] from disk (returns default
//!    on first run).
//! 3. Resolve the Gemini API key — fatal if missing, before any recording.
//! 4. Load the Whisper model and build the Gemini client and the platform
//!    speaker.
//! 5. Create the tokio runtime (current-thread; the pipeline is a single
//!    linear run, blocking work goes through `spawn_blocking`).
//! 6. Run the pipeline once and exit: 0 on success or a no-speech early
//!    exit, non-zero with a message on any stage failure.

use std::sync::Arc;

use anyhow::{bail, Context, Result};

use voice_assistant::{
    config::{AppConfig, AppPaths},
    llm::{GeminiClient, ReplyGenerator},
    pipeline::{run_assistant, Assistant, RunOutcome},
    speech::{PlatformSpeaker, Speaker},
    stt::{SttEngine, TranscribeParams, WhisperEngine},
};

fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("voice assistant starting up");

    // 2. Configuration
    dotenv::dotenv().ok();
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Credential — checked before any device or network I/O.
    let Some(api_key) = config.resolve_api_key() else {
        bail!(
            "GEMINI_API_KEY is not set — export it, add it to a .env file, \
             or set llm.api_key in settings.toml"
        );
    };

    // 4. Stage implementations
    let model_path = AppPaths::new().model_file(&config.stt.model);
    let params = TranscribeParams {
        language: config.stt.language.clone(),
        beam_size: config.stt.beam_size,
        ..TranscribeParams::default()
    };
    let stt: Arc<dyn SttEngine> = Arc::new(
        WhisperEngine::load(&model_path, params).with_context(|| {
            format!("failed to load Whisper model {}", model_path.display())
        })?,
    );
    log::info!("Whisper model loaded: {}", model_path.display());

    let llm: Arc<dyn ReplyGenerator> = Arc::new(GeminiClient::new(&config.llm, api_key));
    let speaker: Arc<dyn Speaker> = Arc::new(PlatformSpeaker::with_command(
        config.speech.command.clone(),
    ));

    // 5. Tokio runtime
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 6. Run the pipeline once
    let assistant = Assistant::new(stt, llm, speaker);
    match run_assistant(&config, &assistant, &rt)? {
        RunOutcome::Spoken { reply, .. } => {
            log::info!("run complete ({} chars spoken)", reply.len());
        }
        RunOutcome::NoSpeech => {
            // Graceful early exit — still exit code 0.
        }
    }

    Ok(())
}

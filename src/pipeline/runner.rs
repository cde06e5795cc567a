//! Pipeline orchestrator — drives the record → STT → reply → speak run.
//!
//! [`run_assistant`] executes the full five-stage state machine once.
//! [`Assistant`] owns the three capability interfaces (STT engine, reply
//! generator, speaker) behind `Arc<dyn …>` so tests can substitute fakes and
//! verify the orchestration contract: the generator and the speaker are each
//! invoked exactly once for a non-empty transcript and never for an empty
//! one.
//!
//! Whisper inference and speech playback are CPU/IO-blocking, so both run
//! under `tokio::task::spawn_blocking`.

use std::sync::Arc;

use thiserror::Error;

use crate::audio::{select_input_device, DeviceError, Recorder, RecordingError};
use crate::config::AppConfig;
use crate::llm::{GenerationError, ReplyGenerator};
use crate::speech::{Speaker, SpeechError};
use crate::stt::{SttEngine, SttError};

use super::state::PipelineState;

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// Any stage failure.  All variants are fatal; the run terminates on the
/// first one.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Recording(#[from] RecordingError),

    #[error(transparent)]
    Stt(#[from] SttError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Speech(#[from] SpeechError),

    /// Internal / unexpected error (e.g. tokio join failure).
    #[error("internal error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// RunOutcome
// ---------------------------------------------------------------------------

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The reply was generated and spoken.
    Spoken {
        /// What the user said.
        transcript: String,
        /// What the assistant answered.
        reply: String,
    },

    /// Transcription was empty; generation and speech were skipped.
    NoSpeech,
}

// ---------------------------------------------------------------------------
// Assistant
// ---------------------------------------------------------------------------

/// Holds the pipeline's capability interfaces.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use voice_assistant::config::AppConfig;
/// use voice_assistant::llm::{GeminiClient, ReplyGenerator};
/// use voice_assistant::pipeline::Assistant;
/// use voice_assistant::speech::{PlatformSpeaker, Speaker};
/// use voice_assistant::stt::{SttEngine, TranscribeParams, WhisperEngine};
///
/// let config = AppConfig::default();
/// let stt: Arc<dyn SttEngine> = Arc::new(
///     WhisperEngine::load("models/ggml-small.bin", TranscribeParams::default()).unwrap(),
/// );
/// let llm: Arc<dyn ReplyGenerator> =
///     Arc::new(GeminiClient::new(&config.llm, "key".into()));
/// let speaker: Arc<dyn Speaker> = Arc::new(PlatformSpeaker::new());
///
/// let assistant = Assistant::new(stt, llm, speaker);
/// ```
pub struct Assistant {
    stt: Arc<dyn SttEngine>,
    llm: Arc<dyn ReplyGenerator>,
    speaker: Arc<dyn Speaker>,
}

impl Assistant {
    /// Create an assistant from its three stage implementations.
    pub fn new(
        stt: Arc<dyn SttEngine>,
        llm: Arc<dyn ReplyGenerator>,
        speaker: Arc<dyn Speaker>,
    ) -> Self {
        Self { stt, llm, speaker }
    }

    /// Run stages 3–5 on an already-captured audio buffer:
    /// transcribe → generate → speak.
    ///
    /// * An empty transcript ends the run with [`RunOutcome::NoSpeech`]
    ///   **before** the reply generator or the speaker is touched.
    /// * Otherwise the generator is invoked exactly once with the transcript
    ///   and the speaker exactly once with the reply.
    ///
    /// # Errors
    ///
    /// The first stage failure, wrapped in [`PipelineError`].
    pub async fn run(&self, audio: Vec<f32>) -> Result<RunOutcome, PipelineError> {
        // ── Stage 3: transcribe ──────────────────────────────────────────
        log::info!("{}…", PipelineState::Transcribing.label());

        let stt = Arc::clone(&self.stt);
        let transcript = tokio::task::spawn_blocking(move || stt.transcribe(&audio))
            .await
            .map_err(|e| PipelineError::Internal(e.to_string()))??;

        if transcript.is_empty() {
            log::info!("No speech detected.");
            return Ok(RunOutcome::NoSpeech);
        }
        log::info!("You said: {transcript}");

        // ── Stage 4: generate reply ──────────────────────────────────────
        log::info!("{}…", PipelineState::Generating.label());

        let reply = self.llm.reply(&transcript).await?;
        log::info!("Assistant: {reply}");

        // ── Stage 5: speak ───────────────────────────────────────────────
        log::info!("{}…", PipelineState::Speaking.label());

        let speaker = Arc::clone(&self.speaker);
        let spoken = reply.clone();
        tokio::task::spawn_blocking(move || speaker.speak(&spoken))
            .await
            .map_err(|e| PipelineError::Internal(e.to_string()))??;

        log::info!("{}", PipelineState::Done.label());
        Ok(RunOutcome::Spoken { transcript, reply })
    }
}

// ---------------------------------------------------------------------------
// run_assistant
// ---------------------------------------------------------------------------

/// Execute the full pipeline once: select device → record → transcribe →
/// generate → speak.
///
/// Stages 1–2 run synchronously on the calling thread (cpal streams stay off
/// async threads); stages 3–5 run on `rt` via [`Assistant::run`].
///
/// # Errors
///
/// The first stage failure; nothing is retried.
pub fn run_assistant(
    config: &AppConfig,
    assistant: &Assistant,
    rt: &tokio::runtime::Runtime,
) -> Result<RunOutcome, PipelineError> {
    // ── Stage 1: select input device ────────────────────────────────────
    log::info!("{}…", PipelineState::SelectingDevice.label());
    let (device, _descriptor) = select_input_device()?;

    // ── Stage 2: record ─────────────────────────────────────────────────
    log::info!("{}…", PipelineState::Recording.label());
    let recorder = Recorder::new(device)?;
    let audio = recorder.record(config.audio.record_secs, config.audio.sample_rate)?;

    // ── Stages 3–5 ──────────────────────────────────────────────────────
    rt.block_on(assistant.run(audio))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::stt::MockSttEngine;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Records every call; replies with a fixed string.
    struct CountingReplier {
        reply: String,
        calls: AtomicUsize,
        last_input: Mutex<Option<String>>,
    }

    impl CountingReplier {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.into(),
                calls: AtomicUsize::new(0),
                last_input: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ReplyGenerator for CountingReplier {
        async fn reply(&self, user_text: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_input.lock().unwrap() = Some(user_text.to_string());
            Ok(self.reply.clone())
        }
    }

    /// Always fails with an API error.
    struct FailingReplier;

    #[async_trait]
    impl ReplyGenerator for FailingReplier {
        async fn reply(&self, _user_text: &str) -> Result<String, GenerationError> {
            Err(GenerationError::Api {
                status: 403,
                message: "API key not valid".into(),
            })
        }
    }

    /// Records every call; playback always succeeds.
    struct CountingSpeaker {
        calls: AtomicUsize,
        last_text: Mutex<Option<String>>,
    }

    impl CountingSpeaker {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last_text: Mutex::new(None),
            }
        }
    }

    impl Speaker for CountingSpeaker {
        fn speak(&self, text: &str) -> Result<(), SpeechError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_text.lock().unwrap() = Some(text.to_string());
            Ok(())
        }
    }

    /// Synthesis engine that is never available.
    struct FailingSpeaker;

    impl Speaker for FailingSpeaker {
        fn speak(&self, _text: &str) -> Result<(), SpeechError> {
            Err(SpeechError::EngineUnavailable("say".into()))
        }
    }

    fn audio_5s() -> Vec<f32> {
        vec![0.0f32; 80_000]
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn full_run_speaks_the_generated_reply() {
        let llm = Arc::new(CountingReplier::new("Paris! Easy peasy."));
        let speaker = Arc::new(CountingSpeaker::new());
        let assistant = Assistant::new(
            Arc::new(MockSttEngine::ok("What's the capital of France?")),
            llm.clone(),
            speaker.clone(),
        );

        let outcome = assistant.run(audio_5s()).await.unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Spoken {
                transcript: "What's the capital of France?".into(),
                reply: "Paris! Easy peasy.".into(),
            }
        );
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            llm.last_input.lock().unwrap().as_deref(),
            Some("What's the capital of France?")
        );
        assert_eq!(speaker.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            speaker.last_text.lock().unwrap().as_deref(),
            Some("Paris! Easy peasy.")
        );
    }

    #[tokio::test]
    async fn empty_transcript_skips_generation_and_speech() {
        let llm = Arc::new(CountingReplier::new("never used"));
        let speaker = Arc::new(CountingSpeaker::new());
        let assistant =
            Assistant::new(Arc::new(MockSttEngine::ok("")), llm.clone(), speaker.clone());

        let outcome = assistant.run(audio_5s()).await.unwrap();

        assert_eq!(outcome, RunOutcome::NoSpeech);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
        assert_eq!(speaker.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn generator_is_called_exactly_once_per_run() {
        let llm = Arc::new(CountingReplier::new("ok"));
        let assistant = Assistant::new(
            Arc::new(MockSttEngine::ok("hello")),
            llm.clone(),
            Arc::new(CountingSpeaker::new()),
        );

        assistant.run(audio_5s()).await.unwrap();
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stt_failure_stops_the_run_before_generation() {
        let llm = Arc::new(CountingReplier::new("never used"));
        let speaker = Arc::new(CountingSpeaker::new());
        let assistant = Assistant::new(
            Arc::new(MockSttEngine::err(SttError::Transcription("boom".into()))),
            llm.clone(),
            speaker.clone(),
        );

        let err = assistant.run(audio_5s()).await.unwrap_err();

        assert!(matches!(err, PipelineError::Stt(_)));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
        assert_eq!(speaker.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn generation_failure_stops_the_run_before_speech() {
        let speaker = Arc::new(CountingSpeaker::new());
        let assistant = Assistant::new(
            Arc::new(MockSttEngine::ok("hello")),
            Arc::new(FailingReplier),
            speaker.clone(),
        );

        let err = assistant.run(audio_5s()).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Generation(GenerationError::Api { status: 403, .. })
        ));
        assert_eq!(speaker.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn speech_failure_propagates() {
        let assistant = Assistant::new(
            Arc::new(MockSttEngine::ok("hello")),
            Arc::new(CountingReplier::new("hi there")),
            Arc::new(FailingSpeaker),
        );

        let err = assistant.run(audio_5s()).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Speech(SpeechError::EngineUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn whitespace_only_transcripts_are_not_treated_as_empty_here() {
        // The STT contract trims its output, so anything non-empty reaching
        // the orchestrator is real speech.
        let llm = Arc::new(CountingReplier::new("ok"));
        let assistant = Assistant::new(
            Arc::new(MockSttEngine::ok("hm")),
            llm.clone(),
            Arc::new(CountingSpeaker::new()),
        );

        let outcome = assistant.run(audio_5s()).await.unwrap();
        assert!(matches!(outcome, RunOutcome::Spoken { .. }));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }
}

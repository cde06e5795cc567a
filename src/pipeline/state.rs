//! Pipeline state machine.
//!
//! [`PipelineState`] names the phase the run is in; the orchestrator logs
//! each transition.  The machine is strictly linear — the only branch is the
//! empty-transcript early exit:
//!
//! ```text
//! SelectingDevice ──▶ Recording ──▶ Transcribing ──▶ Generating ──▶ Speaking ──▶ Done
//!                                        │
//!                                        └──empty transcript──▶ NoSpeech
//! any state ──error──▶ run terminates (error propagates to main)
//! ```

// ---------------------------------------------------------------------------
// PipelineState
// ---------------------------------------------------------------------------

/// Phases of a single assistant run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Enumerating audio devices and choosing a microphone.
    SelectingDevice,

    /// Blocking capture of the fixed-duration clip.
    Recording,

    /// Whisper is running on the blocking thread pool.
    Transcribing,

    /// Waiting on the Gemini `generateContent` call.
    Generating,

    /// The reply is being rendered through the speech synthesizer.
    Speaking,

    /// The reply was spoken; the run succeeded.
    Done,

    /// Transcription produced an empty string; the run ended early without
    /// contacting the LLM or the synthesizer.  Not an error.
    NoSpeech,
}

impl PipelineState {
    /// Returns `true` for the two states a run can end in.
    ///
    /// ```
    /// use voice_assistant::pipeline::PipelineState;
    ///
    /// assert!(PipelineState::Done.is_terminal());
    /// assert!(PipelineState::NoSpeech.is_terminal());
    /// assert!(!PipelineState::Recording.is_terminal());
    /// ```
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::NoSpeech)
    }

    /// A short human-readable label suitable for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            PipelineState::SelectingDevice => "Selecting device",
            PipelineState::Recording => "Recording",
            PipelineState::Transcribing => "Transcribing",
            PipelineState::Generating => "Generating reply",
            PipelineState::Speaking => "Speaking",
            PipelineState::Done => "Done",
            PipelineState::NoSpeech => "No speech",
        }
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        PipelineState::SelectingDevice
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

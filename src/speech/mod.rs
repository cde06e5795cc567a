//! Speech output through the host's synthesis engine.
//!
//! [`Speaker`] is the interface the pipeline depends on;
//! [`PlatformSpeaker`] implements it by running the platform's
//! speech-synthesis command as a child process and waiting for it to exit,
//! so playback blocks the caller until it completes:
//!
//! * macOS — `say`
//! * Linux — `spd-say -w`, falling back to `espeak`
//! * Windows — `System.Speech` via PowerShell
//!
//! No voice selection happens here; whatever the engine provides as its
//! default voice is used.

use std::io::ErrorKind;
use std::process::Command;

use thiserror::Error;

// ---------------------------------------------------------------------------
// SpeechError
// ---------------------------------------------------------------------------

/// Errors that can occur while speaking a reply.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// No speech-synthesis command could be started on this host.
    #[error("no speech-synthesis engine available — tried: {0}")]
    EngineUnavailable(String),

    /// The synthesis process started but exited unsuccessfully.
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    /// I/O failure while waiting on the synthesis process.
    #[error("speech output I/O error: {0}")]
    Io(String),
}

// ---------------------------------------------------------------------------
// Speaker trait
// ---------------------------------------------------------------------------

/// Thread-safe interface for speech output.
///
/// # Contract
///
/// * `text` is non-empty; the caller must not invoke this for an empty reply.
/// * The call blocks until playback completes.
pub trait Speaker: Send + Sync {
    /// Speak `text` aloud, returning once playback has finished.
    fn speak(&self, text: &str) -> Result<(), SpeechError>;
}

// ---------------------------------------------------------------------------
// PlatformSpeaker
// ---------------------------------------------------------------------------

/// Speaks via the operating system's speech-synthesis command.
pub struct PlatformSpeaker {
    /// Optional command override from `speech.command`; `None` picks the
    /// platform default candidates in order.
    command: Option<String>,
}

impl PlatformSpeaker {
    /// Create a speaker using the platform default synthesis command.
    pub fn new() -> Self {
        Self { command: None }
    }

    /// Create a speaker with an explicit command override (e.g. `"espeak"`).
    pub fn with_command(command: Option<String>) -> Self {
        Self { command }
    }

    /// Candidate `(program, full argument list)` pairs for this platform,
    /// tried in order.  `text` is already placed where each program expects
    /// it (trailing argument, or embedded in the PowerShell script).
    fn candidates(&self, text: &str) -> Vec<(String, Vec<String>)> {
        if let Some(cmd) = &self.command {
            return vec![(cmd.clone(), vec![text.into()])];
        }

        if cfg!(target_os = "macos") {
            vec![("say".into(), vec![text.into()])]
        } else if cfg!(target_os = "windows") {
            // -Command folds trailing arguments into the script, so the text
            // is embedded directly with single quotes doubled.
            let script = format!(
                "Add-Type -AssemblyName System.Speech; \
                 (New-Object System.Speech.Synthesis.SpeechSynthesizer).Speak('{}')",
                text.replace('\'', "''")
            );
            vec![(
                "powershell".into(),
                vec!["-NoProfile".into(), "-Command".into(), script],
            )]
        } else {
            // spd-say returns immediately unless -w is passed.
            vec![
                ("spd-say".into(), vec!["-w".into(), text.into()]),
                ("espeak".into(), vec![text.into()]),
            ]
        }
    }
}

impl Default for PlatformSpeaker {
    fn default() -> Self {
        Self::new()
    }
}

impl Speaker for PlatformSpeaker {
    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let candidates = self.candidates(text);
        let mut missing: Vec<String> = Vec::new();

        for (program, args) in &candidates {
            let status = Command::new(program).args(args).status();

            match status {
                Ok(status) if status.success() => {
                    log::debug!("speech: spoke {} chars via {program}", text.len());
                    return Ok(());
                }
                Ok(status) => {
                    return Err(SpeechError::Synthesis(format!(
                        "{program} exited with {status}"
                    )));
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    // Binary absent — try the next candidate.
                    missing.push(program.clone());
                }
                Err(e) => return Err(SpeechError::Io(e.to_string())),
            }
        }

        Err(SpeechError::EngineUnavailable(missing.join(", ")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

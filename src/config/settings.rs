//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//!
//! The fixed constants of the assistant (recording duration, sample rate,
//! beam width, Gemini sampling parameters) live here as documented defaults
//! rather than literals scattered through the pipeline.

use anyhow::Result;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Settings for microphone capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Target sample rate in Hz passed to Whisper (must be 16 000).
    pub sample_rate: u32,
    /// Recording length in seconds; the recorder blocks for exactly this long.
    pub record_secs: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            record_secs: 5.0,
        }
    }
}

// ---------------------------------------------------------------------------
// SttConfig
// ---------------------------------------------------------------------------

/// Settings for the Whisper STT engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SttConfig {
    /// GGML model name / file stem (e.g. `"small"`); resolved to
    /// `<models_dir>/ggml-<model>.bin`.  Pick a quantized file
    /// (e.g. `"small-q8_0"`) for reduced-precision inference.
    pub model: String,
    /// Primary speech language as an ISO-639-1 code.
    pub language: String,
    /// Beam-search width — candidate hypotheses retained at each decode step.
    pub beam_size: i32,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: "small".into(),
            language: "en".into(),
            beam_size: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for the Gemini reply-generation step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the generative-language API endpoint.
    pub base_url: String,
    /// API key — `None` means read `GEMINI_API_KEY` from the environment.
    pub api_key: Option<String>,
    /// Model identifier sent to the API (e.g. `"gemini-2.0-flash"`).
    pub model: String,
    /// Sampling temperature (0.0 = deterministic, 1.0 = more random).
    pub temperature: f32,
    /// Nucleus-sampling threshold.
    pub top_p: f32,
    /// Sampling pool size limit.
    pub top_k: u32,
    /// Maximum reply length in tokens (~4 chars/token in English, so 70
    /// tokens ≈ 200 characters).
    pub max_output_tokens: u32,
    /// Maximum seconds to wait for a reply before timing out.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".into(),
            api_key: None,
            model: "gemini-2.0-flash".into(),
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
            max_output_tokens: 70,
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Settings for speech output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Override for the platform speech-synthesis command.  `None` picks the
    /// host default (`say` on macOS, `spd-say`/`espeak` on Linux,
    /// `System.Speech` via PowerShell on Windows).
    pub command: Option<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self { command: None }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use voice_assistant::config::AppConfig;
///
/// // On first run this writes a default `settings.toml` for the user to
/// // edit; afterwards it reads that file back.
/// let config = AppConfig::load().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Microphone capture settings.
    pub audio: AudioConfig,
    /// Whisper STT settings.
    pub stt: SttConfig,
    /// Gemini reply-generation settings.
    pub llm: LlmConfig,
    /// Speech output settings.
    pub speech: SpeechConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`,
    /// writing a default file on first run so the user has something to
    /// edit.
    pub fn load() -> Result<Self> {
        Self::load_or_init(&super::AppPaths::new().settings_file)
    }

    /// Load from `path`; when the file does not exist yet, write the
    /// defaults there and return them.
    ///
    /// A failed write is logged but not fatal — the run proceeds with
    /// defaults either way.
    pub fn load_or_init(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            match config.save_to(path) {
                Ok(()) => log::info!("Wrote default settings to {}", path.display()),
                Err(e) => log::warn!(
                    "Could not write default settings to {}: {e}",
                    path.display()
                ),
            }
            return Ok(config);
        }
        Self::load_from(path)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save to an explicit path, creating parent directories as needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the Gemini API key: `settings.toml` takes precedence, the
    /// `GEMINI_API_KEY` environment variable is the fallback.  `None` when
    /// neither is set.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.llm
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Verify that a default `AppConfig` can be serialised to TOML and
    /// deserialised back without any data loss.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        // AudioConfig
        assert_eq!(original.audio.sample_rate, loaded.audio.sample_rate);
        assert_eq!(original.audio.record_secs, loaded.audio.record_secs);

        // SttConfig
        assert_eq!(original.stt.model, loaded.stt.model);
        assert_eq!(original.stt.language, loaded.stt.language);
        assert_eq!(original.stt.beam_size, loaded.stt.beam_size);

        // LlmConfig
        assert_eq!(original.llm.base_url, loaded.llm.base_url);
        assert_eq!(original.llm.api_key, loaded.llm.api_key);
        assert_eq!(original.llm.model, loaded.llm.model);
        assert_eq!(original.llm.temperature, loaded.llm.temperature);
        assert_eq!(original.llm.top_p, loaded.llm.top_p);
        assert_eq!(original.llm.top_k, loaded.llm.top_k);
        assert_eq!(original.llm.max_output_tokens, loaded.llm.max_output_tokens);
        assert_eq!(original.llm.timeout_secs, loaded.llm.timeout_secs);

        // SpeechConfig
        assert_eq!(original.speech.command, loaded.speech.command);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(config.audio.sample_rate, default.audio.sample_rate);
        assert_eq!(config.stt.model, default.stt.model);
        assert_eq!(config.llm.model, default.llm.model);
    }

    /// Verify default values match the assistant's fixed parameters.
    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.audio.sample_rate, 16_000);
        assert_eq!(cfg.audio.record_secs, 5.0);
        assert_eq!(cfg.stt.model, "small");
        assert_eq!(cfg.stt.language, "en");
        assert_eq!(cfg.stt.beam_size, 5);
        assert_eq!(cfg.llm.model, "gemini-2.0-flash");
        assert_eq!(cfg.llm.temperature, 0.7);
        assert_eq!(cfg.llm.top_p, 0.9);
        assert_eq!(cfg.llm.top_k, 40);
        assert_eq!(cfg.llm.max_output_tokens, 70);
        assert!(cfg.llm.api_key.is_none());
        assert!(cfg.speech.command.is_none());
    }

    /// Verify that modified non-default values survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.audio.record_secs = 8.0;
        cfg.stt.model = "small-q8_0".into();
        cfg.llm.api_key = Some("test-key".into());
        cfg.llm.model = "gemini-2.5-flash".into();
        cfg.llm.timeout_secs = 10;
        cfg.speech.command = Some("espeak".into());

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.audio.record_secs, 8.0);
        assert_eq!(loaded.stt.model, "small-q8_0");
        assert_eq!(loaded.llm.api_key, Some("test-key".into()));
        assert_eq!(loaded.llm.model, "gemini-2.5-flash");
        assert_eq!(loaded.llm.timeout_secs, 10);
        assert_eq!(loaded.speech.command, Some("espeak".into()));
    }

    /// First run: `load_or_init` must materialise a default `settings.toml`
    /// that reads back as the defaults.
    #[test]
    fn load_or_init_writes_defaults_on_first_run() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let config = AppConfig::load_or_init(&path).expect("init");
        assert!(path.exists(), "settings.toml must be created on first run");
        assert_eq!(config.stt.model, "small");

        let reloaded = AppConfig::load_from(&path).expect("reload");
        assert_eq!(reloaded.llm.model, config.llm.model);
        assert_eq!(reloaded.audio.sample_rate, 16_000);
    }

    /// A second `load_or_init` reads the existing file instead of
    /// overwriting user edits.
    #[test]
    fn load_or_init_keeps_existing_file() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let mut cfg = AppConfig::default();
        cfg.stt.beam_size = 3;
        cfg.save_to(&path).expect("save");

        let loaded = AppConfig::load_or_init(&path).expect("load");
        assert_eq!(loaded.stt.beam_size, 3);
    }

    /// Keys that no longer exist (e.g. `vad_filter` from older files) must
    /// not break loading; every key that does deserialize feeds a consumer.
    #[test]
    fn unknown_stt_keys_are_ignored_on_load() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        std::fs::write(
            &path,
            r#"
[audio]
sample_rate = 16000
record_secs = 5.0

[stt]
model = "small"
language = "en"
beam_size = 3
vad_filter = true

[llm]
base_url = "https://generativelanguage.googleapis.com"
model = "gemini-2.0-flash"
temperature = 0.7
top_p = 0.9
top_k = 40
max_output_tokens = 70
timeout_secs = 30

[speech]
"#,
        )
        .expect("write");

        let cfg = AppConfig::load_from(&path).expect("load");
        assert_eq!(cfg.stt.beam_size, 3);
        assert_eq!(cfg.stt.model, "small");
    }

    /// Config key beats the environment when both could apply.
    #[test]
    fn resolve_api_key_prefers_config() {
        let mut cfg = AppConfig::default();
        cfg.llm.api_key = Some("from-config".into());
        assert_eq!(cfg.resolve_api_key(), Some("from-config".into()));
    }

    /// An empty config key is treated as unset.
    #[test]
    fn resolve_api_key_ignores_empty_config_key() {
        let mut cfg = AppConfig::default();
        cfg.llm.api_key = Some(String::new());
        // Falls through to the environment; may be None in the test env,
        // but must never be Some("").
        assert_ne!(cfg.resolve_api_key(), Some(String::new()));
    }
}

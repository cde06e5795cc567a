//! Fixed-duration microphone recording via `cpal`.
//!
//! [`Recorder`] wraps the cpal device/stream lifecycle for a single blocking
//! capture: the cpal callback runs on a dedicated audio thread and forwards
//! raw buffers over an mpsc channel; the calling thread downmixes, resamples
//! and accumulates until exactly `round(secs × rate)` mono samples exist.
//! The stream is dropped (stopped) before `record` returns, on every path.

use cpal::traits::{DeviceTrait, StreamTrait};
use std::sync::mpsc;
use thiserror::Error;

use crate::audio::resample::{resample, stereo_to_mono};

// ---------------------------------------------------------------------------
// target_samples
// ---------------------------------------------------------------------------

/// Number of mono samples a `secs`-second recording at `rate` Hz must
/// contain: `round(secs × rate)`.
///
/// ```rust
/// use voice_assistant::audio::target_samples;
///
/// assert_eq!(target_samples(5.0, 16_000), 80_000);
/// ```
pub fn target_samples(secs: f32, rate: u32) -> usize {
    (secs as f64 * rate as f64).round() as usize
}

// ---------------------------------------------------------------------------
// RecordingError
// ---------------------------------------------------------------------------

/// Errors that can occur while setting up or running a capture.
#[derive(Debug, Error)]
pub enum RecordingError {
    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    /// The device raised an error mid-capture.
    #[error("audio device error during capture: {0}")]
    Device(String),

    /// The stream went away before the requested duration was captured.
    #[error("audio stream closed before the requested duration was captured")]
    StreamClosed,
}

// ---------------------------------------------------------------------------
// CaptureMessage
// ---------------------------------------------------------------------------

/// Message from the cpal audio thread to the accumulating thread.
enum CaptureMessage {
    /// One raw interleaved `f32` buffer as delivered by the callback.
    Samples(Vec<f32>),
    /// The stream's error callback fired.
    Failed(String),
}

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

/// Blocking fixed-duration recorder bound to one input device.
///
/// The device comes from [`select_input_device`] — passed in explicitly
/// rather than read from any global default.
///
/// [`select_input_device`]: crate::audio::select_input_device
pub struct Recorder {
    device: cpal::Device,
    config: cpal::StreamConfig,
    /// Native sample rate reported by the device (Hz).
    sample_rate: u32,
    /// Number of interleaved channels reported by the device.
    channels: u16,
}

impl Recorder {
    /// Bind a recorder to `device`, querying its preferred stream
    /// configuration (sample rate, channels, buffer size).
    ///
    /// # Errors
    ///
    /// [`RecordingError::DefaultConfig`] when the device cannot report a
    /// default stream configuration.
    pub fn new(device: cpal::Device) -> Result<Self, RecordingError> {
        let supported = device.default_input_config()?;

        let channels = supported.channels();
        let sample_rate = supported.sample_rate().0;
        let config: cpal::StreamConfig = supported.into();

        log::debug!("input device native format: {channels} ch @ {sample_rate} Hz");

        Ok(Self {
            device,
            config,
            sample_rate,
            channels,
        })
    }

    /// Record for `secs` seconds and return exactly
    /// [`target_samples`]`(secs, target_rate)` mono f32 samples at
    /// `target_rate` Hz, each in `[-1.0, 1.0]`.
    ///
    /// Blocks the calling thread for the full duration.  There is no
    /// partial-result or cancellation path; the call returns only when the
    /// sample count is reached or the device fails.
    ///
    /// # Errors
    ///
    /// Stream setup errors, or [`RecordingError::Device`] when the device
    /// fails mid-capture.
    pub fn record(&self, secs: f32, target_rate: u32) -> Result<Vec<f32>, RecordingError> {
        let target = target_samples(secs, target_rate);

        let (tx, rx) = mpsc::channel::<CaptureMessage>();
        let err_tx = tx.clone();

        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                // Ignore send errors; the receiver may have been dropped.
                let _ = tx.send(CaptureMessage::Samples(data.to_vec()));
            },
            move |err: cpal::StreamError| {
                let _ = err_tx.send(CaptureMessage::Failed(err.to_string()));
            },
            None, // no timeout
        )?;

        stream.play()?;
        log::info!("Speak now… (recording {secs} s)");

        let result = collect_samples(&rx, self.sample_rate, self.channels, target_rate, target);

        // Stopping the stream is just dropping it; do so before returning so
        // the device is released on error paths too.
        drop(stream);

        if result.is_ok() {
            log::info!("Recording complete ({target} samples @ {target_rate} Hz)");
        }
        result
    }
}

// ---------------------------------------------------------------------------
// collect_samples
// ---------------------------------------------------------------------------

/// Drain capture messages until `target` converted samples exist.
///
/// Each incoming chunk is downmixed to mono, resampled from `native_rate` to
/// `target_rate`, clamped to `[-1.0, 1.0]` and appended.  The result is
/// truncated to exactly `target` samples.
///
/// Split out from [`Recorder::record`] so the sample-count and range
/// invariants can be tested without an audio device.
fn collect_samples(
    rx: &mpsc::Receiver<CaptureMessage>,
    native_rate: u32,
    channels: u16,
    target_rate: u32,
    target: usize,
) -> Result<Vec<f32>, RecordingError> {
    let mut samples: Vec<f32> = Vec::with_capacity(target);

    while samples.len() < target {
        match rx.recv() {
            Ok(CaptureMessage::Samples(chunk)) => {
                let mono = stereo_to_mono(&chunk, channels);
                let converted = resample(&mono, native_rate, target_rate);
                samples.extend(converted.into_iter().map(|s| s.clamp(-1.0, 1.0)));
            }
            Ok(CaptureMessage::Failed(msg)) => return Err(RecordingError::Device(msg)),
            Err(_) => return Err(RecordingError::StreamClosed),
        }
    }

    samples.truncate(target);
    Ok(samples)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Input-device enumeration and selection.
//!
//! The selection policy mirrors what a user expects from a quick demo:
//! scan every device the host exposes, keep the ones that can record, and
//! prefer anything that calls itself a microphone.  The chosen
//! [`cpal::Device`] is returned by value and handed straight to
//! [`Recorder::new`] — no process-global default-device state.
//!
//! [`Recorder::new`]: crate::audio::Recorder::new

use cpal::traits::{DeviceTrait, HostTrait};
use thiserror::Error;

// ---------------------------------------------------------------------------
// DeviceDescriptor
// ---------------------------------------------------------------------------

/// Name and input-channel count of one enumerated audio device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Human-readable device name as reported by the host.
    pub name: String,
    /// Number of input channels; `0` means the device cannot record.
    pub input_channels: u16,
}

// ---------------------------------------------------------------------------
// DeviceError
// ---------------------------------------------------------------------------

/// Errors that can occur while enumerating or selecting an input device.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// No device with at least one input channel exists on the host.
    #[error("no input (microphone) devices found — check OS microphone permissions")]
    NoInputDevice,

    /// The host failed to enumerate its devices.
    #[error("failed to enumerate audio devices: {0}")]
    Enumerate(String),
}

// ---------------------------------------------------------------------------
// Selection policy
// ---------------------------------------------------------------------------

/// Pick an input device from `devices` and return its index.
///
/// Policy:
/// 1. Only devices with `input_channels > 0` qualify.
/// 2. Prefer the first whose lower-cased name contains `"mic"` — this also
///    matches `"Microphone"` — regardless of its position in the list.
/// 3. Otherwise fall back to the first input-capable device in list order.
///
/// # Errors
///
/// [`DeviceError::NoInputDevice`] when no device qualifies.
pub fn pick_input_device(devices: &[DeviceDescriptor]) -> Result<usize, DeviceError> {
    let input_ids: Vec<usize> = devices
        .iter()
        .enumerate()
        .filter(|(_, d)| d.input_channels > 0)
        .map(|(i, _)| i)
        .collect();

    if input_ids.is_empty() {
        return Err(DeviceError::NoInputDevice);
    }

    for &i in &input_ids {
        if devices[i].name.to_lowercase().contains("mic") {
            return Ok(i);
        }
    }

    Ok(input_ids[0])
}

// ---------------------------------------------------------------------------
// select_input_device
// ---------------------------------------------------------------------------

/// Enumerate the default host's devices and select one for recording.
///
/// Devices whose input configuration cannot be queried are treated as having
/// zero input channels and therefore never selected.
///
/// # Errors
///
/// [`DeviceError::Enumerate`] when the host cannot list its devices, or
/// [`DeviceError::NoInputDevice`] when nothing can record.
pub fn select_input_device() -> Result<(cpal::Device, DeviceDescriptor), DeviceError> {
    let host = cpal::default_host();
    let devices: Vec<cpal::Device> = host
        .devices()
        .map_err(|e| DeviceError::Enumerate(e.to_string()))?
        .collect();

    let descriptors: Vec<DeviceDescriptor> = devices
        .iter()
        .map(|d| DeviceDescriptor {
            name: d.name().unwrap_or_else(|_| "<unknown>".into()),
            input_channels: d
                .default_input_config()
                .map(|c| c.channels())
                .unwrap_or(0),
        })
        .collect();

    let index = pick_input_device(&descriptors)?;
    let descriptor = descriptors[index].clone();

    log::info!(
        "Using input device: [{index}] {} ({} ch)",
        descriptor.name,
        descriptor.input_channels
    );

    let device = devices.into_iter().nth(index).ok_or_else(|| {
        DeviceError::Enumerate("selected device index out of range".into())
    })?;

    Ok((device, descriptor))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

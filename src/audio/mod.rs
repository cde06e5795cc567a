//! Audio subsystem — device selection, fixed-duration capture, resampling.
//!
//! # Pipeline
//!
//! ```text
//! select_input_device → Recorder::record → stereo_to_mono → resample
//!                                        → exactly round(secs × rate) samples
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use voice_assistant::audio::{select_input_device, Recorder};
//!
//! let (device, descriptor) = select_input_device().unwrap();
//! println!("recording from {}", descriptor.name);
//!
//! let recorder = Recorder::new(device).unwrap();
//! let audio = recorder.record(5.0, 16_000).unwrap(); // 80 000 mono samples
//! assert_eq!(audio.len(), 80_000);
//! ```

pub mod device;
pub mod recorder;
pub mod resample;

pub use device::{pick_input_device, select_input_device, DeviceDescriptor, DeviceError};
pub use recorder::{target_samples, Recorder, RecordingError};
pub use resample::{resample, stereo_to_mono};

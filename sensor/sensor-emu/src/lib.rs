//! Byte-exact sensor emulation from simulated ground truth.
//!
//! This crate turns idealized physical signals into the streams a real
//! embedded device would emit, imperfections included:
//!
//! - [`pixel`] / [`camera`] - Nearest-neighbor resampling to a fixed
//!   resolution, RGB565 truncation, big-endian wire frames with a separate
//!   little-endian display copy, frame-rate decoupling
//! - [`audio`] - Most-recent-window extraction from a capture ring buffer,
//!   channel downmix, 16-bit little-endian PCM
//! - [`imu`] - Specific force and angular rate with convention transform,
//!   bias, temperature drift, Gaussian noise and saturation
//!
//! Supporting modules:
//!
//! - [`capture`] - Interfaces to the external frame and sample producers
//! - [`noise`] - Seeded per-sensor Gaussian noise
//! - [`rate`] - Update-rate gating with coalescing of missed intervals
//! - [`servo`] - A yaw servo body that produces kinematic state
//! - [`config`] / [`device`] / [`rig`] - Configuration, device selection and
//!   wiring of all three emulators
//!
//! # Polling model
//!
//! Nothing in this crate blocks or spawns threads. Each component is polled
//! by its caller and answers immediately with fresh data, cached data, or
//! `None` when its source is not ready yet. Only configuration-time faults
//! are errors ([`EmuError`]).
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**.
//!
//! # Example
//!
//! ```
//! use sensor_emu::imu::{ImuConfig, ImuSynthesizer, PhysicalBodyState};
//! use sensor_emu::pixel::FrameCodec;
//! use sensor_types::{CoordinateConvention, RawColorFrame};
//!
//! // Camera: 640x480 red source into a 320x240 RGB565 device.
//! let mut codec = FrameCodec::new(320, 240).unwrap();
//! let wire = codec.produce_wire_frame(&RawColorFrame::solid(640, 480, [255, 0, 0])).unwrap();
//! assert!(wire.chunks_exact(2).all(|px| px == [0xF8, 0x00]));
//!
//! // IMU: an upright body at rest reads +1 g on "up".
//! let config = ImuConfig::ideal().with_convention(CoordinateConvention::Enu);
//! let mut imu = ImuSynthesizer::with_config(42, config).unwrap();
//! let reading = imu.tick(&PhysicalBodyState::at_rest(), 0.005).unwrap();
//! assert!((reading.acceleration[2] - 9.81).abs() < 1e-9);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod audio;
pub mod camera;
pub mod capture;
pub mod config;
pub mod device;
mod error;
pub mod imu;
pub mod noise;
pub mod pixel;
pub mod rate;
pub mod rig;
pub mod servo;

pub use audio::{AudioDigitizer, AudioFrame};
pub use camera::CameraEmulator;
pub use capture::{CaptureBuffer, FrameSource, SampleRing};
pub use config::{AudioConfig, CameraConfig, EmulatorConfig};
pub use device::{DeviceInfo, DeviceInventory, DeviceKind, DeviceSelection, select_device};
pub use error::{EmuError, Result};
pub use imu::{ImuConfig, ImuSynthesizer, PhysicalBodyState, SensorCalibration};
pub use noise::GaussianNoise;
pub use pixel::FrameCodec;
pub use rate::UpdateGate;
pub use rig::SensorRig;
pub use servo::{ServoBody, ServoConfig};

//! Hardware-agnostic data types for emulated sensor streams.
//!
//! This crate provides the foundational types shared by the sensor
//! emulators and by anything that consumes their output:
//! - Renderers (producers of [`RawColorFrame`])
//! - Protocol encoders and firmware test rigs (consumers of wire bytes)
//! - Telemetry sinks (consumers of [`ImuReading`])
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It can be used in:
//! - CLI tools
//! - Firmware-in-the-loop harnesses
//! - Simulation environments
//!
//! # Types
//!
//! - [`RawColorFrame`] / [`PixelLayout`] - Ground-truth color image at any resolution
//! - [`AudioFormat`] - Mono 16-bit PCM frame geometry
//! - [`ImuReading`] - Six-axis inertial reading with gravity and temperature
//! - [`CoordinateConvention`] - Native, ENU and NED axis conventions
//! - [`Timestamp`] / [`Duration`] - Nanosecond simulation time
//!
//! # Example
//!
//! ```
//! use sensor_types::{CoordinateConvention, ImuReading, Timestamp};
//!
//! let imu = ImuReading {
//!     timestamp: Timestamp::from_secs_f64(1.0),
//!     acceleration: [0.0, 9.81, 0.0],
//!     angular_velocity: [0.0, 0.1, 0.0],
//!     gravity: [0.0, -9.81, 0.0],
//!     temperature: 25.0,
//!     convention: CoordinateConvention::Native,
//! };
//!
//! assert!(imu.acceleration[1] > 9.0);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod audio;
mod camera;
mod error;
mod frame;
mod imu;
mod time;

pub use audio::AudioFormat;
pub use camera::{PixelLayout, RawColorFrame};
pub use error::SensorError;
pub use frame::CoordinateConvention;
pub use imu::ImuReading;
pub use time::{Duration, Timestamp};

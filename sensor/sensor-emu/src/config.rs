//! Emulator configuration.
//!
//! Every option is plain data with a sensible default, so a configuration
//! file only needs to name what it changes:
//!
//! ```
//! use sensor_emu::config::EmulatorConfig;
//!
//! let config = EmulatorConfig::from_json(r#"{ "camera": { "width": 160, "height": 120 } }"#)
//!     .unwrap();
//! assert_eq!(config.camera.width, 160);
//! assert_eq!(config.audio.sample_rate, 16_000);
//! ```

use sensor_types::{AudioFormat, Duration, SensorError};
use serde::{Deserialize, Serialize};

use crate::device::DeviceSelection;
use crate::error::{EmuError, Result};
use crate::imu::ImuConfig;
use crate::servo::ServoConfig;

/// Camera emulator options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Device frame width in pixels.
    pub width: u32,
    /// Device frame height in pixels.
    pub height: u32,
    /// Output frame rate in hertz.
    pub frame_rate_hz: f64,
    /// Which camera feeds the emulator.
    pub device: DeviceSelection,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            frame_rate_hz: 30.0,
            device: DeviceSelection::Default,
        }
    }
}

impl CameraConfig {
    /// Set the device resolution.
    #[must_use]
    pub const fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the frame rate.
    #[must_use]
    pub const fn with_frame_rate(mut self, hz: f64) -> Self {
        self.frame_rate_hz = hz;
        self
    }

    /// Frame interval, if the rate is valid.
    #[must_use]
    pub fn frame_interval(&self) -> Option<Duration> {
        Duration::from_rate_hz(self.frame_rate_hz)
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SensorError::invalid_resolution(self.width, self.height).into());
        }
        if self.frame_interval().is_none() {
            return Err(EmuError::invalid_config("camera frame rate must be positive"));
        }
        Ok(())
    }
}

/// Microphone emulator options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Capture sample rate in hertz.
    pub sample_rate: u32,
    /// Default frame duration in milliseconds.
    pub frame_ms: u32,
    /// Ring-buffer length in seconds.
    pub buffer_seconds: u32,
    /// Capture channel count (downmixed to mono).
    pub channels: usize,
    /// Which microphone feeds the emulator.
    pub device: DeviceSelection,
}

impl Default for AudioConfig {
    fn default() -> Self {
        let format = AudioFormat::default();
        Self {
            sample_rate: format.sample_rate,
            frame_ms: format.frame_ms,
            buffer_seconds: 2,
            channels: 1,
            device: DeviceSelection::Default,
        }
    }
}

impl AudioConfig {
    /// Output PCM format.
    ///
    /// # Errors
    ///
    /// Returns an error if the rate and frame duration yield no samples.
    pub fn format(&self) -> Result<AudioFormat> {
        Ok(AudioFormat::new(self.sample_rate, self.frame_ms)?)
    }

    /// Ring-buffer capacity in samples per channel.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.sample_rate as usize * self.buffer_seconds as usize
    }

    fn validate(&self) -> Result<()> {
        let format = self.format()?;
        if self.channels == 0 {
            return Err(EmuError::invalid_config("audio channel count must be positive"));
        }
        if format.samples_per_frame() > self.capacity() {
            return Err(EmuError::invalid_config(format!(
                "audio frame of {} samples exceeds ring capacity {}",
                format.samples_per_frame(),
                self.capacity()
            )));
        }
        Ok(())
    }
}

/// Complete emulator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    /// Camera options.
    pub camera: CameraConfig,
    /// Microphone options.
    pub audio: AudioConfig,
    /// IMU options.
    pub imu: ImuConfig,
    /// Reference servo options.
    pub servo: ServoConfig,
    /// Seed for every noise source.
    pub seed: u64,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            audio: AudioConfig::default(),
            imu: ImuConfig::default(),
            servo: ServoConfig::default(),
            seed: 42,
        }
    }
}

impl EmulatorConfig {
    /// Set the camera options.
    #[must_use]
    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    /// Set the microphone options.
    #[must_use]
    pub fn with_audio(mut self, audio: AudioConfig) -> Self {
        self.audio = audio;
        self
    }

    /// Set the IMU options.
    #[must_use]
    pub fn with_imu(mut self, imu: ImuConfig) -> Self {
        self.imu = imu;
        self
    }

    /// Set the servo options.
    #[must_use]
    pub fn with_servo(mut self, servo: ServoConfig) -> Self {
        self.servo = servo;
        self
    }

    /// Set the noise seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first invalid option found.
    pub fn validate(&self) -> Result<()> {
        self.camera.validate()?;
        self.audio.validate()?;
        self.imu.validate()?;
        self.servo.validate()
    }

    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the result is invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

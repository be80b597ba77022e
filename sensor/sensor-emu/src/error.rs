//! Error types for sensor emulation.
//!
//! Only configuration-time faults are errors. A sensor that simply has no
//! fresh data yet answers `None` from its poll method instead.

use sensor_types::SensorError;
use thiserror::Error;

use crate::device::DeviceKind;

/// Errors that can occur while configuring or wiring emulated sensors.
#[derive(Debug, Error)]
pub enum EmuError {
    /// No capture device of the required kind exists at startup.
    #[error("no {kind} capture device available")]
    NoCaptureDevice {
        /// Kind of device that was required.
        kind: DeviceKind,
    },

    /// Devices exist, but none matches the configured selection.
    #[error("no {kind} device matches selection {selection}")]
    DeviceNotFound {
        /// Kind of device that was required.
        kind: DeviceKind,
        /// Human-readable form of the selection.
        selection: String,
    },

    /// Invalid emulator configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid sensor data or format.
    #[error(transparent)]
    Sensor(#[from] SensorError),

    /// Configuration (de)serialization failed.
    #[error("configuration serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EmuError {
    /// Create a missing-device error.
    #[must_use]
    pub const fn no_capture_device(kind: DeviceKind) -> Self {
        Self::NoCaptureDevice { kind }
    }

    /// Create a device-not-found error.
    #[must_use]
    pub fn device_not_found(kind: DeviceKind, selection: impl Into<String>) -> Self {
        Self::DeviceNotFound {
            kind,
            selection: selection.into(),
        }
    }

    /// Create an invalid config error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Returns `true` for faults that disable a component at startup.
    #[must_use]
    pub const fn is_configuration_fault(&self) -> bool {
        matches!(
            self,
            Self::NoCaptureDevice { .. } | Self::DeviceNotFound { .. }
        )
    }
}

/// Result type for sensor emulation operations.
pub type Result<T> = std::result::Result<T, EmuError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn error_no_capture_device() {
        let err = EmuError::no_capture_device(DeviceKind::Microphone);
        assert_eq!(err.to_string(), "no microphone capture device available");
        assert!(err.is_configuration_fault());
    }

    #[test]
    fn error_device_not_found() {
        let err = EmuError::device_not_found(DeviceKind::Camera, "name \"usb-cam\"");
        assert!(err.to_string().contains("camera"));
        assert!(err.to_string().contains("usb-cam"));
        assert!(err.is_configuration_fault());
    }

    #[test]
    fn error_invalid_config() {
        let err = EmuError::invalid_config("update rate must be positive");
        assert!(err.to_string().contains("invalid configuration"));
        assert!(!err.is_configuration_fault());
    }

    #[test]
    fn error_from_sensor_error() {
        let err: EmuError = SensorError::invalid_resolution(0, 0).into();
        assert_eq!(err.to_string(), "invalid resolution: 0x0");
    }

    #[test]
    fn error_from_json() {
        let json_err = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err: EmuError = json_err.into();
        assert!(err.to_string().contains("serialization"));
    }
}

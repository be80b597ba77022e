//! Error types for sensor data.

use thiserror::Error;

/// Errors that can occur when constructing or validating sensor data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SensorError {
    /// Buffer size mismatch (e.g., image buffer wrong size for its layout).
    #[error("buffer size mismatch: expected {expected}, got {actual}")]
    BufferSizeMismatch {
        /// Expected buffer size.
        expected: usize,
        /// Actual buffer size.
        actual: usize,
    },

    /// A resolution with a zero dimension.
    #[error("invalid resolution: {width}x{height}")]
    InvalidResolution {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// A coordinate-convention selector outside the known set.
    #[error("invalid coordinate convention selector: {0}")]
    InvalidConventionSelector(u8),

    /// A coordinate-convention name outside the known set.
    #[error("unknown coordinate convention: {0}")]
    UnknownConvention(String),

    /// An audio format that yields no samples per frame.
    #[error("invalid audio format: {0}")]
    InvalidAudioFormat(String),
}

impl SensorError {
    /// Creates a buffer size mismatch error.
    #[must_use]
    pub const fn buffer_mismatch(expected: usize, actual: usize) -> Self {
        Self::BufferSizeMismatch { expected, actual }
    }

    /// Creates an invalid resolution error.
    #[must_use]
    pub const fn invalid_resolution(width: u32, height: u32) -> Self {
        Self::InvalidResolution { width, height }
    }

    /// Creates an invalid audio format error.
    #[must_use]
    pub fn invalid_audio_format(reason: impl Into<String>) -> Self {
        Self::InvalidAudioFormat(reason.into())
    }
}

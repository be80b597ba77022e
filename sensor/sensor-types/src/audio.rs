//! Audio wire-format description.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::SensorError;

/// Mono 16-bit PCM frame layout emitted by the microphone emulator.
///
/// Samples are signed, little-endian, one channel, no header.
///
/// # Example
///
/// ```
/// use sensor_types::AudioFormat;
///
/// let format = AudioFormat::default();
/// assert_eq!(format.sample_rate, 16_000);
/// assert_eq!(format.frame_ms, 20);
/// assert_eq!(format.samples_per_frame(), 320);
/// assert_eq!(format.bytes_per_frame(), 640);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AudioFormat {
    /// Sample rate in hertz.
    pub sample_rate: u32,
    /// Frame duration in milliseconds.
    pub frame_ms: u32,
}

impl AudioFormat {
    /// Bytes per packed sample.
    pub const BYTES_PER_SAMPLE: usize = 2;

    /// Creates a format after checking it yields at least one sample.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::InvalidAudioFormat`] if the rate or duration
    /// is zero, or the combination rounds down to zero samples.
    pub fn new(sample_rate: u32, frame_ms: u32) -> Result<Self, SensorError> {
        let format = Self {
            sample_rate,
            frame_ms,
        };
        if format.samples_per_frame() == 0 {
            return Err(SensorError::invalid_audio_format(format!(
                "{sample_rate} Hz over {frame_ms} ms yields no samples"
            )));
        }
        Ok(format)
    }

    /// Number of samples covering `duration_ms` at this rate.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn samples_for(self, duration_ms: u32) -> usize {
        (self.sample_rate as u64 * duration_ms as u64 / 1000) as usize
    }

    /// Number of mono samples in one frame.
    #[must_use]
    pub const fn samples_per_frame(self) -> usize {
        self.samples_for(self.frame_ms)
    }

    /// Number of packed bytes in one frame.
    #[must_use]
    pub const fn bytes_per_frame(self) -> usize {
        self.samples_per_frame() * Self::BYTES_PER_SAMPLE
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            frame_ms: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_frame_is_640_bytes() {
        assert_eq!(AudioFormat::default().bytes_per_frame(), 640);
    }

    #[test]
    fn samples_for_truncates() {
        let format = AudioFormat {
            sample_rate: 44_100,
            frame_ms: 10,
        };
        assert_eq!(format.samples_per_frame(), 441);
        assert_eq!(format.samples_for(1), 44);
    }

    #[test]
    fn new_rejects_empty_frames() {
        assert!(AudioFormat::new(16_000, 20).is_ok());
        assert!(AudioFormat::new(0, 20).is_err());
        assert!(AudioFormat::new(16_000, 0).is_err());
        assert!(AudioFormat::new(500, 1).is_err());
    }
}

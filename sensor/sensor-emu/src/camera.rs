//! Camera emulator.
//!
//! Decouples the device frame rate from the caller's poll rate: a new wire
//! frame is encoded only when the frame interval has elapsed, and polls in
//! between return the cached frame.

use sensor_types::Timestamp;
use tracing::debug;

use crate::capture::FrameSource;
use crate::config::CameraConfig;
use crate::error::{EmuError, Result};
use crate::pixel::FrameCodec;
use crate::rate::UpdateGate;

/// Rate-limited RGB565 camera.
///
/// # Example
///
/// ```
/// use sensor_emu::camera::CameraEmulator;
/// use sensor_emu::config::CameraConfig;
/// use sensor_types::{RawColorFrame, Timestamp};
///
/// let config = CameraConfig::default().with_resolution(32, 24).with_frame_rate(10.0);
/// let mut camera = CameraEmulator::new(&config).unwrap();
///
/// let source = RawColorFrame::solid(64, 48, [0, 0, 255]);
/// let frame = camera.poll(&source, Timestamp::zero()).unwrap();
/// assert_eq!(frame.len(), 32 * 24 * 2);
/// assert_eq!(camera.frames_encoded(), 1);
///
/// // 50 ms later the cached frame is returned without re-encoding.
/// assert!(camera.poll(&source, Timestamp::from_secs_f64(0.05)).is_some());
/// assert_eq!(camera.frames_encoded(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct CameraEmulator {
    codec: FrameCodec,
    gate: UpdateGate,
}

impl CameraEmulator {
    /// Creates a camera from its configuration.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero resolution or non-positive frame rate.
    pub fn new(config: &CameraConfig) -> Result<Self> {
        let gate = UpdateGate::from_rate_hz(config.frame_rate_hz)
            .ok_or_else(|| EmuError::invalid_config("camera frame rate must be positive"))?;
        let codec = FrameCodec::new(config.width, config.height)?;
        Ok(Self { codec, gate })
    }

    /// Returns the wire frame current at `now`.
    ///
    /// When a frame is due, the source's latest frame is encoded. If the
    /// source is not ready, the previous frame (if any) is returned and the
    /// next poll tries again.
    pub fn poll(&mut self, source: &dyn FrameSource, now: Timestamp) -> Option<&[u8]> {
        if self.gate.poll(now) {
            let encoded = source
                .latest_frame()
                .is_some_and(|frame| self.codec.produce_wire_frame(frame).is_some());
            if !encoded {
                debug!("camera frame due but source not ready");
                self.gate.reset();
            }
        }
        self.codec.wire_frame()
    }

    /// Returns the little-endian display copy of the current frame.
    pub fn display_frame(&mut self) -> Option<&[u8]> {
        self.codec.display_frame()
    }

    /// Returns the current wire frame without polling.
    #[must_use]
    pub fn wire_frame(&self) -> Option<&[u8]> {
        self.codec.wire_frame()
    }

    /// Changes the device resolution.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero.
    pub fn set_target(&mut self, width: u32, height: u32) -> Result<()> {
        self.codec.set_target(width, height)?;
        Ok(())
    }

    /// Returns the underlying codec.
    #[must_use]
    pub const fn codec(&self) -> &FrameCodec {
        &self.codec
    }

    /// Returns how many frames have been encoded.
    #[must_use]
    pub const fn frames_encoded(&self) -> u64 {
        self.codec.frames_encoded()
    }

    /// Returns how many frame intervals were coalesced away.
    #[must_use]
    pub const fn missed_frames(&self) -> u64 {
        self.gate.missed()
    }
}

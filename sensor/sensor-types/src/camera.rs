//! Camera frame types.
//!
//! Provides the ground-truth color frame a renderer hands to the camera
//! emulator, in whatever resolution the renderer happens to use.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{SensorError, Timestamp};

/// Channel layout of a raw color frame.
///
/// Describes how pixel data is stored in the raw byte buffer. Alpha
/// channels are carried but never sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PixelLayout {
    /// RGBA 8-bit per channel (4 bytes per pixel).
    #[default]
    Rgba8,
    /// RGB 8-bit per channel (3 bytes per pixel).
    Rgb8,
    /// BGR 8-bit per channel (3 bytes per pixel, `OpenCV` convention).
    Bgr8,
    /// BGRA 8-bit per channel (4 bytes per pixel, `OpenCV` convention).
    Bgra8,
}

impl PixelLayout {
    /// Returns the number of bytes per pixel for this layout.
    #[must_use]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8 | Self::Bgra8 => 4,
            Self::Rgb8 | Self::Bgr8 => 3,
        }
    }

    /// Returns the expected buffer size for an image with this layout.
    #[must_use]
    pub const fn buffer_size(self, width: u32, height: u32) -> usize {
        width as usize * height as usize * self.bytes_per_pixel()
    }

    /// Reorders one pixel's leading channels into `[r, g, b]`.
    #[must_use]
    pub const fn to_rgb(self, px: &[u8]) -> [u8; 3] {
        match self {
            Self::Rgba8 | Self::Rgb8 => [px[0], px[1], px[2]],
            Self::Bgra8 | Self::Bgr8 => [px[2], px[1], px[0]],
        }
    }
}

/// A raw, full-color frame as produced by the renderer.
///
/// Row-major, top row first. The resolution is whatever the source renders
/// at; resampling to the device resolution is the camera emulator's job.
///
/// # Example
///
/// ```
/// use sensor_types::{PixelLayout, RawColorFrame, Timestamp};
///
/// let frame = RawColorFrame::solid(640, 480, [255, 0, 0]);
/// assert_eq!(frame.layout, PixelLayout::Rgb8);
/// assert_eq!(frame.rgb_at(10, 10), Some([255, 0, 0]));
/// assert!(frame.has_valid_buffer_size());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawColorFrame {
    /// Timestamp when the frame was rendered.
    pub timestamp: Timestamp,

    /// Image width in pixels.
    pub width: u32,

    /// Image height in pixels.
    pub height: u32,

    /// Channel layout of `data`.
    pub layout: PixelLayout,

    /// Raw pixel bytes.
    pub data: Vec<u8>,
}

impl RawColorFrame {
    /// Creates a frame after checking the buffer length against the layout.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::BufferSizeMismatch`] if `data` does not hold
    /// exactly `width * height` pixels.
    pub fn new(
        width: u32,
        height: u32,
        layout: PixelLayout,
        data: Vec<u8>,
    ) -> Result<Self, SensorError> {
        let expected = layout.buffer_size(width, height);
        if data.len() != expected {
            return Err(SensorError::buffer_mismatch(expected, data.len()));
        }
        Ok(Self {
            timestamp: Timestamp::zero(),
            width,
            height,
            layout,
            data,
        })
    }

    /// Creates an RGB frame filled with a single color.
    #[must_use]
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * 3);
        for _ in 0..pixels {
            data.extend_from_slice(&rgb);
        }
        Self {
            timestamp: Timestamp::zero(),
            width,
            height,
            layout: PixelLayout::Rgb8,
            data,
        }
    }

    /// Sets the capture timestamp.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Returns the total number of pixels.
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns the expected buffer size for this frame.
    #[must_use]
    pub const fn expected_len(&self) -> usize {
        self.layout.buffer_size(self.width, self.height)
    }

    /// Checks if the image buffer has the expected size.
    #[must_use]
    pub fn has_valid_buffer_size(&self) -> bool {
        self.data.len() == self.expected_len()
    }

    /// Returns the `[r, g, b]` value at `(x, y)`, or `None` out of bounds.
    #[must_use]
    pub fn rgb_at(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.layout.bytes_per_pixel();
        let offset = (y as usize * self.width as usize + x as usize) * bpp;
        self.data
            .get(offset..offset + bpp)
            .map(|px| self.layout.to_rgb(px))
    }
}

//! Frame resampler and RGB565 pixel codec.
//!
//! Converts an arbitrary-resolution color frame into the fixed-resolution
//! framebuffer dump a low-cost embedded camera produces: nearest-neighbor
//! resampled, channels truncated to 5/6/5 bits, each pixel big-endian.
//!
//! Two buffers are kept. The wire buffer holds big-endian pixels for device
//! consumers; the display buffer holds the same pixels little-endian for
//! local viewers. They never share storage, and [`swap_to_display_order`]
//! is the only path from one to the other.

use sensor_types::{RawColorFrame, SensorError};
use tracing::{debug, warn};

/// Sources at or below this size in either dimension are still warming up.
pub const MIN_SOURCE_DIMENSION: u32 = 16;

/// Bytes per packed RGB565 pixel.
pub const BYTES_PER_PIXEL: usize = 2;

/// Packs 8-bit channels into RGB565 by truncation.
///
/// ```
/// use sensor_emu::pixel::pack_rgb565;
///
/// assert_eq!(pack_rgb565(255, 0, 0), 0xF800);
/// assert_eq!(pack_rgb565(0, 255, 0), 0x07E0);
/// assert_eq!(pack_rgb565(0, 0, 255), 0x001F);
/// assert_eq!(pack_rgb565(7, 3, 7), 0x0000);
/// ```
#[must_use]
pub const fn pack_rgb565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3)
}

/// Nearest-neighbor source coordinate for destination coordinate `dst`.
///
/// Integer division, so the mapping is deterministic and never samples
/// past `src_len - 1`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn resample_index(dst: u32, src_len: u32, dst_len: u32) -> u32 {
    (dst as u64 * src_len as u64 / dst_len as u64) as u32
}

/// Writes the little-endian copy of a big-endian RGB565 buffer.
///
/// Both slices must be the same length.
pub fn swap_to_display_order(wire: &[u8], display: &mut [u8]) {
    debug_assert_eq!(wire.len(), display.len());
    for (out, px) in display
        .chunks_exact_mut(BYTES_PER_PIXEL)
        .zip(wire.chunks_exact(BYTES_PER_PIXEL))
    {
        out[0] = px[1];
        out[1] = px[0];
    }
}

/// Fixed-resolution RGB565 encoder with reusable output buffers.
///
/// # Example
///
/// ```
/// use sensor_emu::pixel::FrameCodec;
/// use sensor_types::RawColorFrame;
///
/// let mut codec = FrameCodec::new(320, 240).unwrap();
/// let source = RawColorFrame::solid(640, 480, [255, 0, 0]);
///
/// let wire = codec.produce_wire_frame(&source).unwrap();
/// assert_eq!(wire.len(), 320 * 240 * 2);
/// assert_eq!(&wire[..2], &[0xF8, 0x00]);
///
/// let display = codec.display_frame().unwrap();
/// assert_eq!(&display[..2], &[0x00, 0xF8]);
///
/// // Warm-up resolutions are not ready yet.
/// assert!(codec.produce_wire_frame(&RawColorFrame::solid(16, 16, [0, 0, 0])).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct FrameCodec {
    width: u32,
    height: u32,
    wire: Vec<u8>,
    display: Vec<u8>,
    has_frame: bool,
    display_stale: bool,
    frames_encoded: u64,
}

impl FrameCodec {
    /// Creates a codec for the given device resolution.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::InvalidResolution`] if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self, SensorError> {
        let mut codec = Self {
            width: 0,
            height: 0,
            wire: Vec::new(),
            display: Vec::new(),
            has_frame: false,
            display_stale: false,
            frames_encoded: 0,
        };
        codec.set_target(width, height)?;
        Ok(codec)
    }

    /// Changes the device resolution.
    ///
    /// This is the only operation that reallocates. Setting the current
    /// resolution again is a no-op; a new resolution discards the last frame.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::InvalidResolution`] if either dimension is zero.
    pub fn set_target(&mut self, width: u32, height: u32) -> Result<(), SensorError> {
        if width == 0 || height == 0 {
            return Err(SensorError::invalid_resolution(width, height));
        }
        if (width, height) == (self.width, self.height) {
            return Ok(());
        }
        let len = width as usize * height as usize * BYTES_PER_PIXEL;
        self.width = width;
        self.height = height;
        self.wire = vec![0; len];
        self.display = vec![0; len];
        self.has_frame = false;
        self.display_stale = false;
        debug!(width, height, "camera target resolution set");
        Ok(())
    }

    /// Returns the device resolution as `(width, height)`.
    #[must_use]
    pub const fn target(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the size in bytes of one wire frame.
    #[must_use]
    pub fn frame_len(&self) -> usize {
        self.wire.len()
    }

    /// Returns how many frames have been encoded since construction.
    #[must_use]
    pub const fn frames_encoded(&self) -> u64 {
        self.frames_encoded
    }

    /// Resamples and encodes `source` into the big-endian wire buffer.
    ///
    /// Returns `None` while the source is warming up (either dimension at
    /// or below [`MIN_SOURCE_DIMENSION`]) or when its buffer does not match
    /// its declared layout. The previous wire frame is kept in that case.
    pub fn produce_wire_frame(&mut self, source: &RawColorFrame) -> Option<&[u8]> {
        if source.width <= MIN_SOURCE_DIMENSION || source.height <= MIN_SOURCE_DIMENSION {
            debug!(
                width = source.width,
                height = source.height,
                "camera source not ready"
            );
            return None;
        }
        if !source.has_valid_buffer_size() {
            warn!(
                expected = source.expected_len(),
                actual = source.data.len(),
                "camera source buffer does not match its layout"
            );
            return None;
        }

        self.encode(source);
        self.has_frame = true;
        self.display_stale = true;
        self.frames_encoded += 1;
        Some(&self.wire)
    }

    /// Returns the most recent wire frame, if any.
    #[must_use]
    pub fn wire_frame(&self) -> Option<&[u8]> {
        self.has_frame.then_some(self.wire.as_slice())
    }

    /// Returns the little-endian copy of the most recent frame.
    ///
    /// The byte swap runs only when the wire frame changed since the last call.
    pub fn display_frame(&mut self) -> Option<&[u8]> {
        if !self.has_frame {
            return None;
        }
        if self.display_stale {
            swap_to_display_order(&self.wire, &mut self.display);
            self.display_stale = false;
        }
        Some(&self.display)
    }

    fn encode(&mut self, source: &RawColorFrame) {
        let bpp = source.layout.bytes_per_pixel();
        let src_stride = source.width as usize * bpp;
        let dst_stride = self.width as usize * BYTES_PER_PIXEL;

        for (y, row) in (0..self.height).zip(self.wire.chunks_exact_mut(dst_stride)) {
            let sy = resample_index(y, source.height, self.height) as usize;
            let src_row = &source.data[sy * src_stride..(sy + 1) * src_stride];

            for (x, out) in (0..self.width).zip(row.chunks_exact_mut(BYTES_PER_PIXEL)) {
                let sx = resample_index(x, source.width, self.width) as usize;
                let [r, g, b] = source.layout.to_rgb(&src_row[sx * bpp..(sx + 1) * bpp]);
                out.copy_from_slice(&pack_rgb565(r, g, b).to_be_bytes());
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use sensor_types::PixelLayout;

    fn gradient(width: u32, height: u32) -> RawColorFrame {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8]);
            }
        }
        RawColorFrame::new(width, height, PixelLayout::Rgb8, data).unwrap()
    }

    #[test]
    fn pack_truncates_not_rounds() {
        // 0b1111_1111 -> 5 bits 0b11111, 0b0000_0111 -> 0
        assert_eq!(pack_rgb565(0xFF, 0xFF, 0xFF), 0xFFFF);
        assert_eq!(pack_rgb565(0x07, 0x03, 0x07), 0x0000);
        assert_eq!(pack_rgb565(0x08, 0x04, 0x08), 0x0821);
    }

    #[test]
    fn resample_index_stays_in_bounds() {
        assert_eq!(resample_index(0, 640, 320), 0);
        assert_eq!(resample_index(319, 640, 320), 638);
        assert_eq!(resample_index(99, 17, 100), 16);
        assert_eq!(resample_index(5, 100, 100), 5);
    }

    #[test]
    fn zero_target_is_rejected() {
        assert!(FrameCodec::new(0, 240).is_err());
        assert!(FrameCodec::new(320, 0).is_err());
    }

    #[test]
    fn warm_up_sizes_are_not_ready() {
        let mut codec = FrameCodec::new(32, 32).unwrap();
        assert!(codec.produce_wire_frame(&gradient(16, 100)).is_none());
        assert!(codec.produce_wire_frame(&gradient(100, 16)).is_none());
        assert!(codec.wire_frame().is_none());
        assert!(codec.display_frame().is_none());
        assert!(codec.produce_wire_frame(&gradient(17, 17)).is_some());
    }

    #[test]
    fn malformed_source_is_not_ready_and_keeps_last_frame() {
        let mut codec = FrameCodec::new(20, 20).unwrap();
        let good = RawColorFrame::solid(40, 40, [255, 255, 255]);
        codec.produce_wire_frame(&good).unwrap();

        let mut bad = RawColorFrame::solid(40, 40, [0, 0, 0]);
        bad.data.pop();
        assert!(codec.produce_wire_frame(&bad).is_none());
        assert_eq!(&codec.wire_frame().unwrap()[..2], &[0xFF, 0xFF]);
        assert_eq!(codec.frames_encoded(), 1);
    }

    #[test]
    fn nearest_neighbor_picks_integer_division_source() {
        let source = gradient(64, 48);
        let mut codec = FrameCodec::new(32, 24).unwrap();
        let wire = codec.produce_wire_frame(&source).unwrap().to_vec();

        for (x, y) in [(0_u32, 0_u32), (5, 7), (31, 23), (16, 12)] {
            let [r, g, b] = source.rgb_at(x * 2, y * 2).unwrap();
            let i = ((y * 32 + x) as usize) * 2;
            let got = u16::from_be_bytes([wire[i], wire[i + 1]]);
            assert_eq!(got, pack_rgb565(r, g, b), "pixel ({x}, {y})");
        }
    }

    #[test]
    fn identical_sizes_copy_pixels() {
        let source = gradient(20, 20);
        let mut codec = FrameCodec::new(20, 20).unwrap();
        let wire = codec.produce_wire_frame(&source).unwrap();
        let [r, g, b] = source.rgb_at(13, 9).unwrap();
        let i = (9 * 20 + 13) * 2;
        assert_eq!(
            u16::from_be_bytes([wire[i], wire[i + 1]]),
            pack_rgb565(r, g, b)
        );
    }

    #[test]
    fn bgra_sources_are_reordered() {
        let mut data = Vec::new();
        for _ in 0..(20 * 20) {
            data.extend_from_slice(&[0, 0, 255, 128]); // BGRA red
        }
        let source = RawColorFrame::new(20, 20, PixelLayout::Bgra8, data).unwrap();
        let mut codec = FrameCodec::new(10, 10).unwrap();
        let wire = codec.produce_wire_frame(&source).unwrap();
        assert!(wire.chunks_exact(2).all(|px| px == [0xF8, 0x00]));
    }

    #[test]
    fn display_is_byte_swapped_wire() {
        let mut codec = FrameCodec::new(24, 18).unwrap();
        let wire = codec.produce_wire_frame(&gradient(50, 40)).unwrap().to_vec();
        let display = codec.display_frame().unwrap();

        assert_eq!(wire.len(), display.len());
        for (w, d) in wire.chunks_exact(2).zip(display.chunks_exact(2)) {
            assert_eq!(
                u16::from_be_bytes([w[0], w[1]]),
                u16::from_le_bytes([d[0], d[1]])
            );
        }
    }

    #[test]
    fn display_refreshes_after_new_frame() {
        let mut codec = FrameCodec::new(20, 20).unwrap();
        codec.produce_wire_frame(&RawColorFrame::solid(32, 32, [255, 0, 0]));
        assert_eq!(&codec.display_frame().unwrap()[..2], &[0x00, 0xF8]);

        codec.produce_wire_frame(&RawColorFrame::solid(32, 32, [0, 0, 255]));
        assert_eq!(&codec.display_frame().unwrap()[..2], &[0x1F, 0x00]);
        assert_eq!(&codec.wire_frame().unwrap()[..2], &[0x00, 0x1F]);
    }

    #[test]
    fn steady_state_reuses_buffers() {
        let mut codec = FrameCodec::new(64, 48).unwrap();
        let source = gradient(128, 96);
        let first = codec.produce_wire_frame(&source).unwrap().as_ptr();
        let second = codec.produce_wire_frame(&source).unwrap().as_ptr();
        assert_eq!(first, second);

        codec.set_target(64, 48).unwrap();
        assert!(codec.wire_frame().is_some());
        assert_eq!(codec.wire_frame().unwrap().as_ptr(), first);
    }

    #[test]
    fn retarget_resizes_and_discards() {
        let mut codec = FrameCodec::new(64, 48).unwrap();
        codec.produce_wire_frame(&gradient(128, 96)).unwrap();
        codec.set_target(32, 32).unwrap();

        assert_eq!(codec.target(), (32, 32));
        assert_eq!(codec.frame_len(), 32 * 32 * 2);
        assert!(codec.wire_frame().is_none());
    }
}

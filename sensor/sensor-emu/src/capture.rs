//! Capture-side interfaces.
//!
//! Real capture devices fill their buffers asynchronously. The emulators
//! only ever read a snapshot of that state through these traits, and never
//! wait for it to change.

use sensor_types::RawColorFrame;

/// Source of rendered color frames (the simulated camera's "sensor").
pub trait FrameSource {
    /// Returns the most recently rendered frame, or `None` if the renderer
    /// has not produced one yet.
    fn latest_frame(&self) -> Option<&RawColorFrame>;
}

impl FrameSource for RawColorFrame {
    fn latest_frame(&self) -> Option<&RawColorFrame> {
        Some(self)
    }
}

impl FrameSource for Option<RawColorFrame> {
    fn latest_frame(&self) -> Option<&RawColorFrame> {
        self.as_ref()
    }
}

/// Continuously overwritten multi-channel audio capture buffer.
///
/// Samples are interleaved frame by frame: channel `c` of frame `i` lives at
/// `i * channels() + c`. The write cursor counts frames, advances
/// monotonically and wraps at [`capacity`](Self::capacity).
pub trait CaptureBuffer {
    /// Sample rate in hertz.
    fn sample_rate(&self) -> u32;

    /// Number of interleaved channels.
    fn channels(&self) -> usize;

    /// Capacity in frames (samples per channel).
    fn capacity(&self) -> usize;

    /// Index of the next frame to be written, or `None` before capture starts.
    fn write_position(&self) -> Option<usize>;

    /// The raw interleaved storage, `capacity() * channels()` values long.
    fn samples(&self) -> &[f32];
}

/// In-memory ring buffer standing in for a microphone driver.
///
/// # Example
///
/// ```
/// use sensor_emu::capture::{CaptureBuffer, SampleRing};
///
/// let mut ring = SampleRing::new(8, 1, 1); // 8 Hz, mono, one second
/// assert_eq!(ring.write_position(), None);
///
/// ring.push(&[0.1, 0.2, 0.3]);
/// assert_eq!(ring.write_position(), Some(3));
///
/// ring.push(&[0.0; 6]);
/// assert_eq!(ring.write_position(), Some(1)); // wrapped
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRing {
    sample_rate: u32,
    channels: usize,
    capacity: usize,
    data: Vec<f32>,
    cursor: Option<usize>,
}

impl SampleRing {
    /// Creates a silent ring of `sample_rate * buffer_seconds` frames.
    ///
    /// Channel count and capacity are clamped to at least one.
    #[must_use]
    pub fn new(sample_rate: u32, channels: usize, buffer_seconds: u32) -> Self {
        let channels = channels.max(1);
        let capacity = (sample_rate as usize * buffer_seconds as usize).max(1);
        Self {
            sample_rate,
            channels,
            capacity,
            data: vec![0.0; capacity * channels],
            cursor: None,
        }
    }

    /// Creates a ring from existing interleaved storage and cursor.
    ///
    /// Returns `None` if `data` is empty or not a whole number of frames.
    #[must_use]
    pub fn from_parts(
        sample_rate: u32,
        channels: usize,
        data: Vec<f32>,
        cursor: Option<usize>,
    ) -> Option<Self> {
        if channels == 0 || data.is_empty() || data.len() % channels != 0 {
            return None;
        }
        let capacity = data.len() / channels;
        Some(Self {
            sample_rate,
            channels,
            capacity,
            data,
            cursor,
        })
    }

    /// Appends interleaved frames, overwriting the oldest data.
    ///
    /// A trailing partial frame is ignored. Capture only starts once a whole
    /// frame has been written.
    pub fn push(&mut self, interleaved: &[f32]) {
        let frames = interleaved.chunks_exact(self.channels);
        if frames.len() == 0 {
            return;
        }
        let mut cursor = self.cursor.unwrap_or(0);
        for frame in frames {
            let start = cursor * self.channels;
            self.data[start..start + self.channels].copy_from_slice(frame);
            cursor = (cursor + 1) % self.capacity;
        }
        self.cursor = Some(cursor);
    }

    /// Returns `true` once any frame has been pushed.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.cursor.is_some()
    }
}

impl CaptureBuffer for SampleRing {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn write_position(&self) -> Option<usize> {
        self.cursor
    }

    fn samples(&self) -> &[f32] {
        &self.data
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn ring_sizes_from_rate() {
        let ring = SampleRing::new(16_000, 2, 1);
        assert_eq!(ring.capacity(), 16_000);
        assert_eq!(ring.channels(), 2);
        assert_eq!(ring.samples().len(), 32_000);
        assert!(!ring.is_started());
    }

    #[test]
    fn ring_clamps_degenerate_sizes() {
        let ring = SampleRing::new(0, 0, 0);
        assert_eq!(ring.capacity(), 1);
        assert_eq!(ring.channels(), 1);
    }

    #[test]
    fn push_wraps_and_overwrites() {
        let mut ring = SampleRing::new(4, 1, 1);
        ring.push(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(ring.write_position(), Some(1));
        assert_eq!(ring.samples(), &[5.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn push_interleaved_stereo() {
        let mut ring = SampleRing::new(3, 2, 1);
        ring.push(&[0.1, -0.1, 0.2, -0.2, 0.9]);
        assert_eq!(ring.write_position(), Some(2));
        assert_eq!(&ring.samples()[..4], &[0.1, -0.1, 0.2, -0.2]);
    }

    #[test]
    fn empty_or_partial_push_does_not_start_capture() {
        let mut ring = SampleRing::new(4, 2, 1);
        ring.push(&[]);
        assert_eq!(ring.write_position(), None);
        ring.push(&[0.5]);
        assert_eq!(ring.write_position(), None);
        assert!(!ring.is_started());

        ring.push(&[0.5, 0.5]);
        ring.push(&[]);
        assert_eq!(ring.write_position(), Some(1));
    }

    #[test]
    fn from_parts_validates() {
        assert!(SampleRing::from_parts(10, 2, vec![0.0; 5], None).is_none());
        assert!(SampleRing::from_parts(10, 0, vec![0.0; 4], None).is_none());
        assert!(SampleRing::from_parts(10, 1, Vec::new(), None).is_none());

        let ring = SampleRing::from_parts(10, 2, vec![0.0; 8], Some(3)).unwrap();
        assert_eq!(ring.capacity(), 4);
        assert_eq!(ring.write_position(), Some(3));
    }

    #[test]
    fn frame_sources() {
        let frame = RawColorFrame::solid(20, 20, [1, 2, 3]);
        assert!(frame.latest_frame().is_some());

        let pending: Option<RawColorFrame> = None;
        assert!(pending.latest_frame().is_none());
    }
}

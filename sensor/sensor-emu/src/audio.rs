//! Ring-buffer audio digitizer.
//!
//! Reads the most recent window of a continuously overwritten capture
//! buffer, downmixes it to mono and packs it as 16-bit little-endian PCM,
//! byte-identical to the target device's microphone frames.
//!
//! # Wraparound
//!
//! For a write cursor `pos`, capacity `cap` and request of `n` samples, the
//! window starts at `(pos - n) mod cap`. When `start + n > cap` it is copied
//! as two regions, `[start, cap)` followed by `[0, n - (cap - start))`.

use sensor_types::AudioFormat;
use tracing::{debug, warn};

use crate::capture::CaptureBuffer;
use crate::error::Result;

/// Full-scale value used for PCM quantization.
pub const PCM_FULL_SCALE: f32 = 32767.0;

/// Quantizes a normalized sample to signed 16-bit PCM.
///
/// The sample is clamped to `[-1, 1]` and rounded, so `-1.0` becomes
/// `-32767` rather than `i16::MIN`.
///
/// ```
/// use sensor_emu::audio::quantize;
///
/// assert_eq!(quantize(-1.0).to_le_bytes(), [0x01, 0x80]);
/// assert_eq!(quantize(0.0).to_le_bytes(), [0x00, 0x00]);
/// assert_eq!(quantize(4.0), 32767);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn quantize(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * PCM_FULL_SCALE).round() as i16
}

/// One packed mono PCM frame borrowed from the digitizer's reuse buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFrame<'a> {
    bytes: &'a [u8],
}

impl<'a> AudioFrame<'a> {
    /// Little-endian packed samples, ready for the wire.
    #[must_use]
    pub const fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Number of mono samples in the frame.
    #[must_use]
    pub const fn sample_count(&self) -> usize {
        self.bytes.len() / AudioFormat::BYTES_PER_SAMPLE
    }

    /// Decodes the packed bytes back to signed samples.
    pub fn samples(&self) -> impl Iterator<Item = i16> + 'a {
        self.bytes
            .chunks_exact(AudioFormat::BYTES_PER_SAMPLE)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
    }

    /// Root-mean-square level of the frame, normalized to `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn rms(&self) -> f64 {
        let count = self.sample_count();
        if count == 0 {
            return 0.0;
        }
        let sum_sq: f64 = self
            .samples()
            .map(|s| {
                let v = f64::from(s) / f64::from(PCM_FULL_SCALE);
                v * v
            })
            .sum();
        (sum_sq / count as f64).sqrt()
    }
}

/// Extracts fixed-duration PCM frames from a capture ring buffer.
///
/// # Example
///
/// ```
/// use sensor_emu::audio::AudioDigitizer;
/// use sensor_emu::capture::SampleRing;
///
/// let mut ring = SampleRing::new(16_000, 1, 1);
/// ring.push(&vec![0.5; 400]);
///
/// let mut mic = AudioDigitizer::new(ring, 20).unwrap();
/// let frame = mic.extract_default_frame().unwrap();
/// assert_eq!(frame.bytes().len(), 640);
/// assert!(frame.samples().all(|s| s == 16384));
/// ```
#[derive(Debug, Clone)]
pub struct AudioDigitizer<C> {
    capture: C,
    format: AudioFormat,
    window: Vec<f32>,
    packed: Vec<u8>,
}

impl<C: CaptureBuffer> AudioDigitizer<C> {
    /// Creates a digitizer producing `frame_ms` frames at the capture rate.
    ///
    /// # Errors
    ///
    /// Returns an error if the capture rate and frame duration yield no
    /// samples per frame.
    pub fn new(capture: C, frame_ms: u32) -> Result<Self> {
        let format = AudioFormat::new(capture.sample_rate(), frame_ms)?;
        let samples = format.samples_per_frame();
        Ok(Self {
            capture,
            format,
            window: Vec::with_capacity(samples),
            packed: Vec::with_capacity(samples * AudioFormat::BYTES_PER_SAMPLE),
        })
    }

    /// Returns the output format.
    #[must_use]
    pub const fn format(&self) -> AudioFormat {
        self.format
    }

    /// Returns the capture buffer.
    #[must_use]
    pub const fn capture(&self) -> &C {
        &self.capture
    }

    /// Returns the capture buffer mutably, e.g. to feed it in tests.
    pub fn capture_mut(&mut self) -> &mut C {
        &mut self.capture
    }

    /// Consumes the digitizer and returns its capture buffer.
    pub fn into_capture(self) -> C {
        self.capture
    }

    /// Returns the most recent `sample_count` samples, downmixed to mono.
    ///
    /// Returns `None` before capture starts, for a zero-length request, or
    /// when more samples are requested than the ring holds.
    pub fn window(&mut self, sample_count: usize) -> Option<&[f32]> {
        self.fill_window(sample_count).then_some(self.window.as_slice())
    }

    /// Extracts and packs the most recent `duration_ms` of audio.
    pub fn extract_frame(&mut self, duration_ms: u32) -> Option<AudioFrame<'_>> {
        let sample_count = self.format.samples_for(duration_ms);
        if !self.fill_window(sample_count) {
            return None;
        }

        self.packed.clear();
        for &sample in &self.window {
            self.packed.extend_from_slice(&quantize(sample).to_le_bytes());
        }
        Some(AudioFrame {
            bytes: &self.packed,
        })
    }

    /// Extracts a frame of the configured duration.
    pub fn extract_default_frame(&mut self) -> Option<AudioFrame<'_>> {
        self.extract_frame(self.format.frame_ms)
    }

    /// RMS level of the most recent `duration_ms`, decoded from packed PCM.
    pub fn rms_level(&mut self, duration_ms: u32) -> Option<f64> {
        self.extract_frame(duration_ms).map(|frame| frame.rms())
    }

    fn fill_window(&mut self, sample_count: usize) -> bool {
        let Some(pos) = self.capture.write_position() else {
            debug!("audio capture not started");
            return false;
        };
        let capacity = self.capture.capacity();
        let channels = self.capture.channels();
        let samples = self.capture.samples();

        if sample_count == 0 || sample_count > capacity {
            debug!(sample_count, capacity, "audio window request not servable");
            return false;
        }
        if pos >= capacity {
            warn!(pos, capacity, "audio write cursor out of range");
            return false;
        }
        if channels == 0 || samples.len() < capacity * channels {
            warn!(
                len = samples.len(),
                capacity, channels, "audio capture storage too short"
            );
            return false;
        }

        let start = (pos + capacity - sample_count) % capacity;
        debug_assert!(start < capacity, "window start {start} past capacity");
        let first = sample_count.min(capacity - start);

        self.window.clear();
        let frames = (start..start + first).chain(0..sample_count - first);
        self.window.extend(frames.map(|i| {
            let group = &samples[i * channels..(i + 1) * channels];
            downmix(group)
        }));
        true
    }
}

#[allow(clippy::cast_precision_loss)]
fn downmix(group: &[f32]) -> f32 {
    match group {
        [mono] => *mono,
        _ => group.iter().sum::<f32>() / group.len() as f32,
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::cast_precision_loss,
    clippy::float_cmp
)]
mod tests {
    use super::*;
    use crate::capture::SampleRing;
    use approx::assert_relative_eq;

    /// 1 kHz mono ring of 100 samples holding `i / 1000` at index `i`.
    fn ramp_ring(cursor: Option<usize>) -> SampleRing {
        let data = (0..100).map(|i| i as f32 / 1000.0).collect();
        SampleRing::from_parts(1000, 1, data, cursor).unwrap()
    }

    #[test]
    fn not_started_is_not_ready() {
        let mut mic = AudioDigitizer::new(ramp_ring(None), 20).unwrap();
        assert!(mic.window(20).is_none());
        assert!(mic.extract_default_frame().is_none());
        assert!(mic.rms_level(20).is_none());
    }

    #[test]
    fn empty_push_is_still_not_ready() {
        let mut ring = SampleRing::new(1000, 1, 1);
        ring.push(&[]);
        let mut mic = AudioDigitizer::new(ring, 20).unwrap();
        assert!(mic.extract_default_frame().is_none());

        mic.capture_mut().push(&[0.25; 20]);
        assert_eq!(mic.extract_default_frame().map(|f| f.sample_count()), Some(20));
    }

    #[test]
    fn window_wraps_at_seam() {
        let mut mic = AudioDigitizer::new(ramp_ring(Some(5)), 20).unwrap();
        let window = mic.window(20).unwrap().to_vec();

        let expected: Vec<f32> = (85..100).chain(0..5).map(|i| i as f32 / 1000.0).collect();
        assert_eq!(window, expected);
    }

    #[test]
    fn packed_frame_wraps_at_seam() {
        let mut mic = AudioDigitizer::new(ramp_ring(Some(5)), 20).unwrap();
        let frame = mic.extract_frame(20).unwrap();
        assert_eq!(frame.sample_count(), 20);

        let decoded: Vec<i16> = frame.samples().collect();
        let expected: Vec<i16> = (85..100)
            .chain(0..5)
            .map(|i| quantize(i as f32 / 1000.0))
            .collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn window_without_wrap() {
        let mut mic = AudioDigitizer::new(ramp_ring(Some(50)), 20).unwrap();
        let window = mic.window(10).unwrap();
        assert_eq!(window[0], 0.040);
        assert_eq!(window[9], 0.049);
    }

    #[test]
    fn window_ending_exactly_at_capacity() {
        let mut mic = AudioDigitizer::new(ramp_ring(Some(0)), 20).unwrap();
        let window = mic.window(3).unwrap();
        assert_eq!(window, &[0.097, 0.098, 0.099]);
    }

    #[test]
    fn full_capacity_window_is_oldest_first() {
        let mut mic = AudioDigitizer::new(ramp_ring(Some(30)), 20).unwrap();
        let window = mic.window(100).unwrap();
        assert_eq!(window[0], 0.030);
        assert_eq!(window[69], 0.099);
        assert_eq!(window[70], 0.0);
        assert_eq!(window[99], 0.029);
    }

    #[test]
    fn oversized_and_empty_requests_are_not_ready() {
        let mut mic = AudioDigitizer::new(ramp_ring(Some(5)), 20).unwrap();
        assert!(mic.window(101).is_none());
        assert!(mic.window(0).is_none());
        assert!(mic.extract_frame(0).is_none());
        assert!(mic.extract_frame(200).is_none());
    }

    #[test]
    fn out_of_range_cursor_is_not_ready() {
        let mut mic = AudioDigitizer::new(ramp_ring(Some(100)), 20).unwrap();
        assert!(mic.extract_default_frame().is_none());
    }

    #[test]
    fn pcm_packing_is_little_endian() {
        let data = vec![-1.0, 0.0, 1.0, 0.5];
        let ring = SampleRing::from_parts(1000, 1, data, Some(0)).unwrap();
        let mut mic = AudioDigitizer::new(ring, 4).unwrap();
        let frame = mic.extract_default_frame().unwrap();

        assert_eq!(
            frame.bytes(),
            &[0x01, 0x80, 0x00, 0x00, 0xFF, 0x7F, 0x00, 0x40]
        );
    }

    #[test]
    fn stereo_is_downmixed_and_clamped() {
        // Frames: (0.2, 0.4), (1.0, 1.0), (-0.9, -1.5)
        let data = vec![0.2, 0.4, 1.0, 1.0, -0.9, -1.5];
        let ring = SampleRing::from_parts(1000, 2, data, Some(0)).unwrap();
        let mut mic = AudioDigitizer::new(ring, 3).unwrap();

        let window = mic.window(3).unwrap();
        assert_relative_eq!(window[0], 0.3, epsilon = 1e-6);
        assert_relative_eq!(window[2], -1.2, epsilon = 1e-6);

        let decoded: Vec<i16> = mic.extract_frame(3).unwrap().samples().collect();
        assert_eq!(decoded, vec![quantize(0.3), 32767, -32767]);
    }

    #[test]
    fn default_format_frames_are_640_bytes() {
        let mut ring = SampleRing::new(16_000, 1, 2);
        ring.push(&vec![0.25; 1000]);
        let mut mic = AudioDigitizer::new(ring, 20).unwrap();

        assert_eq!(mic.format(), AudioFormat::default());
        assert_eq!(mic.extract_default_frame().unwrap().bytes().len(), 640);
    }

    #[test]
    fn zero_length_format_is_rejected() {
        let ring = SampleRing::new(10, 1, 1);
        assert!(AudioDigitizer::new(ring, 20).is_err());
    }

    #[test]
    fn rms_matches_decoded_amplitude() {
        let mut ring = SampleRing::new(1000, 1, 1);
        let square: Vec<f32> = (0..100)
            .map(|i| if i % 2 == 0 { 0.5 } else { -0.5 })
            .collect();
        ring.push(&square);
        let mut mic = AudioDigitizer::new(ring, 50).unwrap();

        let rms = mic.rms_level(50).unwrap();
        assert_relative_eq!(rms, f64::from(quantize(0.5)) / 32767.0, epsilon = 1e-12);
    }

    #[test]
    fn silence_has_zero_rms() {
        let mut ring = SampleRing::new(1000, 1, 1);
        ring.push(&[0.0; 10]);
        let mut mic = AudioDigitizer::new(ring, 10).unwrap();
        assert_eq!(mic.rms_level(10), Some(0.0));
    }

    #[test]
    fn feeding_through_capture_mut_advances_window() {
        let mut ring = SampleRing::new(1000, 1, 1);
        ring.push(&[0.0; 10]);
        let mut mic = AudioDigitizer::new(ring, 5).unwrap();
        mic.capture_mut().push(&[0.1; 5]);

        assert!(mic.window(5).unwrap().iter().all(|&s| s == 0.1));
        assert_eq!(mic.capture().write_position(), Some(15));
    }

    #[test]
    fn steady_state_reuses_packed_buffer() {
        let mut ring = SampleRing::new(1000, 1, 1);
        ring.push(&[0.3; 100]);
        let mut mic = AudioDigitizer::new(ring, 20).unwrap();

        let first = mic.extract_default_frame().unwrap().bytes().as_ptr();
        let second = mic.extract_default_frame().unwrap().bytes().as_ptr();
        assert_eq!(first, second);
    }
}

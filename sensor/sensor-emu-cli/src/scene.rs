//! Synthetic ground truth for the recorder.
//!
//! Stands in for the renderer, the microphone driver and the physics
//! engine: an animated gradient, a sine tone and a servo body sweeping its
//! heading back and forth.

use std::f64::consts::TAU;

use sensor_emu::capture::SampleRing;
use sensor_emu::config::EmulatorConfig;
use sensor_emu::imu::PhysicalBodyState;
use sensor_emu::Result;
use sensor_emu::servo::ServoBody;
use sensor_types::{PixelLayout, RawColorFrame, Timestamp};

/// Source resolution handed to the camera emulator.
pub const SOURCE_WIDTH: u32 = 640;
/// Source resolution handed to the camera emulator.
pub const SOURCE_HEIGHT: u32 = 480;

const TONE_HZ: f64 = 440.0;
const TONE_AMPLITUDE: f64 = 0.5;
const SWEEP_HZ: f64 = 0.1;
const SWEEP_AMPLITUDE: f64 = 1.2;

/// Animated scene sampled once per simulation step.
#[derive(Debug)]
pub struct Scene {
    frame: RawColorFrame,
    body: ServoBody,
    sample_rate: u32,
    channels: usize,
    samples_pushed: u64,
    chunk: Vec<f32>,
}

impl Scene {
    /// Creates the scene for a configuration.
    pub fn new(config: &EmulatorConfig) -> Result<Self> {
        let len = PixelLayout::Rgb8.buffer_size(SOURCE_WIDTH, SOURCE_HEIGHT);
        Ok(Self {
            frame: RawColorFrame {
                timestamp: Timestamp::zero(),
                width: SOURCE_WIDTH,
                height: SOURCE_HEIGHT,
                layout: PixelLayout::Rgb8,
                data: vec![0; len],
            },
            body: ServoBody::new(config.servo.clone())?,
            sample_rate: config.audio.sample_rate,
            channels: config.audio.channels,
            samples_pushed: 0,
            chunk: Vec::new(),
        })
    }

    /// Re-renders the gradient for time `now`, scrolling one pixel per frame of 10 ms.
    pub fn render(&mut self, now: Timestamp) -> &RawColorFrame {
        let shift = now.as_nanos() / 10_000_000;
        let width = self.frame.width as usize;
        for (i, px) in self.frame.data.chunks_exact_mut(3).enumerate() {
            let x = (i % width) as u64 + shift;
            let y = (i / width) as u64;
            #[allow(clippy::cast_possible_truncation)]
            px.copy_from_slice(&[x as u8, y as u8, ((x + y) / 2) as u8]);
        }
        self.frame.timestamp = now;
        &self.frame
    }

    /// Pushes every tone sample due by `now` into the ring.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn feed_audio(&mut self, ring: &mut SampleRing, now: Timestamp) {
        let due = u128::from(now.as_nanos()) * u128::from(self.sample_rate) / 1_000_000_000;
        let due = due as u64;
        self.chunk.clear();
        for n in self.samples_pushed..due {
            let t = n as f64 / f64::from(self.sample_rate);
            let sample = ((TAU * TONE_HZ * t).sin() * TONE_AMPLITUDE) as f32;
            self.chunk.extend(std::iter::repeat_n(sample, self.channels));
        }
        self.samples_pushed = self.samples_pushed.max(due);
        ring.push(&self.chunk);
    }

    /// Advances the servo body by `dt` seconds toward the sweeping heading.
    pub fn step_body(&mut self, now: Timestamp, dt: f64) -> PhysicalBodyState {
        let target = (TAU * SWEEP_HZ * now.as_secs_f64()).sin() * SWEEP_AMPLITUDE;
        self.body.step(target, dt)
    }
}

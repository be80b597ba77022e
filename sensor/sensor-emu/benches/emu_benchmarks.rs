//! Benchmarks for the steady-state emulation paths.
//!
//! Run with: cargo bench -p sensor-emu
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p sensor-emu -- --save-baseline main
//! 2. After changes: cargo bench -p sensor-emu -- --baseline main

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use sensor_emu::audio::AudioDigitizer;
use sensor_emu::capture::SampleRing;
use sensor_emu::imu::{ImuConfig, ImuSynthesizer, PhysicalBodyState};
use sensor_emu::pixel::FrameCodec;
use sensor_types::{PixelLayout, RawColorFrame};

// =============================================================================
// Source Generation
// =============================================================================

/// RGBA gradient like a renderer would hand over.
fn gradient_frame(width: u32, height: u32) -> RawColorFrame {
    let mut data = Vec::with_capacity(PixelLayout::Rgba8.buffer_size(width, height));
    for y in 0..height {
        for x in 0..width {
            #[allow(clippy::cast_possible_truncation)]
            data.extend_from_slice(&[x as u8, y as u8, (x ^ y) as u8, 255]);
        }
    }
    RawColorFrame::new(width, height, PixelLayout::Rgba8, data).unwrap()
}

/// Mono ring holding a 440 Hz tone, cursor mid-buffer.
fn tone_ring(sample_rate: u32) -> SampleRing {
    let mut ring = SampleRing::new(sample_rate, 1, 1);
    #[allow(clippy::cast_precision_loss)]
    let tone: Vec<f32> = (0..sample_rate + sample_rate / 2)
        .map(|i| (std::f32::consts::TAU * 440.0 * i as f32 / sample_rate as f32).sin() * 0.5)
        .collect();
    ring.push(&tone);
    ring
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("pixel_codec");

    for (src_w, src_h, dst_w, dst_h) in [(640, 480, 320, 240), (1280, 720, 320, 240), (320, 240, 320, 240)] {
        let source = gradient_frame(src_w, src_h);
        let mut codec = FrameCodec::new(dst_w, dst_h).unwrap();
        group.throughput(Throughput::Elements(u64::from(dst_w * dst_h)));
        group.bench_with_input(
            BenchmarkId::new("produce_wire_frame", format!("{src_w}x{src_h}->{dst_w}x{dst_h}")),
            &source,
            |b, source| b.iter(|| codec.produce_wire_frame(black_box(source)).map(<[u8]>::len)),
        );
    }

    let mut codec = FrameCodec::new(320, 240).unwrap();
    let source = gradient_frame(640, 480);
    group.bench_function("produce_and_display", |b| {
        b.iter(|| {
            codec.produce_wire_frame(black_box(&source));
            codec.display_frame().map(<[u8]>::len)
        });
    });

    group.finish();
}

fn bench_audio(c: &mut Criterion) {
    let mut group = c.benchmark_group("audio_digitizer");

    for frame_ms in [10u32, 20, 100] {
        let mut mic = AudioDigitizer::new(tone_ring(16_000), frame_ms).unwrap();
        group.bench_with_input(
            BenchmarkId::new("extract_frame", frame_ms),
            &frame_ms,
            |b, &ms| b.iter(|| mic.extract_frame(black_box(ms)).map(|f| f.sample_count())),
        );
    }

    let mut mic = AudioDigitizer::new(tone_ring(16_000), 20).unwrap();
    group.bench_function("rms_level", |b| b.iter(|| mic.rms_level(black_box(20))));

    group.finish();
}

fn bench_imu(c: &mut Criterion) {
    let mut imu = ImuSynthesizer::with_config(1, ImuConfig::default().with_update_rate(1000.0)).unwrap();
    let state = PhysicalBodyState::at_rest();
    c.bench_function("imu_tick", |b| b.iter(|| imu.tick(black_box(&state), 0.001)));
}

criterion_group!(benches, bench_codec, bench_audio, bench_imu);
criterion_main!(benches);

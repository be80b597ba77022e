//! The `run` command: step the scene and record every sensor stream.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use sensor_emu::capture::SampleRing;
use sensor_emu::config::EmulatorConfig;
use sensor_emu::device::DeviceInventory;
use sensor_emu::rate::UpdateGate;
use sensor_emu::rig::SensorRig;
use sensor_types::{Duration, Timestamp};
use tracing::{debug, info, warn};

use crate::scene::Scene;

/// Arguments for `sensor-emu run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Number of simulation steps
    #[arg(long, default_value_t = 1000)]
    pub ticks: u64,

    /// Simulation step in milliseconds
    #[arg(long, default_value_t = 5)]
    pub step_ms: u64,

    /// Output directory
    #[arg(long, default_value = "sensor-out")]
    pub out: PathBuf,

    /// JSON configuration file (defaults are used otherwise)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the noise seed from the configuration
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Reads and parses a configuration file.
pub fn load_config(path: &Path) -> Result<EmulatorConfig> {
    let json =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    EmulatorConfig::from_json(&json).with_context(|| format!("failed to load {}", path.display()))
}

fn create(dir: &Path, name: &str) -> Result<BufWriter<File>> {
    let path = dir.join(name);
    let file =
        File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Per-stream counters reported at the end of a run.
#[derive(Debug, Default)]
struct Totals {
    camera_frames: u64,
    audio_frames: u64,
    imu_readings: u64,
}

/// Runs the recorder.
pub fn run(args: &RunArgs) -> Result<()> {
    if args.step_ms == 0 {
        bail!("--step-ms must be positive");
    }

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => EmulatorConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    fs::create_dir_all(&args.out)
        .with_context(|| format!("failed to create {}", args.out.display()))?;

    let mut rig = SensorRig::build(&config, &DeviceInventory::emulated(), |device, audio| {
        debug!(device = %device.name, rate = audio.sample_rate, "opening capture ring");
        SampleRing::new(audio.sample_rate, audio.channels, audio.buffer_seconds)
    })
    .context("failed to build sensor rig")?;
    for fault in rig.faults() {
        warn!(%fault, "sensor disabled");
    }

    let mut scene = Scene::new(&config).context("failed to build scene")?;
    let mut camera_out = create(&args.out, "camera.rgb565")?;
    let mut audio_out = create(&args.out, "audio.pcm")?;
    let mut imu_out = create(&args.out, "imu.jsonl")?;
    let mut audio_gate = UpdateGate::new(Duration::from_millis(u64::from(config.audio.frame_ms)));

    let step = Duration::from_millis(args.step_ms);
    let dt = step.as_secs_f64();
    let mut totals = Totals::default();
    let mut last_imu = None;

    info!(
        ticks = args.ticks,
        step_ms = args.step_ms,
        out = %args.out.display(),
        "recording"
    );

    for tick in 0..args.ticks {
        let now = Timestamp::from_nanos(step.as_nanos().saturating_mul(tick));

        let encoded = rig.camera_mut().map_or(0, |camera| camera.frames_encoded());
        let source = scene.render(now);
        if rig.poll_camera(source, now).is_some() {
            let camera = rig.camera_mut().context("camera vanished mid-run")?;
            if camera.frames_encoded() > encoded {
                if let Some(frame) = camera.wire_frame() {
                    camera_out.write_all(frame)?;
                    totals.camera_frames += 1;
                }
            }
        }

        if let Some(mic) = rig.microphone_mut() {
            scene.feed_audio(mic.capture_mut(), now);
            if audio_gate.poll(now) {
                if let Some(frame) = mic.extract_default_frame() {
                    audio_out.write_all(frame.bytes())?;
                    totals.audio_frames += 1;
                }
            }
        }

        let state = scene.step_body(now, dt);
        if let Some(reading) = rig.tick_imu(&state, dt) {
            if last_imu != Some(reading.timestamp) {
                last_imu = Some(reading.timestamp);
                serde_json::to_writer(&mut imu_out, &reading)?;
                imu_out.write_all(b"\n")?;
                totals.imu_readings += 1;
            }
        }
    }

    camera_out.flush()?;
    audio_out.flush()?;
    imu_out.flush()?;

    let missed_camera = rig.camera_mut().map_or(0, |camera| camera.missed_frames());
    info!(
        camera_frames = totals.camera_frames,
        missed_camera,
        audio_frames = totals.audio_frames,
        imu_readings = totals.imu_readings,
        missed_imu = rig.imu().missed_intervals(),
        "recording complete"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sensor-emu-{name}-{}", std::process::id()))
    }

    #[test]
    fn records_all_three_streams() {
        let out = scratch("run");
        let args = RunArgs {
            ticks: 40,
            step_ms: 5,
            out: out.clone(),
            config: None,
            seed: Some(3),
        };
        run(&args).unwrap();

        // 200 ms: camera at 30 Hz fires at 0, 35, 70, 100, 135, 170 ms.
        let camera = fs::read(out.join("camera.rgb565")).unwrap();
        assert_eq!(camera.len(), 6 * 320 * 240 * 2);

        let audio = fs::read(out.join("audio.pcm")).unwrap();
        assert_eq!(audio.len() % 640, 0);
        assert!(!audio.is_empty());

        let imu = fs::read_to_string(out.join("imu.jsonl")).unwrap();
        assert_eq!(imu.lines().count(), 40);
        let first: serde_json::Value = serde_json::from_str(imu.lines().next().unwrap()).unwrap();
        assert!(first.get("acceleration").is_some());

        fs::remove_dir_all(out).unwrap();
    }

    #[test]
    fn zero_step_is_rejected() {
        let args = RunArgs {
            ticks: 1,
            step_ms: 0,
            out: scratch("zero"),
            config: None,
            seed: None,
        };
        assert!(run(&args).is_err());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let err = load_config(Path::new("/nonexistent/sensor-emu.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}

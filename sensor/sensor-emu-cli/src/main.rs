//! Sensor emulation recorder.
//!
//! Drives the camera, microphone and IMU emulators from a synthetic scene
//! and records their device-level output to disk.
//!
//! # Commands
//!
//! - `sensor-emu run` - Record `camera.rgb565`, `audio.pcm` and `imu.jsonl`
//! - `sensor-emu config` - Print the default configuration as JSON
//! - `sensor-emu check <FILE>` - Validate a configuration file
//!
//! Logs go to stderr. `RUST_LOG` overrides `--log`.

mod run;
mod scene;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sensor_emu::config::EmulatorConfig;
use tracing_subscriber::EnvFilter;

/// Emulated sensor recorder
#[derive(Parser)]
#[command(name = "sensor-emu")]
#[command(about = "Record emulated camera, microphone and IMU streams", long_about = None)]
#[command(version)]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the emulators against the synthetic scene and record their output
    Run(run::RunArgs),

    /// Print the default configuration as JSON
    Config,

    /// Validate a configuration file
    Check {
        /// Path to a JSON configuration
        #[arg(name = "FILE")]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => run::run(&args),
        Commands::Config => {
            println!("{}", EmulatorConfig::default().to_json()?);
            Ok(())
        }
        Commands::Check { file } => {
            let config = run::load_config(&file)?;
            println!(
                "{}: ok ({}x{} camera, {} Hz audio, {} Hz imu)",
                file.display(),
                config.camera.width,
                config.camera.height,
                config.audio.sample_rate,
                config.imu.update_rate_hz
            );
            Ok(())
        }
    }
}

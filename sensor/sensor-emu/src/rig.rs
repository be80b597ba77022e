//! Sensor rig: the three emulators wired from one configuration.
//!
//! The components share no state and are polled independently. A missing
//! capture device, or a microphone capture whose rate or channel count
//! differs from the configuration, disables only the component that needs
//! it; the fault is logged once and kept for inspection, and is never retried.

use sensor_types::{ImuReading, Timestamp};
use tracing::{error, info};

use crate::audio::{AudioDigitizer, AudioFrame};
use crate::camera::CameraEmulator;
use crate::capture::{CaptureBuffer, FrameSource};
use crate::config::{AudioConfig, EmulatorConfig};
use crate::device::{DeviceInfo, DeviceInventory, DeviceKind};
use crate::error::{EmuError, Result};
use crate::imu::{ImuSynthesizer, PhysicalBodyState};

/// Camera, microphone and IMU emulators built together.
///
/// # Example
///
/// ```
/// use sensor_emu::capture::SampleRing;
/// use sensor_emu::config::EmulatorConfig;
/// use sensor_emu::device::DeviceInventory;
/// use sensor_emu::rig::SensorRig;
///
/// let config = EmulatorConfig::default();
/// let rig = SensorRig::build(&config, &DeviceInventory::empty(), |_, audio| {
///     SampleRing::new(audio.sample_rate, audio.channels, audio.buffer_seconds)
/// })
/// .unwrap();
///
/// // No devices: camera and microphone are disabled, the IMU still runs.
/// assert!(!rig.camera_enabled());
/// assert!(!rig.microphone_enabled());
/// assert_eq!(rig.faults().len(), 2);
/// ```
#[derive(Debug)]
pub struct SensorRig<C> {
    camera: Option<CameraEmulator>,
    camera_device: Option<DeviceInfo>,
    microphone: Option<AudioDigitizer<C>>,
    microphone_device: Option<DeviceInfo>,
    imu: ImuSynthesizer,
    faults: Vec<EmuError>,
}

impl<C: CaptureBuffer> SensorRig<C> {
    /// Builds every component from `config`.
    ///
    /// `open_microphone` creates the capture buffer for the selected
    /// microphone.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid. Missing devices are not
    /// errors here; see [`faults`](Self::faults).
    pub fn build<F>(
        config: &EmulatorConfig,
        inventory: &DeviceInventory,
        open_microphone: F,
    ) -> Result<Self>
    where
        F: FnOnce(&DeviceInfo, &AudioConfig) -> C,
    {
        config.validate()?;
        let mut faults = Vec::new();

        let (camera, camera_device) =
            match inventory.select(DeviceKind::Camera, &config.camera.device) {
                Ok(device) => {
                    info!(device = %device.name, "camera enabled");
                    (
                        Some(CameraEmulator::new(&config.camera)?),
                        Some(device.clone()),
                    )
                }
                Err(err) => {
                    error!(%err, "camera disabled");
                    faults.push(err);
                    (None, None)
                }
            };

        let (microphone, microphone_device) =
            match inventory.select(DeviceKind::Microphone, &config.audio.device) {
                Ok(device) => {
                    let capture = open_microphone(device, &config.audio);
                    match check_capture(&capture, &config.audio) {
                        Ok(()) => {
                            info!(device = %device.name, "microphone enabled");
                            (
                                Some(AudioDigitizer::new(capture, config.audio.frame_ms)?),
                                Some(device.clone()),
                            )
                        }
                        Err(err) => {
                            error!(%err, device = %device.name, "microphone disabled");
                            faults.push(err);
                            (None, None)
                        }
                    }
                }
                Err(err) => {
                    error!(%err, "microphone disabled");
                    faults.push(err);
                    (None, None)
                }
            };

        let imu = ImuSynthesizer::with_config(config.seed, config.imu.clone())?;

        Ok(Self {
            camera,
            camera_device,
            microphone,
            microphone_device,
            imu,
            faults,
        })
    }

    /// Configuration faults raised while building.
    #[must_use]
    pub fn faults(&self) -> &[EmuError] {
        &self.faults
    }

    /// Returns `true` if a camera device was found.
    #[must_use]
    pub const fn camera_enabled(&self) -> bool {
        self.camera.is_some()
    }

    /// Returns `true` if a microphone device was found.
    #[must_use]
    pub const fn microphone_enabled(&self) -> bool {
        self.microphone.is_some()
    }

    /// The selected camera device.
    #[must_use]
    pub const fn camera_device(&self) -> Option<&DeviceInfo> {
        self.camera_device.as_ref()
    }

    /// The selected microphone device.
    #[must_use]
    pub const fn microphone_device(&self) -> Option<&DeviceInfo> {
        self.microphone_device.as_ref()
    }

    /// The camera emulator, if enabled.
    pub fn camera_mut(&mut self) -> Option<&mut CameraEmulator> {
        self.camera.as_mut()
    }

    /// The audio digitizer, if enabled.
    pub fn microphone_mut(&mut self) -> Option<&mut AudioDigitizer<C>> {
        self.microphone.as_mut()
    }

    /// The IMU synthesizer.
    #[must_use]
    pub const fn imu(&self) -> &ImuSynthesizer {
        &self.imu
    }

    /// The IMU synthesizer, mutably.
    pub fn imu_mut(&mut self) -> &mut ImuSynthesizer {
        &mut self.imu
    }

    /// Polls the camera. `None` if disabled or not ready.
    pub fn poll_camera(&mut self, source: &dyn FrameSource, now: Timestamp) -> Option<&[u8]> {
        self.camera.as_mut()?.poll(source, now)
    }

    /// Extracts the default-length audio frame. `None` if disabled or not ready.
    pub fn poll_microphone(&mut self) -> Option<AudioFrame<'_>> {
        self.microphone.as_mut()?.extract_default_frame()
    }

    /// Advances the IMU by `dt` seconds.
    pub fn tick_imu(&mut self, state: &PhysicalBodyState, dt: f64) -> Option<ImuReading> {
        self.imu.tick(state, dt)
    }
}

/// Checks that an opened capture runs at the configured rate and channel count.
fn check_capture<C: CaptureBuffer>(capture: &C, audio: &AudioConfig) -> Result<()> {
    if capture.sample_rate() != audio.sample_rate || capture.channels() != audio.channels {
        return Err(EmuError::invalid_config(format!(
            "capture delivers {} Hz x {} channels, configured {} Hz x {} channels",
            capture.sample_rate(),
            capture.channels(),
            audio.sample_rate,
            audio.channels
        )));
    }
    Ok(())
}

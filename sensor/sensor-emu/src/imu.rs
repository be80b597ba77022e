//! Inertial measurement synthesizer.
//!
//! Turns a rigid body's kinematic state into the six-axis reading a MEMS
//! IMU would report. Each computed reading passes through a fixed pipeline:
//!
//! 1. Specific force `a - g` from the body's acceleration (given directly,
//!    or differentiated from velocity), rotated into the body frame
//! 2. Angular velocity rotated into the body frame
//! 3. Coordinate convention transform
//! 4. Constant bias
//! 5. Temperature drift, proportional to `T - 25 °C`
//! 6. Zero-mean Gaussian noise, freshly drawn per axis
//! 7. Saturation at the configured full-scale range
//! 8. Simulation timestamp
//!
//! Readings are produced at the configured update rate. Between update
//! intervals [`ImuSynthesizer::tick`] returns the previous reading unchanged.

use nalgebra::{UnitQuaternion, Vector3};
use sensor_types::{CoordinateConvention, Duration, ImuReading, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{EmuError, Result};
use crate::noise::GaussianNoise;
use crate::rate::UpdateGate;

/// Standard gravity used for g-unit conversions (m/s²).
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Seed offset separating the gyroscope noise stream from the accelerometer's.
const GYRO_SEED_OFFSET: u64 = 0x9E37_79B9_7F4A_7C15;

/// Per-sensor calibration, fixed between explicit setter calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorCalibration {
    /// Standard deviation of the additive white noise, in output units.
    pub noise_std: f64,
    /// Constant bias added to each axis, in output units and output frame.
    pub bias: Vector3<f64>,
    /// Full-scale range: g for accelerometers, deg/s for gyroscopes.
    pub range: f64,
    /// Output axis convention.
    pub convention: CoordinateConvention,
}

impl SensorCalibration {
    /// Accelerometer defaults: ±16 g, 0.02 m/s² noise.
    #[must_use]
    pub fn accelerometer() -> Self {
        Self {
            noise_std: 0.02,
            bias: Vector3::zeros(),
            range: 16.0,
            convention: CoordinateConvention::Native,
        }
    }

    /// Gyroscope defaults: ±2000 deg/s, 0.001 rad/s noise.
    #[must_use]
    pub fn gyroscope() -> Self {
        Self {
            noise_std: 0.001,
            bias: Vector3::zeros(),
            range: 2000.0,
            convention: CoordinateConvention::Native,
        }
    }

    /// Set the noise standard deviation.
    #[must_use]
    pub const fn with_noise(mut self, std_dev: f64) -> Self {
        self.noise_std = std_dev;
        self
    }

    /// Set the constant bias.
    #[must_use]
    pub const fn with_bias(mut self, bias: Vector3<f64>) -> Self {
        self.bias = bias;
        self
    }

    /// Set the full-scale range.
    #[must_use]
    pub const fn with_range(mut self, range: f64) -> Self {
        self.range = range;
        self
    }

    /// Set the output convention.
    #[must_use]
    pub const fn with_convention(mut self, convention: CoordinateConvention) -> Self {
        self.convention = convention;
        self
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !(self.noise_std.is_finite() && self.noise_std >= 0.0) {
            return Err(EmuError::invalid_config(format!(
                "{name} noise must be finite and non-negative"
            )));
        }
        if !(self.range.is_finite() && self.range > 0.0) {
            return Err(EmuError::invalid_config(format!(
                "{name} range must be positive"
            )));
        }
        if !self.bias.iter().all(|b| b.is_finite()) {
            return Err(EmuError::invalid_config(format!(
                "{name} bias must be finite"
            )));
        }
        Ok(())
    }
}

/// Which half of the IMU a calibration applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImuChannel {
    /// Linear accelerometer.
    Accelerometer,
    /// Gyroscope.
    Gyroscope,
}

/// IMU configuration.
///
/// # Example
///
/// ```
/// use sensor_emu::imu::ImuConfig;
/// use sensor_types::CoordinateConvention;
///
/// let config = ImuConfig::default()
///     .with_update_rate(100.0)
///     .with_convention(CoordinateConvention::Ned)
///     .with_temperature_drift(0.002);
///
/// assert!(config.validate().is_ok());
/// assert!((config.gyro_temp_coeff - 0.0002).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImuConfig {
    /// Accelerometer calibration (range in g).
    pub accel: SensorCalibration,
    /// Gyroscope calibration (range in deg/s).
    pub gyro: SensorCalibration,
    /// Output rate in hertz.
    pub update_rate_hz: f64,
    /// Accelerometer drift per °C away from 25 °C (m/s² per °C).
    pub accel_temp_coeff: f64,
    /// Gyroscope drift per °C away from 25 °C (rad/s per °C).
    pub gyro_temp_coeff: f64,
}

impl Default for ImuConfig {
    fn default() -> Self {
        Self {
            accel: SensorCalibration::accelerometer(),
            gyro: SensorCalibration::gyroscope(),
            update_rate_hz: 200.0,
            accel_temp_coeff: 0.001,
            gyro_temp_coeff: 0.0001,
        }
    }
}

impl ImuConfig {
    /// A noise-free, bias-free, drift-free configuration.
    #[must_use]
    pub fn ideal() -> Self {
        Self {
            accel: SensorCalibration::accelerometer().with_noise(0.0),
            gyro: SensorCalibration::gyroscope().with_noise(0.0),
            accel_temp_coeff: 0.0,
            gyro_temp_coeff: 0.0,
            ..Self::default()
        }
    }

    /// Set the update rate.
    #[must_use]
    pub const fn with_update_rate(mut self, hz: f64) -> Self {
        self.update_rate_hz = hz;
        self
    }

    /// Set the output convention of both sensors.
    #[must_use]
    pub const fn with_convention(mut self, convention: CoordinateConvention) -> Self {
        self.accel.convention = convention;
        self.gyro.convention = convention;
        self
    }

    /// Set the accelerometer noise standard deviation (m/s²).
    #[must_use]
    pub const fn with_accel_noise(mut self, std_dev: f64) -> Self {
        self.accel.noise_std = std_dev;
        self
    }

    /// Set the gyroscope noise standard deviation (rad/s).
    #[must_use]
    pub const fn with_gyro_noise(mut self, std_dev: f64) -> Self {
        self.gyro.noise_std = std_dev;
        self
    }

    /// Set the accelerometer bias (m/s², output frame).
    #[must_use]
    pub const fn with_accel_bias(mut self, bias: Vector3<f64>) -> Self {
        self.accel.bias = bias;
        self
    }

    /// Set the gyroscope bias (rad/s, output frame).
    #[must_use]
    pub const fn with_gyro_bias(mut self, bias: Vector3<f64>) -> Self {
        self.gyro.bias = bias;
        self
    }

    /// Set the accelerometer range in g.
    #[must_use]
    pub const fn with_accel_range_g(mut self, g: f64) -> Self {
        self.accel.range = g;
        self
    }

    /// Set the gyroscope range in deg/s.
    #[must_use]
    pub const fn with_gyro_range_dps(mut self, dps: f64) -> Self {
        self.gyro.range = dps;
        self
    }

    /// Set the accelerometer drift coefficient; the gyroscope gets a tenth of it.
    #[must_use]
    pub fn with_temperature_drift(mut self, accel_coeff: f64) -> Self {
        self.accel_temp_coeff = accel_coeff;
        self.gyro_temp_coeff = accel_coeff / 10.0;
        self
    }

    /// Accelerometer saturation limit in m/s².
    #[must_use]
    pub fn accel_limit(&self) -> f64 {
        self.accel.range * STANDARD_GRAVITY
    }

    /// Gyroscope saturation limit in rad/s.
    #[must_use]
    pub fn gyro_limit(&self) -> f64 {
        self.gyro.range.to_radians()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive ranges or rates, negative or
    /// non-finite noise, non-finite bias or drift, or accelerometer and
    /// gyroscope conventions that differ.
    pub fn validate(&self) -> Result<()> {
        self.accel.validate("accelerometer")?;
        self.gyro.validate("gyroscope")?;
        if Duration::from_rate_hz(self.update_rate_hz).is_none() {
            return Err(EmuError::invalid_config("IMU update rate must be positive"));
        }
        if !(self.accel_temp_coeff.is_finite() && self.gyro_temp_coeff.is_finite()) {
            return Err(EmuError::invalid_config(
                "temperature coefficients must be finite",
            ));
        }
        if self.accel.convention != self.gyro.convention {
            return Err(EmuError::invalid_config(format!(
                "accelerometer convention {} differs from gyroscope convention {}",
                self.accel.convention, self.gyro.convention
            )));
        }
        Ok(())
    }
}

/// Snapshot of a rigid body's kinematics, expressed in the native world frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalBodyState {
    /// Linear velocity (m/s).
    pub linear_velocity: Vector3<f64>,
    /// Angular velocity (rad/s).
    pub angular_velocity: Vector3<f64>,
    /// Rotation from body frame to world frame.
    pub orientation: UnitQuaternion<f64>,
    /// Gravitational acceleration (m/s²).
    pub gravity: Vector3<f64>,
    /// Linear acceleration, when the physics source provides it directly.
    pub linear_acceleration: Option<Vector3<f64>>,
}

impl PhysicalBodyState {
    /// A body at rest, upright, under standard gravity along native -Y.
    #[must_use]
    pub fn at_rest() -> Self {
        Self {
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
            gravity: Vector3::new(0.0, -STANDARD_GRAVITY, 0.0),
            linear_acceleration: None,
        }
    }

    /// Set the linear velocity.
    #[must_use]
    pub const fn with_velocity(mut self, velocity: Vector3<f64>) -> Self {
        self.linear_velocity = velocity;
        self
    }

    /// Set the angular velocity.
    #[must_use]
    pub const fn with_angular_velocity(mut self, angular_velocity: Vector3<f64>) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Set the orientation.
    #[must_use]
    pub const fn with_orientation(mut self, orientation: UnitQuaternion<f64>) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set the acceleration from the net force on a body of `mass` kg.
    ///
    /// A non-positive mass leaves the acceleration unset.
    #[must_use]
    pub fn with_force(mut self, force: Vector3<f64>, mass: f64) -> Self {
        self.linear_acceleration = (mass > 0.0).then(|| force / mass);
        self
    }
}

impl Default for PhysicalBodyState {
    fn default() -> Self {
        Self::at_rest()
    }
}

/// Lifecycle of an [`ImuSynthesizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImuState {
    /// Constructed but never configured.
    Uninitialized,
    /// Configured and producing readings.
    Running,
}

#[derive(Debug, Clone)]
struct Pipeline {
    config: ImuConfig,
    gate: UpdateGate,
}

/// Six-axis IMU emulator.
///
/// # Example
///
/// ```
/// use sensor_emu::imu::{ImuConfig, ImuSynthesizer, PhysicalBodyState};
///
/// let mut imu = ImuSynthesizer::new(42);
/// assert!(imu.tick(&PhysicalBodyState::at_rest(), 0.01).is_none());
///
/// imu.configure(ImuConfig::ideal()).unwrap();
/// let reading = imu.tick(&PhysicalBodyState::at_rest(), 0.01).unwrap();
///
/// // At rest the accelerometer feels the reaction to gravity: +Y.
/// assert!((reading.acceleration[1] - 9.81).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct ImuSynthesizer {
    pipeline: Option<Pipeline>,
    accel_noise: GaussianNoise,
    gyro_noise: GaussianNoise,
    temperature: f64,
    sim_time: Timestamp,
    last: Option<ImuReading>,
    previous_velocity: Option<(Timestamp, Vector3<f64>)>,
}

impl ImuSynthesizer {
    /// Creates an uninitialized synthesizer with seeded noise.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            pipeline: None,
            accel_noise: GaussianNoise::from_seed(seed),
            gyro_noise: GaussianNoise::from_seed(seed ^ GYRO_SEED_OFFSET),
            temperature: ImuReading::REFERENCE_TEMPERATURE,
            sim_time: Timestamp::zero(),
            last: None,
            previous_velocity: None,
        }
    }

    /// Creates a running synthesizer.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_config(seed: u64, config: ImuConfig) -> Result<Self> {
        let mut imu = Self::new(seed);
        imu.configure(config)?;
        Ok(imu)
    }

    /// Applies a configuration, moving the synthesizer to [`ImuState::Running`].
    ///
    /// Reconfiguring a running synthesizer restarts its update schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid; the previous
    /// state is kept in that case.
    pub fn configure(&mut self, config: ImuConfig) -> Result<()> {
        config.validate()?;
        let gate = UpdateGate::from_rate_hz(config.update_rate_hz)
            .ok_or_else(|| EmuError::invalid_config("IMU update rate must be positive"))?;
        info!(
            rate_hz = config.update_rate_hz,
            convention = %config.accel.convention,
            "IMU synthesizer running"
        );
        self.pipeline = Some(Pipeline { config, gate });
        Ok(())
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ImuState {
        if self.pipeline.is_some() {
            ImuState::Running
        } else {
            ImuState::Uninitialized
        }
    }

    /// Returns the active configuration, if running.
    #[must_use]
    pub fn config(&self) -> Option<&ImuConfig> {
        self.pipeline.as_ref().map(|p| &p.config)
    }

    /// Replaces one sensor's calibration between polls.
    ///
    /// # Errors
    ///
    /// Returns an error if the synthesizer is not configured yet or the
    /// resulting configuration is invalid.
    pub fn set_calibration(
        &mut self,
        channel: ImuChannel,
        calibration: SensorCalibration,
    ) -> Result<()> {
        let pipeline = self
            .pipeline
            .as_mut()
            .ok_or_else(|| EmuError::invalid_config("IMU is not configured"))?;
        let mut config = pipeline.config.clone();
        match channel {
            ImuChannel::Accelerometer => config.accel = calibration,
            ImuChannel::Gyroscope => config.gyro = calibration,
        }
        config.validate()?;
        pipeline.config = config;
        Ok(())
    }

    /// Sets the die temperature in °C.
    pub fn set_temperature(&mut self, celsius: f64) {
        self.temperature = celsius;
    }

    /// Returns the die temperature in °C.
    #[must_use]
    pub const fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Returns the simulation time accumulated from `tick` calls.
    #[must_use]
    pub const fn sim_time(&self) -> Timestamp {
        self.sim_time
    }

    /// Returns the most recently computed reading.
    #[must_use]
    pub const fn last_reading(&self) -> Option<&ImuReading> {
        self.last.as_ref()
    }

    /// Returns how many update intervals were coalesced away.
    #[must_use]
    pub fn missed_intervals(&self) -> u64 {
        self.pipeline.as_ref().map_or(0, |p| p.gate.missed())
    }

    /// Advances simulation time by `dt` seconds and returns the current reading.
    ///
    /// Returns `None` only while uninitialized. Between update intervals the
    /// previous reading is returned unchanged.
    pub fn tick(&mut self, state: &PhysicalBodyState, dt: f64) -> Option<ImuReading> {
        let Some(pipeline) = self.pipeline.as_mut() else {
            debug!("IMU tick before configuration");
            return None;
        };
        self.sim_time = self.sim_time.saturating_add(Duration::from_secs_f64(dt));
        let now = self.sim_time;

        if !pipeline.gate.poll(now) {
            if let Some(last) = self.last {
                return Some(last);
            }
        }

        let config = pipeline.config.clone();
        let reading = self.compute(&config, state, now);
        self.last = Some(reading);
        Some(reading)
    }

    fn compute(
        &mut self,
        config: &ImuConfig,
        state: &PhysicalBodyState,
        now: Timestamp,
    ) -> ImuReading {
        let world_accel = state
            .linear_acceleration
            .unwrap_or_else(|| self.differentiate_velocity(state.linear_velocity, now));
        self.previous_velocity = Some((now, state.linear_velocity));

        let to_body = state.orientation.inverse();
        let specific_force = to_body * (world_accel - state.gravity);
        let angular_velocity = to_body * state.angular_velocity;
        let gravity = to_body * state.gravity;

        let convention = config.accel.convention;
        let drift = self.temperature - ImuReading::REFERENCE_TEMPERATURE;

        let accel_limit = config.accel_limit();
        let acceleration = (to_convention(convention, &specific_force)
            + config.accel.bias
            + Vector3::repeat(config.accel_temp_coeff * drift)
            + self.accel_noise.vector(config.accel.noise_std))
        .map(|v| v.clamp(-accel_limit, accel_limit));

        let gyro_limit = config.gyro_limit();
        let angular_velocity = (to_convention(convention, &angular_velocity)
            + config.gyro.bias
            + Vector3::repeat(config.gyro_temp_coeff * drift)
            + self.gyro_noise.vector(config.gyro.noise_std))
        .map(|v| v.clamp(-gyro_limit, gyro_limit));

        ImuReading {
            timestamp: now,
            acceleration: acceleration.into(),
            angular_velocity: angular_velocity.into(),
            gravity: to_convention(convention, &gravity).into(),
            temperature: self.temperature,
            convention,
        }
    }

    fn differentiate_velocity(&self, velocity: Vector3<f64>, now: Timestamp) -> Vector3<f64> {
        self.previous_velocity
            .and_then(|(then, previous)| {
                let elapsed = now.checked_duration_since(then)?.as_secs_f64();
                (elapsed > 0.0).then(|| (velocity - previous) / elapsed)
            })
            .unwrap_or_else(Vector3::zeros)
    }
}

fn to_convention(convention: CoordinateConvention, v: &Vector3<f64>) -> Vector3<f64> {
    Vector3::from(convention.apply([v.x, v.y, v.z]))
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
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn ideal(convention: CoordinateConvention) -> ImuSynthesizer {
        let config = ImuConfig::ideal()
            .with_update_rate(1000.0)
            .with_convention(convention);
        ImuSynthesizer::with_config(7, config).unwrap()
    }

    fn std_dev(values: &[f64]) -> f64 {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
    }

    #[test]
    fn uninitialized_until_configured() {
        let mut imu = ImuSynthesizer::new(1);
        assert_eq!(imu.state(), ImuState::Uninitialized);
        assert!(imu.tick(&PhysicalBodyState::at_rest(), 0.01).is_none());
        assert!(imu.last_reading().is_none());
        let gyro = SensorCalibration::gyroscope();
        assert!(imu.set_calibration(ImuChannel::Gyroscope, gyro).is_err());

        imu.configure(ImuConfig::default()).unwrap();
        assert_eq!(imu.state(), ImuState::Running);
        assert!(imu.tick(&PhysicalBodyState::at_rest(), 0.01).is_some());
    }

    #[test]
    fn invalid_configuration_keeps_state() {
        let mut imu = ImuSynthesizer::new(1);
        let bad = ImuConfig::default().with_update_rate(0.0);
        assert!(imu.configure(bad).is_err());
        assert_eq!(imu.state(), ImuState::Uninitialized);
    }

    #[test]
    fn config_validation() {
        assert!(ImuConfig::default().validate().is_ok());
        assert!(ImuConfig::default().with_accel_range_g(0.0).validate().is_err());
        assert!(ImuConfig::default().with_gyro_noise(-1.0).validate().is_err());
        assert!(ImuConfig::default().with_update_rate(f64::NAN).validate().is_err());
        assert!(
            ImuConfig::default()
                .with_accel_bias(Vector3::new(f64::INFINITY, 0.0, 0.0))
                .validate()
                .is_err()
        );

        let mut mixed = ImuConfig::default();
        mixed.gyro.convention = CoordinateConvention::Ned;
        assert!(mixed.validate().is_err());
    }

    #[test]
    fn stationary_gravity_sign_per_convention() {
        let state = PhysicalBodyState::at_rest();

        let native = ideal(CoordinateConvention::Native).tick(&state, 0.01).unwrap();
        assert_relative_eq!(native.acceleration[1], 9.81, epsilon = 1e-12);
        assert_relative_eq!(native.gravity[1], -9.81, epsilon = 1e-12);

        let enu = ideal(CoordinateConvention::Enu).tick(&state, 0.01).unwrap();
        assert_relative_eq!(enu.acceleration[2], 9.81, epsilon = 1e-12);
        assert_relative_eq!(enu.gravity[2], -9.81, epsilon = 1e-12);
        assert_eq!(enu.convention, CoordinateConvention::Enu);

        let ned = ideal(CoordinateConvention::Ned).tick(&state, 0.01).unwrap();
        assert_relative_eq!(ned.acceleration[2], -9.81, epsilon = 1e-12);
        assert_relative_eq!(ned.gravity[2], 9.81, epsilon = 1e-12);
    }

    #[test]
    fn saturation_clamps_each_axis() {
        let config = ImuConfig::ideal()
            .with_update_rate(1000.0)
            .with_accel_range_g(2.0)
            .with_gyro_range_dps(250.0);
        let mut imu = ImuSynthesizer::with_config(3, config).unwrap();

        let state = PhysicalBodyState::at_rest()
            .with_force(Vector3::new(500.0, -300.0, 10.0), 1.0)
            .with_angular_velocity(Vector3::new(100.0, -100.0, 0.5));
        let reading = imu.tick(&state, 0.01).unwrap();

        let limit = 2.0 * 9.81;
        assert!(reading.acceleration.iter().all(|a| a.abs() <= limit));
        assert_eq!(reading.acceleration[0], limit);
        assert_eq!(reading.acceleration[1], -limit);
        assert_relative_eq!(reading.acceleration[2], 10.0, epsilon = 1e-12);

        let gyro_limit = 250.0_f64.to_radians();
        assert_eq!(reading.angular_velocity[0], gyro_limit);
        assert_eq!(reading.angular_velocity[1], -gyro_limit);
        assert_relative_eq!(reading.angular_velocity[2], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn saturation_holds_with_noise_and_bias() {
        let config = ImuConfig::default()
            .with_update_rate(1000.0)
            .with_accel_range_g(1.0)
            .with_accel_noise(5.0)
            .with_accel_bias(Vector3::new(3.0, 3.0, 3.0));
        let mut imu = ImuSynthesizer::with_config(11, config).unwrap();
        let state = PhysicalBodyState::at_rest().with_force(Vector3::new(0.0, 40.0, 0.0), 1.0);

        for _ in 0..1000 {
            let reading = imu.tick(&state, 0.001).unwrap();
            assert!(reading.acceleration.iter().all(|a| a.abs() <= 9.81));
        }
    }

    #[test]
    fn noise_statistics_converge() {
        let config = ImuConfig::ideal()
            .with_update_rate(1000.0)
            .with_accel_noise(0.05)
            .with_gyro_noise(0.002);
        let mut imu = ImuSynthesizer::with_config(2024, config).unwrap();
        let state = PhysicalBodyState::at_rest();

        let readings: Vec<ImuReading> = (0..10_000)
            .map(|_| imu.tick(&state, 0.001).unwrap())
            .collect();

        for axis in 0..3 {
            let accel: Vec<f64> = readings.iter().map(|r| r.acceleration[axis]).collect();
            let gyro: Vec<f64> = readings.iter().map(|r| r.angular_velocity[axis]).collect();
            let accel_std = std_dev(&accel);
            let gyro_std = std_dev(&gyro);
            assert!((accel_std - 0.05).abs() < 0.05 * 0.05, "accel axis {axis}: {accel_std}");
            assert!((gyro_std - 0.002).abs() < 0.002 * 0.05, "gyro axis {axis}: {gyro_std}");
        }
    }

    #[test]
    fn noise_is_redrawn_every_reading() {
        let config = ImuConfig::ideal()
            .with_update_rate(1000.0)
            .with_accel_noise(0.1);
        let mut imu = ImuSynthesizer::with_config(5, config).unwrap();
        let state = PhysicalBodyState::at_rest();
        let a = imu.tick(&state, 0.001).unwrap();
        let b = imu.tick(&state, 0.001).unwrap();
        assert_ne!(a.acceleration, b.acceleration);
    }

    #[test]
    fn same_seed_is_reproducible() {
        let config = ImuConfig::default().with_update_rate(1000.0);
        let mut a = ImuSynthesizer::with_config(99, config.clone()).unwrap();
        let mut b = ImuSynthesizer::with_config(99, config).unwrap();
        let state = PhysicalBodyState::at_rest();
        for _ in 0..50 {
            assert_eq!(a.tick(&state, 0.001), b.tick(&state, 0.001));
        }
    }

    #[test]
    fn bias_is_added_in_output_frame() {
        let config = ImuConfig::ideal()
            .with_update_rate(1000.0)
            .with_convention(CoordinateConvention::Enu)
            .with_accel_bias(Vector3::new(0.1, 0.2, 0.3))
            .with_gyro_bias(Vector3::new(-0.01, 0.0, 0.02));
        let mut imu = ImuSynthesizer::with_config(1, config).unwrap();
        let reading = imu.tick(&PhysicalBodyState::at_rest(), 0.001).unwrap();

        assert_relative_eq!(reading.acceleration[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(reading.acceleration[1], 0.2, epsilon = 1e-12);
        assert_relative_eq!(reading.acceleration[2], 9.81 + 0.3, epsilon = 1e-12);
        assert_eq!(reading.angular_velocity, [-0.01, 0.0, 0.02]);
    }

    #[test]
    fn temperature_drift_scales_with_offset() {
        let config = ImuConfig::ideal()
            .with_update_rate(1000.0)
            .with_temperature_drift(0.01);
        let mut imu = ImuSynthesizer::with_config(1, config).unwrap();
        imu.set_temperature(35.0);
        let reading = imu.tick(&PhysicalBodyState::at_rest(), 0.001).unwrap();

        assert_relative_eq!(reading.acceleration[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(reading.acceleration[1], 9.81 + 0.1, epsilon = 1e-12);
        assert_relative_eq!(reading.angular_velocity[2], 0.01, epsilon = 1e-12);
        assert_eq!(reading.temperature, 35.0);

        imu.set_temperature(25.0);
        let reading = imu.tick(&PhysicalBodyState::at_rest(), 0.001).unwrap();
        assert_relative_eq!(reading.acceleration[0], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn rate_limits_and_holds_previous_reading() {
        let config = ImuConfig::ideal().with_update_rate(10.0);
        let mut imu = ImuSynthesizer::with_config(1, config).unwrap();

        let mut readings = Vec::new();
        for i in 0..25 {
            let state = PhysicalBodyState::at_rest()
                .with_velocity(Vector3::new(f64::from(i) * 0.01, 0.0, 0.0));
            readings.push(imu.tick(&state, 0.01).unwrap());
        }

        // 10 ms steps at 10 Hz: new readings at ticks 0, 10 and 20.
        for i in 1..10 {
            assert_eq!(readings[i], readings[0]);
        }
        assert_ne!(readings[10].timestamp, readings[0].timestamp);
        assert_eq!(readings[19], readings[10]);
        assert_ne!(readings[20].timestamp, readings[10].timestamp);
        assert_eq!(imu.missed_intervals(), 0);
    }

    #[test]
    fn coarse_ticks_are_coalesced() {
        let config = ImuConfig::ideal().with_update_rate(100.0);
        let mut imu = ImuSynthesizer::with_config(1, config).unwrap();
        let state = PhysicalBodyState::at_rest();

        imu.tick(&state, 0.01).unwrap();
        let reading = imu.tick(&state, 0.05).unwrap();
        assert_eq!(reading.timestamp, Timestamp::from_nanos(60_000_000));
        assert_eq!(imu.missed_intervals(), 4);
        assert_eq!(imu.sim_time(), reading.timestamp);
    }

    #[test]
    fn velocity_is_differentiated_between_readings() {
        let mut imu = ideal(CoordinateConvention::Native);
        let mut velocity = 0.0;
        let mut last = None;
        for _ in 0..5 {
            velocity += 2.0 * 0.001;
            let state =
                PhysicalBodyState::at_rest().with_velocity(Vector3::new(velocity, 0.0, 0.0));
            last = imu.tick(&state, 0.001);
        }
        assert_relative_eq!(last.unwrap().acceleration[0], 2.0, epsilon = 1e-6);
    }

    #[test]
    fn first_reading_has_no_motion_term() {
        let mut imu = ideal(CoordinateConvention::Native);
        let state = PhysicalBodyState::at_rest().with_velocity(Vector3::new(5.0, 0.0, 0.0));
        let reading = imu.tick(&state, 0.001).unwrap();
        assert_eq!(reading.acceleration[0], 0.0);
    }

    #[test]
    fn direct_acceleration_is_rotated_into_body_frame() {
        let mut imu = ideal(CoordinateConvention::Native);
        // Yawed +90 degrees about up: body +Z faces world +X.
        let yaw = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2);
        let state = PhysicalBodyState::at_rest()
            .with_orientation(yaw)
            .with_force(Vector3::new(10.0, 0.0, 0.0), 2.0)
            .with_angular_velocity(Vector3::new(0.0, 0.5, 0.0));
        let reading = imu.tick(&state, 0.001).unwrap();

        assert_relative_eq!(reading.acceleration[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(reading.acceleration[1], 9.81, epsilon = 1e-9);
        assert_relative_eq!(reading.acceleration[2], 5.0, epsilon = 1e-9);
        assert_relative_eq!(reading.angular_velocity[1], 0.5, epsilon = 1e-9);
    }

    #[test]
    fn gyro_convention_matches_accel() {
        let mut imu = ideal(CoordinateConvention::Ned);
        let state = PhysicalBodyState::at_rest().with_angular_velocity(Vector3::new(0.0, 0.5, 0.0));
        let reading = imu.tick(&state, 0.001).unwrap();
        assert_relative_eq!(reading.angular_velocity[2], -0.5, epsilon = 1e-12);
    }

    #[test]
    fn set_calibration_between_polls() {
        let mut imu = ideal(CoordinateConvention::Native);
        let state = PhysicalBodyState::at_rest();
        imu.tick(&state, 0.001).unwrap();

        let biased = SensorCalibration::accelerometer()
            .with_noise(0.0)
            .with_bias(Vector3::new(1.0, 0.0, 0.0));
        imu.set_calibration(ImuChannel::Accelerometer, biased).unwrap();
        let reading = imu.tick(&state, 0.001).unwrap();
        assert_relative_eq!(reading.acceleration[0], 1.0, epsilon = 1e-12);

        let mismatched = SensorCalibration::gyroscope().with_convention(CoordinateConvention::Enu);
        assert!(imu.set_calibration(ImuChannel::Gyroscope, mismatched).is_err());
        assert_eq!(imu.config().unwrap().gyro.convention, CoordinateConvention::Native);
    }

    #[test]
    fn with_force_ignores_massless_bodies() {
        let state = PhysicalBodyState::at_rest().with_force(Vector3::new(1.0, 0.0, 0.0), 0.0);
        assert!(state.linear_acceleration.is_none());
    }

    #[test]
    fn config_json_roundtrip() {
        let config = ImuConfig::default()
            .with_convention(CoordinateConvention::Ned)
            .with_accel_bias(Vector3::new(0.1, 0.0, -0.1));
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"ned\""));
        let back: ImuConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}

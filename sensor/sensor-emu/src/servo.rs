//! Reference physical-state producer.
//!
//! A single-axis torque servo yawing a rigid body around the native up axis
//! while it drives forward. It stands in for the physics engine when a
//! realistic kinematic source is needed for the IMU, e.g. in the CLI scene.

use std::f64::consts::{PI, TAU};

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{EmuError, Result};
use crate::imu::PhysicalBodyState;

/// Yaw servo parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServoConfig {
    /// Proportional gain (N·m per rad of heading error).
    pub gain: f64,
    /// Damping (N·m per rad/s of yaw rate).
    pub damping: f64,
    /// Yaw-rate cap (rad/s).
    pub max_angular_velocity: f64,
    /// Yaw moment of inertia (kg·m²).
    pub inertia: f64,
    /// Forward speed along the body's -Z axis (m/s).
    pub forward_speed: f64,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            gain: 4.0,
            damping: 4.0, // 2 * sqrt(gain * inertia)
            max_angular_velocity: 2.0,
            inertia: 1.0,
            forward_speed: 0.5,
        }
    }
}

impl ServoConfig {
    /// Set the proportional gain and matching critical damping.
    #[must_use]
    pub fn with_gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self.damping = 2.0 * (gain * self.inertia).max(0.0).sqrt();
        self
    }

    /// Set the yaw-rate cap.
    #[must_use]
    pub const fn with_max_angular_velocity(mut self, max: f64) -> Self {
        self.max_angular_velocity = max;
        self
    }

    /// Set the forward speed.
    #[must_use]
    pub const fn with_forward_speed(mut self, speed: f64) -> Self {
        self.forward_speed = speed;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if inertia or the yaw-rate cap is not positive, or
    /// any parameter is non-finite or negative.
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.gain,
            self.damping,
            self.max_angular_velocity,
            self.inertia,
            self.forward_speed,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(EmuError::invalid_config(
                "servo parameters must be finite and non-negative",
            ));
        }
        if self.inertia <= 0.0 || self.max_angular_velocity <= 0.0 {
            return Err(EmuError::invalid_config(
                "servo inertia and yaw-rate cap must be positive",
            ));
        }
        Ok(())
    }
}

/// Wraps an angle to `(-π, π]`.
#[must_use]
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Rigid body steered by a yaw servo.
///
/// # Example
///
/// ```
/// use sensor_emu::servo::{ServoBody, ServoConfig};
///
/// let mut body = ServoBody::new(ServoConfig::default()).unwrap();
/// for _ in 0..2000 {
///     body.step(1.0, 0.005);
/// }
/// assert!((body.heading() - 1.0).abs() < 1e-3);
/// ```
#[derive(Debug, Clone)]
pub struct ServoBody {
    config: ServoConfig,
    heading: f64,
    yaw_rate: f64,
    position: Vector3<f64>,
    gravity: Vector3<f64>,
}

impl ServoBody {
    /// Creates a body at the origin facing native -Z.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: ServoConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            heading: 0.0,
            yaw_rate: 0.0,
            position: Vector3::zeros(),
            gravity: PhysicalBodyState::at_rest().gravity,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ServoConfig {
        &self.config
    }

    /// Current heading in radians, counter-clockwise about +Y.
    #[must_use]
    pub const fn heading(&self) -> f64 {
        self.heading
    }

    /// Current yaw rate in rad/s.
    #[must_use]
    pub const fn yaw_rate(&self) -> f64 {
        self.yaw_rate
    }

    /// Current position in the world frame.
    #[must_use]
    pub const fn position(&self) -> Vector3<f64> {
        self.position
    }

    /// Advances the servo by `dt` seconds toward `target_heading`.
    pub fn step(&mut self, target_heading: f64, dt: f64) -> PhysicalBodyState {
        let dt = dt.max(0.0);
        let cfg = &self.config;

        let error = wrap_angle(target_heading - self.heading);
        let torque = cfg.gain * error - cfg.damping * self.yaw_rate;
        let max_rate = cfg.max_angular_velocity;
        self.yaw_rate = (self.yaw_rate + torque / cfg.inertia * dt).clamp(-max_rate, max_rate);
        self.heading = wrap_angle(self.heading + self.yaw_rate * dt);

        let state = self.state();
        self.position += state.linear_velocity * dt;
        state
    }

    /// Kinematic state at the current heading and yaw rate.
    #[must_use]
    pub fn state(&self) -> PhysicalBodyState {
        let orientation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.heading);
        let forward = orientation * Vector3::new(0.0, 0.0, -self.config.forward_speed);
        PhysicalBodyState {
            linear_velocity: forward,
            angular_velocity: Vector3::new(0.0, self.yaw_rate, 0.0),
            orientation,
            gravity: self.gravity,
            linear_acceleration: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn wrap_angle_range() {
        assert_relative_eq!(wrap_angle(0.0), 0.0);
        assert_relative_eq!(wrap_angle(PI), PI);
        assert_relative_eq!(wrap_angle(-PI), PI);
        assert_relative_eq!(wrap_angle(3.0 * PI / 2.0), -FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(TAU + 0.25), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn converges_to_target() {
        let mut body = ServoBody::new(ServoConfig::default()).unwrap();
        for _ in 0..4000 {
            body.step(-2.0, 0.005);
        }
        assert_relative_eq!(body.heading(), -2.0, epsilon = 1e-3);
        assert!(body.yaw_rate().abs() < 1e-3);
    }

    #[test]
    fn yaw_rate_is_capped() {
        let config = ServoConfig::default()
            .with_gain(1000.0)
            .with_max_angular_velocity(0.5);
        let mut body = ServoBody::new(config).unwrap();
        for _ in 0..100 {
            let state = body.step(PI - 0.01, 0.01);
            assert!(state.angular_velocity.y.abs() <= 0.5 + 1e-12);
        }
    }

    #[test]
    fn takes_the_short_way_round() {
        let mut body = ServoBody::new(ServoConfig::default()).unwrap();
        body.heading = 3.0;
        let state = body.step(-3.0, 0.01);
        // -3.0 is 0.28 rad counter-clockwise of 3.0.
        assert!(state.angular_velocity.y > 0.0);
    }

    #[test]
    fn velocity_follows_heading() {
        let mut body = ServoBody::new(ServoConfig::default().with_forward_speed(2.0)).unwrap();
        let state = body.step(0.0, 0.1);
        assert_relative_eq!(state.linear_velocity, Vector3::new(0.0, 0.0, -2.0), epsilon = 1e-12);

        body.heading = FRAC_PI_2;
        let state = body.state();
        // Yawed left by 90 degrees: forward is native -X (west).
        assert_relative_eq!(state.linear_velocity, Vector3::new(-2.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(state.linear_velocity.norm(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn position_integrates_velocity() {
        let mut body = ServoBody::new(ServoConfig::default().with_forward_speed(1.0)).unwrap();
        for _ in 0..10 {
            body.step(0.0, 0.1);
        }
        assert_relative_eq!(body.position().z, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn state_feeds_the_imu_without_direct_acceleration() {
        let body = ServoBody::new(ServoConfig::default()).unwrap();
        let state = body.state();
        assert!(state.linear_acceleration.is_none());
        assert_relative_eq!(state.gravity.y, -9.81);
    }

    #[test]
    fn validation() {
        assert!(ServoConfig::default().validate().is_ok());
        assert!(
            ServoConfig::default()
                .with_max_angular_velocity(0.0)
                .validate()
                .is_err()
        );
        let config = ServoConfig {
            inertia: -1.0,
            ..ServoConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(ServoConfig::default().with_forward_speed(f64::NAN).validate().is_err());
    }

    #[test]
    fn invalid_yaw_rate_cap_is_rejected() {
        for cap in [-1.0, f64::NAN] {
            let config = ServoConfig::default().with_max_angular_velocity(cap);
            assert!(ServoBody::new(config).is_err());
        }
    }
}

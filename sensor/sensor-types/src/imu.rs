//! Inertial Measurement Unit (IMU) data types.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{CoordinateConvention, Timestamp};

/// A six-axis reading from an emulated Inertial Measurement Unit.
///
/// # Units
///
/// - Acceleration: specific force in meters per second squared (m/s²)
/// - Angular velocity: radians per second (rad/s)
/// - Gravity: m/s², expressed in the sensor frame
/// - Temperature: degrees Celsius
///
/// # Example
///
/// ```
/// use sensor_types::{CoordinateConvention, ImuReading, Timestamp};
///
/// let reading = ImuReading {
///     timestamp: Timestamp::from_secs_f64(0.01),
///     acceleration: [0.0, 0.0, 9.81],
///     angular_velocity: [0.0, 0.0, 0.1],
///     gravity: [0.0, 0.0, -9.81],
///     temperature: 25.0,
///     convention: CoordinateConvention::Enu,
/// };
///
/// assert!((reading.acceleration_magnitude() - 9.81).abs() < 1e-12);
/// assert_eq!(reading.to_array(), [0.0, 0.0, 9.81, 0.0, 0.0, 0.1]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImuReading {
    /// Simulation time of the reading.
    pub timestamp: Timestamp,

    /// Specific force in m/s²: `[x, y, z]`.
    ///
    /// A stationary sensor reads the reaction to gravity, so an upright
    /// ENU device at rest reports approximately `[0, 0, 9.81]`.
    pub acceleration: [f64; 3],

    /// Angular velocity in rad/s: `[x, y, z]`.
    pub angular_velocity: [f64; 3],

    /// Gravitational acceleration expressed in the sensor frame (m/s²).
    pub gravity: [f64; 3],

    /// Die temperature in °C.
    pub temperature: f64,

    /// Axis convention of the three vectors above.
    pub convention: CoordinateConvention,
}

impl ImuReading {
    /// Reference temperature at which drift terms vanish (°C).
    pub const REFERENCE_TEMPERATURE: f64 = 25.0;

    /// Creates a zero reading at the reference temperature.
    #[must_use]
    pub const fn zero(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            acceleration: [0.0, 0.0, 0.0],
            angular_velocity: [0.0, 0.0, 0.0],
            gravity: [0.0, 0.0, 0.0],
            temperature: Self::REFERENCE_TEMPERATURE,
            convention: CoordinateConvention::Native,
        }
    }

    /// Returns the magnitude of the acceleration vector.
    #[must_use]
    pub fn acceleration_magnitude(&self) -> f64 {
        let [x, y, z] = self.acceleration;
        x.hypot(y).hypot(z)
    }

    /// Returns the magnitude of the angular velocity vector.
    #[must_use]
    pub fn angular_velocity_magnitude(&self) -> f64 {
        let [x, y, z] = self.angular_velocity;
        x.hypot(y).hypot(z)
    }

    /// Returns the six axes as `[ax, ay, az, gx, gy, gz]`.
    #[must_use]
    pub const fn to_array(&self) -> [f64; 6] {
        let [ax, ay, az] = self.acceleration;
        let [gx, gy, gz] = self.angular_velocity;
        [ax, ay, az, gx, gy, gz]
    }
}

impl Default for ImuReading {
    fn default() -> Self {
        Self::zero(Timestamp::zero())
    }
}

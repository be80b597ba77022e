//! Axis conventions for inertial readings.
//!
//! The simulation's native frame is right-handed with Y up:
//! `x` points east, `y` up, and `z` south. Devices report in one of a
//! small fixed set of conventions, each a signed permutation of the
//! native axes.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::SensorError;

/// Output axis convention of an inertial sensor.
///
/// # Example
///
/// ```
/// use sensor_types::CoordinateConvention;
///
/// // Native "up" is +Y; in NED that is -Z (down is positive).
/// let up = [0.0, 1.0, 0.0];
/// assert_eq!(CoordinateConvention::Ned.apply(up), [0.0, 0.0, -1.0]);
/// assert_eq!(CoordinateConvention::Enu.apply(up), [0.0, 0.0, 1.0]);
///
/// let v = [1.0, 2.0, 3.0];
/// let ned = CoordinateConvention::Ned;
/// assert_eq!(ned.invert(ned.apply(v)), v);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CoordinateConvention {
    /// Native simulation frame (pass-through).
    #[default]
    Native,
    /// East-North-Up.
    Enu,
    /// North-East-Down.
    Ned,
}

impl CoordinateConvention {
    /// All supported conventions, in selector order.
    pub const ALL: [Self; 3] = [Self::Native, Self::Enu, Self::Ned];

    /// Maps a native-frame vector into this convention.
    #[must_use]
    pub fn apply(self, v: [f64; 3]) -> [f64; 3] {
        let [x, y, z] = v;
        match self {
            Self::Native => [x, y, z],
            // east = x, north = -z, up = y
            Self::Enu => [x, -z, y],
            // north = -z, east = x, down = -y
            Self::Ned => [-z, x, -y],
        }
    }

    /// Maps a vector in this convention back into the native frame.
    #[must_use]
    pub fn invert(self, v: [f64; 3]) -> [f64; 3] {
        match self {
            Self::Native => v,
            Self::Enu => {
                let [east, north, up] = v;
                [east, up, -north]
            }
            Self::Ned => {
                let [north, east, down] = v;
                [east, -down, -north]
            }
        }
    }

    /// Returns the register-style selector for this convention.
    #[must_use]
    pub const fn selector(self) -> u8 {
        match self {
            Self::Native => 0,
            Self::Enu => 1,
            Self::Ned => 2,
        }
    }

    /// Decodes a selector, clamping malformed values to [`Self::Native`].
    ///
    /// A malformed selector is a programming error: debug builds panic,
    /// release builds keep running in the native frame.
    #[must_use]
    pub fn from_selector(selector: u8) -> Self {
        let decoded = Self::try_from(selector);
        debug_assert!(
            decoded.is_ok(),
            "malformed coordinate convention selector {selector}"
        );
        decoded.unwrap_or_default()
    }

    /// Returns the lowercase name used in configuration files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Enu => "enu",
            Self::Ned => "ned",
        }
    }
}

impl TryFrom<u8> for CoordinateConvention {
    type Error = SensorError;

    fn try_from(selector: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(selector))
            .copied()
            .ok_or(SensorError::InvalidConventionSelector(selector))
    }
}

impl FromStr for CoordinateConvention {
    type Err = SensorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "native" | "sim" => Ok(Self::Native),
            "enu" => Ok(Self::Enu),
            "ned" => Ok(Self::Ned),
            other => Err(SensorError::UnknownConvention(other.to_string())),
        }
    }
}

impl fmt::Display for CoordinateConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

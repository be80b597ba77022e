//! Capture device selection.
//!
//! Which camera and microphone feed the emulators is decided once at
//! startup. An empty inventory or a selection that matches nothing is a
//! configuration fault: the dependent component is disabled, not retried.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EmuError, Result};

/// Kind of capture device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// Color camera.
    Camera,
    /// Microphone.
    Microphone,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Camera => "camera",
            Self::Microphone => "microphone",
        })
    }
}

/// An enumerated capture device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Human-readable device name.
    pub name: String,
    /// Driver-assigned device index.
    pub index: usize,
}

impl DeviceInfo {
    /// Creates a device description.
    #[must_use]
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }
}

/// How to pick a device from the inventory.
///
/// # Example
///
/// ```
/// use sensor_emu::device::DeviceSelection;
///
/// assert_eq!(DeviceSelection::default(), DeviceSelection::Default);
/// let json = serde_json::to_string(&DeviceSelection::Index(1)).unwrap();
/// assert_eq!(json, r#"{"index":1}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceSelection {
    /// First enumerated device.
    #[default]
    Default,
    /// Device with this driver index.
    Index(usize),
    /// Device whose name matches exactly, or else contains this text
    /// ignoring case.
    Name(String),
}

impl fmt::Display for DeviceSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::Index(index) => write!(f, "index {index}"),
            Self::Name(name) => write!(f, "name {name:?}"),
        }
    }
}

/// Picks a device of `kind` from `devices`.
///
/// # Errors
///
/// Returns [`EmuError::NoCaptureDevice`] if `devices` is empty and
/// [`EmuError::DeviceNotFound`] if nothing matches `selection`.
pub fn select_device<'a>(
    kind: DeviceKind,
    devices: &'a [DeviceInfo],
    selection: &DeviceSelection,
) -> Result<&'a DeviceInfo> {
    if devices.is_empty() {
        return Err(EmuError::no_capture_device(kind));
    }
    let found = match selection {
        DeviceSelection::Default => devices.first(),
        DeviceSelection::Index(index) => devices.iter().find(|d| d.index == *index),
        DeviceSelection::Name(name) => {
            let needle = name.to_lowercase();
            devices.iter().find(|d| d.name == *name).or_else(|| {
                devices
                    .iter()
                    .find(|d| d.name.to_lowercase().contains(&needle))
            })
        }
    };
    found.ok_or_else(|| EmuError::device_not_found(kind, selection.to_string()))
}

/// Devices available at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInventory {
    cameras: Vec<DeviceInfo>,
    microphones: Vec<DeviceInfo>,
}

impl DeviceInventory {
    /// An inventory with no devices.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// One emulated camera and one emulated microphone.
    #[must_use]
    pub fn emulated() -> Self {
        Self::empty()
            .with_device(DeviceKind::Camera, "emulated camera")
            .with_device(DeviceKind::Microphone, "emulated microphone")
    }

    /// Adds a device, indexed after the existing devices of its kind.
    #[must_use]
    pub fn with_device(mut self, kind: DeviceKind, name: impl Into<String>) -> Self {
        let list = self.list_mut(kind);
        let index = list.len();
        list.push(DeviceInfo::new(name, index));
        self
    }

    /// Devices of one kind.
    #[must_use]
    pub fn devices(&self, kind: DeviceKind) -> &[DeviceInfo] {
        match kind {
            DeviceKind::Camera => &self.cameras,
            DeviceKind::Microphone => &self.microphones,
        }
    }

    /// Picks a device of `kind`.
    ///
    /// # Errors
    ///
    /// See [`select_device`].
    pub fn select(&self, kind: DeviceKind, selection: &DeviceSelection) -> Result<&DeviceInfo> {
        select_device(kind, self.devices(kind), selection)
    }

    fn list_mut(&mut self, kind: DeviceKind) -> &mut Vec<DeviceInfo> {
        match kind {
            DeviceKind::Camera => &mut self.cameras,
            DeviceKind::Microphone => &mut self.microphones,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn inventory() -> DeviceInventory {
        DeviceInventory::empty()
            .with_device(DeviceKind::Camera, "Integrated Webcam")
            .with_device(DeviceKind::Camera, "USB Cam")
            .with_device(DeviceKind::Microphone, "Array Mic")
    }

    #[test]
    fn default_picks_first() {
        let inv = inventory();
        let cam = inv.select(DeviceKind::Camera, &DeviceSelection::Default).unwrap();
        assert_eq!(cam.name, "Integrated Webcam");
        assert_eq!(cam.index, 0);
    }

    #[test]
    fn select_by_index() {
        let inv = inventory();
        let cam = inv.select(DeviceKind::Camera, &DeviceSelection::Index(1)).unwrap();
        assert_eq!(cam.name, "USB Cam");
        assert!(inv.select(DeviceKind::Camera, &DeviceSelection::Index(7)).is_err());
    }

    #[test]
    fn select_by_name() {
        let inv = inventory();
        let exact = DeviceSelection::Name("USB Cam".into());
        assert_eq!(inv.select(DeviceKind::Camera, &exact).unwrap().index, 1);

        let partial = DeviceSelection::Name("webcam".into());
        assert_eq!(inv.select(DeviceKind::Camera, &partial).unwrap().index, 0);

        let missing = DeviceSelection::Name("thermal".into());
        let err = inv.select(DeviceKind::Camera, &missing).unwrap_err();
        assert!(matches!(err, EmuError::DeviceNotFound { .. }));
        assert!(err.to_string().contains("thermal"));
    }

    #[test]
    fn empty_inventory_is_a_configuration_fault() {
        let inv = DeviceInventory::empty();
        let err = inv
            .select(DeviceKind::Microphone, &DeviceSelection::Default)
            .unwrap_err();
        assert!(matches!(
            err,
            EmuError::NoCaptureDevice {
                kind: DeviceKind::Microphone
            }
        ));
        assert!(err.is_configuration_fault());
    }

    #[test]
    fn emulated_inventory_has_both_kinds() {
        let inv = DeviceInventory::emulated();
        assert_eq!(inv.devices(DeviceKind::Camera).len(), 1);
        assert_eq!(inv.devices(DeviceKind::Microphone).len(), 1);
    }

    #[test]
    fn selection_display_and_serde() {
        assert_eq!(DeviceSelection::Default.to_string(), "default");
        assert_eq!(DeviceSelection::Index(2).to_string(), "index 2");
        assert_eq!(
            DeviceSelection::Name("mic".into()).to_string(),
            "name \"mic\""
        );

        let json = serde_json::to_string(&DeviceSelection::Default).unwrap();
        assert_eq!(json, "\"default\"");
        let back: DeviceSelection = serde_json::from_str(r#"{"name":"mic"}"#).unwrap();
        assert_eq!(back, DeviceSelection::Name("mic".into()));
    }

    #[test]
    fn kind_display() {
        assert_eq!(DeviceKind::Camera.to_string(), "camera");
        assert_eq!(DeviceKind::Microphone.to_string(), "microphone");
    }
}

//! Client for the Android Debug Bridge (`adb`).

mod client;
pub mod parse;
mod runner;

use std::fmt;

pub use client::{AdbClient, LaunchFailure, UNKNOWN_MODEL};
pub use runner::{CommandOutput, CommandRunner, ProcessRunner};

use crate::console::Sink;
use crate::error::Result;

/// Device state as reported by the bridge listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceStatus {
    Connected,
    Offline,
    Unauthorized,
}

impl DeviceStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Connected => "Device",
            Self::Offline => "Offline",
            Self::Unauthorized => "Unauthorized",
        }
    }
}

/// Transport a device is attached over. Independent of [`DeviceStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionKind {
    Usb,
    Wifi,
    Emulator,
}

impl ConnectionKind {
    pub fn icon(self) -> &'static str {
        match self {
            Self::Usb => "🔌",
            Self::Wifi => "📶",
            Self::Emulator => "💻",
        }
    }
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usb => f.write_str("USB"),
            Self::Wifi => f.write_str("Wi-Fi"),
            Self::Emulator => f.write_str("Emulator"),
        }
    }
}

/// A device seen during one discovery pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    pub id: String,
    pub status: DeviceStatus,
    pub connection: ConnectionKind,
    pub name: String,
    pub details: String,
}

impl DeviceRecord {
    pub fn is_selectable(&self) -> bool {
        self.status == DeviceStatus::Connected
    }

    /// Icon plus display name, e.g. `🔌 Pixel 7`.
    pub fn label(&self) -> String {
        format!("{} {}", self.connection.icon(), self.name)
    }
}

/// Operations the setup pipeline needs from the bridge.
pub trait DeviceBridge {
    /// Installed bridge version, e.g. `34.0.5`.
    fn version(&self) -> Result<String>;

    /// Attached devices. Invocation failures are reported to `sink` and
    /// yield an empty list.
    fn list_devices(&self, sink: &dyn Sink) -> Vec<DeviceRecord>;

    /// Human-readable model name. Never fails.
    fn resolve_model(&self, device_id: &str) -> String;

    /// `adb reverse tcp:<port> tcp:<port>` for one device.
    fn reverse(&self, device_id: &str, port: u16, sink: &dyn Sink) -> bool;

    /// Start the activity `component` (`package/activity`) on the device.
    fn launch(&self, device_id: &str, component: &str, sink: &dyn Sink) -> bool;
}

//! Parsers for `adb` text output.

use std::sync::LazyLock;

use regex_lite::Regex;

use super::{ConnectionKind, DeviceStatus};

/// `<serial> <state> [details...]` as printed by `adb devices -l`.
static DEVICE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\w.\-:]+)\s+(device|offline|unauthorized)(?:\s+(.*))?$")
        .expect("device line pattern is valid")
});

static VERSION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Version\s+(\d+\.\d+\.\d+)").expect("version pattern is valid"));

/// Marker carried by serials of devices paired over wireless debugging.
const TLS_CONNECT_MARKER: &str = "_adb-tls-connect";

const EMULATOR_MARKER: &str = "emulator";

/// One matched line of the device listing, before metadata lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceLine {
    pub id: String,
    pub status: DeviceStatus,
    pub details: String,
}

/// Parse a single listing line. Headers, blanks and daemon chatter yield `None`.
pub fn parse_device_line(line: &str) -> Option<DeviceLine> {
    let caps = DEVICE_LINE.captures(line.trim())?;
    let status = match &caps[2] {
        "device" => DeviceStatus::Connected,
        "offline" => DeviceStatus::Offline,
        "unauthorized" => DeviceStatus::Unauthorized,
        _ => return None,
    };
    Some(DeviceLine {
        id: caps[1].to_string(),
        status,
        details: caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_default(),
    })
}

/// Parse the body of a listing, skipping the `List of devices attached` header.
pub fn parse_device_list(output: &str) -> Vec<DeviceLine> {
    output
        .trim()
        .lines()
        .skip(1)
        .filter_map(parse_device_line)
        .collect()
}

/// Classify how a device is attached from its serial alone.
pub fn classify(id: &str) -> ConnectionKind {
    if id.contains(TLS_CONNECT_MARKER) {
        return ConnectionKind::Wifi;
    }
    if let Some((host, _)) = id.split_once(':')
        && !host.is_empty()
        && host.chars().all(|c| c.is_ascii_digit() || c == '.')
    {
        return ConnectionKind::Wifi;
    }
    if id.contains(EMULATOR_MARKER) {
        return ConnectionKind::Emulator;
    }
    ConnectionKind::Usb
}

/// Extract `X.Y.Z` from `adb version` output.
pub fn parse_version(output: &str) -> Option<String> {
    VERSION_LINE
        .captures(output)
        .map(|caps| caps[1].to_string())
}

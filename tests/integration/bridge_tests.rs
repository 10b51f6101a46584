//! Bridge client commands against a scripted runner

use std::time::Duration;

use rtmp_setup::bridge::{AdbClient, CommandOutput, ConnectionKind, DeviceBridge, LaunchFailure};
use rtmp_setup::console::memory::MemorySink;
use rtmp_setup::SetupError;

use crate::common::ScriptedRunner;

const COMPONENT: &str = "com.example.cam/.MainActivity";

#[test]
fn version_is_extracted() {
    let runner = ScriptedRunner::new().with_version("35.0.2");
    let client = AdbClient::new(&runner, false);
    assert_eq!(client.version().unwrap(), "35.0.2");
}

#[test]
fn version_failure_carries_reason() {
    let runner = ScriptedRunner::new().on("version", CommandOutput::failed("adb: not found"));
    let client = AdbClient::new(&runner, false);
    let err = client.version().unwrap_err();
    assert!(matches!(err, SetupError::Bridge(ref m) if m.contains("not found")));
}

#[test]
fn version_timeout_is_an_error() {
    let runner = ScriptedRunner::new().timing_out("version");
    let client = AdbClient::new(&runner, false);
    assert!(matches!(client.version(), Err(SetupError::BridgeTimeout(_))));
}

#[test]
fn connection_kinds_follow_serials() {
    let runner = ScriptedRunner::new().with_devices(
        "R58M123 device usb:1-1\n\
         10.0.0.5:5555 device\n\
         adb-R58M-xyz._adb-tls-connect._tcp device\n\
         emulator-5554 device",
    );
    let client = AdbClient::new(&runner, false);
    let kinds: Vec<_> = client
        .list_devices(&MemorySink::new())
        .into_iter()
        .map(|d| d.connection)
        .collect();
    assert_eq!(
        kinds,
        vec![
            ConnectionKind::Usb,
            ConnectionKind::Wifi,
            ConnectionKind::Wifi,
            ConnectionKind::Emulator
        ]
    );
}

#[test]
fn reverse_runs_per_device_forward() {
    let runner =
        ScriptedRunner::new().on("-s ABC reverse tcp:1935 tcp:1935", CommandOutput::ok(""));
    let client = AdbClient::new(&runner, false);
    let sink = MemorySink::new();
    assert!(client.reverse("ABC", 1935, &sink));
    assert!(sink.contains("Port Fwd"));
}

#[test]
fn reverse_failure_shows_bridge_output() {
    let runner = ScriptedRunner::new().on(
        "-s ABC reverse tcp:1935 tcp:1935",
        CommandOutput::failed("error: device offline"),
    );
    let client = AdbClient::new(&runner, false);
    let sink = MemorySink::new();
    assert!(!client.reverse("ABC", 1935, &sink));
    assert!(sink.contains("device offline"));
}

#[test]
fn launch_succeeds_on_clean_output() {
    let runner = ScriptedRunner::new().on(
        &format!("-s ABC shell am start -n {COMPONENT}"),
        CommandOutput::ok("Starting: Intent { cmp=com.example.cam/.MainActivity }"),
    );
    let client = AdbClient::new(&runner, false).with_launch_settle(Duration::ZERO);
    let sink = MemorySink::new();
    assert!(client.launch("ABC", COMPONENT, &sink));
}

#[test]
fn launch_error_in_output_is_a_failure() {
    let runner = ScriptedRunner::new().on(
        &format!("-s ABC shell am start -n {COMPONENT}"),
        CommandOutput::ok("Error: Activity class {com.example.cam/.MainActivity} does not exist."),
    );
    let client = AdbClient::new(&runner, false).with_launch_settle(Duration::ZERO);
    let sink = MemorySink::new();
    assert!(!client.launch("ABC", COMPONENT, &sink));
    assert!(sink.contains("Unknown error launching app"));
}

#[test]
fn launch_rejects_component_without_activity() {
    let runner = ScriptedRunner::new();
    let client = AdbClient::new(&runner, false);
    let sink = MemorySink::new();
    assert!(!client.launch("ABC", "com.example.cam", &sink));
    assert!(sink.contains("Invalid package name"));
    assert!(runner.calls.borrow().is_empty());
}

#[test]
fn launch_failures_are_classified() {
    assert_eq!(
        LaunchFailure::classify("java.lang.SecurityException: Permission Denial: starting Intent"),
        LaunchFailure::PermissionDenied
    );
    let missing = "Error type 3\nError: Activity class does not exist. Unable to resolve Intent";
    assert_eq!(LaunchFailure::classify(missing), LaunchFailure::NotFound);
    assert_eq!(LaunchFailure::classify("Segmentation fault"), LaunchFailure::Unknown);
}

//! Device discovery feeding the selection policy

use rtmp_setup::bridge::{AdbClient, DeviceBridge, DeviceStatus};
use rtmp_setup::config::SelectionPolicy;
use rtmp_setup::console::memory::{Answer, MemorySink, ScriptedPrompter};
use rtmp_setup::selector::{choose, selectable};

use crate::common::ScriptedRunner;

fn policy(auto_select_single: bool, fetch_metadata: bool) -> SelectionPolicy {
    SelectionPolicy {
        auto_select_single,
        fetch_metadata,
        force_kill: false,
    }
}

#[test]
fn single_usb_device_is_picked_automatically() {
    let runner = ScriptedRunner::new().with_devices("ABC123  device");
    let client = AdbClient::new(&runner, false);
    let sink = MemorySink::new();
    let prompter = ScriptedPrompter::silent();

    let devices = client.list_devices(&sink);
    let picked = choose(&devices, &policy(true, false), &sink, &prompter)
        .unwrap()
        .expect("device should be auto-selected");

    assert_eq!(picked.id, "ABC123");
    assert_eq!(picked.status, DeviceStatus::Connected);
    assert_eq!(picked.name, "Unknown");
    assert!(prompter.asked().is_empty());
    assert_eq!(*runner.calls.borrow(), vec!["devices -l"]);
}

#[test]
fn no_devices_is_reported() {
    let runner = ScriptedRunner::new().with_devices("");
    let client = AdbClient::new(&runner, true);
    let sink = MemorySink::new();

    let devices = client.list_devices(&sink);
    let picked = choose(&devices, &policy(true, true), &sink, &ScriptedPrompter::silent()).unwrap();

    assert!(devices.is_empty());
    assert!(picked.is_none());
    assert!(sink.contains("No devices found"));
}

#[test]
fn two_devices_require_a_valid_index() {
    let runner = ScriptedRunner::new()
        .with_devices("ABC123 device usb:1-1\n192.168.1.20:5555 device product:x")
        .on(
            "-s ABC123 shell getprop ro.product.model",
            rtmp_setup::bridge::CommandOutput::ok("Pixel 7\n"),
        )
        .on(
            "-s 192.168.1.20:5555 shell getprop ro.product.model",
            rtmp_setup::bridge::CommandOutput::ok("Galaxy S21\n"),
        );
    let client = AdbClient::new(&runner, true);
    let sink = MemorySink::new();
    let prompter = ScriptedPrompter::new([Answer::text("3"), Answer::text("x"), Answer::text("2")]);

    let devices = client.list_devices(&sink);
    assert_eq!(selectable(&devices).len(), 2);

    let picked = choose(&devices, &policy(true, true), &sink, &prompter)
        .unwrap()
        .unwrap();

    assert_eq!(picked.id, "192.168.1.20:5555");
    assert_eq!(picked.name, "Galaxy S21");
    assert_eq!(prompter.asked().len(), 3);
}

#[test]
fn unauthorized_only_is_diagnosed() {
    let runner = ScriptedRunner::new().with_devices("ABC123 unauthorized usb:1-1");
    let client = AdbClient::new(&runner, true);
    let sink = MemorySink::new();

    let devices = client.list_devices(&sink);
    let picked = choose(&devices, &policy(true, true), &sink, &ScriptedPrompter::silent()).unwrap();

    assert!(picked.is_none());
    assert_eq!(devices[0].name, "(Unauthorized)");
    assert!(sink.contains("unauthorized"));
    // Metadata is only fetched for connected devices.
    assert_eq!(runner.calls.borrow().len(), 1);
}

#[test]
fn garbage_lines_are_skipped() {
    let runner = ScriptedRunner::new()
        .with_devices("* daemon started successfully\nemulator-5554 device\nnot a device line");
    let client = AdbClient::new(&runner, false);
    let devices = client.list_devices(&MemorySink::new());

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].id, "emulator-5554");
}

//! Probe and killer against real OS processes

use std::net::TcpListener;
use std::process::Command;
use std::time::Duration;

use rtmp_setup::console::memory::MemorySink;
use rtmp_setup::process::{HostOs, ProcessProbe, SystemProbe, terminate};
use wait_timeout::ChildExt;

use crate::common::find_available_port;

#[test]
fn unused_port_has_no_occupant() {
    let port = find_available_port();
    assert!(SystemProbe.find_occupant(port).is_none());
}

#[cfg(target_os = "linux")]
#[test]
fn own_listener_is_found() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let found = SystemProbe
        .find_occupant(port)
        .expect("listener owned by this process should be visible");

    assert_eq!(found.pid, std::process::id());
    drop(listener);
}

#[test]
fn pid_zero_is_refused_on_windows_path() {
    let sink = MemorySink::new();
    assert!(!terminate(HostOs::Windows, 0, "System Idle Process", &sink));
    assert!(sink.contains("PID 0"));
}

#[cfg(unix)]
#[test]
fn kills_a_child_process() {
    let mut child = Command::new("sleep").arg("30").spawn().unwrap();
    let sink = MemorySink::new();

    assert!(terminate(HostOs::Unix, child.id(), "sleep", &sink));

    let status = child.wait_timeout(Duration::from_secs(5)).unwrap();
    assert!(status.is_some(), "child should have exited");
}

//! Media server start orchestration

use std::path::Path;
use std::time::Duration;

use rtmp_setup::console::memory::{Answer, MemorySink, ScriptedPrompter};
use rtmp_setup::resolver::PortResolver;
use rtmp_setup::server::{ServerManager, ServerStatus, Unconfirmed};
use rtmp_setup::SetupError;

use crate::common::{FakeLauncher, FakeProbe, occupant, touch};

fn start(
    probe: &FakeProbe,
    launcher: &FakeLauncher,
    prompter: &ScriptedPrompter,
    executable: &Path,
    sink: &MemorySink,
) -> rtmp_setup::Result<ServerStatus> {
    let resolver = PortResolver::new(probe, sink, prompter, false).with_settle(Duration::ZERO);
    ServerManager::new(probe, launcher, sink)
        .with_settle(Duration::ZERO)
        .start(executable, 1935, &resolver)
}

#[test]
fn running_server_is_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let exe = touch(dir.path(), "MonaServer");
    let probe = FakeProbe::clear().with_running(vec![true]);
    let launcher = FakeLauncher::default();
    let sink = MemorySink::new();

    let status = start(&probe, &launcher, &ScriptedPrompter::silent(), &exe, &sink).unwrap();

    assert_eq!(status, ServerStatus::AlreadyRunning);
    assert!(launcher.spawned.borrow().is_empty());
    assert_eq!(*probe.lookup_count.borrow(), 0);
}

#[test]
fn spawned_server_is_confirmed() {
    let dir = tempfile::tempdir().unwrap();
    let exe = touch(dir.path(), "MonaServer");
    let probe = FakeProbe::clear().with_running(vec![false, true]);
    let launcher = FakeLauncher::default();
    let sink = MemorySink::new();

    let status = start(&probe, &launcher, &ScriptedPrompter::silent(), &exe, &sink).unwrap();

    assert_eq!(status, ServerStatus::Started);
    assert_eq!(*launcher.spawned.borrow(), vec![exe]);
}

#[test]
fn missing_executable_fails_without_spawning() {
    let probe = FakeProbe::clear();
    let launcher = FakeLauncher::default();
    let sink = MemorySink::new();

    let status = start(
        &probe,
        &launcher,
        &ScriptedPrompter::silent(),
        Path::new("/nonexistent/MonaServer"),
        &sink,
    )
    .unwrap();

    assert_eq!(status, ServerStatus::Failed);
    assert!(launcher.spawned.borrow().is_empty());
}

#[test]
fn skipped_conflict_blocks_the_start() {
    let dir = tempfile::tempdir().unwrap();
    let exe = touch(dir.path(), "MonaServer");
    let probe = FakeProbe::new(vec![occupant(88, "nginx")]);
    let launcher = FakeLauncher::default();
    let sink = MemorySink::new();
    let prompter = ScriptedPrompter::new([Answer::No, Answer::Yes]);

    let status = start(&probe, &launcher, &prompter, &exe, &sink).unwrap();

    assert_eq!(status, ServerStatus::Failed);
    assert!(launcher.spawned.borrow().is_empty());
    assert!(sink.contains("Cannot start"));
}

#[test]
fn unresolved_conflict_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let exe = touch(dir.path(), "MonaServer");
    let probe = FakeProbe::new(vec![occupant(88, "nginx")]);
    let launcher = FakeLauncher::default();
    let sink = MemorySink::new();
    let prompter = ScriptedPrompter::new([Answer::No, Answer::No]);

    let err = start(&probe, &launcher, &prompter, &exe, &sink).unwrap_err();

    assert!(matches!(err, SetupError::Fatal(ref m) if m.contains("1935")));
}

#[test]
fn undetected_server_with_free_port_is_unconfirmed() {
    let dir = tempfile::tempdir().unwrap();
    let exe = touch(dir.path(), "MonaServer");
    let probe = FakeProbe::clear().with_running(vec![false]);
    let launcher = FakeLauncher::default();
    let sink = MemorySink::new();

    let status = start(&probe, &launcher, &ScriptedPrompter::silent(), &exe, &sink).unwrap();

    assert_eq!(status, ServerStatus::Unconfirmed(Unconfirmed::PortFree));
    // Initial resolve plus the post-start re-check.
    assert_eq!(*probe.lookup_count.borrow(), 2);
}

#[test]
fn undetected_server_with_held_port_names_the_holder() {
    let dir = tempfile::tempdir().unwrap();
    let exe = touch(dir.path(), "MonaServer");
    let probe = FakeProbe::new(vec![None, occupant(4242, "mona")]).with_running(vec![false]);
    let launcher = FakeLauncher::default();
    let sink = MemorySink::new();

    let status = start(&probe, &launcher, &ScriptedPrompter::silent(), &exe, &sink).unwrap();

    assert_eq!(
        status,
        ServerStatus::Unconfirmed(Unconfirmed::PortHeld(occupant(4242, "mona").unwrap()))
    );
    // The re-check never kills.
    assert!(probe.kills.borrow().is_empty());
}

#[test]
fn spawn_error_is_a_failure() {
    let dir = tempfile::tempdir().unwrap();
    let exe = touch(dir.path(), "MonaServer");
    let probe = FakeProbe::clear();
    let launcher = FakeLauncher {
        fail: true,
        ..FakeLauncher::default()
    };
    let sink = MemorySink::new();

    let status = start(&probe, &launcher, &ScriptedPrompter::silent(), &exe, &sink).unwrap();

    assert_eq!(status, ServerStatus::Failed);
    assert!(sink.contains("permission denied"));
}

#[test]
fn observe_never_spawns() {
    let probe = FakeProbe::clear().with_running(vec![false]);
    let launcher = FakeLauncher::default();
    let sink = MemorySink::new();

    let status = ServerManager::new(&probe, &launcher, &sink).observe();

    assert_eq!(status, ServerStatus::NotStarted);
    assert!(launcher.spawned.borrow().is_empty());
}

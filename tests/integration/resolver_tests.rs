//! Port conflict resolution against a scripted probe

use std::time::Duration;

use rtmp_setup::console::memory::{Answer, MemorySink, ScriptedPrompter};
use rtmp_setup::resolver::{ConflictOutcome, PortResolver};

use crate::common::{FakeProbe, occupant};

#[test]
fn free_port_is_clear() {
    let probe = FakeProbe::clear();
    let sink = MemorySink::new();
    let prompter = ScriptedPrompter::silent();

    let outcome = PortResolver::new(&probe, &sink, &prompter, true)
        .resolve("1935")
        .unwrap();

    assert_eq!(outcome, ConflictOutcome::Clear);
    assert_eq!(outcome.occupant_pid(), None);
    assert!(probe.kills.borrow().is_empty());
}

#[test]
fn force_kill_resolves_without_prompting() {
    let probe = FakeProbe::new(vec![occupant(500, "OldServer"), None]);
    let sink = MemorySink::new();
    let prompter = ScriptedPrompter::silent();

    let outcome = PortResolver::new(&probe, &sink, &prompter, true)
        .with_settle(Duration::ZERO)
        .resolve("1935")
        .unwrap();

    assert_eq!(outcome, ConflictOutcome::Resolved);
    assert_eq!(outcome.occupant_pid(), None);
    assert_eq!(*probe.kills.borrow(), vec![500]);
    assert!(prompter.asked().is_empty());
}

#[test]
fn kill_is_not_trusted_until_port_is_free() {
    // Port still held after a successful kill.
    let probe = FakeProbe::new(vec![occupant(500, "OldServer"), occupant(500, "OldServer")]);
    let sink = MemorySink::new();

    let abort = ScriptedPrompter::new([Answer::No]);
    let outcome = PortResolver::new(&probe, &sink, &abort, true)
        .with_settle(Duration::ZERO)
        .resolve("1935")
        .unwrap();
    assert_eq!(outcome, ConflictOutcome::Fatal { pid: 500 });
    assert!(sink.contains("still in use"));

    let proceed = ScriptedPrompter::new([Answer::Yes]);
    let outcome = PortResolver::new(&probe, &sink, &proceed, true)
        .with_settle(Duration::ZERO)
        .resolve("1935")
        .unwrap();
    assert_eq!(outcome, ConflictOutcome::Skipped { pid: 500 });
}

#[test]
fn rebinding_by_another_process_is_reported() {
    let probe = FakeProbe::new(vec![occupant(500, "OldServer"), occupant(777, "Squatter")]);
    let sink = MemorySink::new();
    let prompter = ScriptedPrompter::new([Answer::No]);

    let outcome = PortResolver::new(&probe, &sink, &prompter, true)
        .with_settle(Duration::ZERO)
        .resolve("1935")
        .unwrap();

    assert_eq!(outcome, ConflictOutcome::Fatal { pid: 777 });
    assert!(sink.contains("Squatter"));
}

#[test]
fn every_resolve_requeries_the_probe() {
    let probe = FakeProbe::new(vec![None, occupant(42, "obs"), occupant(42, "obs")]);
    let sink = MemorySink::new();
    let prompter = ScriptedPrompter::new([Answer::No, Answer::Yes]);
    let resolver = PortResolver::new(&probe, &sink, &prompter, false);

    assert_eq!(resolver.resolve("1935").unwrap(), ConflictOutcome::Clear);
    assert_eq!(
        resolver.resolve("1935").unwrap(),
        ConflictOutcome::Skipped { pid: 42 }
    );
    assert_eq!(*probe.lookup_count.borrow(), 2);
}

#[test]
fn out_of_range_ports_use_the_default() {
    for raw in ["0", "65536", "70000", "-5", "rtmp"] {
        let probe = FakeProbe::clear();
        let sink = MemorySink::new();
        let prompter = ScriptedPrompter::silent();
        let outcome = PortResolver::new(&probe, &sink, &prompter, false)
            .resolve(raw)
            .unwrap();
        assert_eq!(outcome, ConflictOutcome::Clear, "{raw}");
        assert!(sink.contains("Using 1935"), "{raw}");
        assert!(sink.contains("Checking port TCP:1935"), "{raw}");
    }
}

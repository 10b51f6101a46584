use std::thread;
use std::time::{Duration, Instant};

use sysinfo::{Pid, ProcessStatus, ProcessesToUpdate, System};
use tracing::{info, warn};

use super::HostOs;
use crate::console::Sink;

/// How long to wait for a killed process to disappear.
const EXIT_WAIT: Duration = Duration::from_secs(1);

const EXIT_POLL: Duration = Duration::from_millis(100);

enum Signal {
    Sent,
    Gone,
    Failed(String),
}

/// Kill `pid` and wait briefly for it to exit.
///
/// PID 0 is refused without signalling anything: on Windows it is the System
/// Idle Process, on Unix `kill(0, ..)` would hit our own process group.
/// A process that outlives [`EXIT_WAIT`] is reported as a warning only.
pub fn terminate(os: HostOs, pid: u32, name: &str, sink: &dyn Sink) -> bool {
    terminate_with(os, pid, name, sink, send_kill, wait_for_exit)
}

fn terminate_with(
    os: HostOs,
    pid: u32,
    name: &str,
    sink: &dyn Sink,
    send: impl FnOnce(u32) -> Signal,
    wait: impl FnOnce(u32, Duration) -> bool,
) -> bool {
    if pid == 0 {
        match os {
            HostOs::Windows => sink.error("Cannot kill PID 0 (System Idle Process)."),
            HostOs::Unix => sink.error("Refusing to signal PID 0 (own process group)."),
        }
        warn!(pid, %name, "refused to kill reserved PID");
        return false;
    }

    sink.info(&format!("Killing {name} (PID:{pid})..."));
    match send(pid) {
        Signal::Gone => {
            sink.warn(&format!("{name} (PID:{pid}) already gone."));
            info!(pid, %name, "process already exited");
            true
        }
        Signal::Failed(e) => {
            sink.error(&format!("Kill error {name} (PID:{pid}): {e}"));
            warn!(pid, %name, %e, "kill failed");
            false
        }
        Signal::Sent => {
            if !wait(pid, EXIT_WAIT) {
                sink.warn(&format!("{name} (PID:{pid}) is lingering after kill."));
                warn!(pid, %name, "process still alive after kill signal");
            }
            sink.success(&format!("Kill signal sent to {name} (PID:{pid})."));
            info!(pid, %name, "process killed");
            true
        }
    }
}

#[cfg(unix)]
fn send_kill(pid: u32) -> Signal {
    let Ok(pid_i32) = i32::try_from(pid) else {
        return Signal::Failed(format!("PID {pid} out of range"));
    };
    let ret = unsafe { libc::kill(pid_i32, libc::SIGKILL) };
    if ret == 0 {
        return Signal::Sent;
    }
    let err = std::io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::ESRCH) {
        Signal::Gone
    } else {
        Signal::Failed(err.to_string())
    }
}

#[cfg(not(unix))]
fn send_kill(pid: u32) -> Signal {
    let mut sys = System::new();
    let pid = Pid::from_u32(pid);
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    match sys.process(pid) {
        None => Signal::Gone,
        Some(p) if p.kill() => Signal::Sent,
        Some(_) => Signal::Failed("termination was refused".into()),
    }
}

/// Poll the process table until `pid` is gone or a zombie.
fn wait_for_exit(pid: u32, timeout: Duration) -> bool {
    let pid = Pid::from_u32(pid);
    let mut sys = System::new();
    let deadline = Instant::now() + timeout;
    loop {
        sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        let alive = sys
            .process(pid)
            .is_some_and(|p| p.status() != ProcessStatus::Zombie);
        if !alive {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(EXIT_POLL);
    }
}

//! Port occupant lookup, process termination and media server detection.

mod detector;
mod killer;

use std::fmt;

use crate::console::Sink;

pub use detector::{SocketRow, first_listener, matches_server_process};
pub use killer::terminate;

/// Process holding a listening TCP port at the moment it was queried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortOccupant {
    pub pid: u32,
    pub name: String,
}

impl fmt::Display for PortOccupant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (PID: {})", self.name, self.pid)
    }
}

/// Host operating system family, for the few rules that differ per OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    Windows,
    Unix,
}

impl HostOs {
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    pub fn exe_suffix(self) -> &'static str {
        match self {
            Self::Windows => ".exe",
            Self::Unix => "",
        }
    }
}

/// Access to the OS process and socket tables.
pub trait ProcessProbe {
    /// The process listening on TCP `port`, if any.
    ///
    /// Enumeration failures are reported as `None`.
    fn find_occupant(&self, port: u16) -> Option<PortOccupant>;

    /// Kill `pid`. Returns `true` once the signal was delivered or the
    /// process was already gone.
    fn terminate(&self, pid: u32, name: &str, sink: &dyn Sink) -> bool;

    /// Whether a process matching the media server `base_name` is alive.
    fn is_running(&self, base_name: &str) -> bool;
}

/// [`ProcessProbe`] backed by the live OS tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProbe;

impl ProcessProbe for SystemProbe {
    fn find_occupant(&self, port: u16) -> Option<PortOccupant> {
        detector::find_listener(port)
    }

    fn terminate(&self, pid: u32, name: &str, sink: &dyn Sink) -> bool {
        killer::terminate(HostOs::current(), pid, name, sink)
    }

    fn is_running(&self, base_name: &str) -> bool {
        detector::server_running(base_name, HostOs::current())
    }
}

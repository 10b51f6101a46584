//! Host port conflict resolution.
//!
//! Each call to [`PortResolver::resolve`] walks the state machine from the
//! top: parse the port, query the probe, then apply the kill/skip policy.
//! Nothing is cached between calls, so a re-check after starting the media
//! server always sees the current socket table.

use std::thread;
use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::console::{Prompter, SYMBOL_CHECK, SYMBOL_WARNING, Sink};
use crate::error::Result;
use crate::process::{PortOccupant, ProcessProbe};

/// Port substituted when the configured value is not a valid TCP port.
///
/// The RTMP well-known port. An unparsable setting is logged and replaced
/// rather than aborting the run.
pub const DEFAULT_RTMP_PORT: u16 = 1935;

/// Pause after a successful kill so the OS can release the socket.
pub const KILL_SETTLE: Duration = Duration::from_millis(500);

/// Result of validating a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictOutcome {
    /// Nothing was listening.
    Clear,
    /// An occupant was killed and the port was confirmed free afterwards.
    Resolved,
    /// An occupant remains; the operator chose to proceed anyway.
    Skipped { pid: u32 },
    /// An occupant remains and the run must stop.
    Fatal { pid: u32 },
}

impl ConflictOutcome {
    pub fn is_port_free(self) -> bool {
        matches!(self, Self::Clear | Self::Resolved)
    }

    /// PID of the occupant left behind, if any.
    pub fn occupant_pid(self) -> Option<u32> {
        match self {
            Self::Clear | Self::Resolved => None,
            Self::Skipped { pid } | Self::Fatal { pid } => Some(pid),
        }
    }
}

/// Parse a configured port, substituting [`DEFAULT_RTMP_PORT`] when the
/// value is not an integer in `1..=65535`.
pub fn parse_port_or_default(raw: &str, sink: &dyn Sink) -> u16 {
    normalize_port(raw).unwrap_or_else(|| {
        warn!(raw, fallback = DEFAULT_RTMP_PORT, "invalid port setting");
        sink.error(&format!("Invalid port: {raw}. Using {DEFAULT_RTMP_PORT}."));
        DEFAULT_RTMP_PORT
    })
}

/// `raw` as a TCP port in `1..=65535`, without reporting anything.
pub fn normalize_port(raw: &str) -> Option<u16> {
    raw.trim().parse::<u16>().ok().filter(|p| *p != 0)
}

/// Applies the conflict policy for one port.
pub struct PortResolver<'a> {
    probe: &'a dyn ProcessProbe,
    sink: &'a dyn Sink,
    prompter: &'a dyn Prompter,
    force_kill: bool,
    settle: Duration,
}

impl<'a> PortResolver<'a> {
    pub fn new(
        probe: &'a dyn ProcessProbe,
        sink: &'a dyn Sink,
        prompter: &'a dyn Prompter,
        force_kill: bool,
    ) -> Self {
        Self {
            probe,
            sink,
            prompter,
            force_kill,
            settle: KILL_SETTLE,
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Query only: who holds `port` right now.
    pub fn inspect(&self, port: u16) -> Option<PortOccupant> {
        self.probe.find_occupant(port)
    }

    /// Validate the configured port and resolve any conflict on it.
    #[instrument(skip(self), fields(force_kill = self.force_kill))]
    pub fn resolve(&self, raw_port: &str) -> Result<ConflictOutcome> {
        let port = parse_port_or_default(raw_port, self.sink);
        self.sink.info(&format!("Checking port TCP:{port}..."));

        let Some(occupant) = self.probe.find_occupant(port) else {
            info!(port, "port is clear");
            return Ok(ConflictOutcome::Clear);
        };

        self.sink.warn(&format!(
            "{SYMBOL_WARNING} Port TCP:{port} in use by {} (PID:{}).",
            occupant.name, occupant.pid
        ));
        warn!(port, pid = occupant.pid, process = %occupant.name, "port occupied");

        let kill = self.force_kill
            || self.prompter.confirm(
                &format!("Kill {} (PID:{})?", occupant.name, occupant.pid),
                true,
            )?;

        if kill {
            return self.kill_and_recheck(port, &occupant);
        }

        if self.prompter.confirm("Skip port conflict?", false)? {
            self.sink.warn("Skipping. Streaming may fail.");
            info!(port, pid = occupant.pid, "operator skipped port conflict");
            return Ok(ConflictOutcome::Skipped { pid: occupant.pid });
        }

        warn!(port, pid = occupant.pid, "port conflict left unresolved");
        Ok(ConflictOutcome::Fatal { pid: occupant.pid })
    }

    fn kill_and_recheck(&self, port: u16, occupant: &PortOccupant) -> Result<ConflictOutcome> {
        if !self.probe.terminate(occupant.pid, &occupant.name, self.sink) {
            return self.proceed_or_fail(
                port,
                occupant.pid,
                &format!("Could not kill {occupant}. Proceed without resolving?"),
            );
        }

        thread::sleep(self.settle);

        // The kill only counts once the port is observed free.
        if let Some(still) = self.probe.find_occupant(port) {
            self.sink.warn(&format!(
                "{SYMBOL_WARNING} Port TCP:{port} still in use by {} (PID:{}).",
                still.name, still.pid
            ));
            warn!(port, pid = still.pid, process = %still.name, "port still occupied after kill");
            return self.proceed_or_fail(
                port,
                still.pid,
                &format!("Port {port} is still in use. Proceed without resolving?"),
            );
        }

        self.sink.success(&format!("{SYMBOL_CHECK} Port {port} freed."));
        info!(port, pid = occupant.pid, "port conflict resolved");
        Ok(ConflictOutcome::Resolved)
    }

    fn proceed_or_fail(&self, port: u16, pid: u32, question: &str) -> Result<ConflictOutcome> {
        if self.prompter.confirm(question, false)? {
            self.sink.warn("Proceeding with port conflict. Streaming may fail.");
            info!(port, pid, "operator proceeded despite conflict");
            Ok(ConflictOutcome::Skipped { pid })
        } else {
            Ok(ConflictOutcome::Fatal { pid })
        }
    }
}

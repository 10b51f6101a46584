//! Media server (MonaServer) start-up and health checking.

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::console::{SYMBOL_CHECK, Sink};
use crate::error::{Result, SetupError};
use crate::process::{PortOccupant, ProcessProbe};
use crate::resolver::{ConflictOutcome, PortResolver};

/// Base name the health check looks for in the process table.
pub const SERVER_BASE_NAME: &str = "MonaServer";

/// Time given to a freshly spawned server before its health is checked.
pub const START_SETTLE: Duration = Duration::from_millis(1500);

/// What the post-start port re-check saw when the health check failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unconfirmed {
    /// Nothing holds the port; the server may still be starting.
    PortFree,
    /// Something holds the port, possibly not our server.
    PortHeld(PortOccupant),
}

/// Final media server state for the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerStatus {
    /// Spawned by this run and seen in the process table.
    Started,
    /// Was already running before this run.
    AlreadyRunning,
    Failed,
    /// Spawned, but the health check could not confirm it.
    Unconfirmed(Unconfirmed),
    /// Auto-start is off and no server was found.
    NotStarted,
}

impl ServerStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Started | Self::AlreadyRunning)
    }
}

/// Starts the server executable.
pub trait Launcher {
    fn spawn(&self, executable: &Path) -> io::Result<()>;
}

/// Spawns the server detached from our stdin so it cannot swallow the final
/// Enter keypress. Its stdout and stderr stay attached to this console.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn spawn(&self, executable: &Path) -> io::Result<()> {
        let mut cmd = Command::new(executable);
        if let Some(dir) = executable.parent() {
            cmd.current_dir(dir);
        }
        let child = cmd.stdin(Stdio::null()).spawn()?;
        info!(pid = child.id(), "media server spawned");
        Ok(())
    }
}

pub struct ServerManager<'a> {
    probe: &'a dyn ProcessProbe,
    launcher: &'a dyn Launcher,
    sink: &'a dyn Sink,
    settle: Duration,
}

impl<'a> ServerManager<'a> {
    pub fn new(
        probe: &'a dyn ProcessProbe,
        launcher: &'a dyn Launcher,
        sink: &'a dyn Sink,
    ) -> Self {
        Self {
            probe,
            launcher,
            sink,
            settle: START_SETTLE,
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn is_running(&self) -> bool {
        self.probe.is_running(SERVER_BASE_NAME)
    }

    /// Status when auto-start is disabled: only look, never spawn.
    pub fn observe(&self) -> ServerStatus {
        self.sink.info("Auto-start MonaServer is disabled in config.");
        if self.is_running() {
            self.sink.info("MonaServer is already running (checked manually).");
            ServerStatus::AlreadyRunning
        } else {
            ServerStatus::NotStarted
        }
    }

    /// Start the server unless it is already running.
    ///
    /// The port is re-validated through `resolver` first; a fatal conflict
    /// halts the run. When the post-start health check fails the port is
    /// queried again to describe the unconfirmed state.
    #[instrument(skip(self, executable, resolver))]
    pub fn start(
        &self,
        executable: &Path,
        port: u16,
        resolver: &PortResolver<'_>,
    ) -> Result<ServerStatus> {
        if self.is_running() {
            self.sink
                .success(&format!("{SYMBOL_CHECK} MonaServer already running."));
            return Ok(ServerStatus::AlreadyRunning);
        }
        if !executable.is_file() {
            self.sink.error(&format!(
                "MonaServer path ('{}') is not set or invalid.",
                executable.display()
            ));
            return Ok(ServerStatus::Failed);
        }

        match resolver.resolve(&port.to_string())? {
            ConflictOutcome::Clear | ConflictOutcome::Resolved => {}
            ConflictOutcome::Skipped { pid } => {
                self.sink.error(&format!(
                    "MonaServer: Port TCP:{port} conflict (PID {pid}). Cannot start."
                ));
                return Ok(ServerStatus::Failed);
            }
            ConflictOutcome::Fatal { .. } => {
                return Err(SetupError::fatal(format!("Port {port} conflict unresolved.")));
            }
        }

        self.sink.info(&format!("Starting MonaServer: {}", executable.display()));
        if let Err(e) = self.launcher.spawn(executable) {
            warn!(%e, "media server spawn failed");
            self.sink.error(&format!("MonaServer start failed: {e}"));
            return Ok(ServerStatus::Failed);
        }
        self.sink.success(&format!(
            "{SYMBOL_CHECK} MonaServer start command issued. Output should appear below (if any)."
        ));

        thread::sleep(self.settle);
        if self.is_running() {
            info!(port, "media server confirmed running");
            return Ok(ServerStatus::Started);
        }

        let status = match resolver.inspect(port) {
            None => {
                self.sink.warn(
                    "MonaServer launched, but status check failed and port is not taken. Verify manually.",
                );
                Unconfirmed::PortFree
            }
            Some(occupant) => {
                self.sink.warn(&format!(
                    "MonaServer launched, but status check failed. Port TCP:{port} is held by {occupant}. Verify manually."
                ));
                Unconfirmed::PortHeld(occupant)
            }
        };
        warn!(port, ?status, "media server start unconfirmed");
        Ok(ServerStatus::Unconfirmed(status))
    }
}

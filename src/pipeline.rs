//! The linear setup run, from port check to summary.

use std::time::Duration;

use tracing::{error, info, instrument, warn};

use crate::bridge::DeviceBridge;
use crate::clipboard::{self, Clipboard};
use crate::config::Config;
use crate::console::{Prompter, SYMBOL_CHECK, Sink};
use crate::error::{Result, SetupError};
use crate::process::ProcessProbe;
use crate::report::RunReport;
use crate::resolver::{
    ConflictOutcome, DEFAULT_RTMP_PORT, KILL_SETTLE, PortResolver, normalize_port,
};
use crate::selector;
use crate::server::{Launcher, START_SETTLE, ServerManager};

const EXIT_PROMPT: &str = "Press Enter to exit...";

/// Report how a run ended and pick the process exit code.
///
/// Completed and failed runs hold the console open until the operator
/// acknowledges; a cancellation exits straight away.
pub fn conclude(outcome: Result<()>, sink: &dyn Sink, prompter: &dyn Prompter) -> i32 {
    match outcome {
        Ok(()) => {
            sink.plain("");
            let _ = prompter.pause(EXIT_PROMPT);
            0
        }
        Err(SetupError::Cancelled) => {
            info!("cancelled by operator");
            sink.plain("");
            sink.dimmed("Cancelled.");
            0
        }
        Err(e) => {
            error!(%e, "setup aborted");
            sink.plain("");
            sink.error(&format!("ERROR: {e}"));
            let _ = prompter.pause(EXIT_PROMPT);
            e.exit_code()
        }
    }
}

/// External collaborators for one run.
pub struct Pipeline<'a> {
    pub bridge: &'a dyn DeviceBridge,
    pub probe: &'a dyn ProcessProbe,
    pub launcher: &'a dyn Launcher,
    pub clipboard: &'a dyn Clipboard,
    pub sink: &'a dyn Sink,
    pub prompter: &'a dyn Prompter,
    kill_settle: Duration,
    start_settle: Duration,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        bridge: &'a dyn DeviceBridge,
        probe: &'a dyn ProcessProbe,
        launcher: &'a dyn Launcher,
        clipboard: &'a dyn Clipboard,
        sink: &'a dyn Sink,
        prompter: &'a dyn Prompter,
    ) -> Self {
        Self {
            bridge,
            probe,
            launcher,
            clipboard,
            sink,
            prompter,
            kill_settle: KILL_SETTLE,
            start_settle: START_SETTLE,
        }
    }

    /// Override both settle delays.
    pub fn with_settle(mut self, kill: Duration, start: Duration) -> Self {
        self.kill_settle = kill;
        self.start_settle = start;
        self
    }

    /// Run every step and print the summary.
    ///
    /// Returns `Err` for fatal conditions and cancellation; degraded steps
    /// are recorded in the returned report instead.
    #[instrument(skip_all)]
    pub fn run(&self, config: &Config) -> Result<RunReport> {
        let sink = self.sink;
        let policy = config.policy();
        let raw_port = config.settings.network.rtmp_port.as_str();
        let resolver = PortResolver::new(self.probe, sink, self.prompter, policy.force_kill)
            .with_settle(self.kill_settle);

        let initial_port = resolver.resolve(raw_port)?;
        let port = normalize_port(raw_port).unwrap_or(DEFAULT_RTMP_PORT);
        match initial_port {
            ConflictOutcome::Fatal { pid } => {
                error!(port, pid, "initial port conflict unresolved");
                return Err(SetupError::fatal(format!(
                    "Port TCP:{port} conflict (PID {pid}) unresolved."
                )));
            }
            ConflictOutcome::Skipped { pid } => sink.warn(&format!(
                "Port TCP:{port} conflict (PID {pid}) was not resolved. MonaServer might fail to start or bind."
            )),
            ConflictOutcome::Clear | ConflictOutcome::Resolved => {}
        }

        sink.step("ADB Verification");
        let bridge_version = self
            .bridge
            .version()
            .map_err(|e| SetupError::fatal(format!("ADB check failed: {e}")))?;
        sink.success(&format!("{SYMBOL_CHECK} ADB version {bridge_version}"));

        sink.step("Device Selection");
        let devices = self.bridge.list_devices(sink);
        let device = selector::choose(&devices, &policy, sink, self.prompter)?
            .ok_or_else(|| SetupError::fatal("No device selected."))?;

        sink.step("Setup Execution");
        let forwarded = self.bridge.reverse(&device.id, port, sink);
        if !forwarded {
            warn!(device = %device.id, port, "reverse forwarding failed");
            if !self
                .prompter
                .confirm("Port forwarding failed. Continue anyway?", false)?
            {
                return Err(SetupError::fatal("Aborted: port forwarding failure."));
            }
        }

        let launched = self
            .bridge
            .launch(&device.id, &config.settings.device.package, sink);

        let url = clipboard::rtmp_url(port);
        let url_copied = clipboard::publish_url(&url, self.clipboard, sink);

        let manager =
            ServerManager::new(self.probe, self.launcher, sink).with_settle(self.start_settle);
        let server = if config.settings.options.auto_start_media_server {
            manager.start(&config.media_server_path, port, &resolver)?
        } else {
            manager.observe()
        };
        info!(?server, forwarded, launched, "setup steps finished");

        let report = RunReport {
            bridge_version,
            bridge_path: config.adb_path.clone(),
            device,
            port,
            initial_port,
            forwarded,
            launched,
            app_id: config.app_id().to_string(),
            url,
            url_copied,
            server,
            obs_path: config.obs_path.clone(),
        };

        sink.step("Summary");
        report.render(sink);
        Ok(report)
    }
}

//! End-of-run summary table and next steps.

use std::path::PathBuf;

use crate::bridge::DeviceRecord;
use crate::console::{SYMBOL_ARROW_LR, SYMBOL_CHECK, SYMBOL_CROSS, SYMBOL_WARNING, Sink, Tone};
use crate::resolver::ConflictOutcome;
use crate::server::ServerStatus;

/// Everything the summary needs to know about one run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub bridge_version: String,
    pub bridge_path: PathBuf,
    pub device: DeviceRecord,
    pub port: u16,
    /// Outcome of the first port check, before any server start.
    pub initial_port: ConflictOutcome,
    pub forwarded: bool,
    pub launched: bool,
    pub app_id: String,
    pub url: String,
    pub url_copied: bool,
    pub server: ServerStatus,
    pub obs_path: Option<PathBuf>,
}

/// One summary row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub item: &'static str,
    pub tone: Tone,
    pub status: &'static str,
    pub details: String,
}

fn row(item: &'static str, ok: bool, status: (&'static str, &'static str), details: String) -> Row {
    Row {
        item,
        tone: if ok { Tone::Success } else { Tone::Danger },
        status: if ok { status.0 } else { status.1 },
        details,
    }
}

impl RunReport {
    pub fn rows(&self) -> Vec<Row> {
        let port = self.port;
        let (tone, status, details) = match self.initial_port {
            ConflictOutcome::Clear => (Tone::Dimmed, "No Conflict", format!("Host TCP:{port}")),
            ConflictOutcome::Resolved => {
                (Tone::Success, "Resolved", format!("Host TCP:{port}"))
            }
            ConflictOutcome::Skipped { pid } | ConflictOutcome::Fatal { pid } => (
                Tone::Warning,
                "UNRESOLVED",
                format!("Host TCP:{port} (Initial conflict PID:{pid} unresolved)"),
            ),
        };

        let (server_tone, server_status) = match &self.server {
            ServerStatus::Started => (Tone::Success, "Running/Started"),
            ServerStatus::AlreadyRunning => (Tone::Success, "Already Running"),
            ServerStatus::Failed => (Tone::Danger, "Failed to Start"),
            ServerStatus::Unconfirmed(_) => (Tone::Warning, "Start Attempted (Unconfirmed)"),
            ServerStatus::NotStarted => (Tone::Dimmed, "Not Started"),
        };

        vec![
            row(
                "ADB",
                true,
                ("OK", "FAIL"),
                format!("v{} @ {}", self.bridge_version, self.bridge_path.display()),
            ),
            Row {
                item: "Device",
                tone: Tone::Success,
                status: "Selected",
                details: format!("{} ({})", self.device.label(), self.device.connection),
            },
            Row {
                item: "Host Port",
                tone,
                status,
                details,
            },
            row(
                "Port Forward",
                self.forwarded,
                ("OK", "FAIL"),
                format!("Device:{port} {SYMBOL_ARROW_LR} Host:{port}"),
            ),
            row("App Launch", self.launched, ("OK", "FAIL/Skip"), self.app_id.clone()),
            Row {
                item: "RTMP URL",
                tone: if self.url_copied {
                    Tone::Success
                } else {
                    Tone::Warning
                },
                status: if self.url_copied {
                    "Copied"
                } else {
                    "Not Copied"
                },
                details: self.url.clone(),
            },
            Row {
                item: "MonaServer",
                tone: server_tone,
                status: server_status,
                details: String::new(),
            },
        ]
    }

    /// Next-step hints, in display order.
    pub fn next_steps(&self) -> Vec<(Tone, String)> {
        let mut steps = vec![(
            Tone::Success,
            format!("{SYMBOL_CHECK} Setup Complete. RTMP URL: {}", self.url),
        )];
        if let Some(pid) = self.initial_port.occupant_pid() {
            steps.push((
                Tone::Warning,
                format!(
                    "{SYMBOL_WARNING} Port TCP:{} conflict (PID {pid}) may affect MonaServer.",
                    self.port
                ),
            ));
        }
        if !self.launched {
            steps.push((
                Tone::Warning,
                format!("{SYMBOL_WARNING} App ({}) launch issue.", self.app_id),
            ));
        }
        steps.push(match &self.server {
            ServerStatus::Started | ServerStatus::AlreadyRunning => (
                Tone::Success,
                format!(
                    "{SYMBOL_CHECK} MonaServer should be running. \
                     Its output may appear in this console."
                ),
            ),
            ServerStatus::Failed => (
                Tone::Danger,
                format!("{SYMBOL_CROSS} MonaServer failed to start."),
            ),
            ServerStatus::Unconfirmed(_) => (
                Tone::Warning,
                format!(
                    "{SYMBOL_WARNING} MonaServer start was attempted, status unconfirmed. \
                     Check console output and port."
                ),
            ),
            ServerStatus::NotStarted => (
                Tone::Info,
                "MonaServer auto-start is off. Ensure it's running if needed.".to_string(),
            ),
        });
        if let Some(obs) = self.obs_path.as_ref().filter(|p| p.exists()) {
            steps.push((Tone::Info, format!("Launch OBS: {}", obs.display())));
        }
        steps.push((Tone::Info, "Connect streaming software to the RTMP URL.".to_string()));
        steps
    }

    pub fn render(&self, sink: &dyn Sink) {
        let rows = self.rows();
        let item_width = rows.iter().map(|r| r.item.len()).max().unwrap_or(0);
        let status_width = rows.iter().map(|r| r.status.len()).max().unwrap_or(0);
        for r in &rows {
            sink.emit(
                r.tone,
                &format!(
                    "  {:<item_width$}  {:<status_width$}  {}",
                    r.item, r.status, r.details
                ),
            );
        }
        sink.plain("");
        sink.plain("Next Steps:");
        for (tone, line) in self.next_steps() {
            sink.emit(tone, &format!("  {line}"));
        }
    }
}

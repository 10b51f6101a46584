use std::thread;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, instrument, warn};

use super::parse::{self, DeviceLine};
use super::runner::{CommandOutput, CommandRunner};
use super::{DeviceBridge, DeviceRecord, DeviceStatus};
use crate::console::{SYMBOL_ARROW_LR, SYMBOL_CHECK, SYMBOL_WARNING, Sink};
use crate::error::{Result, SetupError};

/// Display name used when the model cannot or should not be looked up.
pub const UNKNOWN_MODEL: &str = "Unknown";

const LIST_TIMEOUT: Duration = Duration::from_secs(5);
const PROPERTY_TIMEOUT: Duration = Duration::from_secs(2);
const VERSION_TIMEOUT: Duration = Duration::from_secs(5);
const REVERSE_TIMEOUT: Duration = Duration::from_secs(5);
const LAUNCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause after a launch command so the app can come up before the server starts.
const LAUNCH_SETTLE: Duration = Duration::from_millis(500);

/// Why `am start` did not report success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchFailure {
    PermissionDenied,
    NotFound,
    Unknown,
}

impl LaunchFailure {
    pub fn classify(output: &str) -> Self {
        let lower = output.to_lowercase();
        if lower.contains("permission denial") {
            Self::PermissionDenied
        } else if lower.contains("not found") || lower.contains("unable to resolve") {
            Self::NotFound
        } else {
            Self::Unknown
        }
    }
}

/// Bridge client over a [`CommandRunner`].
///
/// A client without a runner stands for an unset bridge path: listing yields
/// nothing and every command reports failure.
pub struct AdbClient<R> {
    runner: Option<R>,
    fetch_models: bool,
    launch_settle: Duration,
}

impl<R: CommandRunner> AdbClient<R> {
    pub fn new(runner: R, fetch_models: bool) -> Self {
        Self {
            runner: Some(runner),
            fetch_models,
            launch_settle: LAUNCH_SETTLE,
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            runner: None,
            fetch_models: false,
            launch_settle: LAUNCH_SETTLE,
        }
    }

    pub fn with_launch_settle(mut self, settle: Duration) -> Self {
        self.launch_settle = settle;
        self
    }

    fn device_record(&self, line: DeviceLine) -> DeviceRecord {
        let connection = parse::classify(&line.id);
        let name = match line.status {
            DeviceStatus::Connected if self.fetch_models => self.resolve_model(&line.id),
            DeviceStatus::Connected => UNKNOWN_MODEL.to_string(),
            other => format!("({})", other.label()),
        };
        DeviceRecord {
            id: line.id,
            status: line.status,
            connection,
            name,
            details: line.details,
        }
    }

    /// Trimmed stdout of a successful property query, empty otherwise.
    fn property(&self, runner: &R, device_id: &str, key: &str) -> Result<String> {
        let out = runner.run(&["-s", device_id, "shell", "getprop", key], PROPERTY_TIMEOUT)?;
        Ok(if out.success {
            out.stdout.trim().to_string()
        } else {
            String::new()
        })
    }

    fn lookup_model(&self, runner: &R, device_id: &str) -> Result<String> {
        let model = self.property(runner, device_id, "ro.product.model")?;
        if !model.is_empty() {
            return Ok(model);
        }
        let manufacturer = self.property(runner, device_id, "ro.product.manufacturer")?;
        Ok(if manufacturer.is_empty() {
            UNKNOWN_MODEL.to_string()
        } else {
            format!("{manufacturer} (Model N/A)")
        })
    }

    fn report_launch_failure(&self, app: &str, out: &CommandOutput, sink: &dyn Sink) {
        let combined = format!("{}{}", out.stdout, out.stderr);
        let message = match LaunchFailure::classify(&combined) {
            LaunchFailure::PermissionDenied => "Permission denied launching app.".to_string(),
            LaunchFailure::NotFound => format!("App {app} not found."),
            LaunchFailure::Unknown => "Unknown error launching app.".to_string(),
        };
        sink.warn(&format!("{SYMBOL_WARNING} {message}"));
        if !out.stdout.trim().is_empty() {
            sink.dimmed(&format!("Out: {}", out.stdout.trim()));
        }
        if !out.stderr.trim().is_empty() {
            sink.dimmed(&format!("Err: {}", out.stderr.trim()));
        }
    }
}

impl<R: CommandRunner> DeviceBridge for AdbClient<R> {
    fn version(&self) -> Result<String> {
        let runner = self
            .runner
            .as_ref()
            .ok_or_else(|| SetupError::Config("ADB path not set".into()))?;
        let out = runner.run(&["version"], VERSION_TIMEOUT)?;
        if out.success
            && let Some(version) = parse::parse_version(&out.stdout)
        {
            return Ok(version);
        }
        let reason = out.stderr.trim();
        Err(SetupError::Bridge(if reason.is_empty() {
            "No version output".to_string()
        } else {
            reason.to_string()
        }))
    }

    #[instrument(skip(self, sink))]
    fn list_devices(&self, sink: &dyn Sink) -> Vec<DeviceRecord> {
        let Some(runner) = self.runner.as_ref() else {
            return Vec::new();
        };
        sink.info("Scanning for connected devices...");

        let out = match runner.run(&["devices", "-l"], LIST_TIMEOUT) {
            Ok(out) if out.success => out,
            Ok(out) => {
                sink.error(&format!("'adb devices' error: {}", out.diagnostic()));
                warn!(stderr = %out.diagnostic(), "device listing exited with failure");
                return Vec::new();
            }
            Err(e) => {
                sink.error(&format!("'adb devices' error: {e}"));
                warn!(%e, "device listing failed");
                return Vec::new();
            }
        };

        let lines = parse::parse_device_list(&out.stdout);
        let connected = lines
            .iter()
            .filter(|l| l.status == DeviceStatus::Connected)
            .count() as u64;

        // Metadata is fetched one device at a time; the bridge is a single
        // shared executable.
        let progress = (self.fetch_models && connected > 0).then(|| {
            let bar = ProgressBar::new(connected);
            bar.set_style(
                ProgressStyle::with_template("{spinner} Fetching models... {pos}/{len}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        });

        let mut devices = Vec::with_capacity(lines.len());
        for line in lines {
            let is_connected = line.status == DeviceStatus::Connected;
            devices.push(self.device_record(line));
            if is_connected && let Some(bar) = &progress {
                bar.inc(1);
            }
        }
        if let Some(bar) = progress {
            bar.finish_and_clear();
        }

        info!(count = devices.len(), "device discovery finished");
        devices
    }

    fn resolve_model(&self, device_id: &str) -> String {
        let Some(runner) = self.runner.as_ref() else {
            return UNKNOWN_MODEL.to_string();
        };
        if !self.fetch_models {
            return UNKNOWN_MODEL.to_string();
        }
        match self.lookup_model(runner, device_id) {
            Ok(name) => name,
            Err(SetupError::BridgeTimeout(_)) => {
                debug!(device = device_id, "model lookup timed out");
                "Unknown (Timeout)".to_string()
            }
            Err(e) => {
                debug!(device = device_id, %e, "model lookup failed");
                "Unknown (Error)".to_string()
            }
        }
    }

    #[instrument(skip(self, sink))]
    fn reverse(&self, device_id: &str, port: u16, sink: &dyn Sink) -> bool {
        let Some(runner) = self.runner.as_ref() else {
            return false;
        };
        sink.info(&format!(
            "Port forwarding (Dev:{port} {SYMBOL_ARROW_LR} Host:{port})..."
        ));
        let spec = format!("tcp:{port}");
        let out = match runner.run(&["-s", device_id, "reverse", &spec, &spec], REVERSE_TIMEOUT) {
            Ok(out) => out,
            Err(e) => {
                sink.error(&format!("ADB reverse error: {e}"));
                warn!(%e, "reverse forwarding failed");
                return false;
            }
        };
        if out.success {
            sink.success(&format!(
                "{SYMBOL_CHECK} Port Fwd: Dev TCP:{port} {SYMBOL_ARROW_LR} Host TCP:{port}"
            ));
            info!("reverse forwarding established");
            true
        } else {
            sink.error(&format!("Port fwd failed. ADB: {}", out.diagnostic()));
            warn!(reason = %out.diagnostic(), "reverse forwarding rejected");
            false
        }
    }

    #[instrument(skip(self, sink))]
    fn launch(&self, device_id: &str, component: &str, sink: &dyn Sink) -> bool {
        let Some(runner) = self.runner.as_ref() else {
            return false;
        };
        let Some((app, _activity)) = component.split_once('/').filter(|(app, _)| !app.is_empty())
        else {
            sink.error(&format!("Invalid package name: {component}"));
            return false;
        };
        sink.info(&format!("Launching app {app}..."));

        let out = match runner.run(
            &["-s", device_id, "shell", "am", "start", "-n", component],
            LAUNCH_TIMEOUT,
        ) {
            Ok(out) => out,
            Err(e) => {
                sink.error(&format!("App launch error: {e}"));
                warn!(%e, "app launch command failed");
                return false;
            }
        };

        let combined = format!("{}{}", out.stdout, out.stderr).to_lowercase();
        if out.success && !combined.contains("error") && !combined.contains("exception") {
            sink.success(&format!("{SYMBOL_CHECK} App Launch: Sent cmd for {app}."));
            info!(app, "launch command accepted");
            thread::sleep(self.launch_settle);
            return true;
        }
        warn!(app, output = %out.diagnostic(), "app launch reported an error");
        self.report_launch_failure(app, &out, sink);
        false
    }
}

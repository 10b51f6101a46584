//! Device selection policy.

use tracing::{debug, info};

use crate::bridge::{DeviceRecord, DeviceStatus};
use crate::config::SelectionPolicy;
use crate::console::{Prompter, SYMBOL_CHECK, SYMBOL_WARNING, Sink};
use crate::error::Result;

/// Why no listed device could be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unusable {
    AllUnauthorized,
    AllOffline,
    Mixed,
}

impl Unusable {
    /// `None` when at least one record is selectable or the list is empty.
    pub fn diagnose(records: &[DeviceRecord]) -> Option<Self> {
        if records.is_empty() || records.iter().any(DeviceRecord::is_selectable) {
            return None;
        }
        let all = |status| records.iter().all(|r| r.status == status);
        Some(if all(DeviceStatus::Unauthorized) {
            Self::AllUnauthorized
        } else if all(DeviceStatus::Offline) {
            Self::AllOffline
        } else {
            Self::Mixed
        })
    }

    fn hint(self) -> &'static str {
        match self {
            Self::AllUnauthorized => {
                "All devices unauthorized. Check the USB debugging prompt on the device."
            }
            Self::AllOffline => "All devices offline. Reconnect the device or restart adb.",
            Self::Mixed => {
                "No usable device. Check the auth prompt or reconnect offline devices."
            }
        }
    }
}

/// Records that can be selected.
pub fn selectable(records: &[DeviceRecord]) -> Vec<&DeviceRecord> {
    records.iter().filter(|r| r.is_selectable()).collect()
}

fn print_table(records: &[DeviceRecord], sink: &dyn Sink) {
    let id_width = records.iter().map(|r| r.id.len()).max().unwrap_or(0).max(2);
    sink.plain(&format!("  {:<id_width$}  {:<12}  {:<9}  NAME", "ID", "STATUS", "TYPE"));
    for r in records {
        let line = format!(
            "  {:<id_width$}  {:<12}  {:<9}  {}",
            r.id,
            r.status.label(),
            r.connection.to_string(),
            r.label()
        );
        if r.is_selectable() {
            sink.plain(&line);
        } else {
            sink.dimmed(&line);
        }
    }
}

/// Pick the device to set up.
///
/// Returns `Ok(None)` when nothing can be selected; the reason has been
/// reported. An interrupted prompt surfaces as
/// [`SetupError::Cancelled`](crate::error::SetupError::Cancelled).
pub fn choose(
    records: &[DeviceRecord],
    policy: &SelectionPolicy,
    sink: &dyn Sink,
    prompter: &dyn Prompter,
) -> Result<Option<DeviceRecord>> {
    if records.is_empty() {
        sink.error("No devices found.");
        return Ok(None);
    }

    print_table(records, sink);

    if let Some(reason) = Unusable::diagnose(records) {
        debug!(?reason, count = records.len(), "no selectable devices");
        sink.error(&format!("{SYMBOL_WARNING} {}", reason.hint()));
        return Ok(None);
    }

    let usable = selectable(records);
    if let [only] = usable.as_slice()
        && policy.auto_select_single
    {
        sink.success(&format!(
            "{SYMBOL_CHECK} Auto-selected: {} ({})",
            only.label(),
            only.id
        ));
        info!(device = %only.id, "device auto-selected");
        return Ok(Some((*only).clone()));
    }

    sink.plain("Select a device:");
    for (i, r) in usable.iter().enumerate() {
        sink.plain(&format!("  [{}] {} ({}, {})", i + 1, r.label(), r.id, r.connection));
    }

    let prompt = format!("Enter selection (1-{})", usable.len());
    loop {
        let raw = prompter.input(&prompt)?;
        match raw.trim().parse::<usize>() {
            Ok(n) if (1..=usable.len()).contains(&n) => {
                let picked = usable[n - 1];
                sink.success(&format!(
                    "{SYMBOL_CHECK} Selected: {} ({})",
                    picked.label(),
                    picked.id
                ));
                info!(device = %picked.id, "device selected");
                return Ok(Some(picked.clone()));
            }
            Ok(_) => sink.warn(&format!(
                "Invalid choice. Enter a number from 1 to {}.",
                usable.len()
            )),
            Err(_) => sink.warn("Invalid input. Enter a number."),
        }
    }
}

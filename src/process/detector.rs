use std::path::Path;

use netstat2::{AddressFamilyFlags, ProtocolFlags, ProtocolSocketInfo, TcpState};
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::debug;

use super::{HostOs, PortOccupant};

/// One row of the OS socket table, reduced to what the lookup needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketRow {
    pub local_port: u16,
    pub listening: bool,
    pub pids: Vec<u32>,
}

/// Find the first listening row on `port` whose owner can be named.
///
/// Rows that failed to decode are skipped, as are owners that vanished or
/// cannot be inspected (`name_of` returns `None`).
pub fn first_listener<I, E, F>(rows: I, port: u16, mut name_of: F) -> Option<PortOccupant>
where
    I: IntoIterator<Item = Result<SocketRow, E>>,
    E: std::fmt::Display,
    F: FnMut(u32) -> Option<String>,
{
    if port == 0 {
        return None;
    }
    for row in rows {
        let row = match row {
            Ok(r) => r,
            Err(e) => {
                debug!(port, %e, "skipping unreadable socket entry");
                continue;
            }
        };
        if row.local_port != port || !row.listening {
            continue;
        }
        for pid in row.pids {
            match name_of(pid) {
                Some(name) => return Some(PortOccupant { pid, name }),
                None => debug!(port, pid, "listener owner vanished or inaccessible"),
            }
        }
    }
    None
}

pub(super) fn find_listener(port: u16) -> Option<PortOccupant> {
    if port == 0 {
        return None;
    }
    let af = AddressFamilyFlags::IPV4 | AddressFamilyFlags::IPV6;
    let sockets = match netstat2::iterate_sockets_info(af, ProtocolFlags::TCP) {
        Ok(s) => s,
        Err(e) => {
            debug!(port, %e, "socket enumeration failed");
            return None;
        }
    };

    let rows = sockets.map(|entry| {
        entry.map(|info| match info.protocol_socket_info {
            ProtocolSocketInfo::Tcp(tcp) => SocketRow {
                local_port: tcp.local_port,
                listening: tcp.state == TcpState::Listen,
                pids: info.associated_pids,
            },
            ProtocolSocketInfo::Udp(udp) => SocketRow {
                local_port: udp.local_port,
                listening: false,
                pids: info.associated_pids,
            },
        })
    });

    let mut sys = System::new();
    let found = first_listener(rows, port, |pid| process_name(&mut sys, pid));
    debug!(port, occupant = ?found, "port lookup finished");
    found
}

fn process_name(sys: &mut System, pid: u32) -> Option<String> {
    let pid = Pid::from_u32(pid);
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    sys.process(pid)
        .map(|p| p.name().to_string_lossy().into_owned())
}

/// Whether a process looks like the media server named `base_name`.
///
/// Matches the exact executable name (with `.exe` on Windows) against the
/// process name or the executable's file name, then falls back to a
/// case-insensitive substring search over the command line.
pub fn matches_server_process(
    name: &str,
    exe: Option<&Path>,
    cmd: &[String],
    base_name: &str,
    os: HostOs,
) -> bool {
    let exe_name = format!("{base_name}{}", os.exe_suffix()).to_lowercase();
    if name.to_lowercase() == exe_name {
        return true;
    }
    let exe_file = exe
        .and_then(|p| p.file_name())
        .map(|f| f.to_string_lossy().to_lowercase());
    if exe_file.as_deref() == Some(exe_name.as_str()) {
        return true;
    }
    let base = base_name.to_lowercase();
    cmd.iter().any(|arg| arg.to_lowercase().contains(&base))
}

pub(super) fn server_running(base_name: &str, os: HostOs) -> bool {
    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::All,
        true,
        ProcessRefreshKind::everything(),
    );
    let own_pid = sysinfo::get_current_pid().ok();

    sys.processes().iter().any(|(pid, process)| {
        if Some(*pid) == own_pid {
            return false;
        }
        let cmd: Vec<String> = process
            .cmd()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        matches_server_process(
            &process.name().to_string_lossy(),
            process.exe(),
            &cmd,
            base_name,
            os,
        )
    })
}

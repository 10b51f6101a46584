use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::console::{Prompter, Sink};
use crate::error::Result;
use crate::process::HostOs;

/// Invalid answers accepted before a path prompt gives up.
pub const MAX_PATH_ATTEMPTS: usize = 5;

const DEFAULT_ADB_WINDOWS: &str = r"C:\platform-tools\adb.exe";
const DEFAULT_OBS_WINDOWS: &str = r"C:\Program Files\obs-studio\bin\64bit\obs64.exe";

/// An external executable the setup depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Bridge,
    MediaServer,
    Obs,
}

impl PathKind {
    pub const ALL: [PathKind; 3] = [Self::Bridge, Self::MediaServer, Self::Obs];

    pub fn is_critical(self) -> bool {
        !matches!(self, Self::Obs)
    }

    pub fn label(self, os: HostOs) -> &'static str {
        match (self, os) {
            (Self::Bridge, HostOs::Windows) => "ADB platform-tools folder",
            (Self::Bridge, HostOs::Unix) => "ADB executable",
            (Self::MediaServer, _) => "MonaServer executable",
            (Self::Obs, _) => "OBS executable (optional)",
        }
    }

    /// Value offered when the operator just presses Enter.
    pub fn default_suggestion(self, os: HostOs) -> Option<PathBuf> {
        match (self, os) {
            (Self::Bridge, HostOs::Windows) => Some(PathBuf::from(DEFAULT_ADB_WINDOWS)),
            (Self::Bridge, HostOs::Unix) => find_on_path("adb"),
            (Self::MediaServer, _) => {
                let dir = std::env::current_exe().ok()?.parent()?.to_path_buf();
                let bundle = match os {
                    HostOs::Windows => "MonaServer_Win64",
                    HostOs::Unix => "MonaServer_Linux",
                };
                Some(dir.join(bundle).join(format!("MonaServer{}", os.exe_suffix())))
            }
            (Self::Obs, HostOs::Windows) => {
                let p = PathBuf::from(DEFAULT_OBS_WINDOWS);
                p.exists().then_some(p)
            }
            (Self::Obs, HostOs::Unix) => None,
        }
    }
}

/// Search `PATH` for an executable called `name`.
pub fn find_on_path(name: &str) -> Option<PathBuf> {
    find_in(name, std::env::var_os("PATH")?)
}

/// Executable lookup over an explicit search path. Honours the executable
/// bit on Unix and `PATHEXT` on Windows.
fn find_in(name: &str, search_path: impl AsRef<OsStr>) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    which::which_in(name, Some(search_path), cwd).ok()
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Check `path` against the rules for `kind`.
///
/// `Ok(None)` means the path was rejected; the reason has been reported.
pub(super) fn validate(
    kind: PathKind,
    path: &Path,
    os: HostOs,
    sink: &dyn Sink,
    prompter: &dyn Prompter,
) -> Result<Option<PathBuf>> {
    match kind {
        PathKind::Bridge => {
            // A platform-tools folder stands for the executable inside it.
            let candidate = if path.is_dir() {
                let exe = path.join(format!("adb{}", os.exe_suffix()));
                if !exe.is_file() {
                    sink.error(&format!(
                        "'adb{}' not found in '{}'.",
                        os.exe_suffix(),
                        path.display()
                    ));
                    return Ok(None);
                }
                exe
            } else {
                path.to_path_buf()
            };
            let named_adb = candidate
                .file_name()
                .is_some_and(|n| n.to_string_lossy().to_lowercase().contains("adb"));
            if candidate.is_file() && named_adb {
                Ok(Some(absolute(&candidate)))
            } else {
                sink.error(&format!(
                    "'{}' is not a valid ADB executable.",
                    candidate.display()
                ));
                Ok(None)
            }
        }
        PathKind::MediaServer | PathKind::Obs => {
            if !path.is_file() {
                sink.error(&format!("Path '{}' is not a valid file.", path.display()));
                return Ok(None);
            }
            let looks_like_server = path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().to_lowercase().contains("monaserver"));
            if kind == PathKind::MediaServer
                && !looks_like_server
                && !prompter.confirm(
                    &format!("'{}' doesn't look like MonaServer. Use anyway?", path.display()),
                    false,
                )?
            {
                return Ok(None);
            }
            Ok(Some(absolute(path)))
        }
    }
}

/// Ask the operator for a path until it validates.
///
/// Returns `None` when the optional OBS path is skipped or after
/// [`MAX_PATH_ATTEMPTS`] rejected answers.
pub(super) fn ask(
    kind: PathKind,
    os: HostOs,
    sink: &dyn Sink,
    prompter: &dyn Prompter,
) -> Result<Option<PathBuf>> {
    let suggestion = kind.default_suggestion(os);
    let prompt = match &suggestion {
        Some(s) => format!("{} (Enter for default: {})", kind.label(os), s.display()),
        None => kind.label(os).to_string(),
    };

    for attempt in 1..=MAX_PATH_ATTEMPTS {
        let raw = prompter.input(&prompt)?;
        let raw = raw.trim();
        let candidate = if !raw.is_empty() {
            PathBuf::from(raw)
        } else if let Some(s) = &suggestion {
            s.clone()
        } else {
            if kind == PathKind::Obs && prompter.confirm("Skip OBS config?", true)? {
                return Ok(None);
            }
            sink.warn("Path cannot be empty.");
            continue;
        };

        debug!(?kind, attempt, candidate = %candidate.display(), "validating entered path");
        if let Some(valid) = validate(kind, &candidate, os, sink, prompter)? {
            return Ok(Some(valid));
        }
    }
    sink.error(&format!(
        "No valid {} after {MAX_PATH_ATTEMPTS} attempts.",
        kind.label(os)
    ));
    Ok(None)
}

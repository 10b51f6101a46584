//! Settings store: a flat TOML file read once at startup.

mod paths;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub use paths::{MAX_PATH_ATTEMPTS, PathKind, find_on_path};

use crate::console::{Prompter, SYMBOL_CHECK, Sink};
use crate::error::{Result, SetupError};
use crate::process::HostOs;

const CONFIG_DIR_NAME: &str = "rtmp-setup";
const CONFIG_FILE_NAME: &str = "config.toml";

pub const DEFAULT_PACKAGE: &str = "com.telegram.a1064/com.nvshen.chmp4.SplashActivity";
pub const DEFAULT_PORT_SETTING: &str = "1935";

/// Locations of the external executables.
///
/// Empty strings mean "not configured".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub adb: String,
    pub media_server: String,
    pub obs: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// `package/activity` component started on the device.
    pub package: String,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            package: DEFAULT_PACKAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// Kept as text; the port resolver applies the default-port policy.
    pub rtmp_port: String,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            rtmp_port: DEFAULT_PORT_SETTING.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub auto_start_media_server: bool,
    pub auto_select_single_device: bool,
    pub fetch_device_models: bool,
    pub force_kill_port_occupant: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            auto_start_media_server: true,
            auto_select_single_device: true,
            fetch_device_models: true,
            force_kill_port_occupant: true,
        }
    }
}

/// On-disk settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub paths: PathSettings,
    pub device: DeviceSettings,
    pub network: NetworkSettings,
    pub options: Options,
}

/// Policy flags for one run. Read-only after load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPolicy {
    pub auto_select_single: bool,
    pub fetch_metadata: bool,
    pub force_kill: bool,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Options::default().policy()
    }
}

impl Options {
    pub fn policy(&self) -> SelectionPolicy {
        SelectionPolicy {
            auto_select_single: self.auto_select_single_device,
            fetch_metadata: self.fetch_device_models,
            force_kill: self.force_kill_port_occupant,
        }
    }
}

impl Settings {
    /// Read settings from `path`. `Ok(None)` if the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let settings = toml::from_str(&content).map_err(|source| SetupError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "settings loaded");
        Ok(Some(settings))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        info!(path = %path.display(), "settings written");
        Ok(())
    }

    fn path_mut(&mut self, kind: PathKind) -> &mut String {
        match kind {
            PathKind::Bridge => &mut self.paths.adb,
            PathKind::MediaServer => &mut self.paths.media_server,
            PathKind::Obs => &mut self.paths.obs,
        }
    }
}

/// Default settings file location.
///
/// `<config_dir>/rtmp-setup/config.toml`, falling back to the home directory
/// and finally the working directory.
pub fn default_config_path() -> PathBuf {
    if let Some(dir) = dirs::config_dir() {
        return dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(format!(".{CONFIG_DIR_NAME}.toml"));
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

/// Settings plus validated executable paths.
#[derive(Debug, Clone)]
pub struct Config {
    pub settings: Settings,
    pub adb_path: PathBuf,
    pub media_server_path: PathBuf,
    pub obs_path: Option<PathBuf>,
}

impl Config {
    pub fn policy(&self) -> SelectionPolicy {
        self.settings.options.policy()
    }

    /// Application id, the part of the component before `/`.
    pub fn app_id(&self) -> &str {
        let package = &self.settings.device.package;
        package.split_once('/').map_or(package.as_str(), |(app, _)| app)
    }
}

/// Load settings from `path`, establishing or correcting paths interactively.
///
/// The file is written back only when something changed in this session.
/// A critical path the operator cannot supply is fatal.
pub fn load_or_setup(
    path: &Path,
    os: HostOs,
    sink: &dyn Sink,
    prompter: &dyn Prompter,
) -> Result<Config> {
    let file_label = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let loaded = Settings::load(path)?;
    let first_run = loaded.is_none();
    let mut settings = loaded.unwrap_or_default();
    let mut changed = false;

    if first_run {
        sink.warn(&format!("'{file_label}' not found. Starting interactive setup."));
        sink.plain("First-Time Setup: Paths");
    } else {
        sink.info(&format!("Loaded configuration from '{file_label}'"));
    }

    let mut resolved = [None, None, None];
    for (slot, kind) in resolved.iter_mut().zip(PathKind::ALL) {
        let stored = settings.path_mut(kind).clone();

        let valid = if first_run || stored.is_empty() {
            None
        } else {
            paths::validate(kind, Path::new(&stored), os, sink, prompter)?
        };

        let value = match valid {
            Some(p) => Some(p),
            None if first_run || kind.is_critical() => {
                if !first_run {
                    let shown = if stored.is_empty() {
                        "empty"
                    } else {
                        stored.as_str()
                    };
                    sink.warn(&format!(
                        "Configured {} ('{shown}') is invalid or missing. Please correct it.",
                        kind.label(os)
                    ));
                }
                let answer = paths::ask(kind, os, sink, prompter)?;
                if answer.is_none() && kind.is_critical() {
                    return Err(SetupError::fatal(format!(
                        "{} is crucial and was not set.",
                        kind.label(os)
                    )));
                }
                *settings.path_mut(kind) = answer
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                changed = true;
                answer
            }
            None => {
                if !stored.is_empty() {
                    sink.info(&format!(
                        "Optional {} ('{stored}') invalid. Clearing.",
                        kind.label(os)
                    ));
                    settings.path_mut(kind).clear();
                    changed = true;
                }
                None
            }
        };
        *slot = value;
    }

    if changed {
        match settings.save(path) {
            Ok(()) => sink.success(&format!(
                "{SYMBOL_CHECK} Configuration saved/updated in {}.",
                path.display()
            )),
            Err(e) => {
                warn!(%e, "could not persist settings");
                sink.error(&format!("Error saving config updates: {e}"));
            }
        }
    }

    let [adb, media_server, obs] = resolved;
    let (Some(adb_path), Some(media_server_path)) = (adb, media_server) else {
        return Err(SetupError::Config("required paths missing after setup".into()));
    };

    Ok(Config {
        settings,
        adb_path,
        media_server_path,
        obs_path: obs,
    })
}

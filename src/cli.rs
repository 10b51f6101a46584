use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// When to colour the operator console.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum ColorMode {
    /// Colour only when stdout is a terminal
    #[default]
    Auto,
    /// Colour even when piped or redirected
    Always,
    /// Plain text
    Never,
}

impl ColorMode {
    /// Whether console styling should be turned on for this run.
    pub fn should_enable(&self) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            // Prompts, step banners and the summary all go to stdout, so that
            // is the stream whose terminal-ness matters. Logs never touch it.
            ColorMode::Auto => std::io::IsTerminal::is_terminal(&std::io::stdout()),
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "rtmp-setup")]
#[command(
    author,
    version,
    about = "Set up an RTMP stream from an Android device to a local MonaServer"
)]
pub struct Cli {
    /// Settings file (defaults to <config dir>/rtmp-setup/config.toml)
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level for the debug log (trace, debug, info, warn, error)
    #[arg(long = "log-level", default_value = "info")]
    pub log_level: String,

    /// Colored console output (auto-detected by default)
    #[arg(long = "color", default_value = "auto")]
    pub color: ColorMode,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::default_config_path)
    }
}

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse settings file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("Bridge command failed: {0}")]
    Bridge(String),

    #[error("Bridge command timed out after {0:?}")]
    BridgeTimeout(Duration),

    #[error("Failed to kill process: {0}")]
    ProcessKill(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    /// The operator interrupted an interactive step. Not a fault.
    #[error("Cancelled by operator")]
    Cancelled,

    #[error("{0}")]
    Fatal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SetupError {
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal(message.into())
    }

    /// Exit status the process should terminate with for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Cancelled => 0,
            _ => 1,
        }
    }
}

impl From<dialoguer::Error> for SetupError {
    fn from(e: dialoguer::Error) -> Self {
        match e {
            dialoguer::Error::IO(io) if io.kind() == std::io::ErrorKind::Interrupted => {
                Self::Cancelled
            }
            dialoguer::Error::IO(io) => Self::Prompt(io.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SetupError>;

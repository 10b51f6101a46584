//! Interactive setup of an RTMP stream from an Android device to a local
//! MonaServer: port conflict resolution, device selection over `adb`,
//! reverse forwarding, app launch and media server start-up.

pub mod bridge;
pub mod cli;
pub mod clipboard;
pub mod config;
pub mod console;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod process;
pub mod report;
pub mod resolver;
pub mod selector;
pub mod server;

pub use error::{Result, SetupError};

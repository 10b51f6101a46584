//! RTMP ingest URL and clipboard hand-off.

use tracing::{debug, warn};

use crate::console::{SYMBOL_CHECK, SYMBOL_WARNING, Sink};

/// URL OBS (or any RTMP client) should publish to.
pub fn rtmp_url(port: u16) -> String {
    format!("rtmp://127.0.0.1:{port}/live")
}

pub trait Clipboard {
    fn set_text(&self, text: &str) -> Result<(), String>;
}

/// The desktop clipboard.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<(), String> {
        arboard::Clipboard::new()
            .and_then(|mut c| c.set_text(text.to_string()))
            .map_err(|e| e.to_string())
    }
}

/// Print `url` and try to copy it. Returns whether the copy succeeded.
pub fn publish_url(url: &str, clipboard: &dyn Clipboard, sink: &dyn Sink) -> bool {
    sink.plain(&format!("RTMP URL: {url}"));
    match clipboard.set_text(url) {
        Ok(()) => {
            debug!(url, "url copied to clipboard");
            sink.success(&format!("{SYMBOL_CHECK} URL copied to clipboard."));
            true
        }
        Err(e) => {
            warn!(error = %e, "clipboard unavailable");
            sink.warn(&format!("{SYMBOL_WARNING} Could not copy URL to clipboard: {e}"));
            false
        }
    }
}

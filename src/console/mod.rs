//! Operator-facing output and prompts.
//!
//! Every component writes through a [`Sink`] and asks questions through a
//! [`Prompter`] instead of touching the terminal directly. The binary wires
//! in [`TermSink`] and [`DialoguerPrompter`]; tests use the recording
//! implementations from [`memory`].

mod term;

pub mod memory;

pub use term::{DialoguerPrompter, TermSink};

use crate::error::Result;

pub const SYMBOL_CHECK: &str = "✓";
pub const SYMBOL_CROSS: &str = "✗";
pub const SYMBOL_WARNING: &str = "⚠";
pub const SYMBOL_ARROW_LR: &str = "↔";

/// Visual weight of a console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Info,
    Success,
    Warning,
    Danger,
    Dimmed,
}

/// Destination for operator-facing messages.
pub trait Sink {
    fn emit(&self, tone: Tone, message: &str);

    fn plain(&self, message: &str) {
        self.emit(Tone::Plain, message);
    }

    fn info(&self, message: &str) {
        self.emit(Tone::Info, message);
    }

    fn success(&self, message: &str) {
        self.emit(Tone::Success, message);
    }

    fn warn(&self, message: &str) {
        self.emit(Tone::Warning, message);
    }

    fn error(&self, message: &str) {
        self.emit(Tone::Danger, message);
    }

    fn dimmed(&self, message: &str) {
        self.emit(Tone::Dimmed, message);
    }

    /// Section divider between pipeline steps.
    fn step(&self, title: &str) {
        self.emit(Tone::Plain, &step_divider(title));
    }
}

/// Source of operator decisions.
pub trait Prompter {
    /// Yes/no question. `default` is used when the operator just presses Enter.
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;

    /// Free text answer, possibly empty.
    fn input(&self, prompt: &str) -> Result<String>;

    /// Block until the operator acknowledges.
    fn pause(&self, prompt: &str) -> Result<()>;
}

const DIVIDER_WIDTH: usize = 40;
const DIVIDER_LEAD: usize = 5;

pub(crate) fn step_divider(title: &str) -> String {
    let trailing = DIVIDER_WIDTH.saturating_sub(title.chars().count() + DIVIDER_LEAD);
    format!(
        "{} {} {}",
        "─".repeat(DIVIDER_LEAD),
        title,
        "─".repeat(trailing)
    )
}

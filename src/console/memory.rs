//! Recording sink and scripted prompter.
//!
//! Used by the test suites to drive interactive flows deterministically.

use std::cell::RefCell;
use std::collections::VecDeque;

use super::{Prompter, Sink, Tone};
use crate::error::{Result, SetupError};

/// Sink that keeps every emitted line in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: RefCell<Vec<(Tone, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(Tone, String)> {
        self.lines.borrow().clone()
    }

    /// True if any emitted line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|(_, l)| l.contains(needle))
    }

    /// True if a line with the given tone contains `needle`.
    pub fn contains_tone(&self, tone: Tone, needle: &str) -> bool {
        self.lines
            .borrow()
            .iter()
            .any(|(t, l)| *t == tone && l.contains(needle))
    }
}

impl Sink for MemorySink {
    fn emit(&self, tone: Tone, message: &str) {
        self.lines.borrow_mut().push((tone, message.to_string()));
    }
}

/// A single scripted operator response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Text(String),
    /// Simulates Ctrl-C at the prompt.
    Interrupt,
}

impl Answer {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

/// Prompter that replays a fixed list of answers in order.
///
/// Running out of answers is reported as a prompt error so that a test
/// which prompts more often than expected fails loudly.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<Answer>>,
    asked: RefCell<Vec<String>>,
    pauses: RefCell<usize>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: RefCell::new(answers.into_iter().collect()),
            ..Self::default()
        }
    }

    /// A prompter that must never be asked anything.
    pub fn silent() -> Self {
        Self::default()
    }

    /// Prompts asked so far, in order.
    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }

    pub fn remaining(&self) -> usize {
        self.answers.borrow().len()
    }

    pub fn pauses(&self) -> usize {
        *self.pauses.borrow()
    }

    fn next(&self, prompt: &str) -> Result<Answer> {
        self.asked.borrow_mut().push(prompt.to_string());
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| SetupError::Prompt(format!("no scripted answer for '{prompt}'")))
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, prompt: &str, _default: bool) -> Result<bool> {
        match self.next(prompt)? {
            Answer::Yes => Ok(true),
            Answer::No => Ok(false),
            Answer::Interrupt => Err(SetupError::Cancelled),
            Answer::Text(t) => Err(SetupError::Prompt(format!(
                "expected yes/no for '{prompt}', got text '{t}'"
            ))),
        }
    }

    fn input(&self, prompt: &str) -> Result<String> {
        match self.next(prompt)? {
            Answer::Text(t) => Ok(t),
            Answer::Interrupt => Err(SetupError::Cancelled),
            other => Err(SetupError::Prompt(format!(
                "expected text for '{prompt}', got {other:?}"
            ))),
        }
    }

    fn pause(&self, _prompt: &str) -> Result<()> {
        *self.pauses.borrow_mut() += 1;
        Ok(())
    }
}

use ::console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};

use super::{Prompter, Sink, Tone};
use crate::error::Result;

/// Styled output on stdout.
pub struct TermSink {
    term: Term,
}

impl TermSink {
    pub fn stdout() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl Sink for TermSink {
    fn emit(&self, tone: Tone, message: &str) {
        let line = match tone {
            Tone::Plain => style(message),
            Tone::Info => style(message).cyan().dim(),
            Tone::Success => style(message).green().bold(),
            Tone::Warning => style(message).yellow(),
            Tone::Danger => style(message).red().bold(),
            Tone::Dimmed => style(message).dim(),
        };
        // Output is best effort; a closed stdout must not abort the run.
        let _ = self.term.write_line(&line.to_string());
    }
}

/// Interactive prompts on the controlling terminal.
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for DialoguerPrompter {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(answer)
    }

    fn input(&self, prompt: &str) -> Result<String> {
        let answer: String = Input::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(answer)
    }

    fn pause(&self, prompt: &str) -> Result<()> {
        let term = Term::stdout();
        term.write_line(&style(prompt).italic().to_string())?;
        term.read_line()?;
        Ok(())
    }
}

//! Deletion decisions
//!
//! A [`Confirm`] answers one yes/no question per fork-only branch. The mode is
//! chosen once at startup: [`AutoConfirm`] answers from configuration without
//! blocking, [`PromptConfirm`] blocks on a line from the operator.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use tracing::info;

/// Synchronous yes/no boundary for destructive actions
///
/// `confirm` may block the calling thread until the operator answers. Call it
/// only from the single sequential sync flow, never from a spawned task.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// `y` or `yes` in any case, after trimming, is affirmative; anything else is not
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Non-interactive answers: always the configured auto-delete flag
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm {
    answer: bool,
}

impl AutoConfirm {
    pub fn new(answer: bool) -> Self {
        Self { answer }
    }
}

impl Confirm for AutoConfirm {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        let echoed = if self.answer { "y (auto)" } else { "N (auto)" };
        info!("{}{}", question, echoed);
        Ok(self.answer)
    }
}

/// Interactive answers read line by line from `input`
pub struct PromptConfirm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl PromptConfirm<std::io::StdinLock<'static>, std::io::Stdout> {
    /// Prompt on the process's stdout and read answers from stdin
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Confirm for PromptConfirm<R, W> {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        write!(self.output, "{}", question).context("Failed to write prompt")?;
        self.output.flush().context("Failed to flush prompt")?;

        let mut line = String::new();
        // End of input reads zero bytes and falls through as a "no"
        self.input
            .read_line(&mut line)
            .context("Failed to read answer")?;

        Ok(is_affirmative(&line))
    }
}

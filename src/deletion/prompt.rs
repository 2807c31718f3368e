//! Confirmation providers
//!
//! `DeletionGuard` asks its questions through `ConfirmationProvider`, so the
//! same gate logic runs against a terminal, a script, or a test double.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::error::{ArchiveError, ArchiveResult};

/// How alarming a yes/no question is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Critical,
}

/// A yes/no question
#[derive(Debug, Clone)]
pub struct ConfirmRequest {
    pub severity: Severity,
    pub message: String,
}

/// Source of answers for the deletion gates
pub trait ConfirmationProvider {
    /// Ask a yes/no question; `true` only for an explicit yes
    fn confirm(&mut self, request: &ConfirmRequest) -> ArchiveResult<bool>;

    /// Ask for a typed token; `None` on end of input
    fn request_token(&mut self, prompt: &str) -> ArchiveResult<Option<String>>;
}

/// Interactive prompt over any reader and writer
pub struct ConsolePrompt<R, W> {
    input: R,
    output: W,
}

impl ConsolePrompt<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the process terminal
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, prompt: &str) -> ArchiveResult<Option<String>> {
        write!(self.output, "{}", prompt).map_err(|e| ArchiveError::Prompt(e.to_string()))?;
        self.output
            .flush()
            .map_err(|e| ArchiveError::Prompt(e.to_string()))?;

        // Bytes, not `read_line`: an undecodable answer is a "no", not a failure
        let mut line = Vec::new();
        let read = self
            .input
            .read_until(b'\n', &mut line)
            .map_err(|e| ArchiveError::Prompt(e.to_string()))?;

        if read == 0 {
            // End of input; keep the terminal tidy
            let _ = writeln!(self.output);
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&line).trim().to_string()))
    }
}

impl<R: BufRead, W: Write> ConfirmationProvider for ConsolePrompt<R, W> {
    fn confirm(&mut self, request: &ConfirmRequest) -> ArchiveResult<bool> {
        let prefix = match request.severity {
            Severity::Warning => "WARNING",
            Severity::Critical => "!!! FINAL CONFIRMATION !!!",
        };
        let prompt = format!("{} {} (yes/no): ", prefix, request.message);
        Ok(self.ask(&prompt)?.is_some_and(|answer| is_yes(&answer)))
    }

    fn request_token(&mut self, prompt: &str) -> ArchiveResult<Option<String>> {
        self.ask(&format!("{}: ", prompt))
    }
}

/// Pre-recorded answers, consumed in order
///
/// Running out of answers behaves like end of input.
#[derive(Debug, Default, Clone)]
pub struct ScriptedResponses {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedResponses {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Every question asked so far
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl ConfirmationProvider for ScriptedResponses {
    fn confirm(&mut self, request: &ConfirmRequest) -> ArchiveResult<bool> {
        self.asked.push(request.message.clone());
        Ok(self
            .answers
            .pop_front()
            .is_some_and(|answer| is_yes(answer.trim())))
    }

    fn request_token(&mut self, prompt: &str) -> ArchiveResult<Option<String>> {
        self.asked.push(prompt.to_string());
        Ok(self.answers.pop_front().map(|a| a.trim().to_string()))
    }
}

fn is_yes(answer: &str) -> bool {
    answer.eq_ignore_ascii_case("yes") || answer.eq_ignore_ascii_case("y")
}

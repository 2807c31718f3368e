//! Deletion guard state machine

use std::fmt;
use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use super::prompt::{ConfirmRequest, ConfirmationProvider, Severity};
use crate::error::ArchiveResult;
use crate::manifest::{Manifest, ManifestEntry};
use crate::report::ReportSink;

/// Literal token that must be typed at the last gate (case-sensitive)
pub const DELETE_TOKEN: &str = "DELETE";

/// The confirmation step at which the guard stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionGate {
    Primary,
    Final,
    Token,
}

impl fmt::Display for DeletionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "first confirmation"),
            Self::Final => write!(f, "final confirmation"),
            Self::Token => write!(f, "{} token", DELETE_TOKEN),
        }
    }
}

/// Guard states, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Idle,
    WarningShown,
    PrimaryConfirmed,
    FinallyConfirmed,
    Executing,
    Done,
    Aborted(DeletionGate),
}

impl GuardState {
    /// Whether no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted(_))
    }
}

/// A source file that could not be removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Per-file results of the deletion loop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionReport {
    pub deleted_count: usize,
    pub failed: Vec<DeletionFailure>,
}

impl DeletionReport {
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

/// How a guarded deletion ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// A gate was not passed; nothing was deleted
    Aborted(DeletionGate),
    /// All gates passed and the loop ran over every entry
    Completed(DeletionReport),
}

/// Walks the confirmation protocol and, if every gate passes, removes the
/// target source files
pub struct DeletionGuard<'a> {
    targets: Vec<&'a ManifestEntry>,
    state: GuardState,
    report: DeletionReport,
}

impl<'a> DeletionGuard<'a> {
    /// Guard over every entry in the manifest
    pub fn new(manifest: &'a Manifest) -> Self {
        Self::for_entries(manifest.entries().iter().collect())
    }

    /// Guard over a subset of entries; nothing outside `targets` is touched
    pub fn for_entries(targets: Vec<&'a ManifestEntry>) -> Self {
        Self {
            targets,
            state: GuardState::Idle,
            report: DeletionReport::default(),
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Perform one transition and return the new state
    ///
    /// Terminal states are left unchanged.
    pub fn advance(
        &mut self,
        prompts: &mut dyn ConfirmationProvider,
        reporter: &mut dyn ReportSink,
    ) -> ArchiveResult<GuardState> {
        let count = self.targets.len();
        let current = self.state;

        let next = match current {
            GuardState::Idle => {
                let total_bytes: u64 = self.targets.iter().map(|e| e.size_bytes()).sum();
                reporter.deletion_warning(count, total_bytes);
                GuardState::WarningShown
            }
            GuardState::WarningShown => {
                let request = ConfirmRequest {
                    severity: Severity::Warning,
                    message: "Permanently delete the original files now that they are archived?"
                        .to_string(),
                };
                if prompts.confirm(&request)? {
                    GuardState::PrimaryConfirmed
                } else {
                    GuardState::Aborted(DeletionGate::Primary)
                }
            }
            GuardState::PrimaryConfirmed => {
                let request = ConfirmRequest {
                    severity: Severity::Critical,
                    message: format!(
                        "This will PERMANENTLY DELETE {} file(s) from disk. Are you absolutely sure?",
                        count
                    ),
                };
                if prompts.confirm(&request)? {
                    GuardState::FinallyConfirmed
                } else {
                    GuardState::Aborted(DeletionGate::Final)
                }
            }
            GuardState::FinallyConfirmed => {
                let prompt = format!("Type {} to confirm deletion of {} file(s)", DELETE_TOKEN, count);
                match prompts.request_token(&prompt)? {
                    Some(token) if token == DELETE_TOKEN => GuardState::Executing,
                    _ => GuardState::Aborted(DeletionGate::Token),
                }
            }
            GuardState::Executing => {
                self.execute(reporter);
                GuardState::Done
            }
            terminal => terminal,
        };

        if let (false, GuardState::Aborted(gate)) = (current.is_terminal(), next) {
            info!(%gate, "deletion aborted by operator");
            reporter.deletion_aborted(gate);
        }
        self.state = next;

        Ok(self.state)
    }

    /// Drive the guard to a terminal state
    pub fn run(
        mut self,
        prompts: &mut dyn ConfirmationProvider,
        reporter: &mut dyn ReportSink,
    ) -> ArchiveResult<DeletionOutcome> {
        while !self.state.is_terminal() {
            self.advance(prompts, reporter)?;
        }

        Ok(match self.state {
            GuardState::Aborted(gate) => DeletionOutcome::Aborted(gate),
            _ => DeletionOutcome::Completed(self.report),
        })
    }

    /// Remove every source file; failures are recorded and the loop continues
    fn execute(&mut self, reporter: &mut dyn ReportSink) {
        info!(files = self.targets.len(), "deleting archived source files");

        for entry in &self.targets {
            match fs::remove_file(entry.original_path()) {
                Ok(()) => self.report.deleted_count += 1,
                Err(e) => {
                    let reason = e.to_string();
                    warn!(path = %entry.original_path().display(), reason = %reason, "delete failed");
                    reporter.deletion_failed(entry.original_path(), &reason);
                    self.report.failed.push(DeletionFailure {
                        path: entry.original_path().to_path_buf(),
                        reason,
                    });
                }
            }
        }

        reporter.deletion_finished(&self.report);
    }
}

//! Guarded removal of archived source files
//!
//! Deletion only runs after three independent confirmations:
//!
//! 1. A yes/no confirmation after the warning
//! 2. A second, higher-severity yes/no confirmation naming the file count
//! 3. Typing the literal token `DELETE`
//!
//! Any other answer aborts without touching the filesystem. Aborting is a
//! normal outcome, not an error.

mod guard;
mod prompt;

pub use guard::{
    DeletionFailure, DeletionGate, DeletionGuard, DeletionOutcome, DeletionReport, GuardState,
    DELETE_TOKEN,
};
pub use prompt::{ConfirmRequest, ConfirmationProvider, ConsolePrompt, ScriptedResponses, Severity};

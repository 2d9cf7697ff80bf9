//! Recoverable failures reported while the pipeline keeps going.

use std::fmt;

use tracing::warn;

use crate::error::{DobError, EntryError};

/// A failure that cost one entry or one record, never the whole run.
#[derive(Debug)]
pub enum Diagnostic {
    /// The entry at `index` was skipped.
    Entry { index: usize, error: EntryError },
    /// A record was excluded because its date of birth did not parse.
    Record(DobError),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Entry { error, .. } => write!(f, "{}", error),
            Diagnostic::Record(error) => write!(f, "{}", error),
        }
    }
}

/// Receives diagnostics as they happen.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Collects diagnostics for later inspection.
impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Emits every diagnostic as a `tracing` warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::Entry { index, error } => {
                warn!(entry = index, subject = %error.subject(), "{}", diagnostic)
            }
            Diagnostic::Record(error) => warn!(username = %error.username, "{}", diagnostic),
        }
    }
}

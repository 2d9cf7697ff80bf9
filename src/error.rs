//! Error types, split by how far a failure reaches.
//!
//! - [`PipelineError`] aborts the whole run and is returned to the caller.
//! - [`EntryError`] skips one archive entry.
//! - [`DobError`] drops one employee record.
//!
//! The last two never stop the run; they are handed to a
//! [`DiagnosticSink`](crate::diagnostics::DiagnosticSink) instead.

use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop the run before any output is written.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The request could not be sent or the connection failed.
    #[error("Error calling API: {0}")]
    Request(#[source] reqwest::Error),

    /// The server answered with something other than `200 OK`.
    #[error("Error calling API: {0}")]
    Status(reqwest::StatusCode),

    #[error("Error reading response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("Error opening archive {}: {cause}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        cause: std::io::Error,
    },

    /// The bytes do not form a readable ZIP central directory.
    #[error("Error creating zip reader: {0:#}")]
    InvalidArchive(anyhow::Error),
}

/// Failures confined to a single archive entry.
#[derive(Debug, Error)]
pub enum EntryError {
    #[error("Problem with zip: {name}: {cause:#}")]
    Extract { name: String, cause: anyhow::Error },

    #[error("Ignored invalid employees JSON: {name}")]
    Decode {
        name: String,
        #[source]
        cause: serde_json::Error,
    },

    #[error("Error writing to file: {}: {cause}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        cause: std::io::Error,
    },
}

impl EntryError {
    /// Name of the archive entry, or the output path for write failures.
    pub fn subject(&self) -> String {
        match self {
            EntryError::Extract { name, .. } | EntryError::Decode { name, .. } => name.clone(),
            EntryError::Write { path, .. } => path.display().to_string(),
        }
    }
}

/// A date of birth that is not an RFC3339 timestamp.
#[derive(Debug, Error)]
#[error("Error checking if employee was born in summer: {username}, {cause}")]
pub struct DobError {
    pub username: String,
    #[source]
    pub cause: DobFormatError,
}

/// Why a date of birth was rejected.
///
/// chrono's RFC3339 parser is lenient in a few places; the extra variants
/// cover the forms that are still refused.
#[derive(Debug, Error)]
pub enum DobFormatError {
    #[error(transparent)]
    Parse(#[from] chrono::ParseError),

    #[error("date and time must be separated by 'T'")]
    Separator,

    #[error("UTC must be written as 'Z'")]
    LowercaseZulu,

    #[error("second out of range")]
    LeapSecond,
}

//! # staffsift
//!
//! Fetches a ZIP archive of employee JSON batches and writes, for every
//! batch, the salaried employees born between June and September as CSV.
//!
//! ## Pipeline
//!
//! 1. Download the archive with a single GET (or open a local file)
//! 2. Read the ZIP central directory; STORED and DEFLATE entries are supported
//! 3. Decode each entry as a JSON array of employee records
//! 4. Keep salaried employees with summer birthdays, shorten long names
//! 5. Write `employees_<N>.csv` for entry `N`
//!
//! Failing to get or parse the archive stops the run. Problems with a
//! single entry or record are handed to a [`DiagnosticSink`] and the run
//! carries on.
//!
//! ## Example
//!
//! ```no_run
//! use staffsift::{Config, LogSink, run};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_url("https://example.com/employees.zip").with_output_dir("out");
//!     let summary = run(&config, &mut LogSink).await?;
//!     println!("wrote {} files", summary.files_written.len());
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod cli;
pub mod config;
pub mod csv;
pub mod diagnostics;
pub mod employee;
pub mod error;
pub mod filter;
pub mod io;
pub mod pipeline;

pub use archive::{ArchiveEntry, ArchiveReader};
pub use cli::Cli;
pub use config::{Config, DEFAULT_URL, Source};
pub use diagnostics::{Diagnostic, DiagnosticSink, LogSink};
pub use employee::{CleanEmployee, Name, RawEmployee};
pub use error::{DobError, DobFormatError, EntryError, PipelineError};
pub use io::{HttpFetcher, LocalFileReader, MemoryReader, ReadAt};
pub use pipeline::{RunSummary, process_archive, run};

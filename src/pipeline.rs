//! The fetch → extract → filter → write pipeline.
//!
//! Entries are handled strictly one after another. Only a failure to obtain
//! or parse the archive itself ends the run early; anything that goes wrong
//! with a single entry or record is reported to the [`DiagnosticSink`] and
//! processing moves on.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::archive::{ArchiveEntry, ArchiveReader};
use crate::config::{Config, Source};
use crate::csv;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::employee::decode_employees;
use crate::error::{EntryError, PipelineError};
use crate::filter::filter_employees;
use crate::io::{HttpFetcher, LocalFileReader, MemoryReader, ReadAt};

/// What a completed run produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Entries listed in the archive's central directory.
    pub entries: usize,
    /// Entries that produced no file.
    pub skipped: usize,
    /// CSV files written, in entry order.
    pub files_written: Vec<PathBuf>,
    /// Data rows across all written files.
    pub employees_written: usize,
}

/// Run the whole pipeline for `config`.
pub async fn run(
    config: &Config,
    sink: &mut dyn DiagnosticSink,
) -> Result<RunSummary, PipelineError> {
    match &config.source {
        Source::Url(url) => {
            info!(url = %url, "fetching archive");
            let bytes = HttpFetcher::new()?.fetch(url).await?;
            let reader = Arc::new(MemoryReader::new(bytes));
            process_archive(reader, &config.output_dir, sink).await
        }
        Source::File(path) => {
            info!(path = %path.display(), "opening archive");
            let reader = LocalFileReader::new(path).map_err(|cause| PipelineError::Open {
                path: path.clone(),
                cause,
            })?;
            process_archive(Arc::new(reader), &config.output_dir, sink).await
        }
    }
}

/// Turn every entry of an already obtained archive into a CSV file.
pub async fn process_archive<R: ReadAt>(
    reader: Arc<R>,
    output_dir: &Path,
    sink: &mut dyn DiagnosticSink,
) -> Result<RunSummary, PipelineError> {
    let archive = ArchiveReader::new(reader);
    let entries = archive
        .entries()
        .await
        .map_err(PipelineError::InvalidArchive)?;
    info!(entries = entries.len(), "archive opened");

    let mut summary = RunSummary {
        entries: entries.len(),
        ..RunSummary::default()
    };

    for entry in &entries {
        match process_entry(&archive, entry, output_dir, sink).await {
            Ok((path, rows)) => {
                debug!(entry = %entry.name, path = %path.display(), rows, "wrote csv");
                summary.files_written.push(path);
                summary.employees_written += rows;
            }
            Err(error) => {
                summary.skipped += 1;
                sink.report(Diagnostic::Entry {
                    index: entry.index,
                    error,
                });
            }
        }
    }

    info!(
        written = summary.files_written.len(),
        skipped = summary.skipped,
        employees = summary.employees_written,
        "run complete"
    );
    Ok(summary)
}

async fn process_entry<R: ReadAt>(
    archive: &ArchiveReader<R>,
    entry: &ArchiveEntry,
    output_dir: &Path,
    sink: &mut dyn DiagnosticSink,
) -> Result<(PathBuf, usize), EntryError> {
    let bytes = archive
        .read_entry(entry)
        .await
        .map_err(|cause| EntryError::Extract {
            name: entry.name.clone(),
            cause,
        })?;

    let employees = decode_employees(&bytes).map_err(|cause| EntryError::Decode {
        name: entry.name.clone(),
        cause,
    })?;

    let kept = filter_employees(&employees, sink);
    debug!(
        entry = %entry.name,
        decoded = employees.len(),
        kept = kept.len(),
        "filtered employees"
    );

    let path = csv::write(output_dir, entry.index, &kept).await?;
    Ok((path, kept.len()))
}

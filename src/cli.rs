use clap::Parser;
use std::path::PathBuf;

use crate::config::{Config, DEFAULT_URL, Source};

#[derive(Parser, Debug)]
#[command(name = "staffsift")]
#[command(version)]
#[command(about = "Write salaried employees with summer birthdays from a ZIP of JSON batches to CSV", long_about = None)]
#[command(after_help = "Examples:\n  \
  staffsift                                  fetch the default archive into ./employees_<N>.csv\n  \
  staffsift --url http://localhost/e.zip -d out   fetch another archive, write into out/\n  \
  staffsift --file employees.zip -q          process a local archive, warnings suppressed")]
pub struct Cli {
    /// Archive URL
    #[arg(long, value_name = "URL", default_value = DEFAULT_URL, conflicts_with = "file")]
    pub url: String,

    /// Read a local archive instead of fetching one
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Write CSV files into DIR
    #[arg(short = 'd', value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// More log output (-vv for trace)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Less log output (-qq => errors off too)
    #[arg(short = 'q', action = clap::ArgAction::Count, conflicts_with = "verbose")]
    pub quiet: u8,
}

impl Cli {
    pub fn config(&self) -> Config {
        let source = match &self.file {
            Some(path) => Source::File(path.clone()),
            None => Source::Url(self.url.clone()),
        };
        Config {
            source,
            output_dir: self.output_dir.clone(),
        }
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (q, _) if q > 1 => "off",
            (1, _) => "error",
            (_, 0) => "info",
            (_, 1) => "debug",
            _ => "trace",
        }
    }
}

//! Command-line entry point for staffsift.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use staffsift::{Cli, LogSink, run};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    fmt().with_env_filter(env).with_writer(std::io::stderr).init();

    let config = cli.config();
    if let Err(err) = tokio::fs::create_dir_all(&config.output_dir).await {
        error!(dir = %config.output_dir.display(), "cannot create output directory: {}", err);
        return ExitCode::FAILURE;
    }

    match run(&config, &mut LogSink).await {
        Ok(summary) => {
            info!(
                "{} of {} entries written to {}",
                summary.files_written.len(),
                summary.entries,
                config.output_dir.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

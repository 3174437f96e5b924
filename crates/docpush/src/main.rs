//! docpush - push a JSON file of records into MongoDB

use clap::Parser;
use docpush::clock::SystemClock;
use docpush::store::MongoConnector;
use docpush::{pipeline, report, Cli, IngestError};
use docpush_common::logging::{init_logging, LogConfig, LogLevel};
use std::process;
use tracing::{debug, error};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("docpush")
        .build();

    // The tool must work without logging, so setup failures are ignored
    let guard = log_config
        .merge_env()
        .and_then(|config| init_logging(&config))
        .ok();

    let request = cli.to_request();
    match pipeline::run(&request, &MongoConnector, &SystemClock).await {
        Ok(summary) => report::report(&summary),
        Err(e) => {
            // A missing file reports on the single `Error:` line only
            if matches!(e, IngestError::FileNotFound(_)) {
                debug!(error = %e, "Ingestion failed");
            } else {
                error!(error = %e, "Ingestion failed");
            }
            eprintln!("Error: {}", e);
            // exit() skips destructors; flush file logs first
            drop(guard);
            process::exit(1);
        },
    }
}

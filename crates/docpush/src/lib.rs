//! docpush library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Reads a JSON array of records from a file, stamps each record with a
//! Pacific-time `created_at`, a tag list and a fixed `meta` block, and inserts
//! them into a MongoDB collection in one bulk insert.
//!
//! # Example
//!
//! ```no_run
//! use docpush::clock::SystemClock;
//! use docpush::pipeline::{self, IngestRequest};
//! use docpush::store::{ConnectionSettings, MongoConnector, Target};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> docpush::Result<()> {
//!     let request = IngestRequest {
//!         json_path: "results.json".into(),
//!         tags: docpush::tags::parse_tags(Some("nightly, gpu")),
//!         settings: ConnectionSettings {
//!             user: "root".into(),
//!             password: "example".into(),
//!             host: "localhost".into(),
//!             port: 27017,
//!         },
//!         target: Target {
//!             db_name: "perf".into(),
//!             collection: "runs".into(),
//!         },
//!     };
//!
//!     let summary = pipeline::run(&request, &MongoConnector, &SystemClock).await?;
//!     docpush::report::report(&summary);
//!     Ok(())
//! }
//! ```

pub mod clock;
pub mod error;
pub mod pipeline;
pub mod records;
pub mod report;
pub mod store;
pub mod tags;

pub use error::{IngestError, Result};

use clap::Parser;
use pipeline::IngestRequest;
use std::path::PathBuf;
use store::{ConnectionSettings, Target};

/// Insert JSON items into MongoDB with PT timestamps.
#[derive(Parser, Debug)]
#[command(name = "docpush")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the JSON file
    #[arg(short, long)]
    pub json: PathBuf,

    /// MongoDB database name
    #[arg(short, long = "db_name")]
    pub db_name: String,

    /// MongoDB collection name
    #[arg(short, long)]
    pub collection: String,

    /// MongoDB username
    #[arg(short, long)]
    pub user: String,

    /// MongoDB password
    #[arg(short, long)]
    pub password: String,

    /// MongoDB host
    #[arg(short = 'H', long)]
    pub host: String,

    /// MongoDB port
    #[arg(short = 'P', long)]
    pub port: u16,

    /// Comma-separated list of tags to add to each entry
    #[arg(short, long)]
    pub tags: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn to_request(&self) -> IngestRequest {
        IngestRequest {
            json_path: self.json.clone(),
            tags: tags::parse_tags(self.tags.as_deref()),
            settings: ConnectionSettings {
                user: self.user.clone(),
                password: self.password.clone(),
                host: self.host.clone(),
                port: self.port,
            },
            target: Target {
                db_name: self.db_name.clone(),
                collection: self.collection.clone(),
            },
        }
    }
}

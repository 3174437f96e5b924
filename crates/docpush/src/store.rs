//! MongoDB connection and bulk insert
//!
//! The pipeline talks to storage through [`Connector`] and [`DocumentSink`].
//! [`MongoConnector`] is the production implementation; tests substitute an
//! in-memory one.

use crate::error::Result;
use async_trait::async_trait;
use bson::Document;
use mongodb::{Client, Collection};
use std::fmt;
use tracing::{debug, info, instrument};

/// URI scheme for the standard (non-SRV) connection string
pub const URI_SCHEME: &str = "mongodb";

/// Credentials and address of the database server
#[derive(Clone)]
pub struct ConnectionSettings {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
}

impl ConnectionSettings {
    /// Connection string authenticating against the `admin` database.
    ///
    /// User and password are percent-encoded.
    pub fn uri(&self) -> String {
        format!(
            "{}://{}:{}@{}:{}/?authSource=admin",
            URI_SCHEME,
            urlencoding::encode(&self.user),
            urlencoding::encode(&self.password),
            self.host,
            self.port
        )
    }

    /// Same as [`uri`](Self::uri) with the password masked, for logs.
    pub fn redacted_uri(&self) -> String {
        format!(
            "{}://{}:****@{}:{}/?authSource=admin",
            URI_SCHEME,
            urlencoding::encode(&self.user),
            self.host,
            self.port
        )
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("user", &self.user)
            .field("password", &"****")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

/// Database and collection receiving the records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub db_name: String,
    pub collection: String,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.db_name, self.collection)
    }
}

/// Destination for one bulk insert
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Insert all documents in one request and return how many ids came back.
    async fn insert_many(&self, documents: Vec<Document>) -> Result<usize>;
}

/// Opens a [`DocumentSink`] for a target
#[async_trait]
pub trait Connector: Send + Sync {
    type Sink: DocumentSink;

    async fn connect(&self, settings: &ConnectionSettings, target: &Target) -> Result<Self::Sink>;
}

/// Connects with the official MongoDB driver
#[derive(Debug, Clone, Copy, Default)]
pub struct MongoConnector;

#[async_trait]
impl Connector for MongoConnector {
    type Sink = MongoSink;

    #[instrument(skip_all, fields(uri = %settings.redacted_uri(), db_target = %target))]
    async fn connect(&self, settings: &ConnectionSettings, target: &Target) -> Result<MongoSink> {
        debug!("Opening MongoDB client");
        let client = Client::with_uri_str(settings.uri()).await?;
        let collection = client
            .database(&target.db_name)
            .collection::<Document>(&target.collection);

        Ok(MongoSink { collection })
    }
}

/// A collection handle scoped to one `db.collection`
#[derive(Debug, Clone)]
pub struct MongoSink {
    collection: Collection<Document>,
}

#[async_trait]
impl DocumentSink for MongoSink {
    #[instrument(skip_all, fields(count = documents.len()))]
    async fn insert_many(&self, documents: Vec<Document>) -> Result<usize> {
        let result = self.collection.insert_many(documents).await?;
        info!(inserted = result.inserted_ids.len(), "Bulk insert finished");
        Ok(result.inserted_ids.len())
    }
}

//! MongoDB test container for docpush integration tests
//!
//! Starts the official `mongo` image with a root user so the binary can
//! authenticate against `admin`, exactly as it does in production.

#![allow(dead_code)]

use anyhow::{Context, Result};
use mongodb::bson::{doc, Document};
use mongodb::{Client, Collection};
use std::time::Duration;
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};
use tracing::{debug, info};

pub const MONGO_USER: &str = "root";
pub const MONGO_PASSWORD: &str = "example";
const MONGO_PORT: u16 = 27017;

/// Running MongoDB container plus a client authenticated as root
pub struct TestMongo {
    _container: ContainerAsync<GenericImage>,
    client: Client,
    host: String,
    port: u16,
}

impl TestMongo {
    pub async fn start() -> Result<Self> {
        info!("Starting MongoDB test container...");

        let container = GenericImage::new("mongo", "7.0")
            .with_exposed_port(MONGO_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Waiting for connections"))
            .with_env_var("MONGO_INITDB_ROOT_USERNAME", MONGO_USER)
            .with_env_var("MONGO_INITDB_ROOT_PASSWORD", MONGO_PASSWORD)
            .start()
            .await
            .context("Failed to start MongoDB container")?;

        let host = container
            .get_host()
            .await
            .context("Failed to get container host")?
            .to_string();
        let port = container
            .get_host_port_ipv4(MONGO_PORT.tcp())
            .await
            .context("Failed to get container port")?;

        let uri = format!(
            "mongodb://{}:{}@{}:{}/?authSource=admin",
            MONGO_USER, MONGO_PASSWORD, host, port
        );
        let client = Client::with_uri_str(&uri)
            .await
            .context("Failed to create MongoDB client")?;

        let mongo = Self {
            _container: container,
            client,
            host,
            port,
        };
        mongo.wait_until_ready().await?;
        Ok(mongo)
    }

    /// The image logs "Waiting for connections" once for its init server
    /// too, so poll until the real server accepts the root user.
    async fn wait_until_ready(&self) -> Result<()> {
        let mut last_error = None;
        for attempt in 1..=30 {
            match self
                .client
                .database("admin")
                .run_command(doc! { "ping": 1 })
                .await
            {
                Ok(_) => return Ok(()),
                Err(e) => {
                    debug!(attempt, error = %e, "MongoDB not ready yet");
                    last_error = Some(e);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                },
            }
        }
        Err(anyhow::anyhow!("MongoDB never became ready: {:?}", last_error))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn collection(&self, db_name: &str, collection: &str) -> Collection<Document> {
        self.client.database(db_name).collection(collection)
    }
}

pub fn init_test_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,docpush=debug,testcontainers=info")),
        )
        .with_test_writer()
        .try_init();
}

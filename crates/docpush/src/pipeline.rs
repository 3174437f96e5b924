//! The ingestion run
//!
//! validate → load → enrich → connect → insert, strictly in that order.
//! Nothing touches the database until the input has been read and enriched.

use crate::clock::Clock;
use crate::error::Result;
use crate::records::{enrich, load_records, validate_input};
use crate::report::IngestSummary;
use crate::store::{ConnectionSettings, Connector, DocumentSink, Target};
use std::path::PathBuf;
use tracing::{debug, info, instrument};

/// Everything one run needs, already parsed from the command line
#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub json_path: PathBuf,
    pub tags: Vec<String>,
    pub settings: ConnectionSettings,
    pub target: Target,
}

#[instrument(skip_all, fields(json = %request.json_path.display(), db_target = %request.target))]
pub async fn run<C, K>(request: &IngestRequest, connector: &C, clock: &K) -> Result<IngestSummary>
where
    C: Connector,
    K: Clock + ?Sized,
{
    validate_input(&request.json_path)?;

    let mut records = load_records(&request.json_path)?;
    info!(count = records.len(), "Loaded records");

    let now = clock.now();
    let source_file = request.json_path.to_string_lossy();
    enrich(&mut records, &source_file, &request.tags, now);
    debug!(created_at = %now.to_rfc3339(), tags = ?request.tags, "Enriched records");

    let sink = connector.connect(&request.settings, &request.target).await?;
    let inserted = sink.insert_many(records).await?;

    Ok(IngestSummary {
        inserted,
        target: request.target.clone(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::IngestError;
    use async_trait::async_trait;
    use bson::Document;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::{NamedTempFile, TempDir};

    /// Collections keyed by "db.collection"
    #[derive(Default, Clone)]
    struct MemoryConnector {
        collections: Arc<Mutex<HashMap<String, Vec<Document>>>>,
        connects: Arc<AtomicUsize>,
    }

    impl MemoryConnector {
        fn count(&self, target: &Target) -> usize {
            self.collections
                .lock()
                .unwrap()
                .get(&target.to_string())
                .map_or(0, Vec::len)
        }

        fn documents(&self, target: &Target) -> Vec<Document> {
            self.collections
                .lock()
                .unwrap()
                .get(&target.to_string())
                .cloned()
                .unwrap_or_default()
        }

        fn connects(&self) -> usize {
            self.connects.load(Ordering::SeqCst)
        }
    }

    struct MemorySink {
        key: String,
        collections: Arc<Mutex<HashMap<String, Vec<Document>>>>,
    }

    #[async_trait]
    impl DocumentSink for MemorySink {
        async fn insert_many(&self, documents: Vec<Document>) -> Result<usize> {
            let inserted = documents.len();
            self.collections
                .lock()
                .unwrap()
                .entry(self.key.clone())
                .or_default()
                .extend(documents);
            Ok(inserted)
        }
    }

    #[async_trait]
    impl Connector for MemoryConnector {
        type Sink = MemorySink;

        async fn connect(&self, _settings: &ConnectionSettings, target: &Target) -> Result<MemorySink> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(MemorySink {
                key: target.to_string(),
                collections: Arc::clone(&self.collections),
            })
        }
    }

    fn json_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn request(path: PathBuf, tags: Vec<String>) -> IngestRequest {
        IngestRequest {
            json_path: path,
            tags,
            settings: ConnectionSettings {
                user: "root".to_string(),
                password: "example".to_string(),
                host: "localhost".to_string(),
                port: 27017,
            },
            target: Target {
                db_name: "perf".to_string(),
                collection: "runs".to_string(),
            },
        }
    }

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_run_inserts_every_record() {
        let file = json_file(r#"[{"id": 1}, {"id": 2}, {"id": 3}]"#);
        let req = request(file.path().to_path_buf(), vec!["gpu".to_string()]);
        let connector = MemoryConnector::default();

        let summary = run(&req, &connector, &clock()).await.unwrap();

        assert_eq!(summary.inserted, 3);
        assert_eq!(summary.target, req.target);
        assert_eq!(connector.connects(), 1);

        let source = file.path().to_string_lossy().to_string();
        for doc in connector.documents(&req.target) {
            assert!(doc.get_datetime("created_at").is_ok());
            assert_eq!(doc.get_array("tags").unwrap().len(), 1);
            let meta = doc.get_document("meta").unwrap();
            assert_eq!(meta.get_i32("schema_version").unwrap(), 2);
            assert_eq!(meta.get_str("source_file").unwrap(), source);
            assert_eq!(meta.get_str("notes").unwrap(), "");
        }
    }

    #[tokio::test]
    async fn test_run_twice_doubles_collection() {
        let file = json_file(r#"[{"id": 1}, {"id": 2}]"#);
        let req = request(file.path().to_path_buf(), Vec::new());
        let connector = MemoryConnector::default();

        run(&req, &connector, &clock()).await.unwrap();
        assert_eq!(connector.count(&req.target), 2);

        run(&req, &connector, &clock()).await.unwrap();
        assert_eq!(connector.count(&req.target), 4);
    }

    #[tokio::test]
    async fn test_missing_file_never_connects() {
        let dir = TempDir::new().unwrap();
        let req = request(dir.path().join("absent.json"), Vec::new());
        let connector = MemoryConnector::default();

        let err = run(&req, &connector, &clock()).await.unwrap_err();

        assert!(matches!(err, IngestError::FileNotFound(_)));
        assert!(err.to_string().contains("absent.json"));
        assert_eq!(connector.connects(), 0);
    }

    #[tokio::test]
    async fn test_object_input_never_connects() {
        let file = json_file(r#"{"id": 1}"#);
        let req = request(file.path().to_path_buf(), Vec::new());
        let connector = MemoryConnector::default();

        let err = run(&req, &connector, &clock()).await.unwrap_err();

        assert!(matches!(err, IngestError::JsonParse(_)));
        assert_eq!(connector.connects(), 0);
    }

    #[tokio::test]
    async fn test_oversized_integer_never_connects() {
        let file = json_file(r#"[{"ok": 1}, {"n": 18446744073709551615}]"#);
        let req = request(file.path().to_path_buf(), Vec::new());
        let connector = MemoryConnector::default();

        let err = run(&req, &connector, &clock()).await.unwrap_err();

        assert!(matches!(err, IngestError::Bson(_)));
        assert_eq!(connector.connects(), 0);
    }

    #[tokio::test]
    async fn test_source_file_is_path_as_given() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("..").join("items.json");
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("items.json"), r#"[{"a": 1}]"#).unwrap();

        let req = request(path.clone(), Vec::new());
        let connector = MemoryConnector::default();
        run(&req, &connector, &clock()).await.unwrap();

        let doc = &connector.documents(&req.target)[0];
        assert_eq!(
            doc.get_document("meta").unwrap().get_str("source_file").unwrap(),
            path.to_string_lossy()
        );
    }
}

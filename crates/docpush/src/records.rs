//! Input loading and record enrichment

use crate::error::{IngestError, Result};
use bson::{doc, Bson, Document};
use chrono::DateTime;
use chrono_tz::Tz;
use serde_json::{Map, Number, Value};
use std::path::Path;
use tracing::debug;

/// Version of the `meta` block written into every record
pub const SCHEMA_VERSION: i32 = 2;

/// Fail unless `path` names an existing regular file.
pub fn validate_input(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(IngestError::file_not_found(path.display().to_string()))
    }
}

/// Read the whole file and decode it as a JSON array of objects.
///
/// Field order inside each object is kept as written.
pub fn load_records(path: &Path) -> Result<Vec<Document>> {
    let content = std::fs::read_to_string(path)?;
    let objects: Vec<Map<String, Value>> = serde_json::from_str(&content)?;

    debug!(count = objects.len(), path = %path.display(), "Decoded input records");

    objects.into_iter().map(object_to_document).collect()
}

fn object_to_document(object: Map<String, Value>) -> Result<Document> {
    object
        .into_iter()
        .map(|(key, value)| Ok((key, value_to_bson(value)?)))
        .collect()
}

fn value_to_bson(value: Value) -> Result<Bson> {
    Ok(match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(b),
        Value::Number(n) => number_to_bson(&n)?,
        Value::String(s) => Bson::String(s),
        Value::Array(items) => Bson::Array(
            items
                .into_iter()
                .map(value_to_bson)
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Object(object) => Bson::Document(object_to_document(object)?),
    })
}

/// Whole numbers take the narrowest signed integer type that holds them.
fn number_to_bson(n: &Number) -> Result<Bson> {
    if let Some(i) = n.as_i64() {
        return Ok(i32::try_from(i).map_or(Bson::Int64(i), Bson::Int32));
    }
    if n.is_u64() {
        return Err(IngestError::Bson(format!(
            "integer {n} does not fit in a signed 64-bit integer"
        )));
    }
    n.as_f64()
        .map(Bson::Double)
        .ok_or_else(|| IngestError::Bson(format!("unsupported number {n}")))
}

/// Stamp every record with `created_at`, `tags`, and the `meta` block.
///
/// Existing fields with those names are replaced; nothing else is touched.
pub fn enrich(records: &mut [Document], source_path: &str, tags: &[String], now: DateTime<Tz>) {
    let created_at = bson::DateTime::from_chrono(now);
    let tags: Vec<Bson> = tags.iter().cloned().map(Bson::String).collect();
    let meta = doc! {
        "source_file": source_path,
        "notes": "",
        "schema_version": SCHEMA_VERSION,
    };

    for record in records.iter_mut() {
        record.insert("created_at", created_at);
        record.insert("tags", tags.clone());
        record.insert("meta", meta.clone());
    }
}

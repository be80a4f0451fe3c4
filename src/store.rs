//! Flat-file record storage.
//!
//! The whole collection lives in one JSON object keyed by patient id;
//! values are the stored fields (no id, no derived fields). Every
//! mutation is a full read-modify-write cycle, so the store only needs
//! a read-all/write-all contract.

use crate::model::PatientFields;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;
use tracing::info;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("patient data file not found: {0:?}")]
    NotFound(PathBuf),
    #[error("patient data file is malformed: {0}")]
    Malformed(String),
    #[error("failed to access patient data file: {0}")]
    Io(#[from] std::io::Error),
}

/// The full collection, in the data file's document order. Order matters:
/// it is the tiebreak for the stable sort endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Records(Vec<(String, PatientFields)>);

impl Records {
    pub fn get(&self, id: &str) -> Option<&PatientFields> {
        self.0.iter().find(|(k, _)| k == id).map(|(_, f)| f)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|(k, _)| k == id)
    }

    /// Replaces an existing record in place, or appends a new one.
    pub fn insert(&mut self, id: String, fields: PatientFields) {
        match self.0.iter_mut().find(|(k, _)| *k == id) {
            Some((_, existing)) => *existing = fields,
            None => self.0.push((id, fields)),
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<PatientFields> {
        let idx = self.0.iter().position(|(k, _)| k == id)?;
        Some(self.0.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PatientFields)> {
        self.0.iter().map(|(id, fields)| (id.as_str(), fields))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Read-all/write-all contract over the persisted collection.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn load(&self) -> Result<Records, StoreError>;
    async fn save(&self, records: &Records) -> Result<(), StoreError>;
}

/// JSON file implementation with atomic writes (temp file + rename).
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Seed an empty collection if the data file does not exist yet, so a
    /// fresh server starts out usable.
    pub async fn ensure_exists(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        if !fs::try_exists(&self.path).await? {
            fs::write(&self.path, "{}").await?;
            info!("Seeded empty patient data file at {:?}", self.path);
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn load(&self) -> Result<Records, StoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        // serde_json's preserve_order keeps the document order of the map.
        let raw: Map<String, Value> =
            serde_json::from_str(&content).map_err(|e| StoreError::Malformed(e.to_string()))?;

        let mut records = Records::default();
        for (id, value) in raw {
            let fields: PatientFields = serde_json::from_value(value)
                .map_err(|e| StoreError::Malformed(format!("record {id}: {e}")))?;
            records.insert(id, fields);
        }
        Ok(records)
    }

    async fn save(&self, records: &Records) -> Result<(), StoreError> {
        let mut raw = Map::new();
        for (id, fields) in records.iter() {
            let value = serde_json::to_value(fields)
                .map_err(|e| StoreError::Malformed(e.to_string()))?;
            raw.insert(id.to_string(), value);
        }
        let json = serde_json::to_string_pretty(&Value::Object(raw))
            .map_err(|e| StoreError::Malformed(e.to_string()))?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, json).await?;
        fs::rename(&temp_path, &self.path).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Gender;
    use tempfile::TempDir;

    fn fields(height: f64, weight: f64) -> PatientFields {
        PatientFields {
            name: "Test".into(),
            city: "X".into(),
            age: 30,
            gender: Gender::Other,
            height,
            weight,
        }
    }

    #[tokio::test]
    async fn round_trips_in_document_order() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("patient.json"));

        let mut records = Records::default();
        records.insert("P003".into(), fields(1.5, 60.0));
        records.insert("P001".into(), fields(1.6, 70.0));
        records.insert("P002".into(), fields(1.5, 80.0));
        store.save(&records).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, records);

        let ids: Vec<&str> = loaded.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["P003", "P001", "P002"]);
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent.json"));

        assert!(matches!(
            store.load().await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn malformed_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("patient.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let store = JsonFileStore::new(path);
        assert!(matches!(
            store.load().await,
            Err(StoreError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn ensure_exists_seeds_empty_collection() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("data").join("patient.json"));

        store.ensure_exists().await.unwrap();
        let records = store.load().await.unwrap();
        assert!(records.is_empty());

        // Does not clobber an existing file.
        let mut records = Records::default();
        records.insert("P001".into(), fields(1.8, 90.0));
        store.save(&records).await.unwrap();
        store.ensure_exists().await.unwrap();
        assert_eq!(store.load().await.unwrap().len(), 1);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut records = Records::default();
        records.insert("P001".into(), fields(1.5, 60.0));
        records.insert("P002".into(), fields(1.6, 70.0));
        records.insert("P001".into(), fields(1.7, 80.0));

        let ids: Vec<&str> = records.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["P001", "P002"]);
        assert_eq!(records.get("P001").unwrap().height, 1.7);
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let mut records = Records::default();
        records.insert("P001".into(), fields(1.5, 60.0));
        records.insert("P002".into(), fields(1.6, 70.0));
        records.insert("P003".into(), fields(1.7, 80.0));

        assert!(records.remove("P002").is_some());
        assert!(records.remove("P002").is_none());

        let ids: Vec<&str> = records.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["P001", "P003"]);
    }
}

//! Persistence backends for captured collections
//!
//! Each kind (`images` / `texts`) is stored as one ordered JSON record,
//! newest first. Backends are pluggable behind the `Storage` trait: an
//! embedded redb database for the default local store and an in-memory
//! backend with an optional byte quota.

use std::path::Path;
use std::sync::Mutex;

use directories::ProjectDirs;
use redb::{Database, TableDefinition};

use crate::shared::errors::{CaptureError, CaptureResult};
use crate::shared::types::{CapturedItem, ItemKind};

/// Redb table: key = collection key ("images"/"texts"), value = JSON array
const COLLECTIONS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("collections");

/// Storage backend for captured collections
pub trait Storage: Send + Sync {
    /// Load one collection, newest first; missing data is an empty list
    fn load(&self, kind: ItemKind) -> CaptureResult<Vec<CapturedItem>>;

    /// Persist one collection; `CaptureError::QuotaExceeded` signals that
    /// the backend is out of capacity and the caller should trim and retry
    fn save(&self, kind: ItemKind, items: &[CapturedItem]) -> CaptureResult<()>;
}

/// Embedded-database storage under the user data directory
pub struct RedbStorage {
    db: Mutex<Database>,
}

impl RedbStorage {
    pub fn new() -> CaptureResult<Self> {
        let proj_dirs = ProjectDirs::from("com", "clipkeep", "clipkeep")
            .ok_or_else(|| CaptureError::Storage("Failed to get project directories".to_string()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .map_err(|e| CaptureError::Storage(format!("Failed to create data directory: {}", e)))?;

        Self::open(data_dir.join("collections.redb"))
    }

    /// Open (or create) a database at an explicit path
    pub fn open(path: impl AsRef<Path>) -> CaptureResult<Self> {
        let db = Database::create(path)
            .map_err(|e| CaptureError::Storage(format!("Failed to create database: {}", e)))?;

        // Make sure the table exists so loads on a fresh database succeed
        {
            let write_txn = db
                .begin_write()
                .map_err(|e| CaptureError::Storage(format!("Failed to begin write: {}", e)))?;
            {
                let _table = write_txn
                    .open_table(COLLECTIONS_TABLE)
                    .map_err(|e| CaptureError::Storage(format!("Failed to open table: {}", e)))?;
            }
            write_txn
                .commit()
                .map_err(|e| CaptureError::Storage(format!("Failed to commit: {}", e)))?;
        }

        Ok(Self { db: Mutex::new(db) })
    }
}

impl Storage for RedbStorage {
    fn load(&self, kind: ItemKind) -> CaptureResult<Vec<CapturedItem>> {
        let db = self
            .db
            .lock()
            .map_err(|e| CaptureError::Storage(format!("Mutex poisoned: {}", e)))?;

        let read_txn = db
            .begin_read()
            .map_err(|e| CaptureError::Storage(format!("Failed to begin read: {}", e)))?;
        let table = read_txn
            .open_table(COLLECTIONS_TABLE)
            .map_err(|e| CaptureError::Storage(format!("Failed to open table: {}", e)))?;

        let record = table
            .get(kind.collection_key())
            .map_err(|e| CaptureError::Storage(format!("Failed to read record: {}", e)))?;

        match record {
            Some(value) => {
                let items: Vec<CapturedItem> = serde_json::from_str(value.value())?;
                Ok(items)
            }
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, kind: ItemKind, items: &[CapturedItem]) -> CaptureResult<()> {
        let serialized = serde_json::to_string(items)?;

        let db = self
            .db
            .lock()
            .map_err(|e| CaptureError::Storage(format!("Mutex poisoned: {}", e)))?;

        let write_txn = db
            .begin_write()
            .map_err(|e| CaptureError::Storage(format!("Failed to begin write: {}", e)))?;
        {
            let mut table = write_txn
                .open_table(COLLECTIONS_TABLE)
                .map_err(|e| CaptureError::Storage(format!("Failed to open table: {}", e)))?;
            table
                .insert(kind.collection_key(), serialized.as_str())
                .map_err(|e| CaptureError::Storage(format!("Failed to insert: {}", e)))?;
        }
        write_txn
            .commit()
            .map_err(|e| CaptureError::Storage(format!("Failed to commit: {}", e)))?;

        Ok(())
    }
}

/// In-memory storage with an optional byte quota
///
/// Models the browser localStorage path: a save whose serialized size
/// exceeds the quota fails with `QuotaExceeded` without being applied.
pub struct MemoryStorage {
    records: Mutex<std::collections::HashMap<&'static str, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(std::collections::HashMap::new()),
            quota_bytes: None,
        }
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            records: Mutex::new(std::collections::HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, kind: ItemKind) -> CaptureResult<Vec<CapturedItem>> {
        let records = self
            .records
            .lock()
            .map_err(|e| CaptureError::Storage(format!("Mutex poisoned: {}", e)))?;
        match records.get(kind.collection_key()) {
            Some(serialized) => Ok(serde_json::from_str(serialized)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, kind: ItemKind, items: &[CapturedItem]) -> CaptureResult<()> {
        let serialized = serde_json::to_string(items)?;
        if let Some(quota) = self.quota_bytes {
            if serialized.len() > quota {
                return Err(CaptureError::QuotaExceeded);
            }
        }

        let mut records = self
            .records
            .lock()
            .map_err(|e| CaptureError::Storage(format!("Mutex poisoned: {}", e)))?;
        records.insert(kind.collection_key(), serialized);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample(content: &str) -> CapturedItem {
        CapturedItem::new_text(content.to_string(), "Text 1 (10:00)".to_string())
    }

    #[test]
    fn redb_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = RedbStorage::open(dir.path().join("test.redb")).unwrap();

        assert!(storage.load(ItemKind::Text).unwrap().is_empty());

        let items = vec![sample("second"), sample("first")];
        storage.save(ItemKind::Text, &items).unwrap();

        let loaded = storage.load(ItemKind::Text).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].content, "second");
        assert_eq!(loaded[1].content, "first");

        // Kinds are independent records
        assert!(storage.load(ItemKind::Image).unwrap().is_empty());
    }

    #[test]
    fn redb_save_overwrites_previous_record() {
        let dir = tempfile::tempdir().unwrap();
        let storage = RedbStorage::open(dir.path().join("test.redb")).unwrap();

        storage.save(ItemKind::Text, &[sample("a"), sample("b")]).unwrap();
        storage.save(ItemKind::Text, &[sample("c")]).unwrap();

        let loaded = storage.load(ItemKind::Text).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].content, "c");
    }

    #[test]
    fn memory_storage_respects_quota() {
        let storage = MemoryStorage::with_quota(64);
        let small = vec![sample("x")];
        assert!(matches!(
            storage.save(ItemKind::Text, &small),
            Err(CaptureError::QuotaExceeded)
        ));

        // Failed save leaves the previous record intact
        assert!(storage.load(ItemKind::Text).unwrap().is_empty());

        let storage = MemoryStorage::with_quota(100_000);
        storage.save(ItemKind::Text, &small).unwrap();
        assert_eq!(storage.load(ItemKind::Text).unwrap().len(), 1);
    }
}

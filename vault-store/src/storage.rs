//! Storage backends: where sealed records live.

use crate::error::StoreError;

use envelope_vault::SecureRecord;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

// ---------------------------------------------------------------------------
// Storage trait
// ---------------------------------------------------------------------------

/// Backend for persisting sealed records by id.
///
/// Records are opaque to the backend: it never sees key material and never
/// needs to decrypt anything. `put` must refuse an id that is already stored.
pub trait RecordStore: Send + Sync {
    fn get(&self, id: &str) -> Result<Option<SecureRecord>, StoreError>;
    fn put(&self, record: &SecureRecord) -> Result<(), StoreError>;
    fn list_by_party(&self, party_id: &str) -> Result<Vec<SecureRecord>, StoreError>;
    fn len(&self) -> Result<usize, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

/// In-memory storage (for testing and ephemeral use).
pub struct InMemoryStore {
    records: RwLock<HashMap<String, SecureRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, SecureRecord>>, StoreError> {
        self.records
            .read()
            .map_err(|_| StoreError::StorageError("record map lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, SecureRecord>>, StoreError> {
        self.records
            .write()
            .map_err(|_| StoreError::StorageError("record map lock poisoned".into()))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for InMemoryStore {
    fn get(&self, id: &str) -> Result<Option<SecureRecord>, StoreError> {
        Ok(self.read()?.get(id).cloned())
    }

    fn put(&self, record: &SecureRecord) -> Result<(), StoreError> {
        let mut records = self.write()?;
        if records.contains_key(record.id()) {
            return Err(StoreError::DuplicateRecord(record.id().to_string()));
        }
        records.insert(record.id().to_string(), record.clone());
        Ok(())
    }

    /// Oldest first; ties broken by id so the order is stable.
    fn list_by_party(&self, party_id: &str) -> Result<Vec<SecureRecord>, StoreError> {
        let mut out: Vec<SecureRecord> = self
            .read()?
            .values()
            .filter(|r| r.party_id() == party_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(out)
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.len())
    }
}

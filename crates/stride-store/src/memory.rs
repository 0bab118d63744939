use std::sync::RwLock;

use async_trait::async_trait;
use stride_types::{ExerciseRecord, RecordId};

use crate::error::{StoreError, StoreResult};
use crate::traits::RecordStore;

/// In-memory, `Vec`-based record store.
///
/// Intended for tests and embedding. Records keep insertion order; replacing
/// a record keeps its original position. Data is lost when the store is
/// dropped.
pub struct InMemoryRecordStore {
    records: RwLock<Vec<ExerciseRecord>>,
}

impl InMemoryRecordStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Create a store pre-populated with `records`, in order.
    pub fn with_records(records: Vec<ExerciseRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if a record with this id is stored.
    pub fn contains(&self, id: &RecordId) -> bool {
        self.records
            .read()
            .map(|r| r.iter().any(|rec| &rec.id == id))
            .unwrap_or(false)
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn list_all(&self) -> StoreResult<Vec<ExerciseRecord>> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records.clone())
    }

    async fn insert(&self, record: &ExerciseRecord) -> StoreResult<()> {
        let mut records = self.records.write().map_err(|_| StoreError::LockPoisoned)?;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => *slot = record.clone(),
            None => records.push(record.clone()),
        }
        Ok(())
    }

    async fn delete(&self, record: &ExerciseRecord) -> StoreResult<bool> {
        let mut records = self.records.write().map_err(|_| StoreError::LockPoisoned)?;
        let before = records.len();
        records.retain(|r| r.id != record.id);
        Ok(records.len() != before)
    }
}

impl std::fmt::Debug for InMemoryRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRecordStore")
            .field("record_count", &self.len())
            .finish()
    }
}

//! Collaborator doubles shared by the engine tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use stride_provider::{ExternalProvider, ProviderResult};
use stride_store::{InMemoryRecordStore, RecordStore, StoreError, StoreResult};
use stride_types::{ExerciseRecord, TimeWindow};

/// 2023-11-14T22:13:20Z.
pub(crate) const NOW: i64 = 1_700_000_000_000;

/// In-memory store that can refuse reads, refuse deletes, or acknowledge
/// deletes without performing them.
pub(crate) struct FlakyStore {
    inner: InMemoryRecordStore,
    fail_lists: AtomicBool,
    fail_deletes: AtomicBool,
    ignore_deletes: AtomicBool,
}

impl FlakyStore {
    pub(crate) fn new(records: Vec<ExerciseRecord>) -> Self {
        Self {
            inner: InMemoryRecordStore::with_records(records),
            fail_lists: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            ignore_deletes: AtomicBool::new(false),
        }
    }

    pub(crate) fn fail_lists(&self, on: bool) {
        self.fail_lists.store(on, Ordering::SeqCst);
    }

    pub(crate) fn fail_deletes(&self, on: bool) {
        self.fail_deletes.store(on, Ordering::SeqCst);
    }

    pub(crate) fn ignore_deletes(&self, on: bool) {
        self.ignore_deletes.store(on, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordStore for FlakyStore {
    async fn list_all(&self) -> StoreResult<Vec<ExerciseRecord>> {
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("list refused".into()));
        }
        self.inner.list_all().await
    }

    async fn insert(&self, record: &ExerciseRecord) -> StoreResult<()> {
        self.inner.insert(record).await
    }

    async fn delete(&self, record: &ExerciseRecord) -> StoreResult<bool> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("delete refused".into()));
        }
        if self.ignore_deletes.load(Ordering::SeqCst) {
            return Ok(true);
        }
        self.inner.delete(record).await
    }
}

/// Provider whose n-th read returns the n-th layer; reads past the last
/// layer keep returning it.
pub(crate) struct LayeredProvider {
    layers: Vec<Vec<ExerciseRecord>>,
    reads: AtomicUsize,
}

impl LayeredProvider {
    pub(crate) fn new(layers: Vec<Vec<ExerciseRecord>>) -> Self {
        Self {
            layers,
            reads: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ExternalProvider for LayeredProvider {
    async fn read_recent(&self, _window: TimeWindow) -> ProviderResult<Vec<ExerciseRecord>> {
        let n = self.reads.fetch_add(1, Ordering::SeqCst);
        let idx = n.min(self.layers.len().saturating_sub(1));
        Ok(self.layers.get(idx).cloned().unwrap_or_default())
    }
}

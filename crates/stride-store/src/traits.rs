use async_trait::async_trait;
use stride_types::ExerciseRecord;

use crate::error::StoreResult;

/// Durable storage of locally authored records.
///
/// Implementations must satisfy read-your-writes: a completed `insert` or
/// `delete` is visible to the next `list_all`. Order of `list_all` is the
/// backend's own and is preserved by the merge engine.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every stored record.
    async fn list_all(&self) -> StoreResult<Vec<ExerciseRecord>>;

    /// Insert a record, replacing any stored record with the same id.
    async fn insert(&self, record: &ExerciseRecord) -> StoreResult<()>;

    /// Delete a record by id. Returns `true` if the record existed.
    async fn delete(&self, record: &ExerciseRecord) -> StoreResult<bool>;
}

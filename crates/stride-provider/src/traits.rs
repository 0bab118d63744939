use async_trait::async_trait;
use stride_types::{ExerciseRecord, TimeWindow};

use crate::error::ProviderResult;

/// Read-only source of externally imported records.
///
/// Every returned record must carry `Origin::External`. Order is the
/// provider's own and is preserved by the merge engine.
#[async_trait]
pub trait ExternalProvider: Send + Sync {
    /// Sessions that intersect `window`.
    async fn read_recent(&self, window: TimeWindow) -> ProviderResult<Vec<ExerciseRecord>>;
}

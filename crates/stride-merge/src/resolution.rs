use serde::{Deserialize, Serialize};
use stride_types::{ExerciseRecord, Origin, RecordId};
use tracing::{debug, info, warn};

use crate::engine::{MergeEngine, Sourcing};
use crate::error::{EngineError, EngineResult, ResolveError};

/// How a removed record was taken out of the merged view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalAction {
    /// A local record deleted from the store.
    Deleted,
    /// An external record hidden from future merges.
    Suppressed,
}

/// One record removed while resolving.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Removal {
    pub id: RecordId,
    pub origin: Origin,
    pub action: RemovalAction,
}

/// Outcome of a successful resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionReport {
    pub keep: RecordId,
    /// Every record removed, in removal order.
    pub removed: Vec<Removal>,
    /// Scan passes taken, including the final pass that found nothing.
    pub passes: usize,
}

impl ResolutionReport {
    pub fn removed_ids(&self) -> impl Iterator<Item = &RecordId> {
        self.removed.iter().map(|r| &r.id)
    }
}

impl MergeEngine {
    /// Keep `keep` and remove every other record of the same activity that
    /// overlaps it, `dropped` included.
    ///
    /// Both sources are re-read after each pass and scanning stops at the
    /// first pass that finds no overlapping record, so records that only
    /// surface once others are gone are removed in the same call. Local
    /// records are deleted from the store; external records are suppressed.
    /// Every removal marks `(keep, removed)` resolved. `keep` itself is
    /// never a candidate.
    ///
    /// Any store or provider failure aborts the call. Nothing is rolled
    /// back: the error lists what was already applied.
    pub async fn resolve(
        &self,
        keep: &ExerciseRecord,
        dropped: &ExerciseRecord,
    ) -> Result<ResolutionReport, ResolveError> {
        let _gate = self.write_gate.lock().await;
        let mut applied = Vec::new();

        match self.resolve_to_fixed_point(keep, &mut applied).await {
            Ok(passes) => {
                if !applied.iter().any(|r| r.id == dropped.id) {
                    debug!(keep = %keep.id, dropped = %dropped.id, "dropped record was not an overlap of the kept record");
                }
                info!(keep = %keep.id, removed = applied.len(), passes, "conflict resolved");
                Ok(ResolutionReport {
                    keep: keep.id.clone(),
                    removed: applied,
                    passes,
                })
            }
            Err(cause) => {
                warn!(keep = %keep.id, applied = applied.len(), error = %cause, "conflict resolution aborted");
                Err(ResolveError { applied, cause })
            }
        }
    }

    async fn resolve_to_fixed_point(
        &self,
        keep: &ExerciseRecord,
        applied: &mut Vec<Removal>,
    ) -> EngineResult<usize> {
        let key = keep.activity_key();
        let max_passes = self.config.max_resolution_passes.max(2);
        let mut pass = 0;

        loop {
            pass += 1;
            let records = self.gather(Sourcing::Strict).await?.records;
            let overlapping: Vec<ExerciseRecord> = records
                .into_iter()
                .filter(|r| r.id != keep.id && r.activity_key() == key && r.overlaps(keep))
                .collect();

            debug!(keep = %keep.id, pass, found = overlapping.len(), "resolution pass");
            if overlapping.is_empty() {
                return Ok(pass);
            }
            if pass >= max_passes {
                return Err(EngineError::PassLimitExceeded { passes: pass });
            }

            for record in &overlapping {
                applied.push(self.remove_overlap(keep, record).await?);
            }
        }
    }

    async fn remove_overlap(
        &self,
        keep: &ExerciseRecord,
        record: &ExerciseRecord,
    ) -> EngineResult<Removal> {
        let action = match record.origin {
            Origin::Local => {
                self.store().delete(record).await?;
                RemovalAction::Deleted
            }
            Origin::External => {
                self.memory_mut()?.suppress_external(&record.id);
                RemovalAction::Suppressed
            }
        };
        self.memory_mut()?.mark_resolved(&keep.id, &record.id);

        debug!(keep = %keep.id, removed = %record.id, origin = %record.origin, ?action, "overlap removed");
        Ok(Removal {
            id: record.id.clone(),
            origin: record.origin,
            action,
        })
    }
}

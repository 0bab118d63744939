use std::collections::HashSet;

use serde::Serialize;
use stride_provider::Availability;
use stride_types::{ExerciseRecord, RecordId};

use crate::detector::ConflictPair;

/// Output of [`MergeEngine::merged_view`](crate::MergeEngine::merged_view).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedView {
    /// Local records in store order, then unsuppressed external records in
    /// provider order.
    pub records: Vec<ExerciseRecord>,
    /// Detected conflicts that have not been resolved.
    pub open_conflicts: Vec<ConflictPair>,
    /// Whether the external provider answered. An unavailable provider
    /// contributes no records.
    pub external: Availability,
}

/// A record tagged with its conflict membership, for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    #[serde(flatten)]
    pub record: ExerciseRecord,
    pub in_conflict: bool,
}

impl MergedView {
    /// Ids appearing on either side of an open conflict.
    pub fn conflicted_ids(&self) -> HashSet<&RecordId> {
        self.open_conflicts
            .iter()
            .flat_map(|p| [&p.first.id, &p.second.id])
            .collect()
    }

    pub fn is_in_conflict(&self, id: &RecordId) -> bool {
        self.open_conflicts.iter().any(|p| p.involves(id))
    }

    /// Open conflicts involving `id`, in detection order.
    pub fn conflicts_for<'a>(&'a self, id: &'a RecordId) -> impl Iterator<Item = &'a ConflictPair> + 'a {
        self.open_conflicts.iter().filter(move |p| p.involves(id))
    }

    pub fn find(&self, id: &RecordId) -> Option<&ExerciseRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    /// Every record with its `in_conflict` flag, newest start first. Records
    /// with equal starts keep merge order.
    pub fn timeline(&self) -> Vec<TimelineEntry> {
        let conflicted = self.conflicted_ids();
        let mut entries: Vec<TimelineEntry> = self
            .records
            .iter()
            .map(|r| TimelineEntry {
                record: r.clone(),
                in_conflict: conflicted.contains(&r.id),
            })
            .collect();
        entries.sort_by(|a, b| b.record.start_ms.cmp(&a.record.start_ms));
        entries
    }
}

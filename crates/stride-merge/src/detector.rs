use serde::{Deserialize, Serialize};
use stride_types::{ExerciseRecord, RecordId};

/// Two records reported as conflicting, in input order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictPair {
    pub first: ExerciseRecord,
    pub second: ExerciseRecord,
}

impl ConflictPair {
    pub fn new(first: ExerciseRecord, second: ExerciseRecord) -> Self {
        Self { first, second }
    }

    /// Returns `true` if either side has this id.
    pub fn involves(&self, id: &RecordId) -> bool {
        &self.first.id == id || &self.second.id == id
    }

    /// The side opposite `id`, if `id` is part of the pair.
    pub fn other(&self, id: &RecordId) -> Option<&ExerciseRecord> {
        if &self.first.id == id {
            Some(&self.second)
        } else if &self.second.id == id {
            Some(&self.first)
        } else {
            None
        }
    }

    /// Returns `true` if this pair joins `a` and `b`, in either order.
    pub fn joins(&self, a: &RecordId, b: &RecordId) -> bool {
        (&self.first.id == a && &self.second.id == b) || (&self.first.id == b && &self.second.id == a)
    }
}

/// The conflict rule: same activity, open-interval overlap, and at least one
/// `LOCAL` side.
pub fn is_conflict(a: &ExerciseRecord, b: &ExerciseRecord) -> bool {
    (a.is_local() || b.is_local()) && a.overlaps(b) && a.same_activity(b)
}

/// Every conflicting pair in `records`.
///
/// Each unordered pair is examined once; pairs come out ordered by the outer
/// index, then the inner index. Resolution status is not consulted.
pub fn detect_conflicts(records: &[ExerciseRecord]) -> Vec<ConflictPair> {
    let keys: Vec<String> = records.iter().map(ExerciseRecord::activity_key).collect();
    let mut conflicts = Vec::new();

    for (i, a) in records.iter().enumerate() {
        for (j, b) in records.iter().enumerate().skip(i + 1) {
            let eligible = a.is_local() || b.is_local();
            if eligible && keys[i] == keys[j] && a.overlaps(b) {
                conflicts.push(ConflictPair::new(a.clone(), b.clone()));
            }
        }
    }

    conflicts
}

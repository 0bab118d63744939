use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use stride_types::RecordId;

/// Unordered id pair, stored with the smaller id first.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct PairKey(RecordId, RecordId);

impl PairKey {
    fn new(a: &RecordId, b: &RecordId) -> Self {
        if a <= b {
            Self(a.clone(), b.clone())
        } else {
            Self(b.clone(), a.clone())
        }
    }
}

/// What the engine remembers about past resolutions.
///
/// - suppressed external ids are excluded from every later merge;
/// - resolved pairs are never reported as open conflicts again, even while
///   both records still exist.
///
/// Both sets only grow. Nothing is evicted for the lifetime of the value.
#[derive(Clone, Debug, Default)]
pub struct ConflictMemory {
    suppressed_external: HashSet<RecordId>,
    resolved_pairs: HashSet<PairKey>,
}

impl ConflictMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude an external record from future merges. Returns `true` if the
    /// id was not already suppressed.
    pub fn suppress_external(&mut self, id: &RecordId) -> bool {
        self.suppressed_external.insert(id.clone())
    }

    pub fn is_suppressed(&self, id: &RecordId) -> bool {
        self.suppressed_external.contains(id)
    }

    /// Mark the conflict between `a` and `b` as settled. Returns `true` if
    /// the pair was not already marked.
    pub fn mark_resolved(&mut self, a: &RecordId, b: &RecordId) -> bool {
        self.resolved_pairs.insert(PairKey::new(a, b))
    }

    /// Returns `true` if the pair was marked, in either order.
    pub fn is_resolved(&self, a: &RecordId, b: &RecordId) -> bool {
        self.resolved_pairs.contains(&PairKey::new(a, b))
    }

    pub fn suppressed_count(&self) -> usize {
        self.suppressed_external.len()
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved_pairs.len()
    }

    /// Returns `true` if nothing has been remembered yet.
    pub fn is_empty(&self) -> bool {
        self.suppressed_external.is_empty() && self.resolved_pairs.is_empty()
    }

    /// Export both sets in a stable order for persistence.
    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            suppressed_external: self.suppressed_external.iter().cloned().collect(),
            resolved_pairs: self
                .resolved_pairs
                .iter()
                .map(|PairKey(a, b)| (a.clone(), b.clone()))
                .collect(),
        }
    }

    /// Rebuild memory from a snapshot.
    pub fn from_snapshot(snapshot: &MemorySnapshot) -> Self {
        let mut memory = Self::new();
        memory.absorb(snapshot);
        memory
    }

    /// Add everything in `snapshot` to this memory.
    pub fn absorb(&mut self, snapshot: &MemorySnapshot) {
        for id in &snapshot.suppressed_external {
            self.suppress_external(id);
        }
        for (a, b) in &snapshot.resolved_pairs {
            self.mark_resolved(a, b);
        }
    }
}

/// Serializable form of [`ConflictMemory`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySnapshot {
    pub suppressed_external: BTreeSet<RecordId>,
    pub resolved_pairs: BTreeSet<(RecordId, RecordId)>,
}

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TypeError;

/// Opaque record identifier.
///
/// Local records get a UUID v7 string from [`RecordId::generate`]; external
/// records keep whatever identifier their provider assigned. Ids are compared
/// byte-for-byte.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generate a fresh time-ordered identifier for a local record.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Parse an identifier, rejecting the empty string.
    pub fn parse(s: impl Into<String>) -> Result<Self, TypeError> {
        let s = s.into();
        if s.is_empty() {
            return Err(TypeError::EmptyId);
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Provenance of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Origin {
    /// Authored by the user and held in the record store.
    Local,
    /// Imported read-only from an external provider.
    External,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("LOCAL"),
            Self::External => f.write_str("EXTERNAL"),
        }
    }
}

/// Normalize an activity label for comparison: trim, then lower-case.
pub fn normalize_activity(label: &str) -> String {
    label.trim().to_lowercase()
}

/// One logged exercise session.
///
/// Records are immutable values. Conflict membership is computed as a
/// separate output of a merge and never stored on the record itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRecord {
    pub id: RecordId,
    /// Free-text label such as `"Running"`.
    pub activity_type: String,
    /// Session start, milliseconds since UNIX epoch.
    pub start_ms: i64,
    /// Session end, milliseconds since UNIX epoch. Well-formed records have
    /// `end_ms >= start_ms`; nothing in this type enforces it.
    pub end_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<u32>,
    pub origin: Origin,
}

impl ExerciseRecord {
    pub fn new(
        id: impl Into<RecordId>,
        activity_type: impl Into<String>,
        start_ms: i64,
        end_ms: i64,
        origin: Origin,
    ) -> Self {
        Self {
            id: id.into(),
            activity_type: activity_type.into(),
            start_ms,
            end_ms,
            calories: None,
            origin,
        }
    }

    /// Shorthand for a `LOCAL` record.
    pub fn local(id: impl Into<RecordId>, activity_type: impl Into<String>, start_ms: i64, end_ms: i64) -> Self {
        Self::new(id, activity_type, start_ms, end_ms, Origin::Local)
    }

    /// Shorthand for an `EXTERNAL` record.
    pub fn external(id: impl Into<RecordId>, activity_type: impl Into<String>, start_ms: i64, end_ms: i64) -> Self {
        Self::new(id, activity_type, start_ms, end_ms, Origin::External)
    }

    pub fn with_calories(mut self, calories: u32) -> Self {
        self.calories = Some(calories);
        self
    }

    pub fn is_local(&self) -> bool {
        self.origin == Origin::Local
    }

    pub fn is_external(&self) -> bool {
        self.origin == Origin::External
    }

    /// The normalized activity label used as a matching key.
    pub fn activity_key(&self) -> String {
        normalize_activity(&self.activity_type)
    }

    /// Returns `true` if both records name the same activity after
    /// normalization.
    pub fn same_activity(&self, other: &Self) -> bool {
        self.activity_key() == other.activity_key()
    }

    /// Open-interval overlap with `[start_ms, end_ms)`. Ranges that only
    /// touch at an endpoint do not overlap.
    pub fn overlaps_range(&self, start_ms: i64, end_ms: i64) -> bool {
        self.start_ms < end_ms && self.end_ms > start_ms
    }

    /// Open-interval overlap with another record.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.overlaps_range(other.start_ms, other.end_ms)
    }

    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }
}

/// Caller-supplied payload for authoring a local record. The engine assigns
/// the id and the `LOCAL` origin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    pub activity_type: String,
    pub start_ms: i64,
    pub end_ms: i64,
    #[serde(default)]
    pub calories: Option<u32>,
}

impl NewRecord {
    pub fn new(activity_type: impl Into<String>, start_ms: i64, end_ms: i64) -> Self {
        Self {
            activity_type: activity_type.into(),
            start_ms,
            end_ms,
            calories: None,
        }
    }

    pub fn with_calories(mut self, calories: u32) -> Self {
        self.calories = Some(calories);
        self
    }

    /// Materialize as a `LOCAL` record under the given id.
    pub fn into_local(self, id: RecordId) -> ExerciseRecord {
        ExerciseRecord {
            id,
            activity_type: self.activity_type,
            start_ms: self.start_ms,
            end_ms: self.end_ms,
            calories: self.calories,
            origin: Origin::Local,
        }
    }
}

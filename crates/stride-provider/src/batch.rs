use serde::{Deserialize, Serialize};
use stride_types::{ExerciseRecord, TimeWindow};

use crate::error::ProviderResult;
use crate::traits::ExternalProvider;

/// Whether the external source answered a read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Availability {
    Available,
    Unavailable { reason: String },
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Result of a best-effort provider read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalBatch {
    pub records: Vec<ExerciseRecord>,
    pub availability: Availability,
}

impl ExternalBatch {
    pub fn available(records: Vec<ExerciseRecord>) -> Self {
        Self {
            records,
            availability: Availability::Available,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            availability: Availability::Unavailable {
                reason: reason.into(),
            },
        }
    }

    /// Read `window` from `provider`, collapsing recoverable failures into an
    /// empty, unavailable batch. Fatal failures are returned as errors.
    pub async fn fetch(
        provider: &dyn ExternalProvider,
        window: TimeWindow,
    ) -> ProviderResult<Self> {
        match provider.read_recent(window).await {
            Ok(records) => Ok(Self::available(records)),
            Err(e) if e.is_recoverable() => Ok(Self::unavailable(e.to_string())),
            Err(e) => Err(e),
        }
    }
}

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stride_types::{activity_name, ExerciseRecord, Origin, RecordId, TimeWindow};
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::traits::ExternalProvider;

/// One session as exported by an activity tracker.
///
/// Trackers report the activity as a numeric exercise-type code; the label is
/// resolved through the activity catalog on import.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedSession {
    pub id: String,
    pub exercise_type: u16,
    pub start_ms: i64,
    pub end_ms: i64,
    #[serde(default)]
    pub calories: Option<u32>,
}

impl ImportedSession {
    fn into_record(self) -> ProviderResult<ExerciseRecord> {
        let id = RecordId::parse(self.id)
            .map_err(|e| ProviderError::Fatal(format!("imported session: {e}")))?;
        Ok(ExerciseRecord {
            id,
            activity_type: activity_name(self.exercise_type).to_string(),
            start_ms: self.start_ms,
            end_ms: self.end_ms,
            calories: self.calories,
            origin: Origin::External,
        })
    }
}

/// Provider reading a JSON array of [`ImportedSession`] values from disk.
///
/// A missing export file means the tracker has not shared anything yet and
/// reads as an empty batch. An unreadable file is still an error.
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ExternalProvider for JsonFileProvider {
    async fn read_recent(&self, window: TimeWindow) -> ProviderResult<Vec<ExerciseRecord>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no tracker export yet");
                return Ok(Vec::new());
            }
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                return Err(ProviderError::PermissionDenied(e.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let sessions: Vec<ImportedSession> = serde_json::from_slice(&bytes)?;
        let total = sessions.len();
        let records = sessions
            .into_iter()
            .filter(|s| window.intersects(s.start_ms, s.end_ms))
            .map(ImportedSession::into_record)
            .collect::<ProviderResult<Vec<_>>>()?;

        debug!(path = %self.path.display(), total, in_window = records.len(), "imported sessions read");
        Ok(records)
    }
}

//! In-memory provider for tests and embedding.
//!
//! [`StaticProvider`] serves a fixed list of sessions and can be told to fail
//! in any of the ways a real provider fails, either immediately or after a
//! number of successful reads.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use stride_types::{ExerciseRecord, Origin, TimeWindow};

use crate::error::{ProviderError, ProviderResult};
use crate::traits::ExternalProvider;

/// Failure a [`StaticProvider`] can simulate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureMode {
    PermissionDenied,
    Unavailable,
    Fatal,
}

impl FailureMode {
    fn to_error(self) -> ProviderError {
        match self {
            Self::PermissionDenied => ProviderError::PermissionDenied("read access not granted".into()),
            Self::Unavailable => ProviderError::Unavailable("simulated outage".into()),
            Self::Fatal => ProviderError::Fatal("simulated failure".into()),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct ScheduledFailure {
    mode: FailureMode,
    after_reads: usize,
}

/// Provider serving a fixed, mutable list of sessions.
///
/// Every stored record is forced to `Origin::External`. Reads return the
/// sessions that intersect the requested window, in insertion order.
#[derive(Debug, Default)]
pub struct StaticProvider {
    records: RwLock<Vec<ExerciseRecord>>,
    failure: RwLock<Option<ScheduledFailure>>,
    reads: AtomicUsize,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ExerciseRecord>) -> Self {
        let provider = Self::new();
        for record in records {
            provider.push(record);
        }
        provider
    }

    /// Add a session.
    pub fn push(&self, mut record: ExerciseRecord) {
        record.origin = Origin::External;
        if let Ok(mut records) = self.records.write() {
            records.push(record);
        }
    }

    /// Fail every read from now on.
    pub fn fail_with(&self, mode: FailureMode) {
        let after_reads = self.read_count();
        self.schedule(mode, after_reads);
    }

    /// Serve `reads` more successful reads, then fail every read after that.
    pub fn fail_after(&self, reads: usize, mode: FailureMode) {
        let after_reads = self.read_count() + reads;
        self.schedule(mode, after_reads);
    }

    /// Clear any simulated failure.
    pub fn recover(&self) {
        if let Ok(mut failure) = self.failure.write() {
            *failure = None;
        }
    }

    /// Number of `read_recent` calls served or refused so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn schedule(&self, mode: FailureMode, after_reads: usize) {
        if let Ok(mut failure) = self.failure.write() {
            *failure = Some(ScheduledFailure { mode, after_reads });
        }
    }
}

#[async_trait]
impl ExternalProvider for StaticProvider {
    async fn read_recent(&self, window: TimeWindow) -> ProviderResult<Vec<ExerciseRecord>> {
        let served = self.reads.fetch_add(1, Ordering::SeqCst);

        let failure = *self
            .failure
            .read()
            .map_err(|_| ProviderError::Fatal("failure lock poisoned".into()))?;
        if let Some(f) = failure {
            if served >= f.after_reads {
                return Err(f.mode.to_error());
            }
        }

        let records = self
            .records
            .read()
            .map_err(|_| ProviderError::Fatal("record lock poisoned".into()))?;
        Ok(records
            .iter()
            .filter(|r| window.intersects(r.start_ms, r.end_ms))
            .cloned()
            .collect())
    }
}

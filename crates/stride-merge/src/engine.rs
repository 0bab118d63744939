use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use stride_provider::{Availability, ExternalBatch, ExternalProvider};
use stride_store::RecordStore;
use stride_types::{Clock, ExerciseRecord, NewRecord, RecordId, SystemClock, TimeWindow};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::detector::detect_conflicts;
use crate::error::{EngineError, EngineResult, ResolveError};
use crate::memory::{ConflictMemory, MemorySnapshot};
use crate::resolution::ResolutionReport;
use crate::view::MergedView;

/// How a provider failure is treated while gathering records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Sourcing {
    /// Recoverable provider failures read as "no external records".
    BestEffort,
    /// Every provider failure is an error.
    Strict,
}

/// The combined record set of one read of both sources.
pub(crate) struct Gathered {
    pub(crate) records: Vec<ExerciseRecord>,
    pub(crate) external: Availability,
}

/// Reconciles the local record store with an external provider.
///
/// The engine owns its [`ConflictMemory`]; a fresh engine starts with empty
/// memory unless one is supplied with [`MergeEngine::with_memory`]. Mutating
/// operations (`add_local`, `resolve`) are serialized behind an async write
/// gate, so an engine may be shared through an `Arc`.
pub struct MergeEngine {
    store: Arc<dyn RecordStore>,
    provider: Arc<dyn ExternalProvider>,
    memory: RwLock<ConflictMemory>,
    pub(crate) write_gate: Mutex<()>,
    clock: Arc<dyn Clock>,
    pub(crate) config: EngineConfig,
}

impl MergeEngine {
    /// Create an engine over the given collaborators with the wall clock and
    /// default configuration.
    pub fn new(store: Arc<dyn RecordStore>, provider: Arc<dyn ExternalProvider>) -> Self {
        Self {
            store,
            provider,
            memory: RwLock::new(ConflictMemory::new()),
            write_gate: Mutex::new(()),
            clock: Arc::new(SystemClock),
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Start from previously accumulated memory instead of an empty one.
    pub fn with_memory(mut self, memory: ConflictMemory) -> Self {
        self.memory = RwLock::new(memory);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The provider window for a read happening now.
    pub fn external_window(&self) -> TimeWindow {
        TimeWindow::trailing(self.clock.now_ms(), self.config.external_window)
    }

    /// Merge both sources and report the conflicts that are still open.
    ///
    /// Recoverable provider failures are absorbed: the view then holds local
    /// records only and `external` says why. Store failures and fatal
    /// provider failures are returned as errors. No state is modified.
    pub async fn merged_view(&self) -> EngineResult<MergedView> {
        let Gathered { records, external } = self.gather(Sourcing::BestEffort).await?;
        let detected = detect_conflicts(&records);
        let detected_count = detected.len();

        let open_conflicts = {
            let memory = self.memory()?;
            detected
                .into_iter()
                .filter(|p| !memory.is_resolved(&p.first.id, &p.second.id))
                .collect::<Vec<_>>()
        };

        debug!(
            records = records.len(),
            detected = detected_count,
            open = open_conflicts.len(),
            "merged view built"
        );
        Ok(MergedView {
            records,
            open_conflicts,
            external,
        })
    }

    /// Author a local record. The engine assigns a fresh id and the `LOCAL`
    /// origin, then inserts it into the store.
    pub async fn add_local(&self, new: NewRecord) -> EngineResult<ExerciseRecord> {
        if new.activity_type.trim().is_empty() {
            return Err(EngineError::InvalidRecord("activity type is blank".into()));
        }
        if new.end_ms < new.start_ms {
            return Err(EngineError::InvalidRecord(format!(
                "end {} is before start {}",
                new.end_ms, new.start_ms
            )));
        }

        let _gate = self.write_gate.lock().await;
        let record = new.into_local(RecordId::generate());
        self.store.insert(&record).await?;
        info!(id = %record.id, activity = %record.activity_type, "local record added");
        Ok(record)
    }

    /// Keep `record` and drop the other side of its first open conflict.
    ///
    /// Returns `Ok(None)` when `record` is not part of any open conflict.
    pub async fn keep_and_remove_other(
        &self,
        record: &ExerciseRecord,
    ) -> Result<Option<ResolutionReport>, ResolveError> {
        let view = self.merged_view().await.map_err(|cause| ResolveError {
            applied: Vec::new(),
            cause,
        })?;
        let Some(other) = view
            .conflicts_for(&record.id)
            .find_map(|p| p.other(&record.id))
            .cloned()
        else {
            debug!(id = %record.id, "no open conflict to resolve");
            return Ok(None);
        };
        self.resolve(record, &other).await.map(Some)
    }

    /// Export conflict memory for persistence.
    pub fn memory_snapshot(&self) -> EngineResult<MemorySnapshot> {
        Ok(self.memory()?.snapshot())
    }

    /// Merge a persisted snapshot into the current conflict memory.
    pub fn restore_memory(&self, snapshot: &MemorySnapshot) -> EngineResult<()> {
        self.memory_mut()?.absorb(snapshot);
        info!(
            suppressed = snapshot.suppressed_external.len(),
            resolved = snapshot.resolved_pairs.len(),
            "conflict memory restored"
        );
        Ok(())
    }

    /// Read local records, then external records, and drop suppressed
    /// external ids.
    pub(crate) async fn gather(&self, sourcing: Sourcing) -> EngineResult<Gathered> {
        let local = self.store.list_all().await?;

        let window = self.external_window();
        let batch = match sourcing {
            Sourcing::BestEffort => ExternalBatch::fetch(self.provider.as_ref(), window).await?,
            Sourcing::Strict => ExternalBatch::available(self.provider.read_recent(window).await?),
        };
        if let Availability::Unavailable { reason } = &batch.availability {
            warn!(%reason, %window, "external provider unavailable; merging local records only");
        }

        let mut records = local;
        {
            let memory = self.memory()?;
            records.extend(
                batch
                    .records
                    .into_iter()
                    .filter(|r| !memory.is_suppressed(&r.id)),
            );
        }

        Ok(Gathered {
            records,
            external: batch.availability,
        })
    }

    pub(crate) fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub(crate) fn memory(&self) -> EngineResult<RwLockReadGuard<'_, ConflictMemory>> {
        self.memory.read().map_err(|_| EngineError::LockPoisoned)
    }

    pub(crate) fn memory_mut(&self) -> EngineResult<RwLockWriteGuard<'_, ConflictMemory>> {
        self.memory.write().map_err(|_| EngineError::LockPoisoned)
    }
}

impl std::fmt::Debug for MergeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergeEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use stride_provider::{FailureMode, StaticProvider};
    use stride_store::InMemoryRecordStore;
    use stride_types::{FixedClock, Origin};

    use super::*;
    use crate::testing::{FlakyStore, NOW};

    fn engine(
        local: Vec<ExerciseRecord>,
        external: Vec<ExerciseRecord>,
    ) -> (Arc<InMemoryRecordStore>, Arc<StaticProvider>, MergeEngine) {
        let store = Arc::new(InMemoryRecordStore::with_records(local));
        let provider = Arc::new(StaticProvider::with_records(external));
        let engine = MergeEngine::new(store.clone(), provider.clone())
            .with_clock(Arc::new(FixedClock(NOW)));
        (store, provider, engine)
    }

    fn ids(records: &[ExerciseRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[tokio::test]
    async fn locals_come_before_externals() {
        let (_, _, engine) = engine(
            vec![
                ExerciseRecord::local("m2", "Yoga", NOW - 10, NOW),
                ExerciseRecord::local("m1", "Yoga", NOW - 500, NOW - 400),
            ],
            vec![
                ExerciseRecord::external("h2", "Rowing", NOW - 50, NOW - 40),
                ExerciseRecord::external("h1", "Rowing", NOW - 90, NOW - 80),
            ],
        );
        let view = engine.merged_view().await.unwrap();
        assert_eq!(ids(&view.records), vec!["m2", "m1", "h2", "h1"]);
        assert!(view.open_conflicts.is_empty());
        assert!(view.external.is_available());
    }

    #[tokio::test]
    async fn example_scenario_reports_one_conflict() {
        let (_, _, engine) = engine(
            vec![ExerciseRecord::local("m1", "Running", NOW - 60_000, NOW + 60_000)],
            vec![ExerciseRecord::external("h1", "Running", NOW - 90_000, NOW - 30_000)],
        );
        let view = engine.merged_view().await.unwrap();
        assert_eq!(view.open_conflicts.len(), 1);
        assert_eq!(view.open_conflicts[0].first.id.as_str(), "m1");
        assert_eq!(view.open_conflicts[0].second.id.as_str(), "h1");
    }

    #[tokio::test]
    async fn external_reads_use_trailing_window() {
        let day = 24 * 60 * 60 * 1000;
        let (_, _, engine) = engine(
            vec![ExerciseRecord::local("m-old", "Running", NOW - 40 * day, NOW - 40 * day + 1_000)],
            vec![
                ExerciseRecord::external("h-old", "Running", NOW - 40 * day, NOW - 40 * day + 1_000),
                ExerciseRecord::external("h-new", "Running", NOW - day, NOW - day + 1_000),
            ],
        );
        let view = engine.merged_view().await.unwrap();
        // Local records are not windowed; external ones are.
        assert_eq!(ids(&view.records), vec!["m-old", "h-new"]);
        assert!(view.open_conflicts.is_empty());
    }

    #[tokio::test]
    async fn custom_window_is_respected() {
        let (_, _, engine) = engine(
            vec![],
            vec![ExerciseRecord::external("h1", "Running", NOW - 5_000, NOW - 4_000)],
        );
        let engine = engine.with_config(EngineConfig {
            external_window: Duration::from_secs(1),
            ..EngineConfig::default()
        });
        assert!(engine.merged_view().await.unwrap().records.is_empty());
    }

    #[tokio::test]
    async fn permission_denied_falls_back_to_local() {
        let (_, provider, engine) = engine(
            vec![ExerciseRecord::local("m1", "Running", NOW - 100, NOW)],
            vec![ExerciseRecord::external("h1", "Running", NOW - 100, NOW)],
        );
        provider.fail_with(FailureMode::PermissionDenied);

        let view = engine.merged_view().await.unwrap();
        assert_eq!(ids(&view.records), vec!["m1"]);
        assert!(view.open_conflicts.is_empty());
        assert!(!view.external.is_available());
    }

    #[tokio::test]
    async fn transient_outage_falls_back_to_local() {
        let (_, provider, engine) = engine(vec![], vec![ExerciseRecord::external("h1", "Yoga", NOW - 1, NOW)]);
        provider.fail_with(FailureMode::Unavailable);
        assert!(engine.merged_view().await.unwrap().records.is_empty());
    }

    #[tokio::test]
    async fn fatal_provider_failure_is_surfaced() {
        let (_, provider, engine) = engine(vec![], vec![]);
        provider.fail_with(FailureMode::Fatal);
        assert!(matches!(
            engine.merged_view().await,
            Err(EngineError::Provider(_))
        ));
    }

    #[tokio::test]
    async fn store_failure_is_surfaced() {
        let store = Arc::new(FlakyStore::new(vec![]));
        store.fail_lists(true);
        let engine = MergeEngine::new(store, Arc::new(StaticProvider::new()));
        assert!(matches!(engine.merged_view().await, Err(EngineError::Store(_))));
    }

    #[tokio::test]
    async fn suppressed_externals_are_hidden() {
        let (_, _, engine) = engine(
            vec![ExerciseRecord::local("m1", "Running", NOW - 100, NOW)],
            vec![ExerciseRecord::external("h1", "Running", NOW - 100, NOW)],
        );
        let mut memory = ConflictMemory::new();
        memory.suppress_external(&RecordId::from("h1"));
        let engine = engine.with_memory(memory);

        let view = engine.merged_view().await.unwrap();
        assert_eq!(ids(&view.records), vec!["m1"]);
        assert!(view.open_conflicts.is_empty());
    }

    #[tokio::test]
    async fn resolved_pairs_are_filtered_but_records_remain() {
        let (_, _, engine) = engine(
            vec![
                ExerciseRecord::local("m1", "Running", NOW - 100, NOW),
                ExerciseRecord::local("m2", "Running", NOW - 50, NOW),
            ],
            vec![],
        );
        let mut memory = ConflictMemory::new();
        memory.mark_resolved(&RecordId::from("m2"), &RecordId::from("m1"));
        let engine = engine.with_memory(memory);

        let view = engine.merged_view().await.unwrap();
        assert_eq!(view.records.len(), 2);
        assert!(view.open_conflicts.is_empty());
    }

    #[tokio::test]
    async fn merged_view_is_idempotent() {
        let (_, _, engine) = engine(
            vec![ExerciseRecord::local("m1", "Running", NOW - 100, NOW)],
            vec![ExerciseRecord::external("h1", "running", NOW - 50, NOW)],
        );
        let first = engine.merged_view().await.unwrap();
        let second = engine.merged_view().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn add_local_assigns_id_and_origin() {
        let (store, _, engine) = engine(vec![], vec![]);
        let added = engine
            .add_local(NewRecord::new("Hiking", NOW - 3_600_000, NOW).with_calories(420))
            .await
            .unwrap();

        assert_eq!(added.origin, Origin::Local);
        assert_eq!(added.calories, Some(420));
        assert!(store.contains(&added.id));

        let again = engine.add_local(NewRecord::new("Hiking", NOW - 10, NOW)).await.unwrap();
        assert_ne!(added.id, again.id);
    }

    #[tokio::test]
    async fn add_local_rejects_malformed_input() {
        let (store, _, engine) = engine(vec![], vec![]);
        assert!(matches!(
            engine.add_local(NewRecord::new("Hiking", NOW, NOW - 1)).await,
            Err(EngineError::InvalidRecord(_))
        ));
        assert!(matches!(
            engine.add_local(NewRecord::new("   ", NOW - 1, NOW)).await,
            Err(EngineError::InvalidRecord(_))
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn added_record_shows_up_as_conflict() {
        let (_, _, engine) = engine(
            vec![],
            vec![ExerciseRecord::external("h1", "Running", NOW - 1_000, NOW)],
        );
        let added = engine
            .add_local(NewRecord::new(" RUNNING", NOW - 500, NOW - 100))
            .await
            .unwrap();
        let view = engine.merged_view().await.unwrap();
        assert!(view.is_in_conflict(&added.id));
        assert!(view.is_in_conflict(&RecordId::from("h1")));
    }

    #[tokio::test]
    async fn memory_snapshot_roundtrips_between_engines() {
        let (_, _, engine_a) = engine(vec![], vec![]);
        engine_a.memory_mut().unwrap().suppress_external(&RecordId::from("h9"));
        let snap = engine_a.memory_snapshot().unwrap();

        let (_, _, engine_b) = engine(vec![], vec![ExerciseRecord::external("h9", "Yoga", NOW - 1, NOW)]);
        engine_b.restore_memory(&snap).unwrap();
        assert!(engine_b.merged_view().await.unwrap().records.is_empty());
    }
}

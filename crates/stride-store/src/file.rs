use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use stride_types::ExerciseRecord;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::RecordStore;

/// Record store backed by one JSON array on disk.
///
/// Every mutation rewrites the whole document through a temporary file in the
/// same directory followed by an atomic rename, so a crash never leaves a
/// half-written log behind. A missing file reads as an empty log. File I/O
/// runs on the blocking pool.
pub struct JsonFileRecordStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl JsonFileRecordStore {
    /// Open (or lazily create) the log at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn with_log<T, F>(&self, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> StoreResult<T> + Send + 'static,
    {
        let _guard = self.lock.lock().await;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || op(&path))
            .await
            .map_err(|e| StoreError::Unavailable(format!("record log task failed: {e}")))?
    }
}

fn load(path: &Path) -> StoreResult<Vec<ExerciseRecord>> {
    match fs::read(path) {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

fn save(path: &Path, records: &[ExerciseRecord]) -> StoreResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
    serde_json::to_writer_pretty(&mut tmp, records)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;

    debug!(path = %path.display(), count = records.len(), "record log written");
    Ok(())
}

#[async_trait]
impl RecordStore for JsonFileRecordStore {
    async fn list_all(&self) -> StoreResult<Vec<ExerciseRecord>> {
        self.with_log(load).await
    }

    async fn insert(&self, record: &ExerciseRecord) -> StoreResult<()> {
        let record = record.clone();
        self.with_log(move |path| {
            let mut records = load(path)?;
            match records.iter_mut().find(|r| r.id == record.id) {
                Some(slot) => *slot = record,
                None => records.push(record),
            }
            save(path, &records)
        })
        .await
    }

    async fn delete(&self, record: &ExerciseRecord) -> StoreResult<bool> {
        let id = record.id.clone();
        self.with_log(move |path| {
            let mut records = load(path)?;
            let before = records.len();
            records.retain(|r| r.id != id);
            if records.len() == before {
                return Ok(false);
            }
            save(path, &records)?;
            Ok(true)
        })
        .await
    }
}

impl std::fmt::Debug for JsonFileRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileRecordStore")
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileRecordStore::open(dir.path().join("log.json"));
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("log.json");

        let store = JsonFileRecordStore::open(&path);
        store
            .insert(&ExerciseRecord::local("a", "Yoga", 0, 10).with_calories(40))
            .await
            .unwrap();
        store.insert(&ExerciseRecord::local("b", "Yoga", 20, 30)).await.unwrap();
        drop(store);

        let reopened = JsonFileRecordStore::open(&path);
        let all = reopened.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].calories, Some(40));
    }

    #[tokio::test]
    async fn delete_rewrites_log() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileRecordStore::open(dir.path().join("log.json"));
        let rec = ExerciseRecord::local("a", "Yoga", 0, 10);
        store.insert(&rec).await.unwrap();

        assert!(store.delete(&rec).await.unwrap());
        assert!(!store.delete(&rec).await.unwrap());
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_inserts_all_land() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(JsonFileRecordStore::open(dir.path().join("log.json")));

        let mut handles = Vec::new();
        for i in 0..8i64 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let rec = ExerciseRecord::local(format!("r{i}"), "Rowing", i * 10, i * 10 + 5);
                store.insert(&rec).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.list_all().await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn corrupt_log_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        fs::write(&path, b"{not json").unwrap();

        let store = JsonFileRecordStore::open(&path);
        assert!(matches!(
            store.list_all().await,
            Err(StoreError::Serialization(_))
        ));
    }
}

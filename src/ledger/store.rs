// Store module - persists the log aggregates between runs
//
// The aggregates are written as three JSON strings into a flat key-value
// layer, one key per aggregate:
//   <namespace>.logsMetadata
//   <namespace>.playerLogs
//   <namespace>.dropTypeLogs
//
// On disk each key is one file inside the data directory, e.g.
// ./data/betterfriends.playerLogs.json
//
// A save commits all three keys or none of them. The metadata carries the
// ingestion watermark, so it is written last; a failed write restores the
// keys written before it.

use super::aggregates::{DropTypeLogs, LogAggregates, LogsMetadata, PlayerLogs};
use super::error::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

/// Synchronous string key-value storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Delete `key`; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// One file per key under a directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create the store, creating `dir` if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        // Write-then-rename so a crash never leaves half a value behind
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };
        fs::write(&tmp, value).map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(io_err)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(StoreError::Io {
                key: key.to_string(),
                source: e,
            }),
            _ => Ok(()),
        }
    }
}

/// Process-local store for demo mode and tests
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.remove(key);
        Ok(())
    }
}

const METADATA_KEY: &str = "logsMetadata";
const PLAYER_LOGS_KEY: &str = "playerLogs";
const DROP_TYPE_LOGS_KEY: &str = "dropTypeLogs";

/// Namespaced view of a [`KeyValueStore`] holding the three aggregates
pub struct LogStore {
    kv: Box<dyn KeyValueStore>,
    namespace: String,
}

impl LogStore {
    pub fn new(kv: Box<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            kv,
            namespace: namespace.into(),
        }
    }

    fn key(&self, name: &str) -> String {
        format!("{}.{}", self.namespace, name)
    }

    fn load_one<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T, StoreError> {
        let key = self.key(name);
        match self.kv.get(&key)? {
            Some(raw) => {
                serde_json::from_str(&raw).map_err(|source| StoreError::Serde { key, source })
            }
            None => Ok(T::default()),
        }
    }

    fn encode<T: Serialize>(&self, name: &str, value: &T) -> Result<(String, String), StoreError> {
        let key = self.key(name);
        match serde_json::to_string(value) {
            Ok(raw) => Ok((key, raw)),
            Err(source) => Err(StoreError::Serde { key, source }),
        }
    }

    /// Put back the values `written` held before a failed save
    fn roll_back(&self, written: &[(String, Option<String>)]) {
        for (key, previous) in written.iter().rev() {
            let restored = match previous {
                Some(raw) => self.kv.set(key, raw),
                None => self.kv.remove(key),
            };
            if let Err(e) = restored {
                tracing::error!("Could not restore {} after a failed save: {}", key, e);
            }
        }
    }

    /// Load all three aggregates; missing keys load as empty
    pub fn load(&self) -> Result<LogAggregates, StoreError> {
        Ok(LogAggregates {
            metadata: self.load_one::<LogsMetadata>(METADATA_KEY)?,
            player_logs: self.load_one::<PlayerLogs>(PLAYER_LOGS_KEY)?,
            drop_type_logs: self.load_one::<DropTypeLogs>(DROP_TYPE_LOGS_KEY)?,
        })
    }

    /// Overwrite all three keys with the given snapshot
    ///
    /// On error the stored values are the ones from before the call.
    pub fn save(&self, aggregates: &LogAggregates) -> Result<(), StoreError> {
        let staged = [
            self.encode(DROP_TYPE_LOGS_KEY, &aggregates.drop_type_logs)?,
            self.encode(PLAYER_LOGS_KEY, &aggregates.player_logs)?,
            self.encode(METADATA_KEY, &aggregates.metadata)?,
        ];

        let mut written = Vec::with_capacity(staged.len());
        for (key, raw) in &staged {
            let previous = match self.kv.get(key) {
                Ok(previous) => previous,
                Err(e) => {
                    self.roll_back(&written);
                    return Err(e);
                }
            };
            if let Err(e) = self.kv.set(key, raw) {
                tracing::warn!("Saving {} failed, restoring previous snapshot", key);
                self.roll_back(&written);
                return Err(e);
            }
            written.push((key.clone(), previous));
        }

        tracing::debug!(
            "Saved log aggregates ({} friends, {} categories)",
            aggregates.player_logs.len(),
            aggregates.drop_type_logs.len()
        );
        Ok(())
    }

    /// Raw stored values, for comparing snapshots
    #[cfg(test)]
    pub fn raw_values(&self) -> Result<[Option<String>; 3], StoreError> {
        Ok([
            self.kv.get(&self.key(METADATA_KEY))?,
            self.kv.get(&self.key(PLAYER_LOGS_KEY))?,
            self.kv.get(&self.key(DROP_TYPE_LOGS_KEY))?,
        ])
    }
}

/// Shares one store between a [`LogStore`] and the test that inspects it
#[cfg(test)]
impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// In-memory store whose next write to one key fails
#[cfg(test)]
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing_key: Mutex<Option<String>>,
}

#[cfg(test)]
impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_set(&self, key: &str) {
        *self.failing_key.lock().unwrap() = Some(key.to_string());
    }
}

#[cfg(test)]
impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut failing = self.failing_key.lock().unwrap();
        if failing.as_deref() == Some(key) {
            *failing = None;
            return Err(StoreError::Io {
                key: key.to_string(),
                source: std::io::Error::other("disk full"),
            });
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::FRIEND_DROP;

    #[test]
    fn test_file_store_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        assert_eq!(store.get("nothing").unwrap(), None);
    }

    #[test]
    fn test_file_store_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested")).unwrap();

        store.set("k", "first").unwrap();
        store.set("k", "second").unwrap();

        assert_eq!(store.get("k").unwrap().as_deref(), Some("second"));
        assert!(!dir.path().join("nested").join("k.json.tmp").exists());
    }

    #[test]
    fn test_log_store_first_run_is_empty() {
        let store = LogStore::new(Box::new(MemoryStore::new()), "betterfriends");
        let aggregates = store.load().unwrap();
        assert_eq!(aggregates, LogAggregates::default());
    }

    #[test]
    fn test_log_store_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = LogStore::new(Box::new(FileStore::new(dir.path()).unwrap()), "ns");

        let mut aggregates = LogAggregates::default();
        aggregates.reset_for("Hearts");
        aggregates.metadata.newest_seen = 1_700_000_000;
        aggregates.add_drop(FRIEND_DROP, 10);
        aggregates.add_friend_drop(42, 10, 1_700_000_000);
        store.save(&aggregates).unwrap();

        assert!(dir.path().join("ns.playerLogs.json").exists());
        assert_eq!(store.load().unwrap(), aggregates);
    }

    #[test]
    fn test_file_store_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        store.remove("k").unwrap();

        assert_eq!(store.get("k").unwrap(), None);
    }

    fn snapshot(newest_seen: i64, value: i64) -> LogAggregates {
        let mut aggregates = LogAggregates::default();
        aggregates.reset_for("Hearts");
        aggregates.metadata.newest_seen = newest_seen;
        aggregates.add_drop(FRIEND_DROP, value);
        aggregates.add_friend_drop(1, value, newest_seen);
        aggregates
    }

    #[test]
    fn test_failed_save_restores_previous_snapshot() {
        let kv = std::sync::Arc::new(FlakyStore::new());
        let store = LogStore::new(Box::new(kv.clone()), "ns");
        let before = snapshot(100, 5);
        store.save(&before).unwrap();

        for key in ["ns.dropTypeLogs", "ns.playerLogs", "ns.logsMetadata"] {
            kv.fail_next_set(key);
            let result = store.save(&snapshot(200, 15));

            match result {
                Err(StoreError::Io { key: failed, .. }) => assert_eq!(failed, key),
                other => panic!("expected Io error, got {:?}", other),
            }
            assert_eq!(store.load().unwrap(), before);
        }
    }

    #[test]
    fn test_failed_first_save_leaves_store_empty() {
        let kv = std::sync::Arc::new(FlakyStore::new());
        let store = LogStore::new(Box::new(kv.clone()), "ns");

        kv.fail_next_set("ns.logsMetadata");
        assert!(store.save(&snapshot(200, 15)).is_err());

        assert_eq!(store.raw_values().unwrap(), [None, None, None]);
    }

    #[test]
    fn test_log_store_reports_corrupt_value() {
        let kv = MemoryStore::new();
        kv.set("ns.dropTypeLogs", "{not json").unwrap();
        let store = LogStore::new(Box::new(kv), "ns");

        match store.load() {
            Err(StoreError::Serde { key, .. }) => assert_eq!(key, "ns.dropTypeLogs"),
            other => panic!("expected Serde error, got {:?}", other),
        }
    }
}

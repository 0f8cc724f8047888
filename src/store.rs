//! JSON file store for the four record sets.
//!
//! This module provides:
//! - One pretty-printed JSON document per record set inside a data directory
//! - Read snapshots that may run concurrently with each other
//! - Exclusive transactions spanning the full load-mutate-commit of an operation
//!
//! # Atomicity Guarantees
//!
//! A store-wide `RwLock` is held for the lifetime of a `Snapshot` (shared) or a
//! `Transaction` (exclusive), so two operations can never both observe the same
//! pre-mutation state. On commit every dirty set is serialized before anything is written,
//! then written to a temporary sibling file and renamed over the original. Dropping a
//! transaction without committing discards its staged changes.

use crate::models::{
    cooldown::Cooldowns,
    key::{KeyMap, UsedKeyLog, UserBindings},
};
use serde::{Serialize, de::DeserializeOwned};
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The independently addressable record sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSet {
    Keys,
    Users,
    Cooldowns,
    UsedKeys,
}

impl RecordSet {
    pub const ALL: [RecordSet; 4] = [
        RecordSet::Keys,
        RecordSet::Users,
        RecordSet::Cooldowns,
        RecordSet::UsedKeys,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            RecordSet::Keys => "keys.json",
            RecordSet::Users => "users.json",
            RecordSet::Cooldowns => "cooldowns.json",
            RecordSet::UsedKeys => "usedkeys.json",
        }
    }
}

/// Store failures. Every variant is a persistence fault.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed record set {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize {set:?}: {source}")]
    Serialize {
        set: RecordSet,
        #[source]
        source: serde_json::Error,
    },

    #[error("store writer task failed: {0}")]
    Writer(#[from] tokio::task::JoinError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Handle to the data directory. Cheap to clone; clones share one lock.
#[derive(Debug, Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    dir: PathBuf,
    lock: RwLock<()>,
}

impl Store {
    /// Open (creating if needed) the data directory.
    ///
    /// Every existing record set is parsed up front so a malformed file is reported at
    /// startup instead of on the first command that touches it.
    ///
    /// # Errors
    ///
    /// - `Io`: the directory cannot be created or a file cannot be read
    /// - `Malformed`: a record set is not valid JSON of the expected shape
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;

        let store = Self {
            inner: Arc::new(StoreInner {
                dir,
                lock: RwLock::new(()),
            }),
        };

        store.load::<KeyMap>(RecordSet::Keys)?;
        store.load::<UserBindings>(RecordSet::Users)?;
        store.load::<Cooldowns>(RecordSet::Cooldowns)?;
        store.load::<UsedKeyLog>(RecordSet::UsedKeys)?;

        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    pub fn path(&self, set: RecordSet) -> PathBuf {
        self.inner.dir.join(set.file_name())
    }

    /// Acquire a shared snapshot. Blocks while a transaction is open.
    pub async fn read(&self) -> Snapshot<'_> {
        Snapshot {
            store: self,
            _guard: self.inner.lock.read().await,
        }
    }

    /// Begin an exclusive transaction. Blocks while any snapshot or transaction is open.
    pub async fn begin(&self) -> Transaction<'_> {
        Transaction {
            store: self,
            _guard: self.inner.lock.write().await,
            keys: Staged::default(),
            users: Staged::default(),
            cooldowns: Staged::default(),
            used_keys: Staged::default(),
        }
    }

    /// Load one set. A missing file is an empty set.
    fn load<T: DeserializeOwned + Default>(&self, set: RecordSet) -> StoreResult<T> {
        let path = self.path(set);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        serde_json::from_str(&contents).map_err(|source| StoreError::Malformed { path, source })
    }

    fn temp_path(&self, set: RecordSet) -> PathBuf {
        self.inner.dir.join(format!("{}.tmp", set.file_name()))
    }
}

/// A serialized set waiting to be written.
struct PendingWrite {
    temp: PathBuf,
    path: PathBuf,
    json: String,
}

/// Write every pending set to its temporary file, then rename them all into place.
///
/// If any temporary file cannot be written, the ones already written are removed and no
/// set is replaced.
fn write_all(pending: Vec<PendingWrite>) -> StoreResult<()> {
    let mut staged: Vec<&PendingWrite> = Vec::with_capacity(pending.len());
    for write in &pending {
        if let Err(source) = fs::write(&write.temp, &write.json) {
            for done in &staged {
                let _ = fs::remove_file(&done.temp);
            }
            return Err(StoreError::Io {
                path: write.temp.clone(),
                source,
            });
        }
        staged.push(write);
    }

    for write in staged {
        fs::rename(&write.temp, &write.path).map_err(|source| StoreError::Io {
            path: write.path.clone(),
            source,
        })?;
    }

    Ok(())
}

/// Shared read access to the record sets.
pub struct Snapshot<'a> {
    store: &'a Store,
    _guard: RwLockReadGuard<'a, ()>,
}

impl Snapshot<'_> {
    pub fn keys(&self) -> StoreResult<KeyMap> {
        self.store.load(RecordSet::Keys)
    }

    pub fn users(&self) -> StoreResult<UserBindings> {
        self.store.load(RecordSet::Users)
    }

    pub fn cooldowns(&self) -> StoreResult<Cooldowns> {
        self.store.load(RecordSet::Cooldowns)
    }

    pub fn used_keys(&self) -> StoreResult<UsedKeyLog> {
        self.store.load(RecordSet::UsedKeys)
    }
}

/// A record set loaded on first access inside a transaction.
#[derive(Default)]
struct Staged<T> {
    value: Option<T>,
    dirty: bool,
}

impl<T: DeserializeOwned + Serialize + Default> Staged<T> {
    fn get(&mut self, store: &Store, set: RecordSet) -> StoreResult<&mut T> {
        let value = match self.value.take() {
            Some(value) => value,
            None => store.load(set)?,
        };
        Ok(self.value.insert(value))
    }

    fn get_mut(&mut self, store: &Store, set: RecordSet) -> StoreResult<&mut T> {
        self.dirty = true;
        self.get(store, set)
    }

    fn encode(&self, set: RecordSet) -> StoreResult<Option<String>> {
        match (&self.value, self.dirty) {
            (Some(value), true) => serde_json::to_string_pretty(value)
                .map(Some)
                .map_err(|source| StoreError::Serialize { set, source }),
            _ => Ok(None),
        }
    }
}

/// Exclusive read-modify-write access to the record sets.
///
/// Sets are loaded lazily on first access and written back on `commit` only if they were
/// borrowed mutably.
pub struct Transaction<'a> {
    store: &'a Store,
    _guard: RwLockWriteGuard<'a, ()>,
    keys: Staged<KeyMap>,
    users: Staged<UserBindings>,
    cooldowns: Staged<Cooldowns>,
    used_keys: Staged<UsedKeyLog>,
}

impl Transaction<'_> {
    pub fn keys(&mut self) -> StoreResult<&KeyMap> {
        self.keys.get(self.store, RecordSet::Keys).map(|v| &*v)
    }

    pub fn keys_mut(&mut self) -> StoreResult<&mut KeyMap> {
        self.keys.get_mut(self.store, RecordSet::Keys)
    }

    pub fn users(&mut self) -> StoreResult<&UserBindings> {
        self.users.get(self.store, RecordSet::Users).map(|v| &*v)
    }

    pub fn users_mut(&mut self) -> StoreResult<&mut UserBindings> {
        self.users.get_mut(self.store, RecordSet::Users)
    }

    pub fn cooldowns(&mut self) -> StoreResult<&Cooldowns> {
        self.cooldowns
            .get(self.store, RecordSet::Cooldowns)
            .map(|v| &*v)
    }

    pub fn cooldowns_mut(&mut self) -> StoreResult<&mut Cooldowns> {
        self.cooldowns.get_mut(self.store, RecordSet::Cooldowns)
    }

    pub fn used_keys_mut(&mut self) -> StoreResult<&mut UsedKeyLog> {
        self.used_keys.get_mut(self.store, RecordSet::UsedKeys)
    }

    /// Write every modified set back to disk.
    ///
    /// # Process
    ///
    /// 1. Serialize all dirty sets (nothing is written if any fails)
    /// 2. Write each to a temporary file (staged files are removed if any fails)
    /// 3. Rename the temporary files over the originals
    ///
    /// Steps 2 and 3 run on the blocking pool; the store lock is held until they finish.
    pub async fn commit(self) -> StoreResult<()> {
        let encoded = [
            (RecordSet::Keys, self.keys.encode(RecordSet::Keys)?),
            (RecordSet::Users, self.users.encode(RecordSet::Users)?),
            (
                RecordSet::Cooldowns,
                self.cooldowns.encode(RecordSet::Cooldowns)?,
            ),
            (
                RecordSet::UsedKeys,
                self.used_keys.encode(RecordSet::UsedKeys)?,
            ),
        ];

        let pending: Vec<PendingWrite> = encoded
            .into_iter()
            .filter_map(|(set, json)| {
                json.map(|json| PendingWrite {
                    temp: self.store.temp_path(set),
                    path: self.store.path(set),
                    json,
                })
            })
            .collect();

        if pending.is_empty() {
            return Ok(());
        }

        tokio::task::spawn_blocking(move || write_all(pending)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::key::KeyState;

    #[tokio::test]
    async fn missing_sets_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();

        let snapshot = store.read().await;
        assert!(snapshot.keys().unwrap().is_empty());
        assert!(snapshot.users().unwrap().is_empty());
        assert!(snapshot.cooldowns().unwrap().is_empty());
        assert!(snapshot.used_keys().unwrap().is_empty());
    }

    #[tokio::test]
    async fn commit_writes_only_dirty_sets() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();

        let mut tx = store.begin().await;
        tx.keys_mut()
            .unwrap()
            .insert("12345678901".to_string(), KeyState::Unredeemed);
        tx.users().unwrap();
        tx.commit().await.unwrap();

        assert!(store.path(RecordSet::Keys).exists());
        assert!(!store.path(RecordSet::Users).exists());
        assert!(!store.temp_path(RecordSet::Keys).exists());

        let keys = store.read().await.keys().unwrap();
        assert_eq!(keys.get("12345678901"), Some(&KeyState::Unredeemed));
    }

    #[tokio::test]
    async fn dropped_transaction_discards_changes() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();

        {
            let mut tx = store.begin().await;
            tx.cooldowns_mut().unwrap().insert("alice".to_string(), 42);
        }

        assert!(store.read().await.cooldowns().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_staging_replaces_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        // A directory where the users temp file should go makes its write fail.
        fs::create_dir(store.temp_path(RecordSet::Users)).unwrap();

        let mut tx = store.begin().await;
        tx.keys_mut()
            .unwrap()
            .insert("12345678901".to_string(), KeyState::Unredeemed);
        tx.users_mut()
            .unwrap()
            .insert("alice".to_string(), "12345678901".to_string());
        let err = tx.commit().await.unwrap_err();

        assert!(matches!(err, StoreError::Io { .. }));
        assert!(!store.path(RecordSet::Keys).exists());
        assert!(!store.temp_path(RecordSet::Keys).exists());
        assert!(store.read().await.keys().unwrap().is_empty());
    }

    #[test]
    fn malformed_set_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("keys.json"), "{ not json").unwrap();

        let err = Store::open(dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
    }
}

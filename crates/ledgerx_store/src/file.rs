//! File-based store backend for persistent storage.

use crate::error::{StoreError, StoreResult};
use crate::store::LedgerStore;
use ledgerx_types::LedgerEntry;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A file-backed ledger store.
///
/// The full entry set is persisted as one JSON snapshot. Every `put` writes
/// the snapshot to a temporary sibling file, calls `sync_all`, and atomically
/// renames it over the live file, so a crash mid-write leaves the previous
/// snapshot intact.
///
/// # Durability
///
/// `put` returns only after `File::sync_all` and the rename have succeeded.
///
/// # Thread Safety
///
/// This backend is thread-safe within one process. It does not arbitrate
/// between processes: two processes writing one snapshot race
/// last-writer-wins.
///
/// # Example
///
/// ```no_run
/// use ledgerx_store::{FileStore, LedgerStore};
/// use std::path::Path;
///
/// let store = FileStore::open(Path::new("ledger.json")).unwrap();
/// let entry = ledgerx_types::LedgerEntry::new("e-1", "u-1", "order", serde_json::json!({}));
/// store.put(&entry).unwrap();
/// ```
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, LedgerEntry>>,
}

impl FileStore {
    /// Opens or creates a file store at the given path.
    ///
    /// If the file exists its snapshot is loaded; otherwise the store starts
    /// empty and the file is created on the first `put`.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing snapshot cannot be read or parsed.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let entries = if path.exists() {
            let bytes = fs::read(path)?;
            if bytes.is_empty() {
                HashMap::new()
            } else {
                let list: Vec<LedgerEntry> = serde_json::from_slice(&bytes)?;
                let mut map = HashMap::with_capacity(list.len());
                for entry in list {
                    if map.insert(entry.id.clone(), entry).is_some() {
                        return Err(StoreError::Corrupted(
                            "snapshot contains duplicate entry ids".into(),
                        ));
                    }
                }
                map
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries: RwLock::new(entries),
        })
    }

    /// Opens or creates a file store, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or the snapshot
    /// cannot be read.
    pub fn open_with_create_dirs(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Self::open(path)
    }

    /// Returns the path to the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the current entry map to disk, durable before returning.
    fn persist(&self, entries: &HashMap<String, LedgerEntry>) -> StoreResult<()> {
        let list: Vec<&LedgerEntry> = entries.values().collect();
        let bytes = serde_json::to_vec(&list)?;

        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl LedgerStore for FileStore {
    fn put(&self, entry: &LedgerEntry) -> StoreResult<()> {
        let mut entries = self.entries.write();
        let previous = entries.insert(entry.id.clone(), entry.clone());

        if let Err(e) = self.persist(&entries) {
            // Roll the in-memory map back so a failed write is not
            // observable through get_all.
            match previous {
                Some(old) => {
                    entries.insert(entry.id.clone(), old);
                }
                None => {
                    entries.remove(&entry.id);
                }
            }
            tracing::error!(id = %entry.id, error = %e, "failed to persist ledger snapshot");
            return Err(e);
        }
        Ok(())
    }

    fn get_all(&self) -> StoreResult<Vec<LedgerEntry>> {
        Ok(self.entries.read().values().cloned().collect())
    }

    fn get(&self, id: &str) -> StoreResult<Option<LedgerEntry>> {
        Ok(self.entries.read().get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerx_types::EntryStatus;
    use serde_json::json;

    fn entry(id: &str) -> LedgerEntry {
        LedgerEntry::new(id, "u-1", "booking", json!({"slot": "9am"}))
    }

    #[test]
    fn file_open_missing_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(&dir.path().join("ledger.json")).unwrap();
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn file_put_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");

        let store = FileStore::open(&path).unwrap();
        store.put(&entry("e-1")).unwrap();
        store.put(&entry("e-2")).unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        let all = reopened.get_all().unwrap();
        assert_eq!(all.len(), 2);
        assert!(reopened.get("e-1").unwrap().is_some());
    }

    #[test]
    fn file_put_upserts_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");

        let store = FileStore::open(&path).unwrap();
        let mut e = entry("e-1");
        store.put(&e).unwrap();
        e.set_status(EntryStatus::Cancelled);
        store.put(&e).unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        let all = reopened.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, EntryStatus::Cancelled);
    }

    #[test]
    fn file_open_with_create_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("ledger.json");

        let store = FileStore::open_with_create_dirs(&path).unwrap();
        store.put(&entry("e-1")).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn file_open_corrupt_snapshot_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, b"not json at all").unwrap();

        let result = FileStore::open(&path);
        assert!(matches!(result, Err(StoreError::Codec(_))));
    }

    #[test]
    fn file_open_empty_snapshot_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, b"").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert!(store.get_all().unwrap().is_empty());
    }
}

//! Ordered log of committed moves, with undo of the most recent one.
//!
//! The log lives in memory and, when opened from a file, is rewritten atomically as JSON after
//! every change. Each change re-reads the file under an advisory lock (`<file>.lock`), so
//! concurrent processes append to one log instead of overwriting each other. A failed write is
//! logged and does not undo the move that was just made.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use super::RelocationTransaction;
use crate::errors::RuleMoveError;
use crate::platform::write_file_atomic_0600;
use crate::vault::{FileLock, Vault, acquire_file_lock};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub timestamp: DateTime<Utc>,
    pub original_path: String,
    pub target_path: String,
}

impl MoveRecord {
    pub fn new(original_path: impl Into<String>, target_path: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            original_path: original_path.into(),
            target_path: target_path.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct MoveHistory {
    entries: Mutex<Vec<MoveRecord>>,
    file: Option<PathBuf>,
}

impl MoveHistory {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the log stored at `path`; a missing file starts an empty log there.
    pub fn open(path: &Path) -> Result<Self, RuleMoveError> {
        let entries = read_entries(path)?;
        debug!(path = %path.display(), entries = entries.len(), "history loaded");
        Ok(Self {
            entries: Mutex::new(entries),
            file: Some(path.to_path_buf()),
        })
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<MoveRecord>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a committed move.
    pub fn record(&self, record: MoveRecord) {
        let mut entries = self.lock();
        let _file_lock = self.lock_file();
        self.refresh(&mut entries);
        entries.push(record);
        self.persist(&entries);
    }

    pub fn entries(&self) -> Vec<MoveRecord> {
        self.lock().clone()
    }

    pub fn last(&self) -> Option<MoveRecord> {
        self.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Move the most recently relocated file back and drop it from the log.
    /// If the reverse rename fails the entry stays, so the undo can be retried.
    pub fn undo_last<V: Vault + ?Sized>(&self, vault: &V) -> Result<MoveRecord, RuleMoveError> {
        let mut entries = self.lock();
        let _file_lock = self.lock_file();
        self.refresh(&mut entries);
        let record = entries.last().cloned().ok_or(RuleMoveError::NothingToUndo)?;

        let mut tx = RelocationTransaction::begin("undo", &record.target_path, &record.original_path);
        tx.perform(vault)?;

        entries.pop();
        self.persist(&entries);
        info!(from = %record.target_path, to = %record.original_path, "Undid move");
        Ok(record)
    }

    /// Exclusive lock on the backing file; `None` for in-memory logs or when locking fails.
    fn lock_file(&self) -> Option<FileLock> {
        let path = self.file.as_deref()?;
        let lock_path = lock_path_for(path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            let _ = fs::create_dir_all(parent);
        }
        match acquire_file_lock(&lock_path) {
            Ok(lock) => Some(lock),
            Err(e) => {
                warn!(path = %lock_path.display(), error = %e, "failed to lock move history");
                None
            }
        }
    }

    /// Pick up entries other processes wrote since this handle last looked.
    fn refresh(&self, entries: &mut Vec<MoveRecord>) {
        let Some(path) = &self.file else {
            return;
        };
        match read_entries(path) {
            Ok(on_disk) => *entries = on_disk,
            Err(e) => warn!(error = %e, "keeping in-memory move history"),
        }
    }

    fn persist(&self, entries: &[MoveRecord]) {
        let Some(path) = &self.file else {
            return;
        };
        let written = serde_json::to_vec_pretty(entries)
            .map_err(anyhow::Error::from)
            .and_then(|bytes| write_file_atomic_0600(path, &bytes));
        if let Err(e) = written {
            warn!(path = %path.display(), error = %e, "failed to write move history");
        }
    }
}

fn read_entries(path: &Path) -> Result<Vec<MoveRecord>, RuleMoveError> {
    match fs::read(path) {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| RuleMoveError::History {
            path: path.to_path_buf(),
            reason: format!("malformed history: {e}"),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(RuleMoveError::History {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::RenameFailure;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FlakyVault {
        fail: AtomicBool,
    }

    impl Vault for FlakyVault {
        fn rename(&self, _from: &str, _to: &str) -> Result<(), RenameFailure> {
            if self.fail.load(Ordering::SeqCst) {
                Err(RenameFailure::Conflict("occupied".into()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn undo_on_empty_log() {
        let history = MoveHistory::in_memory();
        let vault = FlakyVault { fail: AtomicBool::new(false) };
        assert!(matches!(history.undo_last(&vault), Err(RuleMoveError::NothingToUndo)));
    }

    #[test]
    fn failed_undo_keeps_entry() {
        let history = MoveHistory::in_memory();
        history.record(MoveRecord::new("a.md", "A/a.md"));
        let vault = FlakyVault { fail: AtomicBool::new(true) };
        assert!(history.undo_last(&vault).is_err());
        assert_eq!(history.len(), 1);

        vault.fail.store(false, Ordering::SeqCst);
        let undone = history.undo_last(&vault).unwrap();
        assert_eq!(undone.original_path, "a.md");
        assert!(history.is_empty());
    }

    #[test]
    fn persisted_log_reloads_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        {
            let history = MoveHistory::open(&path).unwrap();
            history.record(MoveRecord::new("a.md", "A/a.md"));
            history.record(MoveRecord::new("b.md", "B/b.md"));
        }
        let reloaded = MoveHistory::open(&path).unwrap();
        let targets: Vec<_> = reloaded.entries().into_iter().map(|r| r.target_path).collect();
        assert_eq!(targets, vec!["A/a.md", "B/b.md"]);
    }

    #[test]
    fn two_handles_on_one_file_keep_both_moves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let first = MoveHistory::open(&path).unwrap();
        let second = MoveHistory::open(&path).unwrap();
        first.record(MoveRecord::new("a.md", "A/a.md"));
        second.record(MoveRecord::new("b.md", "B/b.md"));

        let reloaded = MoveHistory::open(&path).unwrap();
        let targets: Vec<_> = reloaded.entries().into_iter().map(|r| r.target_path).collect();
        assert_eq!(targets, vec!["A/a.md", "B/b.md"]);
    }

    #[test]
    fn undo_sees_moves_recorded_by_another_handle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let first = MoveHistory::open(&path).unwrap();
        let second = MoveHistory::open(&path).unwrap();
        first.record(MoveRecord::new("a.md", "A/a.md"));
        second.record(MoveRecord::new("b.md", "B/b.md"));

        let vault = FlakyVault { fail: AtomicBool::new(false) };
        let undone = first.undo_last(&vault).unwrap();
        assert_eq!(undone.target_path, "B/b.md");

        let reloaded = MoveHistory::open(&path).unwrap();
        let targets: Vec<_> = reloaded.entries().into_iter().map(|r| r.target_path).collect();
        assert_eq!(targets, vec!["A/a.md"]);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(MoveHistory::open(&path), Err(RuleMoveError::History { .. })));
    }
}

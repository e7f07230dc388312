//! In-process serialization of moves that resolve to the same target path.
//! Two relocations racing for one target run one after the other; the second then sees the
//! first's file at the destination and fails as a conflict instead of clobbering it.

use std::collections::HashSet;
use std::sync::{Condvar, Mutex, PoisonError};
use tracing::trace;

#[derive(Debug, Default)]
pub(crate) struct TargetLocks {
    busy: Mutex<HashSet<String>>,
    freed: Condvar,
}

/// Held while a move into `key` is in progress.
pub(crate) struct TargetGuard<'a> {
    locks: &'a TargetLocks,
    key: String,
}

impl TargetLocks {
    pub(crate) fn acquire(&self, key: &str) -> TargetGuard<'_> {
        let mut busy = self.busy.lock().unwrap_or_else(PoisonError::into_inner);
        while busy.contains(key) {
            trace!(target_path = key, "waiting for in-flight move to same target");
            busy = self.freed.wait(busy).unwrap_or_else(PoisonError::into_inner);
        }
        busy.insert(key.to_string());
        TargetGuard {
            locks: self,
            key: key.to_string(),
        }
    }

    #[cfg(test)]
    fn is_busy(&self, key: &str) -> bool {
        self.busy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }
}

impl Drop for TargetGuard<'_> {
    fn drop(&mut self) {
        let mut busy = self.locks.busy.lock().unwrap_or_else(PoisonError::into_inner);
        busy.remove(&self.key);
        drop(busy);
        self.locks.freed.notify_all();
    }
}

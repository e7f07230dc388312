//! Current rule snapshot, replaced wholesale on edit.
//! Readers take an `Arc` and keep using it even if a newer snapshot is installed meanwhile.

use std::sync::{Arc, PoisonError, RwLock};

use super::RuleSet;

#[derive(Debug, Default)]
pub struct RuleStore {
    current: RwLock<Arc<RuleSet>>,
}

impl RuleStore {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            current: RwLock::new(Arc::new(rules)),
        }
    }

    /// Snapshot to use for one relocation.
    pub fn snapshot(&self) -> Arc<RuleSet> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Install a new snapshot; returns the previous one.
    pub fn replace(&self, rules: RuleSet) -> Arc<RuleSet> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(rules))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::FolderRule;

    #[test]
    fn old_snapshot_survives_replace() {
        let store = RuleStore::new(RuleSet::new(vec![FolderRule::new("a", "A/")]));
        let before = store.snapshot();
        store.replace(RuleSet::new(vec![FolderRule::new("b", "B/")]));
        let after = store.snapshot();
        assert_eq!(before.to_rules()[0].file_regex, "a");
        assert_eq!(after.to_rules()[0].file_regex, "b");
    }
}

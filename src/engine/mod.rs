//! Relocation engine.
//! Brings a file to its canonical location: select rule, compute target, skip if already
//! there, otherwise run one transaction against the vault.
//!
//! Notes:
//! - Rules are passed per call as an immutable snapshot; edits take effect on the next call.
//! - Moves into the same target path are serialized within the process.
//! - Once a rename is handed to the vault it runs to completion; shutdown only prevents new ones.

mod locks;

use rayon::prelude::*;
use tracing::{error, info, warn};

use crate::errors::RuleMoveError;
use crate::file::FileDescriptor;
use crate::path::{compute_target_path, is_at_canonical_location};
use crate::rules::{RuleSet, select_rule};
use crate::shutdown;
use crate::transaction::{MoveHistory, MoveRecord, RelocationTransaction};
use crate::vault::Vault;

use locks::TargetLocks;

/// Result of a relocation that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Moved(String),
    AlreadyAtTarget,
    NoMatchingRule,
}

/// What `relocate` would do, computed without touching the vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Move { from: String, to: String },
    AlreadyAtTarget,
    NoMatchingRule,
}

/// One file's result in a sweep.
#[derive(Debug)]
pub struct SweepEntry {
    pub path: String,
    pub result: Result<Outcome, RuleMoveError>,
}

pub struct RelocationEngine<V> {
    vault: V,
    history: MoveHistory,
    locks: TargetLocks,
}

impl<V: Vault> RelocationEngine<V> {
    /// Engine with an in-memory history.
    pub fn new(vault: V) -> Self {
        Self::with_history(vault, MoveHistory::in_memory())
    }

    pub fn with_history(vault: V, history: MoveHistory) -> Self {
        Self {
            vault,
            history,
            locks: TargetLocks::default(),
        }
    }

    pub fn vault(&self) -> &V {
        &self.vault
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    pub fn plan(&self, rules: &RuleSet, file: &FileDescriptor) -> Plan {
        let Some(rule) = select_rule(rules, file) else {
            return Plan::NoMatchingRule;
        };
        let target = compute_target_path(rule, file);
        if is_at_canonical_location(file, &target) {
            return Plan::AlreadyAtTarget;
        }
        Plan::Move {
            from: file.path.clone(),
            to: target,
        }
    }

    /// Move `file` to its canonical location if it is not there already.
    pub fn relocate(&self, rules: &RuleSet, file: &FileDescriptor) -> Result<Outcome, RuleMoveError> {
        let (from, to) = match self.plan(rules, file) {
            Plan::NoMatchingRule => return Ok(Outcome::NoMatchingRule),
            Plan::AlreadyAtTarget => {
                info!(path = %file.path, "already at preferred location");
                return Ok(Outcome::AlreadyAtTarget);
            }
            Plan::Move { from, to } => (from, to),
        };

        if shutdown::is_requested() {
            return Err(RuleMoveError::Interrupted(from));
        }

        let _guard = self.locks.acquire(&to);
        let mut tx = RelocationTransaction::begin("relocate", &from, &to).with_history(&self.history);
        match tx.perform(&self.vault) {
            Ok(()) => {
                info!(src = %from, dest = %to, "Moved to preferred location");
                Ok(Outcome::Moved(to))
            }
            Err(e @ RuleMoveError::InvalidTransactionState { .. }) => {
                error!(code = e.code(), kind = e.kind(), error = %e, "transaction misuse");
                Err(e)
            }
            Err(e) => {
                warn!(code = e.code(), kind = e.kind(), state = %tx.state(), error = %e, "Move failed");
                Err(e)
            }
        }
    }

    /// Relocate a batch of files in parallel. Results keep the input order.
    pub fn sweep(&self, rules: &RuleSet, files: &[FileDescriptor]) -> Vec<SweepEntry> {
        files
            .par_iter()
            .map(|file| SweepEntry {
                path: file.path.clone(),
                result: self.relocate(rules, file),
            })
            .collect()
    }

    /// Reverse the most recent move recorded by this engine's history.
    pub fn undo_last(&self) -> Result<MoveRecord, RuleMoveError> {
        self.history.undo_last(&self.vault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{FolderRule, default_rules};
    use crate::vault::RenameFailure;
    use serial_test::serial;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Vault keyed by path; rename fails when the destination is taken.
    #[derive(Default)]
    struct MapVault {
        files: Mutex<HashSet<String>>,
        renames: Mutex<usize>,
    }

    impl MapVault {
        fn with(paths: &[&str]) -> Self {
            let v = Self::default();
            v.files.lock().unwrap().extend(paths.iter().map(|p| p.to_string()));
            v
        }
    }

    impl Vault for MapVault {
        fn rename(&self, from: &str, to: &str) -> Result<(), RenameFailure> {
            *self.renames.lock().unwrap() += 1;
            let mut files = self.files.lock().unwrap();
            if !files.contains(from) {
                return Err(RenameFailure::Unavailable(format!("{from} vanished")));
            }
            if files.contains(to) {
                return Err(RenameFailure::Conflict(format!("{to} exists")));
            }
            files.remove(from);
            files.insert(to.to_string());
            Ok(())
        }
    }

    #[test]
    #[serial]
    fn plan_does_not_touch_vault() {
        shutdown::reset();
        let engine = RelocationEngine::new(MapVault::with(&["2024-05-01.md"]));
        let rules = RuleSet::new(default_rules());
        let plan = engine.plan(&rules, &FileDescriptor::from_vault_path("2024-05-01.md"));
        assert_eq!(
            plan,
            Plan::Move {
                from: "2024-05-01.md".into(),
                to: "DAILY/2024-05-01.md".into()
            }
        );
        assert_eq!(*engine.vault().renames.lock().unwrap(), 0);
    }

    #[test]
    #[serial]
    fn relocate_records_history_and_undo_restores() {
        shutdown::reset();
        let engine = RelocationEngine::new(MapVault::with(&["person/john.md"]));
        let rules = RuleSet::new(default_rules());
        let out = engine
            .relocate(&rules, &FileDescriptor::from_vault_path("person/john.md"))
            .unwrap();
        assert_eq!(out, Outcome::Moved("PERSONS/john.md".into()));
        assert_eq!(engine.history().len(), 1);

        let undone = engine.undo_last().unwrap();
        assert_eq!(undone.original_path, "person/john.md");
        assert!(engine.vault().files.lock().unwrap().contains("person/john.md"));
        assert!(engine.history().is_empty());
    }

    #[test]
    #[serial]
    fn sweep_collision_moves_exactly_one() {
        shutdown::reset();
        let engine = RelocationEngine::new(MapVault::with(&["a/x.md", "b/x.md", "c/other.md"]));
        let rules = RuleSet::new(vec![FolderRule::new(r"^(a|b)/", "X/")]);
        let files: Vec<_> = ["a/x.md", "b/x.md", "c/other.md"]
            .iter()
            .map(|p| FileDescriptor::from_vault_path(p))
            .collect();
        let results = engine.sweep(&rules, &files);

        assert_eq!(results.len(), 3);
        assert_eq!(results[2].path, "c/other.md");
        assert!(matches!(results[2].result, Ok(Outcome::NoMatchingRule)));

        let moved = results[..2]
            .iter()
            .filter(|e| matches!(e.result, Ok(Outcome::Moved(_))))
            .count();
        let conflicts = results[..2]
            .iter()
            .filter(|e| matches!(e.result, Err(RuleMoveError::RenameConflict { .. })))
            .count();
        assert_eq!((moved, conflicts), (1, 1));
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    #[serial]
    fn shutdown_blocks_new_moves() {
        shutdown::reset();
        shutdown::request();
        let engine = RelocationEngine::new(MapVault::with(&["2024-05-01.md"]));
        let rules = RuleSet::new(default_rules());
        let err = engine
            .relocate(&rules, &FileDescriptor::from_vault_path("2024-05-01.md"))
            .unwrap_err();
        assert!(matches!(err, RuleMoveError::Interrupted(_)));
        assert_eq!(*engine.vault().renames.lock().unwrap(), 0);
        shutdown::reset();
    }
}

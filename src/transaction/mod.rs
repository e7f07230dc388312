//! Single-shot relocation transaction.
//!
//! `Pending -> Committed | RolledBack`, never reused. `perform` drives the rename and moves the
//! transaction to its terminal state. Committing appends the move to the history log (when one
//! is attached). Rolling back is bookkeeping only: a vault rename either fully happens or leaves
//! the store untouched, so there is nothing to compensate.

mod history;

pub use history::{MoveHistory, MoveRecord};

use std::fmt;
use tracing::{debug, trace};

use crate::errors::RuleMoveError;
use crate::vault::Vault;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    Pending,
    Committed,
    RolledBack,
}

impl fmt::Display for TxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TxState::Pending => "pending",
            TxState::Committed => "committed",
            TxState::RolledBack => "rolled back",
        };
        f.write_str(s)
    }
}

#[derive(Debug)]
pub struct RelocationTransaction<'h> {
    label: String,
    original_path: String,
    target_path: String,
    state: TxState,
    history: Option<&'h MoveHistory>,
}

impl<'h> RelocationTransaction<'h> {
    /// Open a transaction. Nothing touches the store yet.
    pub fn begin(
        label: impl Into<String>,
        original_path: impl Into<String>,
        target_path: impl Into<String>,
    ) -> Self {
        let tx = Self {
            label: label.into(),
            original_path: original_path.into(),
            target_path: target_path.into(),
            state: TxState::Pending,
            history: None,
        };
        trace!(label = %tx.label, from = %tx.original_path, to = %tx.target_path, "transaction begin");
        tx
    }

    /// Record the move in `history` when the transaction commits.
    pub fn with_history(mut self, history: &'h MoveHistory) -> Self {
        self.history = Some(history);
        self
    }

    pub fn state(&self) -> TxState {
        self.state
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn original_path(&self) -> &str {
        &self.original_path
    }

    pub fn target_path(&self) -> &str {
        &self.target_path
    }

    /// Ask the vault to rename, then commit on success or roll back on failure.
    /// There is no mid-flight abort; the call returns once the vault answers.
    pub fn perform<V: Vault + ?Sized>(&mut self, vault: &V) -> Result<(), RuleMoveError> {
        self.ensure_pending("perform")?;
        match vault.rename(&self.original_path, &self.target_path) {
            Ok(()) => self.commit(),
            Err(failure) => {
                self.rollback()?;
                Err(failure.into_error(&self.original_path, &self.target_path))
            }
        }
    }

    /// Mark the move as done and append it to the history log.
    pub fn commit(&mut self) -> Result<(), RuleMoveError> {
        self.ensure_pending("commit")?;
        self.state = TxState::Committed;
        if let Some(history) = self.history {
            history.record(MoveRecord::new(&self.original_path, &self.target_path));
        }
        debug!(label = %self.label, from = %self.original_path, to = %self.target_path, "transaction committed");
        Ok(())
    }

    /// Mark the attempt as abandoned; the file is still at `original_path`.
    pub fn rollback(&mut self) -> Result<(), RuleMoveError> {
        self.ensure_pending("roll back")?;
        self.state = TxState::RolledBack;
        debug!(label = %self.label, from = %self.original_path, to = %self.target_path, "transaction rolled back");
        Ok(())
    }

    fn ensure_pending(&self, op: &'static str) -> Result<(), RuleMoveError> {
        if self.state == TxState::Pending {
            Ok(())
        } else {
            Err(RuleMoveError::InvalidTransactionState {
                path: self.original_path.clone(),
                op,
                state: self.state,
            })
        }
    }
}

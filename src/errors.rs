//! Typed error definitions for rule_move.
//! Covers rule validation, rename failures at the vault boundary and transaction misuse.

use std::path::PathBuf;
use thiserror::Error;

use crate::transaction::TxState;

#[derive(Debug, Error)]
pub enum RuleMoveError {
    #[error("Rule #{index} has an invalid pattern '{pattern}': {source}")]
    InvalidRulePattern {
        index: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Rule #{index} ('{pattern}') has an empty target folder")]
    EmptyTargetFolder { index: usize, pattern: String },

    #[error("Cannot move '{from}' to '{to}': {reason}")]
    RenameConflict {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Store unavailable while moving '{path}': {reason}")]
    HostUnavailable { path: String, reason: String },

    #[error("Transaction for '{path}' cannot {op} while {state}")]
    InvalidTransactionState {
        path: String,
        op: &'static str,
        state: TxState,
    },

    #[error("Move history is empty; nothing to undo")]
    NothingToUndo,

    #[error("Move history {path}: {reason}")]
    History { path: PathBuf, reason: String },

    #[error("Shutdown requested; not moving '{0}'")]
    Interrupted(String),
}

impl RuleMoveError {
    /// Stable numeric code for structured logs.
    pub fn code(&self) -> i32 {
        match self {
            RuleMoveError::InvalidRulePattern { .. } => 10,
            RuleMoveError::EmptyTargetFolder { .. } => 11,
            RuleMoveError::RenameConflict { .. } => 20,
            RuleMoveError::HostUnavailable { .. } => 21,
            RuleMoveError::InvalidTransactionState { .. } => 30,
            RuleMoveError::NothingToUndo => 40,
            RuleMoveError::History { .. } => 41,
            RuleMoveError::Interrupted(_) => 130,
        }
    }

    /// Short machine-friendly label, used as the `kind` field in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RuleMoveError::InvalidRulePattern { .. } => "invalid_rule_pattern",
            RuleMoveError::EmptyTargetFolder { .. } => "empty_target_folder",
            RuleMoveError::RenameConflict { .. } => "rename_conflict",
            RuleMoveError::HostUnavailable { .. } => "host_unavailable",
            RuleMoveError::InvalidTransactionState { .. } => "invalid_transaction_state",
            RuleMoveError::NothingToUndo => "nothing_to_undo",
            RuleMoveError::History { .. } => "history",
            RuleMoveError::Interrupted(_) => "interrupted",
        }
    }
}

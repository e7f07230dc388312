//! Core library for `rule_move`.
//!
//! Files in a vault are matched against an ordered list of regex rules; the first matching rule
//! names the folder the file belongs in. A misplaced file is moved there exactly once through a
//! single-shot transaction, and a file already in place is left alone.
//!
//! - `rules`: rule snapshots and first-match selection
//! - `path`: target computation and the "already in place" check
//! - `transaction`: the move lifecycle and the undo history
//! - `engine`: `plan`, `relocate`, `sweep`
//! - `vault`: the rename capability, with a filesystem implementation
//! - `hooks`: file-creation subscriptions
//! - `config`: XML settings and rule editing

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod file;
pub mod hooks;
pub mod output;
pub mod path;
pub mod platform;
pub mod rules;
pub mod shutdown;
pub mod transaction;
pub mod vault;

pub use config::{
    Config, LogLevel, default_config_path, default_history_path, default_log_path,
    path_has_symlink_ancestor,
};
pub use engine::{Outcome, Plan, RelocationEngine, SweepEntry};
pub use errors::RuleMoveError;
pub use file::FileDescriptor;
pub use path::{compute_target_path, is_at_canonical_location, normalize_path};
pub use rules::{FolderRule, RuleSet, RuleStore, default_rules, select_rule};
pub use transaction::{MoveHistory, MoveRecord, RelocationTransaction, TxState};
pub use vault::{FsVault, RenameFailure, Vault};

//! The store files live in.
//! The engine needs exactly one effectful capability from it: rename a file from one vault
//! path to another. `FsVault` provides it for a vault rooted at a directory on disk.

mod fs;
mod helpers;
mod lock;

pub use fs::FsVault;
pub use helpers::{describe_io_error, io_error_with_help};
pub use lock::{FileLock, LOCK_FILE_NAME, acquire_dir_lock, acquire_file_lock};

use thiserror::Error;

use crate::errors::RuleMoveError;

/// Why a rename was refused by the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenameFailure {
    /// Destination occupied, path invalid, or an I/O error; nothing was changed.
    #[error("{0}")]
    Conflict(String),
    /// The store could not be reached, or the source vanished before the rename.
    #[error("{0}")]
    Unavailable(String),
}

impl RenameFailure {
    pub fn into_error(self, from: &str, to: &str) -> RuleMoveError {
        match self {
            RenameFailure::Conflict(reason) => RuleMoveError::RenameConflict {
                from: from.to_string(),
                to: to.to_string(),
                reason,
            },
            RenameFailure::Unavailable(reason) => RuleMoveError::HostUnavailable {
                path: from.to_string(),
                reason,
            },
        }
    }
}

/// Rename capability of a store. A rename either fully happens or leaves the store untouched.
pub trait Vault: Send + Sync {
    fn rename(&self, from: &str, to: &str) -> Result<(), RenameFailure>;
}

impl<V: Vault + ?Sized> Vault for &V {
    fn rename(&self, from: &str, to: &str) -> Result<(), RenameFailure> {
        (**self).rename(from, to)
    }
}

impl<V: Vault + ?Sized> Vault for std::sync::Arc<V> {
    fn rename(&self, from: &str, to: &str) -> Result<(), RenameFailure> {
        (**self).rename(from, to)
    }
}

//! Vault backed by a directory on disk.
//! Vault paths map onto `root/<segments>`. A rename:
//! - fails with `Unavailable` if the source vanished (deleted between the hook and the move),
//! - creates the destination folder,
//! - refuses to overwrite an existing entry (`Conflict`),
//! - holds the destination folder lock while checking and renaming,
//! - fsyncs the destination folder afterwards (best-effort).

use anyhow::{Context, Result, bail};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::helpers::{describe_io_error, io_error_with_help};
use super::lock::acquire_dir_lock;
use super::{RenameFailure, Vault};
use crate::file::FileDescriptor;
use crate::path::{ROOT, normalize_path};
use crate::platform::fsync_dir;

#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
    use_locks: bool,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            use_locks: true,
        }
    }

    /// Skip folder locking (network shares where flock is unreliable).
    pub fn without_locks(mut self) -> Self {
        self.use_locks = false;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem location of a vault path.
    pub fn resolve(&self, vault_path: &str) -> PathBuf {
        let norm = normalize_path(vault_path);
        if norm == ROOT {
            return self.root.clone();
        }
        norm.split('/').fold(self.root.clone(), |acc, seg| acc.join(seg))
    }

    /// Describe an on-disk file as a vault file.
    ///
    /// Relative paths are tried against the current directory first, then the vault root.
    /// The file must be a regular file inside the vault.
    pub fn describe(&self, path: &Path) -> Result<FileDescriptor> {
        let candidate = if path.is_absolute() || path.exists() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };

        let meta = fs::symlink_metadata(&candidate)
            .map_err(io_error_with_help("inspect", &candidate))?;
        if !meta.file_type().is_file() {
            bail!("'{}' is not a regular file", candidate.display());
        }

        let root_real = fs::canonicalize(&self.root)
            .with_context(|| format!("vault root '{}' is not accessible", self.root.display()))?;
        let file_real =
            fs::canonicalize(&candidate).map_err(io_error_with_help("resolve", &candidate))?;
        let rel = file_real.strip_prefix(&root_real).with_context(|| {
            format!(
                "'{}' is outside the vault '{}'",
                file_real.display(),
                root_real.display()
            )
        })?;

        Ok(FileDescriptor::from_vault_path(&to_vault_path(rel)))
    }

    /// Every regular file in the vault, skipping hidden files and folders.
    pub fn list_files(&self) -> Vec<FileDescriptor> {
        WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(err) => {
                    warn!(error = %err, "skipping unreadable vault entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                e.path()
                    .strip_prefix(&self.root)
                    .ok()
                    .map(|rel| FileDescriptor::from_vault_path(&to_vault_path(rel)))
            })
            .collect()
    }

    fn ensure_source(&self, from: &str, src: &Path) -> Result<(), RenameFailure> {
        match fs::symlink_metadata(src) {
            Ok(meta) if meta.file_type().is_file() => Ok(()),
            Ok(_) => Err(RenameFailure::Conflict(format!(
                "'{from}' is not a regular file"
            ))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(RenameFailure::Unavailable(
                describe_io_error("read source", src, &e),
            )),
            Err(e) => Err(RenameFailure::Conflict(describe_io_error("read source", src, &e))),
        }
    }
}

impl Vault for FsVault {
    fn rename(&self, from: &str, to: &str) -> Result<(), RenameFailure> {
        if !self.root.is_dir() {
            return Err(RenameFailure::Unavailable(format!(
                "vault root '{}' is not an accessible folder",
                self.root.display()
            )));
        }
        if normalize_path(to) == ROOT {
            return Err(RenameFailure::Conflict("destination is the vault root".into()));
        }

        let src = self.resolve(from);
        let dst = self.resolve(to);
        self.ensure_source(from, &src)?;

        let dest_dir = dst.parent().unwrap_or(self.root.as_path()).to_path_buf();
        fs::create_dir_all(&dest_dir).map_err(|e| {
            RenameFailure::Conflict(describe_io_error("create folder", &dest_dir, &e))
        })?;

        let _lock = if self.use_locks {
            Some(acquire_dir_lock(&dest_dir).map_err(|e| {
                RenameFailure::Conflict(describe_io_error("lock folder", &dest_dir, &e))
            })?)
        } else {
            None
        };

        if fs::symlink_metadata(&dst).is_ok() {
            return Err(RenameFailure::Conflict(format!(
                "destination '{to}' already exists"
            )));
        }

        fs::rename(&src, &dst).map_err(|e| {
            let msg = describe_io_error("rename", &src, &e);
            if e.kind() == io::ErrorKind::NotFound && !src.exists() {
                RenameFailure::Unavailable(msg)
            } else {
                RenameFailure::Conflict(msg)
            }
        })?;

        if let Err(e) = fsync_dir(&dest_dir) {
            debug!(error = %e, dir = %dest_dir.display(), "fsync after rename failed");
        }
        info!(src = %src.display(), dest = %dst.display(), "Renamed file");
        Ok(())
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn to_vault_path(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

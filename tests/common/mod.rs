//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Mutex;

use rule_move::{FileDescriptor, RenameFailure, Vault};

/// In-memory vault that records every rename call and can be told to refuse them.
#[derive(Default)]
pub struct RecordingVault {
    files: Mutex<BTreeSet<String>>,
    calls: Mutex<Vec<(String, String)>>,
    fail_with: Mutex<Option<RenameFailure>>,
}

impl RecordingVault {
    pub fn with_files(paths: &[&str]) -> Self {
        let v = Self::default();
        v.files.lock().unwrap().extend(paths.iter().map(|p| p.to_string()));
        v
    }

    pub fn fail_next_with(&self, failure: RenameFailure) {
        *self.fail_with.lock().unwrap() = Some(failure);
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.lock().unwrap().contains(path)
    }

    pub fn files(&self) -> Vec<String> {
        self.files.lock().unwrap().iter().cloned().collect()
    }
}

impl Vault for RecordingVault {
    fn rename(&self, from: &str, to: &str) -> Result<(), RenameFailure> {
        self.calls.lock().unwrap().push((from.to_string(), to.to_string()));
        if let Some(f) = self.fail_with.lock().unwrap().take() {
            return Err(f);
        }
        let mut files = self.files.lock().unwrap();
        if !files.contains(from) {
            return Err(RenameFailure::Unavailable(format!("'{from}' not found")));
        }
        if files.contains(to) {
            return Err(RenameFailure::Conflict(format!("'{to}' already exists")));
        }
        files.remove(from);
        files.insert(to.to_string());
        Ok(())
    }
}

pub fn file(path: &str) -> FileDescriptor {
    FileDescriptor::from_vault_path(path)
}

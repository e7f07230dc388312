//! Narrow description of a file in the vault at the moment it is evaluated.

use std::fmt;

use crate::path::{base_name, normalize_path, parent_of};

/// Snapshot of a file's identity: name, vault path and parent folder path.
/// Not kept valid after a move; build a new one from the new path instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileDescriptor {
    pub name: String,
    pub path: String,
    pub parent_path: String,
}

impl FileDescriptor {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        parent_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            parent_path: parent_path.into(),
        }
    }

    /// Derive name and parent folder from a vault path.
    pub fn from_vault_path(path: &str) -> Self {
        let path = normalize_path(path);
        Self {
            name: base_name(&path),
            parent_path: parent_of(&path),
            path,
        }
    }
}

impl fmt::Display for FileDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vault_path_splits_parts() {
        let f = FileDescriptor::from_vault_path("person/john.md");
        assert_eq!(f.name, "john.md");
        assert_eq!(f.path, "person/john.md");
        assert_eq!(f.parent_path, "person");
    }

    #[test]
    fn top_level_file_has_root_parent() {
        let f = FileDescriptor::from_vault_path("/2024-05-01.md");
        assert_eq!(f.path, "2024-05-01.md");
        assert_eq!(f.parent_path, "/");
    }
}

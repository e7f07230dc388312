//! Vault path arithmetic.
//! Vault paths are `/`-separated and relative to the vault root; the root itself is `/`.
//!
//! - `normalize_path` is the single canonical form every comparison goes through.
//! - `compute_target_path` flattens: only the file name is kept under the target folder.
//! - `is_at_canonical_location` is the idempotence gate used before any rename.

use crate::file::FileDescriptor;
use crate::rules::FolderRule;

/// Path of the vault root.
pub const ROOT: &str = "/";

/// Canonical form of a vault path.
///
/// Accepts `/` and `\` as separators, drops empty and `.` segments, resolves `..`
/// (never above the root) and turns non-breaking spaces into plain spaces.
/// The result has no leading or trailing separator; the root is `/`.
pub fn normalize_path(raw: &str) -> String {
    let cleaned = raw.replace(['\u{00A0}', '\u{202F}'], " ");
    let mut segments: Vec<&str> = Vec::new();
    for seg in cleaned.split(['/', '\\']) {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        ROOT.to_string()
    } else {
        segments.join("/")
    }
}

/// Parent folder of a vault path (`/` for top-level entries).
pub fn parent_of(path: &str) -> String {
    let norm = normalize_path(path);
    match norm.rsplit_once('/') {
        Some((parent, _)) => parent.to_string(),
        None => ROOT.to_string(),
    }
}

/// Last segment of a vault path (empty for the root).
pub fn base_name(path: &str) -> String {
    let norm = normalize_path(path);
    if norm == ROOT {
        return String::new();
    }
    match norm.rsplit_once('/') {
        Some((_, name)) => name.to_string(),
        None => norm,
    }
}

/// Join a folder and a relative path, then normalize.
pub fn join(folder: &str, rest: &str) -> String {
    normalize_path(&format!("{folder}/{rest}"))
}

/// Canonical target of `file` under `rule`: `<target_folder>/<file name>`.
/// Any sub-path the file had below the matched segment is dropped.
pub fn compute_target_path(rule: &FolderRule, file: &FileDescriptor) -> String {
    join(&rule.target_folder, &file.name)
}

/// True when the file already sits in the parent folder of `target_path` under the same name.
pub fn is_at_canonical_location(file: &FileDescriptor, target_path: &str) -> bool {
    normalize_path(&file.parent_path) == parent_of(target_path) && file.name == base_name(target_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_separators_and_dots() {
        assert_eq!(normalize_path("DAILY//2024-05-01.md"), "DAILY/2024-05-01.md");
        assert_eq!(normalize_path("/DAILY/./x.md/"), "DAILY/x.md");
        assert_eq!(normalize_path("a\\b\\c.md"), "a/b/c.md");
        assert_eq!(normalize_path("a/b/../c.md"), "a/c.md");
        assert_eq!(normalize_path("../../x.md"), "x.md");
        assert_eq!(normalize_path("my\u{00A0}note.md"), "my note.md");
    }

    #[test]
    fn normalize_empty_is_root() {
        assert_eq!(normalize_path(""), ROOT);
        assert_eq!(normalize_path("//"), ROOT);
        assert_eq!(normalize_path("a/.."), ROOT);
    }

    #[test]
    fn parent_and_base_name() {
        assert_eq!(parent_of("PERSONS/john.md"), "PERSONS");
        assert_eq!(parent_of("john.md"), ROOT);
        assert_eq!(parent_of("a/b/c.md"), "a/b");
        assert_eq!(base_name("a/b/c.md"), "c.md");
        assert_eq!(base_name("c.md"), "c.md");
        assert_eq!(base_name("/"), "");
    }

    #[test]
    fn target_path_flattens_sub_path() {
        let rule = FolderRule::new("person/.*", "PERSONS/");
        let file = FileDescriptor::from_vault_path("notes/sub/person/john.md");
        assert_eq!(compute_target_path(&rule, &file), "PERSONS/john.md");
    }

    #[test]
    fn target_path_normalizes_messy_folder() {
        let rule = FolderRule::new("x", "//Archive//2024/");
        let file = FileDescriptor::from_vault_path("x.md");
        assert_eq!(compute_target_path(&rule, &file), "Archive/2024/x.md");
    }

    #[test]
    fn canonical_location_checks_parent_and_name() {
        let file = FileDescriptor::from_vault_path("DAILY/2024-05-01.md");
        assert!(is_at_canonical_location(&file, "DAILY/2024-05-01.md"));
        assert!(!is_at_canonical_location(&file, "JOURNAL/2024-05-01.md"));
        assert!(!is_at_canonical_location(&file, "DAILY/2024-05-02.md"));
    }

    #[test]
    fn canonical_location_at_root() {
        let file = FileDescriptor::new("a.md", "a.md", "");
        assert!(is_at_canonical_location(&file, "a.md"));
        let file = FileDescriptor::new("a.md", "a.md", "/");
        assert!(is_at_canonical_location(&file, "/a.md"));
    }
}

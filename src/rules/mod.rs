//! Folder rules.
//! - `FolderRule` is the plain pattern/target pair persisted in config.
//! - `RuleSet` is an immutable, precompiled snapshot of an ordered rule list.
//! - `RuleStore` swaps snapshots atomically when the list is edited.
//! - `select_rule` picks the first rule matching a file's name or path.

mod matcher;
mod set;
mod store;

pub use matcher::select_rule;
pub use set::RuleSet;
pub use store::RuleStore;

use serde::{Deserialize, Serialize};

/// A regular expression and the folder that files matching it belong in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRule {
    pub file_regex: String,
    pub target_folder: String,
}

impl FolderRule {
    pub fn new(file_regex: impl Into<String>, target_folder: impl Into<String>) -> Self {
        Self {
            file_regex: file_regex.into(),
            target_folder: target_folder.into(),
        }
    }
}

/// Rules shipped in a fresh config: ISO-dated daily notes and notes under a `person/` folder.
pub fn default_rules() -> Vec<FolderRule> {
    vec![
        FolderRule::new(r"20\d\d-(0[1-9]|1[0-2])-([0-2][0-9]|3[0-1])", "DAILY/"),
        FolderRule::new("person/.*", "PERSONS/"),
    ]
}

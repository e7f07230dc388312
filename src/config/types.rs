//! Core configuration types.
//! - Config holds the vault location, trigger flags and the ordered folder rules.
//! - LogLevel represents verbosity with simple parsing helpers.
//! - Rule editing helpers mirror what a settings editor does: add, remove, reorder, edit.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::VAULT_ROOT_PLACEHOLDER;
use super::paths;
use crate::rules::{FolderRule, RuleSet, default_rules};

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Moves, warnings and errors (default)
    #[default]
    Normal,
    /// Adds per-file decisions
    Info,
    /// Everything, including rule evaluation
    Debug,
}

impl LogLevel {
    /// Parse common names (case-insensitive, surrounding whitespace ignored).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" | "warn" => Some(LogLevel::Normal),
            "info" | "verbose" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Folder holding the vault; vault paths are relative to it
    pub vault_root: PathBuf,
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// Where committed moves are recorded for `undo`; None keeps history in memory only
    pub history_file: Option<PathBuf>,
    /// React to `created` notifications
    pub trigger_on_file_creation: bool,
    pub handle_daily_notes: bool,
    /// When false every file is left where it is
    pub enable_folder_rules: bool,
    /// Print a hint when no rule matches a file checked on demand
    pub ask_user_if_no_folder: bool,
    /// Ordered; the first matching rule wins
    pub folder_rules: Vec<FolderRule>,
    /// Runtime only (CLI): skip folder lock files
    pub disable_locks: bool,
    /// Runtime only (CLI): report planned moves without renaming
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vault_root: PathBuf::from(VAULT_ROOT_PLACEHOLDER),
            log_level: LogLevel::Normal,
            log_file: paths::default_log_path().ok(),
            history_file: paths::default_history_path().ok(),
            trigger_on_file_creation: true,
            handle_daily_notes: true,
            enable_folder_rules: true,
            ask_user_if_no_folder: false,
            folder_rules: default_rules(),
            disable_locks: false,
            dry_run: false,
        }
    }
}

impl Config {
    /// Config for a vault at `vault_root`; everything else uses defaults.
    pub fn new(vault_root: impl Into<PathBuf>) -> Self {
        Self {
            vault_root: vault_root.into(),
            ..Default::default()
        }
    }

    /// Compile the effective rule snapshot. Disabled folder rules yield an empty set.
    pub fn rule_set(&self) -> RuleSet {
        if self.enable_folder_rules {
            RuleSet::new(self.folder_rules.clone())
        } else {
            RuleSet::empty()
        }
    }

    pub fn add_rule(&mut self, rule: FolderRule) {
        self.folder_rules.push(rule);
    }

    /// Remove and return the rule at `index`, if there is one.
    pub fn remove_rule(&mut self, index: usize) -> Option<FolderRule> {
        (index < self.folder_rules.len()).then(|| self.folder_rules.remove(index))
    }

    /// Move the rule at `from` to position `to`. Out-of-range positions leave the list as is.
    pub fn move_rule(&mut self, from: usize, to: usize) -> bool {
        let len = self.folder_rules.len();
        if from >= len || to >= len {
            return false;
        }
        let rule = self.folder_rules.remove(from);
        self.folder_rules.insert(to, rule);
        true
    }

    /// Replace the pattern and/or target folder of the rule at `index`.
    pub fn edit_rule(
        &mut self,
        index: usize,
        file_regex: Option<&str>,
        target_folder: Option<&str>,
    ) -> bool {
        let Some(rule) = self.folder_rules.get_mut(index) else {
            return false;
        };
        if let Some(re) = file_regex {
            rule.file_regex = re.to_string();
        }
        if let Some(folder) = target_folder {
            rule.target_folder = folder.to_string();
        }
        true
    }
}

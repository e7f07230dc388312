//! CLI definition and parsing.
//!
//! Notes:
//! - Global flags override config values.
//! - --debug is a shorthand for --log-level debug.
//! - File arguments may arrive wrapped in stray quotes from shell hooks; they are stripped.

use clap::{Args as ClapArgs, Parser, Subcommand, ValueHint};
use std::path::{Path, PathBuf};

use crate::config::{Config, LogLevel};

/// Keep vault files in the folder their name says they belong in.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Move vault files to the folder chosen by ordered regex rules")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Vault folder (overrides `vault_root` in the config file).
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub vault_root: Option<PathBuf>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    /// Set log level: quiet, normal, info, debug.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Show what would be moved without renaming anything.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Do not take folder lock files (network shares where flock is unreliable).
    #[arg(long, global = true)]
    pub disable_locks: bool,

    /// Emit logs in structured JSON.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A file was just created: relocate it if the creation trigger is enabled.
    Created {
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
    },
    /// Move the given (active) file to its preferred location.
    Check {
        #[arg(value_hint = ValueHint::FilePath)]
        path: Option<PathBuf>,
    },
    /// Relocate every misplaced file in the vault.
    Sweep,
    /// Move the most recently relocated file back.
    Undo,
    /// List recorded moves, oldest first.
    History {
        /// Show only the last N entries.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Check the config: vault root and every rule.
    Validate,
    /// List or edit folder rules.
    Rules {
        #[command(subcommand)]
        action: Option<RulesAction>,
    },
    /// Print where the config file is read from, then exit.
    PrintConfig,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum RulesAction {
    /// Print rules in evaluation order (default).
    List,
    /// Append a rule.
    Add(RuleFields),
    /// Delete the rule at INDEX (as shown by `rules list`).
    Remove { index: usize },
    /// Move the rule at FROM to position TO.
    Move { from: usize, to: usize },
    /// Change the pattern and/or target folder of the rule at INDEX.
    Edit {
        index: usize,
        #[arg(long)]
        regex: Option<String>,
        #[arg(long)]
        target: Option<String>,
    },
}

#[derive(ClapArgs, Debug, Clone, PartialEq, Eq)]
pub struct RuleFields {
    /// Regular expression tested against the file name and vault path.
    pub regex: String,
    /// Folder (relative to the vault root) that matching files are moved to.
    pub target: String,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(root) = &self.vault_root {
            cfg.vault_root = sanitize_path(root);
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if self.dry_run {
            cfg.dry_run = true;
        }
        if self.disable_locks {
            cfg.disable_locks = true;
        }
    }

    /// File argument of `created`/`check`, with stray quotes removed.
    pub fn file_arg(&self) -> Option<PathBuf> {
        match &self.command {
            Command::Created { path } => Some(sanitize_path(path)),
            Command::Check { path } => path.as_deref().map(sanitize_path),
            _ => None,
        }
    }
}

pub fn sanitize_path(p: &Path) -> PathBuf {
    sanitize_str(&p.to_string_lossy())
}

/// Strip matched pairs of surrounding quotes left by PowerShell/CMD or hook templates
/// (`"'%f'"`), and drop one trailing separator. Quotes inside the path are kept.
pub fn sanitize_str(s: &str) -> PathBuf {
    let mut inner = s.trim();
    while inner.len() >= 2 {
        let Some(first) = inner.chars().next().filter(|c| *c == '\'' || *c == '"') else {
            break;
        };
        if !inner.ends_with(first) {
            break;
        }
        inner = inner[1..inner.len() - 1].trim();
    }
    let mut inner = inner.to_string();
    if (inner.ends_with('\\') || inner.ends_with('/')) && inner.len() > 1 {
        inner.pop();
    }
    PathBuf::from(inner)
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_quotes_and_trailing_separator() {
        assert_eq!(sanitize_str("'/v/a.md'"), PathBuf::from("/v/a.md"));
        assert_eq!(sanitize_str("\"/v/notes/\""), PathBuf::from("/v/notes"));
        assert_eq!(sanitize_str("/"), PathBuf::from("/"));
        assert_eq!(sanitize_str("\"'/v/a.md'\""), PathBuf::from("/v/a.md"));
    }

    #[test]
    fn keeps_apostrophes_inside_names() {
        assert_eq!(
            sanitize_str("/vault/John's meeting.md"),
            PathBuf::from("/vault/John's meeting.md")
        );
        assert_eq!(
            sanitize_str("'/vault/John's meeting.md'"),
            PathBuf::from("/vault/John's meeting.md")
        );
        assert_eq!(sanitize_str("/vault/Johns'"), PathBuf::from("/vault/Johns'"));
    }

    #[test]
    fn overrides_apply() {
        let args = Args::try_parse_from(["rule_move", "--vault-root", "/v", "-d", "--dry-run", "sweep"]).unwrap();
        let mut cfg = Config::new("/other");
        args.apply_overrides(&mut cfg);
        assert_eq!(cfg.vault_root, PathBuf::from("/v"));
        assert_eq!(cfg.log_level, LogLevel::Debug);
        assert!(cfg.dry_run);
        assert!(!cfg.disable_locks);
    }
}

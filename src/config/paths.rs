//! Default path helpers and symlink checks.
//! Determines OS-appropriate config/log/history paths and detects symlinked ancestors.

use anyhow::{Result, anyhow};
use dirs::{config_dir, data_dir};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{APP_DIR, CONFIG_ENV};

const CONFIG_FILE: &str = "config.xml";
const LOG_FILE: &str = "rule_move.log";
const HISTORY_FILE: &str = "history.json";

/// Config file location.
///
/// `RULE_MOVE_CONFIG` wins when set: a directory means `<dir>/config.xml`, a relative path is
/// taken from the current directory. Otherwise `<config_dir>/rule_move/config.xml`.
pub fn default_config_path() -> Result<PathBuf> {
    if let Some(raw) = env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        let mut p = PathBuf::from(raw);
        if p.is_relative() {
            p = env::current_dir()?.join(p);
        }
        if p.is_dir() {
            p.push(CONFIG_FILE);
        }
        return Ok(p);
    }
    app_dir(config_dir(), &[".config"]).map(|d| d.join(CONFIG_FILE))
}

/// Default log file (data dir). The parent folder is created best-effort.
pub fn default_log_path() -> Result<PathBuf> {
    data_file(LOG_FILE)
}

/// Default move-history file (data dir).
pub fn default_history_path() -> Result<PathBuf> {
    data_file(HISTORY_FILE)
}

fn data_file(name: &str) -> Result<PathBuf> {
    let dir = app_dir(data_dir(), &[".local", "share"])?;
    let _ = fs::create_dir_all(&dir);
    Ok(dir.join(name))
}

fn app_dir(base: Option<PathBuf>, home_fallback: &[&str]) -> Result<PathBuf> {
    let base = match base {
        Some(b) => b,
        None => {
            let home = env::var_os("HOME")
                .ok_or_else(|| anyhow!("cannot determine a per-user directory (HOME is unset)"))?;
            home_fallback
                .iter()
                .fold(PathBuf::from(home), |acc, seg| acc.join(seg))
        }
    };
    Ok(base.join(APP_DIR))
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if anc.exists() {
            let meta = fs::symlink_metadata(anc)?;
            if meta.file_type().is_symlink() {
                return Ok(true);
            }
        }
        p = anc.parent();
    }
    Ok(false)
}

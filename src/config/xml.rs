//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - Saves the full config back atomically (used after rule edits).
//! - Creates a commented template with the stock rules when the default file is missing.
//!
//! Missing elements fall back to defaults. A present but empty `<folder_rules/>` means
//! "no rules", not "stock rules". Unknown elements are rejected.

use anyhow::{Context, Result, bail};
use quick_xml::de::from_str as from_xml_str;
use quick_xml::se::Serializer;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::paths::{default_config_path, path_has_symlink_ancestor};
use super::types::{Config, LogLevel};
use super::CONFIG_ENV;
use crate::platform::{set_dir_mode_0700, write_file_atomic_0600};
use crate::rules::FolderRule;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "config", deny_unknown_fields)]
struct XmlConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vault_root: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    log_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    log_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    history_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trigger_on_file_creation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    handle_daily_notes: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    enable_folder_rules: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ask_user_if_no_folder: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    folder_rules: Option<XmlRules>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct XmlRules {
    #[serde(default)]
    rule: Vec<XmlRule>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct XmlRule {
    #[serde(default)]
    file_regex: String,
    #[serde(default)]
    target_folder: String,
}

/// Outcome of `load_or_init`.
#[derive(Debug)]
pub enum LoadResult {
    Loaded(Box<Config>, PathBuf),
    /// No config existed; a template was written here and should be edited first.
    CreatedTemplate(PathBuf),
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn xml_to_config(parsed: XmlConfig) -> Config {
    let mut cfg = Config::default();

    if let Some(root) = non_blank(parsed.vault_root) {
        cfg.vault_root = PathBuf::from(root);
    }
    if let Some(level) = parsed.log_level.as_deref().and_then(LogLevel::parse) {
        cfg.log_level = level;
    }
    // An explicitly empty element disables file logging / history persistence.
    if let Some(lf) = parsed.log_file {
        cfg.log_file = non_blank(Some(lf)).map(PathBuf::from);
    }
    if let Some(hf) = parsed.history_file {
        cfg.history_file = non_blank(Some(hf)).map(PathBuf::from);
    }

    cfg.trigger_on_file_creation = parsed
        .trigger_on_file_creation
        .unwrap_or(cfg.trigger_on_file_creation);
    cfg.handle_daily_notes = parsed.handle_daily_notes.unwrap_or(cfg.handle_daily_notes);
    cfg.enable_folder_rules = parsed.enable_folder_rules.unwrap_or(cfg.enable_folder_rules);
    cfg.ask_user_if_no_folder = parsed
        .ask_user_if_no_folder
        .unwrap_or(cfg.ask_user_if_no_folder);

    if let Some(rules) = parsed.folder_rules {
        cfg.folder_rules = rules
            .rule
            .into_iter()
            .map(|r| FolderRule::new(r.file_regex, r.target_folder.trim()))
            .collect();
    }
    cfg
}

fn config_to_xml(cfg: &Config) -> XmlConfig {
    let path_str = |p: &Option<PathBuf>| {
        Some(
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        )
    };
    XmlConfig {
        vault_root: Some(cfg.vault_root.display().to_string()),
        log_level: Some(cfg.log_level.to_string()),
        log_file: path_str(&cfg.log_file),
        history_file: path_str(&cfg.history_file),
        trigger_on_file_creation: Some(cfg.trigger_on_file_creation),
        handle_daily_notes: Some(cfg.handle_daily_notes),
        enable_folder_rules: Some(cfg.enable_folder_rules),
        ask_user_if_no_folder: Some(cfg.ask_user_if_no_folder),
        folder_rules: Some(XmlRules {
            rule: cfg
                .folder_rules
                .iter()
                .map(|r| XmlRule {
                    file_regex: r.file_regex.clone(),
                    target_folder: r.target_folder.clone(),
                })
                .collect(),
        }),
    }
}

/// Parse config XML text.
pub fn parse_config_xml(contents: &str) -> Result<Config> {
    let parsed: XmlConfig = from_xml_str(contents)?;
    Ok(xml_to_config(parsed))
}

/// Render a config as indented XML.
pub fn render_config_xml(cfg: &Config) -> Result<String> {
    let mut out = String::new();
    let mut ser = Serializer::with_root(&mut out, Some("config"))?;
    ser.indent(' ', 2);
    config_to_xml(cfg).serialize(ser)?;
    out.push('\n');
    Ok(out)
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let cfg = parse_config_xml(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    debug!(path = %path.display(), rules = cfg.folder_rules.len(), "config loaded");
    Ok(cfg)
}

/// Write `cfg` to `path` atomically (0600 on Unix).
pub fn save_config_to_xml_path(cfg: &Config, path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        bail!(
            "Refusing to write config: ancestor of {} is a symlink",
            path.display()
        );
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config folder '{}'", parent.display()))?;
    }
    let xml = render_config_xml(cfg)?;
    write_file_atomic_0600(path, xml.as_bytes())?;
    info!(path = %path.display(), rules = cfg.folder_rules.len(), "Saved config");
    Ok(())
}

const TEMPLATE_HEADER: &str = "<!--
  rule_move configuration (XML)

  vault_root                -> folder containing the vault; rule targets are relative to it
  log_level                 -> quiet | normal | info | debug
  log_file                  -> optional log file (empty = console only)
  history_file              -> where moves are recorded for `undo` (empty = not persisted)
  trigger_on_file_creation  -> act on `rule_move created <file>` notifications
  handle_daily_notes        -> stored for compatibility; no effect on moves
  enable_folder_rules       -> false leaves every file where it is
  ask_user_if_no_folder     -> print a hint when `check` finds no matching rule
  folder_rules              -> ordered <rule> list; the first rule whose file_regex matches the
                               file name or vault path wins, and the file is moved to
                               target_folder/<file name>

  CLI flags override XML values.
-->
";

/// Create the default template (stock rules, placeholder vault root) at `path`.
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        bail!(
            "Refusing to create config: ancestor of {} is a symlink",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
        let _ = set_dir_mode_0700(parent);
    }

    let body = render_config_xml(&Config::default())?;
    let content = format!("{TEMPLATE_HEADER}{body}");
    write_file_atomic_0600(path, content.as_bytes())?;

    info!("Created template config at {}", path.display());
    Ok(())
}

/// Load the active config file, creating a template first if the default one is missing.
/// An explicit `RULE_MOVE_CONFIG` that points nowhere is an error, not a template.
pub fn load_or_init() -> Result<LoadResult> {
    let path = default_config_path().context("resolve config path")?;
    if path.exists() {
        let cfg = load_config_from_xml_path(&path)?;
        return Ok(LoadResult::Loaded(Box::new(cfg), path));
    }
    if env::var_os(CONFIG_ENV).is_some() {
        bail!(
            "{CONFIG_ENV} points to '{}', which does not exist",
            path.display()
        );
    }
    create_template_config(&path)?;
    Ok(LoadResult::CreatedTemplate(path))
}

//! Config module.
//! Provides configuration types, default paths, XML load/save, and validation.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{default_config_path, default_history_path, default_log_path, path_has_symlink_ancestor};
pub use types::{Config, LogLevel};
pub use validate::validate_and_normalize;
pub use xml::{
    LoadResult, create_template_config, load_config_from_xml_path, load_or_init,
    save_config_to_xml_path,
};

/// Environment variable naming an explicit config file (or folder holding `config.xml`).
pub const CONFIG_ENV: &str = "RULE_MOVE_CONFIG";
/// Per-user folder name under the OS config/data dirs.
pub const APP_DIR: &str = "rule_move";
/// Written into fresh templates; validation fails until the user sets a real folder.
pub const VAULT_ROOT_PLACEHOLDER: &str = "/path/to/vault";

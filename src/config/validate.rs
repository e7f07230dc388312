//! Config validation logic.
//! Checks that the vault root is a readable folder and canonicalizes it, so that files passed
//! on the command line can be located relative to it.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;
use tracing::{debug, error, info};

use super::types::Config;

impl Config {
    /// Verify the vault root exists, is a folder and can be listed.
    pub fn validate(&self) -> Result<()> {
        let root = &self.vault_root;
        ensure_dir_exists_and_is_dir(root, "vault_root")?;
        ensure_readable(root, "vault_root")?;
        info!(
            vault_root = %root.display(),
            rules = self.folder_rules.len(),
            enabled = self.enable_folder_rules,
            "Config validated"
        );
        Ok(())
    }
}

/// Validate and replace `vault_root` with its canonical form.
pub fn validate_and_normalize(cfg: &mut Config) -> Result<()> {
    cfg.validate()?;
    cfg.vault_root = fs::canonicalize(&cfg.vault_root)
        .with_context(|| format!("resolve vault_root '{}'", cfg.vault_root.display()))?;
    Ok(())
}

fn ensure_dir_exists_and_is_dir(path: &Path, name: &str) -> Result<()> {
    if !path.exists() {
        error!("{name} does not exist: {}", path.display());
        bail!("{name} does not exist: {}", path.display());
    }
    if !path.is_dir() {
        error!("{name} is not a directory: {}", path.display());
        bail!("{name} is not a directory: {}", path.display());
    }
    Ok(())
}

fn ensure_readable(path: &Path, name: &str) -> Result<()> {
    fs::read_dir(path).with_context(|| {
        format!("Cannot read {name} directory '{}'; check permissions", path.display())
    })?;
    debug!("{name} readable: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::new(dir.path().join("nope"));
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn file_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join("f.md");
        fs::write(&f, "x").unwrap();
        let err = Config::new(&f).validate().unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn normalize_canonicalizes() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("vault")).unwrap();
        let mut cfg = Config::new(dir.path().join("vault").join(".."));
        validate_and_normalize(&mut cfg).unwrap();
        assert_eq!(cfg.vault_root, fs::canonicalize(dir.path()).unwrap());
    }
}

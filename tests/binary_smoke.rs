//! Run the binary against a throwaway vault and config.

use assert_fs::TempDir;
use assert_fs::prelude::*;
use std::path::Path;
use std::process::{Command, Output};

struct Fixture {
    _home: TempDir,
    vault: TempDir,
    config: std::path::PathBuf,
    data: std::path::PathBuf,
}

impl Fixture {
    fn new(extra: &str) -> Self {
        let home = TempDir::new().unwrap();
        let vault = TempDir::new().unwrap();
        let config = home.path().join("config.xml");
        let data = home.path().join("data");
        let history = home.path().join("history.json");
        let xml = format!(
            "<config>\n  <vault_root>{}</vault_root>\n  <log_level>quiet</log_level>\n  <log_file></log_file>\n  <history_file>{}</history_file>\n{extra}</config>\n",
            vault.path().display(),
            history.display()
        );
        std::fs::write(&config, xml).unwrap();
        Self { _home: home, vault, config, data }
    }

    fn run(&self, args: &[&str]) -> Output {
        let me = assert_cmd::cargo::cargo_bin!("rule_move");
        Command::new(me)
            .args(args)
            .env("RULE_MOVE_CONFIG", &self.config)
            .env("XDG_DATA_HOME", &self.data)
            .env("XDG_CONFIG_HOME", &self.data)
            .output()
            .expect("spawn binary")
    }

    fn vault_file(&self, rel: &str) -> std::path::PathBuf {
        self.vault.path().join(rel)
    }
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

#[test]
fn print_config_succeeds() {
    let fx = Fixture::new("");
    let out = fx.run(&["print-config"]);
    assert!(out.status.success(), "print-config should succeed");
    let text = stdout(&out);
    assert!(text.contains("handle_daily_notes = true"), "stdout={text}");
    assert!(text.contains("folder_rules = 2"), "stdout={text}");
}

#[test]
fn check_moves_then_undo_restores() {
    let fx = Fixture::new("");
    fx.vault.child("2024-05-01.md").write_str("today").unwrap();

    let out = fx.run(&["check", fx.vault_file("2024-05-01.md").to_str().unwrap()]);
    assert!(out.status.success(), "check failed: {}", String::from_utf8_lossy(&out.stderr));
    fx.vault.child("DAILY/2024-05-01.md").assert("today");

    let out = fx.run(&["history"]);
    assert!(stdout(&out).contains("2024-05-01.md -> DAILY/2024-05-01.md"));

    let out = fx.run(&["undo"]);
    assert!(out.status.success());
    fx.vault.child("2024-05-01.md").assert("today");
    assert!(!fx.vault_file("DAILY/2024-05-01.md").exists());

    let out = fx.run(&["undo"]);
    assert!(!out.status.success(), "second undo has nothing to do");
}

#[test]
fn created_is_ignored_when_trigger_disabled() {
    let fx = Fixture::new("  <trigger_on_file_creation>false</trigger_on_file_creation>\n");
    fx.vault.child("person/kim.md").touch().unwrap();
    let out = fx.run(&["created", fx.vault_file("person/kim.md").to_str().unwrap()]);
    assert!(out.status.success());
    assert!(fx.vault_file("person/kim.md").exists());
}

#[test]
fn created_relocates_when_trigger_enabled() {
    let fx = Fixture::new("");
    fx.vault.child("person/kim.md").touch().unwrap();
    let out = fx.run(&["created", fx.vault_file("person/kim.md").to_str().unwrap()]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));
    assert!(fx.vault_file("PERSONS/kim.md").exists());
}

#[test]
fn dry_run_sweep_changes_nothing() {
    let fx = Fixture::new("");
    fx.vault.child("2024-05-01.md").touch().unwrap();
    let out = fx.run(&["--dry-run", "sweep"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("would move '2024-05-01.md' -> 'DAILY/2024-05-01.md'"));
    assert!(fx.vault_file("2024-05-01.md").exists());
}

#[test]
fn no_match_prints_hint_when_asked() {
    let fx = Fixture::new("  <ask_user_if_no_folder>true</ask_user_if_no_folder>\n");
    fx.vault.child("random.md").touch().unwrap();
    let out = fx.run(&["check", fx.vault_file("random.md").to_str().unwrap()]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("No rule matches 'random.md'"));
}

#[test]
fn rules_add_persists_and_validate_flags_bad_pattern() {
    let fx = Fixture::new("");
    let out = fx.run(&["rules", "add", "(oops", "BROKEN/"]);
    assert!(out.status.success());
    let saved = std::fs::read_to_string(&fx.config).unwrap();
    assert!(saved.contains("<file_regex>(oops</file_regex>"), "config={saved}");

    let out = fx.run(&["validate"]);
    assert!(!out.status.success(), "validate should reject the broken rule");
}

#[test]
fn explicit_missing_config_is_an_error() {
    let fx = Fixture::new("");
    let me = assert_cmd::cargo::cargo_bin!("rule_move");
    let out = Command::new(me)
        .arg("sweep")
        .env("RULE_MOVE_CONFIG", Path::new(&fx.data).join("absent.xml"))
        .env("XDG_DATA_HOME", &fx.data)
        .output()
        .expect("spawn binary");
    assert!(!out.status.success());
}

use clap::Parser;
use std::path::PathBuf;

use rule_move::cli::{Args, Command, RuleFields, RulesAction};
use rule_move::{Config, LogLevel};

#[test]
fn created_takes_a_path_and_strips_quotes() {
    let args = Args::try_parse_from(["rule_move", "created", "'/vault/2024-05-01.md'"]).unwrap();
    assert!(matches!(args.command, Command::Created { .. }));
    assert_eq!(args.file_arg(), Some(PathBuf::from("/vault/2024-05-01.md")));
}

#[test]
fn check_path_is_optional() {
    let args = Args::try_parse_from(["rule_move", "check"]).unwrap();
    assert_eq!(args.command, Command::Check { path: None });
    assert_eq!(args.file_arg(), None);
}

#[test]
fn global_flags_after_subcommand() {
    let args = Args::try_parse_from(["rule_move", "sweep", "--dry-run", "--log-level", "info", "--json"]).unwrap();
    assert_eq!(args.command, Command::Sweep);
    assert!(args.dry_run);
    assert!(args.json);
    assert_eq!(args.effective_log_level(), Some(LogLevel::Info));
}

#[test]
fn debug_beats_log_level() {
    let args = Args::try_parse_from(["rule_move", "--log-level", "quiet", "--debug", "undo"]).unwrap();
    assert_eq!(args.effective_log_level(), Some(LogLevel::Debug));
}

#[test]
fn unknown_log_level_leaves_config_alone() {
    let args = Args::try_parse_from(["rule_move", "--log-level", "loud", "history"]).unwrap();
    let mut cfg = Config::new("/v");
    cfg.log_level = LogLevel::Quiet;
    args.apply_overrides(&mut cfg);
    assert_eq!(cfg.log_level, LogLevel::Quiet);
}

#[test]
fn rules_subcommands_parse() {
    let args = Args::try_parse_from(["rule_move", "rules"]).unwrap();
    assert_eq!(args.command, Command::Rules { action: None });

    let args = Args::try_parse_from(["rule_move", "rules", "add", r"\.pdf$", "PDF/"]).unwrap();
    assert_eq!(
        args.command,
        Command::Rules {
            action: Some(RulesAction::Add(RuleFields {
                regex: r"\.pdf$".into(),
                target: "PDF/".into()
            }))
        }
    );

    let args = Args::try_parse_from(["rule_move", "rules", "move", "2", "0"]).unwrap();
    assert_eq!(
        args.command,
        Command::Rules { action: Some(RulesAction::Move { from: 2, to: 0 }) }
    );

    let args = Args::try_parse_from(["rule_move", "rules", "edit", "1", "--target", "PEOPLE/"]).unwrap();
    assert_eq!(
        args.command,
        Command::Rules {
            action: Some(RulesAction::Edit { index: 1, regex: None, target: Some("PEOPLE/".into()) })
        }
    );
}

#[test]
fn missing_subcommand_is_an_error() {
    assert!(Args::try_parse_from(["rule_move"]).is_err());
}

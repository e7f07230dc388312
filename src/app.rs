//! Application orchestrator.
//! Loads config (creating a template on first run), applies CLI overrides, initializes logging,
//! installs the Ctrl-C handler, then runs one command against the filesystem vault.

use anyhow::{Context, Result, anyhow, bail};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

use rule_move::cli::{Args, Command, RulesAction};
use rule_move::config::{
    CONFIG_ENV, LoadResult, default_config_path, load_config_from_xml_path, load_or_init,
    save_config_to_xml_path, validate_and_normalize,
};
use rule_move::hooks::{CreateEvents, CreationTrigger};
use rule_move::output as out;
use rule_move::{
    Config, FileDescriptor, FolderRule, FsVault, MoveHistory, Outcome, Plan, RelocationEngine,
    RuleMoveError, RuleSet, RuleStore, shutdown,
};

use crate::logging::init_tracing;

type Engine = RelocationEngine<FsVault>;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    if args.command == Command::PrintConfig {
        return print_config();
    }

    let (file_cfg, cfg_path) = match load_or_init()? {
        LoadResult::Loaded(cfg, path) => (*cfg, path),
        LoadResult::CreatedTemplate(path) => {
            out::print_success(&format!("A template rule_move config was written to: {}", path.display()));
            out::print_info("Set `vault_root` to your vault folder and adjust `folder_rules`, then re-run this command.");
            out::print_info(&format!("To use a different location set {CONFIG_ENV}."));
            return Ok(());
        }
    };
    let mut cfg = file_cfg.clone();
    args.apply_overrides(&mut cfg);

    let guard = init_tracing(cfg.log_level, cfg.log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {e}"));
        e
    })?;

    // Dropping the guard on Ctrl-C flushes the file appender.
    let guard_slot = Arc::new(Mutex::new(guard));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("Received interrupt; finishing the current move and stopping...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take();
            }
        })
        .context("install Ctrl-C handler")?;
    }

    debug!(?args, config = %cfg_path.display(), "Starting rule_move");

    let result = dispatch(&args, file_cfg, cfg, &cfg_path);
    if let Err(e) = &result {
        log_failure(e);
    }

    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }
    result
}

fn dispatch(args: &Args, file_cfg: Config, mut cfg: Config, cfg_path: &Path) -> Result<()> {
    match &args.command {
        Command::PrintConfig => print_config(),
        Command::Rules { action } => {
            rules_command(action.clone().unwrap_or(RulesAction::List), file_cfg, cfg_path)
        }
        Command::Validate => validate_command(&cfg),
        Command::Created { .. } => {
            if !cfg.trigger_on_file_creation {
                info!("creation trigger disabled (trigger_on_file_creation = false); ignoring");
                return Ok(());
            }
            let path = args.file_arg().ok_or_else(|| anyhow!("missing file"))?;
            let engine = open_engine(&mut cfg)?;
            created_command(engine, &cfg, &path)
        }
        Command::Check { .. } => {
            let Some(path) = args.file_arg() else {
                out::print_info("No active file; nothing to check.");
                return Ok(());
            };
            let engine = open_engine(&mut cfg)?;
            check_command(&engine, &cfg, &path)
        }
        Command::Sweep => {
            let engine = open_engine(&mut cfg)?;
            sweep_command(&engine, &cfg)
        }
        Command::Undo => {
            let engine = open_engine(&mut cfg)?;
            let record = engine.undo_last()?;
            out::print_success(&format!(
                "Moved '{}' back to '{}'",
                record.target_path, record.original_path
            ));
            Ok(())
        }
        Command::History { limit } => {
            let history = open_history(&cfg)?;
            let entries = history.entries();
            let skip = limit.map_or(0, |n| entries.len().saturating_sub(n));
            if entries.is_empty() {
                out::print_info("No moves recorded.");
            }
            for r in entries.iter().skip(skip) {
                out::print_user(&format!(
                    "{}  {} -> {}",
                    r.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    r.original_path,
                    r.target_path
                ));
            }
            Ok(())
        }
    }
}

fn open_history(cfg: &Config) -> Result<MoveHistory> {
    Ok(match &cfg.history_file {
        Some(path) => MoveHistory::open(path)?,
        None => MoveHistory::in_memory(),
    })
}

fn open_engine(cfg: &mut Config) -> Result<Arc<Engine>> {
    validate_and_normalize(cfg)?;
    let mut vault = FsVault::new(&cfg.vault_root);
    if cfg.disable_locks {
        vault = vault.without_locks();
    }
    let history = open_history(cfg)?;
    Ok(Arc::new(RelocationEngine::with_history(vault, history)))
}

/// Route one creation notification through the subscription, the way a host would.
fn created_command(engine: Arc<Engine>, cfg: &Config, path: &Path) -> Result<()> {
    let file = match engine.vault().describe(path) {
        Ok(f) => f,
        Err(e) => {
            info!(path = %path.display(), reason = %e, "ignoring creation of non-file entry");
            return Ok(());
        }
    };

    let store = Arc::new(RuleStore::new(cfg.rule_set()));
    let dry_run = cfg.dry_run;
    let failure: Arc<Mutex<Option<RuleMoveError>>> = Arc::default();

    let events = CreateEvents::new();
    let mut trigger = {
        let engine = Arc::clone(&engine);
        let failure = Arc::clone(&failure);
        CreationTrigger::new(events.clone(), move |file: &FileDescriptor| {
            let rules = store.snapshot();
            if dry_run {
                report_plan(&engine.plan(&rules, file));
                return;
            }
            match engine.relocate(&rules, file) {
                Ok(outcome) => report_outcome(file, &outcome, false),
                Err(e) => {
                    if let Ok(mut slot) = failure.lock() {
                        *slot = Some(e);
                    }
                }
            }
        })
    };
    trigger.set_enabled(cfg.trigger_on_file_creation);
    events.emit(&file);
    trigger.set_enabled(false);

    let failed = failure.lock().ok().and_then(|mut slot| slot.take());
    match failed {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn check_command(engine: &Engine, cfg: &Config, path: &Path) -> Result<()> {
    let file = engine.vault().describe(path)?;
    let rules = cfg.rule_set();
    if cfg.dry_run {
        report_plan(&engine.plan(&rules, &file));
        return Ok(());
    }
    let outcome = engine.relocate(&rules, &file)?;
    report_outcome(&file, &outcome, cfg.ask_user_if_no_folder);
    Ok(())
}

fn sweep_command(engine: &Engine, cfg: &Config) -> Result<()> {
    let rules = cfg.rule_set();
    let files = engine.vault().list_files();
    info!(files = files.len(), rules = rules.len(), "Sweeping vault");

    if cfg.dry_run {
        for file in &files {
            report_plan(&engine.plan(&rules, file));
        }
        return Ok(());
    }

    let results = engine.sweep(&rules, &files);
    let mut moved = 0usize;
    let mut failed = 0usize;
    for entry in &results {
        match &entry.result {
            Ok(Outcome::Moved(to)) => {
                moved += 1;
                out::print_user(&format!("{} -> {to}", entry.path));
            }
            Ok(_) => {}
            Err(e) => {
                failed += 1;
                out::print_warn(&format!("{}: {e}", entry.path));
            }
        }
    }
    out::print_info(&format!(
        "{moved} moved, {failed} failed, {} already in place or unmatched",
        results.len() - moved - failed
    ));
    if failed > 0 {
        bail!("{failed} of {} files could not be moved", results.len());
    }
    Ok(())
}

fn report_outcome(file: &FileDescriptor, outcome: &Outcome, ask_user: bool) {
    match outcome {
        Outcome::Moved(to) => out::print_user(&format!("{} -> {to}", file.path)),
        Outcome::AlreadyAtTarget => out::print_info(&format!("'{}' is already in place", file.path)),
        Outcome::NoMatchingRule => {
            debug!(path = %file.path, "no rule matches");
            if ask_user {
                out::print_hint(&format!(
                    "No rule matches '{}'. Add one with `rule_move rules add <REGEX> <FOLDER>`.",
                    file.path
                ));
            }
        }
    }
}

fn report_plan(plan: &Plan) {
    if let Plan::Move { from, to } = plan {
        out::print_info(&format!("Dry-run: would move '{from}' -> '{to}'"));
    }
}

fn validate_command(cfg: &Config) -> Result<()> {
    let mut problems = 0usize;
    if let Err(e) = cfg.validate() {
        out::print_error(&format!("{e:#}"));
        problems += 1;
    }
    let rules = RuleSet::new(cfg.folder_rules.clone());
    for issue in rules.validate() {
        out::print_error(&issue.to_string());
        problems += 1;
    }
    if !cfg.enable_folder_rules {
        out::print_warn("enable_folder_rules is false; no file will be moved.");
    }
    if problems > 0 {
        bail!("configuration has {problems} problem(s)");
    }
    out::print_success(&format!("Configuration OK ({} rules)", rules.len()));
    Ok(())
}

fn rules_command(action: RulesAction, mut cfg: Config, cfg_path: &Path) -> Result<()> {
    let changed = match action {
        RulesAction::List => {
            let set = RuleSet::new(cfg.folder_rules.clone());
            for (i, rule) in set.rules().enumerate() {
                let flag = if set.is_active(i) { "" } else { "  (inactive)" };
                out::print_user(&format!("{i}: {}  ->  {}{flag}", rule.file_regex, rule.target_folder));
            }
            if !cfg.enable_folder_rules {
                out::print_warn("Folder rules are disabled (enable_folder_rules = false).");
            }
            return Ok(());
        }
        RulesAction::Add(fields) => {
            cfg.add_rule(FolderRule::new(fields.regex, fields.target));
            true
        }
        RulesAction::Remove { index } => cfg.remove_rule(index).is_some(),
        RulesAction::Move { from, to } => cfg.move_rule(from, to),
        RulesAction::Edit { index, regex, target } => {
            cfg.edit_rule(index, regex.as_deref(), target.as_deref())
        }
    };
    if !changed {
        bail!("no rule at that position (see `rule_move rules list`)");
    }
    for issue in RuleSet::new(cfg.folder_rules.clone()).validate() {
        out::print_warn(&issue.to_string());
    }
    save_config_to_xml_path(&cfg, cfg_path)?;
    out::print_success(&format!("Saved {} rules to {}", cfg.folder_rules.len(), cfg_path.display()));
    Ok(())
}

fn print_config() -> Result<()> {
    if std::env::var_os(CONFIG_ENV).is_some() {
        out::print_info(&format!("Using {CONFIG_ENV} (explicit)."));
    }
    let path: PathBuf = match default_config_path() {
        Ok(p) => p,
        Err(e) => {
            out::print_error(&format!("Could not determine a config path: {e}"));
            return Ok(());
        }
    };
    out::print_info(&format!("Config file:\n  {}", path.display()));
    if !path.exists() {
        out::print_info("No config file exists there yet. Run any other command to create a template.");
        return Ok(());
    }
    let cfg = load_config_from_xml_path(&path)?;
    let show = |p: &Option<PathBuf>| p.as_ref().map_or("<none>".to_string(), |p| p.display().to_string());
    out::print_user(&format!("vault_root = {}", cfg.vault_root.display()));
    out::print_user(&format!("log_level = {}", cfg.log_level));
    out::print_user(&format!("log_file = {}", show(&cfg.log_file)));
    out::print_user(&format!("history_file = {}", show(&cfg.history_file)));
    out::print_user(&format!("trigger_on_file_creation = {}", cfg.trigger_on_file_creation));
    out::print_user(&format!("handle_daily_notes = {}", cfg.handle_daily_notes));
    out::print_user(&format!("enable_folder_rules = {}", cfg.enable_folder_rules));
    out::print_user(&format!("ask_user_if_no_folder = {}", cfg.ask_user_if_no_folder));
    out::print_user(&format!("folder_rules = {}", cfg.folder_rules.len()));
    Ok(())
}

fn log_failure(e: &anyhow::Error) {
    match e.downcast_ref::<RuleMoveError>() {
        Some(rm) => error!(code = rm.code(), kind = rm.kind(), error = %rm, "Command failed"),
        None => error!(error = %format!("{e:#}"), "Command failed"),
    }
}

//! User-facing console messages.
//! Prefixed, colored when the target stream is a terminal. Results go to stdout,
//! warnings/errors to stderr.

use owo_colors::OwoColorize;

fn stdout_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

fn stderr_tty() -> bool {
    atty::is(atty::Stream::Stderr)
}

pub fn print_info(msg: &str) {
    if stdout_tty() {
        println!("{} {msg}", "info:".cyan().bold());
    } else {
        println!("info: {msg}");
    }
}

pub fn print_success(msg: &str) {
    if stdout_tty() {
        println!("{} {msg}", "ok:".green().bold());
    } else {
        println!("ok: {msg}");
    }
}

/// Suggestion for the user (e.g. no rule matched and `ask_user_if_no_folder` is set).
pub fn print_hint(msg: &str) {
    if stdout_tty() {
        println!("{} {msg}", "hint:".magenta().bold());
    } else {
        println!("hint: {msg}");
    }
}

pub fn print_warn(msg: &str) {
    if stderr_tty() {
        eprintln!("{} {msg}", "warn:".yellow().bold());
    } else {
        eprintln!("warn: {msg}");
    }
}

pub fn print_error(msg: &str) {
    if stderr_tty() {
        eprintln!("{} {msg}", "error:".red().bold());
    } else {
        eprintln!("error: {msg}");
    }
}

/// Plain line without prefix, for output users may script against (`history`, `rules`).
pub fn print_user(msg: &str) {
    println!("{msg}");
}

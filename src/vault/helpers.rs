//! I/O error messages with actionable hints.
//!
//! Usage:
//!   // in functions returning anyhow::Result<_>
//!   fs::create_dir_all(dir).map_err(io_error_with_help("create folder", dir))?;
//!
//!   // when the message feeds a `RenameFailure`
//!   RenameFailure::Conflict(describe_io_error("rename", &src, &e))

use anyhow::anyhow;
use std::io;
use std::path::Path;

fn hint_for(e: &io::Error) -> Option<&'static str> {
    #[cfg(unix)]
    if let Some(code) = e.raw_os_error() {
        let hint = match code {
            libc::EACCES | libc::EPERM => Some("permission denied; check ownership and write permissions"),
            libc::EXDEV => Some("cross-filesystem; the vault must live on a single filesystem"),
            libc::EBUSY => Some("resource busy; another process may be using the file"),
            libc::ENOENT => Some("path not found; it may have been moved or deleted"),
            libc::EEXIST | libc::ENOTEMPTY => Some("already exists; remove or rename the existing entry"),
            libc::ENOSPC => Some("no space left on device"),
            libc::EROFS => Some("read-only filesystem"),
            libc::ENAMETOOLONG => Some("file name or path too long"),
            libc::ENOTDIR => Some("a path component is a file, not a folder"),
            _ => None,
        };
        if hint.is_some() {
            return hint;
        }
    }
    #[cfg(windows)]
    if let Some(code) = e.raw_os_error() {
        let hint = match code {
            5 => Some("access denied; check permissions"),
            17 => Some("not same device; the vault must live on a single volume"),
            32 => Some("sharing violation; the file is open elsewhere"),
            2 | 3 => Some("path not found; it may have been moved or deleted"),
            80 | 183 => Some("already exists; remove or rename the existing entry"),
            206 => Some("file name or path too long"),
            _ => None,
        };
        if hint.is_some() {
            return hint;
        }
    }
    match e.kind() {
        io::ErrorKind::PermissionDenied => Some("permission denied; check ownership and write permissions"),
        io::ErrorKind::NotFound => Some("path not found; it may have been moved or deleted"),
        io::ErrorKind::AlreadyExists => Some("already exists; remove or rename the existing entry"),
        _ => None,
    }
}

/// "<op> '<path>': <error> (<hint>) [os code: N]"
pub fn describe_io_error(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);
    if let Some(hint) = hint_for(e) {
        msg.push_str(&format!(" ({hint})"));
    }
    if let Some(code) = e.raw_os_error() {
        msg.push_str(&format!(" [os code: {code}]"));
    }
    msg
}

/// Adapter for anyhow::Result code: `.map_err(io_error_with_help("open", p))`.
pub fn io_error_with_help<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> anyhow::Error + 'a {
    move |e: io::Error| anyhow!(describe_io_error(op, path, &e))
}

//! Platform-specific helpers.
//! Hides OS differences (Unix/Windows) behind a uniform API so the rest of the crate can stay
//! platform-agnostic.

mod temp;
#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod windows;

#[cfg(unix)]
pub use unix::{fsync_dir, open_log_file_secure_append, set_dir_mode_0700, write_file_atomic_0600};

#[cfg(not(unix))]
pub use windows::{fsync_dir, open_log_file_secure_append, set_dir_mode_0700, write_file_atomic_0600};

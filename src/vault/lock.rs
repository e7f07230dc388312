//! Advisory file locks.
//! Serializes renames into the same vault folder across processes (two hooks firing at once
//! for files that resolve to the same target), and read-modify-write of the move history.
//!
//! - A folder lock is a hidden sidecar file `.rule_move.dir.lock` inside the folder.
//! - Unix: flock(LOCK_EX) on the descriptor (blocks until acquired).
//! - Windows: open the file without sharing; retry on sharing violations.
//! - Released when the `FileLock` guard is dropped. The sidecar stays on disk: unlinking it
//!   while a waiter is blocked on the old inode would let a newcomer lock a fresh one.

#[cfg(unix)]
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::trace;
#[cfg(windows)]
use tracing::warn;

#[cfg(unix)]
use std::os::fd::AsRawFd;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

#[cfg(windows)]
use windows_sys::Win32::{
    Foundation::{CloseHandle, INVALID_HANDLE_VALUE},
    Storage::FileSystem::{
        CreateFileW, FILE_ATTRIBUTE_HIDDEN, FILE_ATTRIBUTE_NORMAL, OPEN_ALWAYS, SetFileAttributesW,
    },
};

#[cfg(windows)]
const GENERIC_READ: u32 = 0x8000_0000;
#[cfg(windows)]
const GENERIC_WRITE: u32 = 0x4000_0000;
#[cfg(windows)]
const ERROR_SHARING_VIOLATION: i32 = 32;

/// Name of the sidecar lock file; hidden so vault scans skip it.
pub const LOCK_FILE_NAME: &str = ".rule_move.dir.lock";

/// RAII guard held while a lock is active.
pub struct FileLock {
    #[cfg(unix)]
    file: File,
    #[cfg(windows)]
    handle: isize,
}

impl Drop for FileLock {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            let _ = unsafe { libc::flock(self.file.as_raw_fd(), libc::LOCK_UN) };
        }
        #[cfg(windows)]
        unsafe {
            if self.handle != 0 {
                let _ = CloseHandle(self.handle as _);
            }
        }
    }
}

fn lock_file_path(dir: &Path) -> PathBuf {
    dir.join(LOCK_FILE_NAME)
}

#[cfg(unix)]
fn open_lock_file(lock_path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .custom_flags(libc::O_CLOEXEC)
        .mode(0o600)
        .open(lock_path)
}

#[cfg(windows)]
fn open_exclusive(lock_path: &Path) -> io::Result<isize> {
    use std::iter::once;
    use std::os::windows::ffi::OsStrExt;

    let wide: Vec<u16> = lock_path.as_os_str().encode_wide().chain(once(0)).collect();
    let handle = unsafe {
        CreateFileW(
            wide.as_ptr(),
            GENERIC_READ | GENERIC_WRITE,
            0, // no sharing => exclusive
            std::ptr::null(),
            OPEN_ALWAYS,
            FILE_ATTRIBUTE_NORMAL,
            std::ptr::null_mut(),
        )
    };
    if handle == INVALID_HANDLE_VALUE {
        return Err(io::Error::last_os_error());
    }
    let _ = unsafe { SetFileAttributesW(wide.as_ptr(), FILE_ATTRIBUTE_NORMAL | FILE_ATTRIBUTE_HIDDEN) };
    Ok(handle as isize)
}

/// Blocking acquire of the lock for `dir`.
pub fn acquire_dir_lock(dir: &Path) -> io::Result<FileLock> {
    acquire_file_lock(&lock_file_path(dir))
}

/// Blocking acquire of an exclusive lock on `lock_path`, creating the file if needed.
pub fn acquire_file_lock(lock_path: &Path) -> io::Result<FileLock> {
    let start = Instant::now();

    #[cfg(unix)]
    {
        let file = open_lock_file(lock_path)?;
        let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        trace!(
            path = %lock_path.display(),
            waited_ms = start.elapsed().as_millis() as u64,
            "lock acquired"
        );
        Ok(FileLock { file })
    }

    #[cfg(windows)]
    {
        use std::thread::sleep;
        use std::time::Duration;

        let mut attempts: u32 = 0;
        loop {
            match open_exclusive(lock_path) {
                Ok(handle) => {
                    trace!(
                        path = %lock_path.display(),
                        attempts,
                        waited_ms = start.elapsed().as_millis() as u64,
                        "lock acquired"
                    );
                    return Ok(FileLock { handle });
                }
                Err(e) if e.raw_os_error() == Some(ERROR_SHARING_VIOLATION) => {
                    attempts += 1;
                    if attempts % 10 == 0 {
                        warn!(path = %lock_path.display(), attempts, "still waiting for lock");
                    }
                    sleep(Duration::from_millis(50));
                }
                Err(e) => return Err(e),
            }
        }
    }
}

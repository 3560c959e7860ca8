//! Lock file management for single-instance enforcement.
//!
//! The daemon holds an exclusive `flock` on `switchr.lock` in the runtime
//! directory for as long as it runs. The lock is released by the kernel when
//! the process dies, so a leftover file never blocks a new instance; the PID
//! written into it is only used to tell the user which process is running and
//! to deliver signals from one-shot commands.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::common::constants::LOCK_FILE_NAME;

const LOCK_ATTEMPTS: usize = 3;
use crate::common::utils;

/// A held instance lock. Dropping it removes the file, then releases the lock.
#[derive(Debug)]
pub struct LockFile {
    file: File,
    path: PathBuf,
}

impl LockFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        // Unlink while still locked so nobody can lock a file that is about to vanish
        let _ = std::fs::remove_file(&self.path);
        let _ = FileExt::unlock(&self.file);
    }
}

/// Result of trying to become the running instance.
#[derive(Debug)]
pub enum LockStatus {
    Acquired(LockFile),
    /// Another process holds the lock; its PID if the file could be read
    HeldBy(Option<u32>),
}

/// Default lock location: `$XDG_RUNTIME_DIR/switchr.lock`, else the temp dir.
pub fn lock_path() -> PathBuf {
    std::env::var_os("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join(LOCK_FILE_NAME)
}

/// Try to take the exclusive lock at `path` without blocking.
pub fn acquire_lock(path: &Path) -> Result<LockStatus> {
    for _ in 0..LOCK_ATTEMPTS {
        // Open without truncating so a running instance's PID stays readable
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("Failed to open lock file {}", utils::private_path(path)))?;

        if file.try_lock_exclusive().is_err() {
            return Ok(LockStatus::HeldBy(read_running_pid(path)));
        }

        // The previous holder may have unlinked the file between our open and lock
        if !is_current_file(&file, path) {
            let _ = FileExt::unlock(&file);
            continue;
        }

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        writeln!(file, "{}", std::process::id())?;
        file.flush()?;

        return Ok(LockStatus::Acquired(LockFile {
            file,
            path: path.to_path_buf(),
        }));
    }

    anyhow::bail!(
        "Lock file {} kept changing while acquiring it",
        utils::private_path(path)
    )
}

/// Whether `file` is still the file that `path` names.
#[cfg(unix)]
fn is_current_file(file: &File, path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (file.metadata(), std::fs::metadata(path)) {
        (Ok(held), Ok(named)) => held.dev() == named.dev() && held.ino() == named.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn is_current_file(_file: &File, path: &Path) -> bool {
    path.exists()
}

/// PID recorded in the lock file, if the file exists and that process is alive.
pub fn read_running_pid(path: &Path) -> Option<u32> {
    let content = std::fs::read_to_string(path).ok()?;
    let pid = content.lines().next()?.trim().parse::<u32>().ok()?;
    utils::is_process_running(pid).then_some(pid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_reports_holder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);

        let first = match acquire_lock(&path).unwrap() {
            LockStatus::Acquired(lock) => lock,
            LockStatus::HeldBy(_) => panic!("expected to acquire a fresh lock"),
        };
        assert_eq!(read_running_pid(&path), Some(std::process::id()));

        match acquire_lock(&path).unwrap() {
            LockStatus::HeldBy(pid) => assert_eq!(pid, Some(std::process::id())),
            LockStatus::Acquired(_) => panic!("lock should be held"),
        }

        drop(first);
        assert!(!path.exists());
        assert!(matches!(acquire_lock(&path).unwrap(), LockStatus::Acquired(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_unlinked_lock_file_is_not_current() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);

        let stale = File::create(&path).unwrap();
        assert!(is_current_file(&stale, &path));

        // A new holder recreates the file after the old one was removed
        std::fs::remove_file(&path).unwrap();
        assert!(!is_current_file(&stale, &path));
        std::fs::write(&path, "").unwrap();
        assert!(!is_current_file(&stale, &path));

        // Locking the stale handle does not stop a newcomer from acquiring
        stale.try_lock_exclusive().unwrap();
        assert!(matches!(acquire_lock(&path).unwrap(), LockStatus::Acquired(_)));
    }

    #[test]
    fn test_read_running_pid_ignores_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);
        std::fs::write(&path, "not a pid\n").unwrap();
        assert_eq!(read_running_pid(&path), None);
        assert_eq!(read_running_pid(&dir.path().join("missing.lock")), None);
    }
}

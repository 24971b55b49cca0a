//! Filesystem helpers shared by settings and session persistence.

use std::fs;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

/// Writes `content` to `path` atomically (temp file + rename).
///
/// Parent directories are created as needed.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = Path::new(&temp_name);
    if temp_path.exists() {
        let _ = fs::remove_file(temp_path);
    }

    let mut file = File::create(temp_path)
        .with_context(|| format!("Failed to create temp file {}", temp_path.display()))?;
    file.write_all(content)
        .with_context(|| format!("Failed to write {}", temp_path.display()))?;
    file.sync_all()
        .with_context(|| format!("Failed to sync {}", temp_path.display()))?;

    if cfg!(windows) {
        // Windows: rename does not overwrite, so we use a backup-then-swap.
        let mut backup_name = path.as_os_str().to_owned();
        backup_name.push(".bak");
        let backup_path = Path::new(&backup_name);
        if backup_path.exists() {
            let _ = fs::remove_file(backup_path);
        }
        if path.exists() {
            fs::rename(path, backup_path)
                .with_context(|| format!("Failed to back up {}", path.display()))?;
        }
        if let Err(e) = fs::rename(temp_path, path) {
            if backup_path.exists() {
                let _ = fs::rename(backup_path, path);
            }
            return Err(e).with_context(|| format!("Failed to finalize {}", path.display()));
        }
        let _ = fs::remove_file(backup_path);
    } else {
        fs::rename(temp_path, path)
            .with_context(|| format!("Failed to finalize {}", path.display()))?;
    }

    Ok(())
}

/// Runs `op` while holding an advisory lock on `lock_path`.
pub fn with_lock<T>(lock_path: &Path, exclusive: bool, op: impl FnOnce() -> Result<T>) -> Result<T> {
    if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let lock_file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(lock_path)
        .with_context(|| format!("Failed to open lock file {}", lock_path.display()))?;

    if exclusive {
        fs2::FileExt::lock_exclusive(&lock_file).context("Failed to take exclusive lock")?;
    } else {
        fs2::FileExt::lock_shared(&lock_file).context("Failed to take shared lock")?;
    }

    let result = op();

    if let Err(e) = fs2::FileExt::unlock(&lock_file) {
        warn!("Failed to unlock {}: {}", lock_path.display(), e);
    }

    result
}

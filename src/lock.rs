//! Single-instance guard.
//!
//! Two concurrent updates of the same service would race on the unit file and
//! the artifact directory, so every run holds an exclusive advisory lock on
//! the configured lock file for its whole duration. The lock is released
//! when the [`UpdateLock`] is dropped (or the process exits).

use crate::core::UpdaterError;
use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// An exclusive lock held for the duration of one run.
#[derive(Debug)]
pub struct UpdateLock {
    file: File,
    path: PathBuf,
}

impl UpdateLock {
    /// Take the lock at `path` without waiting.
    ///
    /// # Errors
    ///
    /// [`UpdaterError::Configuration`] when another process holds the lock;
    /// [`UpdaterError::FileSystem`] when the lock file cannot be opened.
    pub async fn try_acquire(path: &Path) -> Result<Self> {
        let lock_path = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::try_acquire_blocking(lock_path))
            .await
            .context("spawn_blocking panicked")?
    }

    fn try_acquire_blocking(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| UpdaterError::file_system("create directory", parent, &e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| UpdaterError::file_system("open lock file", &path, &e))?;

        let acquired = FileExt::try_lock_exclusive(&file)
            .map_err(|e| UpdaterError::file_system("lock", &path, &e))?;
        if !acquired {
            return Err(UpdaterError::Configuration {
                message: format!(
                    "another update is already running (lock held on {})",
                    path.display()
                ),
            }
            .into());
        }

        debug!("Acquired update lock {}", path.display());
        Ok(Self {
            file,
            path,
        })
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for UpdateLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!("Failed to unlock {}: {}", self.path.display(), e);
        }
    }
}

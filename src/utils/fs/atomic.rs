//! Atomic file replacement.

use crate::core::UpdaterError;
use anyhow::Result;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Replace `path` with `content` so readers see either the old or the new file.
///
/// The content goes to a sibling `<name>.tmp` file which is synced and then
/// renamed over the target. If the target already exists its permission bits
/// are copied onto the replacement first.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let temp_path = temp_path_for(path);
    let existing_permissions = fs::metadata(path).ok().map(|m| m.permissions());

    if let Err(e) = write_synced(&temp_path, content, existing_permissions) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(UpdaterError::file_system("replace", path, &e).into());
    }

    Ok(())
}

fn write_synced(
    temp_path: &Path,
    content: &[u8],
    permissions: Option<fs::Permissions>,
) -> Result<(), UpdaterError> {
    let io_error =
        |operation: &str, e: std::io::Error| UpdaterError::file_system(operation, temp_path, &e);

    let mut file = fs::File::create(temp_path).map_err(|e| io_error("create", e))?;
    file.write_all(content).map_err(|e| io_error("write", e))?;
    if let Some(permissions) = permissions {
        file.set_permissions(permissions)
            .map_err(|e| io_error("set permissions on", e))?;
    }
    file.sync_all().map_err(|e| io_error("sync", e))
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

//! Host checks.

use crate::core::UpdaterError;
use anyhow::Result;

/// Whether the effective user is root.
pub fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}

/// Fail with [`UpdaterError::PrivilegesRequired`] unless running as root.
///
/// Unit files, `/opt` and `systemctl` all need root, so this runs before any
/// work.
pub fn require_root() -> Result<()> {
    if is_root() {
        Ok(())
    } else {
        Err(UpdaterError::PrivilegesRequired.into())
    }
}

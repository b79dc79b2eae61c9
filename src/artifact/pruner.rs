//! Removal of superseded artifacts.

use super::{ArtifactPattern, scan};
use crate::core::UpdaterError;
use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Delete every artifact under `root` except `active`.
///
/// Deletion stops at the first failure and the error names the file that
/// could not be removed; files already deleted stay deleted. `active` is
/// compared by path, so a sibling with the same version (for instance in a
/// subdirectory) is still removed while `active` itself never is.
///
/// Returns how many files were deleted.
pub fn prune_stale(root: &Path, pattern: &ArtifactPattern, active: &Path) -> Result<usize> {
    prune_stale_with(root, pattern, active, |path| std::fs::remove_file(path))
}

/// [`prune_stale`] with the file removal supplied by the caller.
pub fn prune_stale_with(
    root: &Path,
    pattern: &ArtifactPattern,
    active: &Path,
    mut remove: impl FnMut(&Path) -> std::io::Result<()>,
) -> Result<usize> {
    let mut deleted = 0;

    for candidate in scan(root, pattern)? {
        if candidate.path == active {
            continue;
        }

        info!("Deleting old artifact: {}", candidate.path.display());
        remove(&candidate.path)
            .map_err(|e| UpdaterError::file_system("delete", &candidate.path, &e))?;
        deleted += 1;
    }

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn pattern() -> ArtifactPattern {
        ArtifactPattern::new("product-", ".ext").unwrap()
    }

    #[test]
    fn test_prune_keeps_active() {
        let temp_dir = TempDir::new().unwrap();
        let old = temp_dir.path().join("product-1.0.0.ext");
        let active = temp_dir.path().join("product-2.0.0.ext");
        let unrelated = temp_dir.path().join("notes.txt");
        fs::write(&old, b"old").unwrap();
        fs::write(&active, b"new").unwrap();
        fs::write(&unrelated, b"keep").unwrap();

        let deleted = prune_stale(temp_dir.path(), &pattern(), &active).unwrap();
        assert_eq!(deleted, 1);
        assert!(!old.exists());
        assert!(active.exists());
        assert!(unrelated.exists());
    }

    #[test]
    fn test_prune_same_version_sibling() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("backup");
        fs::create_dir(&nested).unwrap();
        let active = temp_dir.path().join("product-2.0.0.ext");
        let twin = nested.join("product-2.0.0.ext");
        let short = temp_dir.path().join("product-2.0.ext");
        fs::write(&active, b"a").unwrap();
        fs::write(&twin, b"b").unwrap();
        fs::write(&short, b"c").unwrap();

        let deleted = prune_stale(temp_dir.path(), &pattern(), &active).unwrap();
        assert_eq!(deleted, 2);
        assert!(active.exists());
        assert!(!twin.exists());
        assert!(!short.exists());
    }

    #[test]
    fn test_prune_nothing_to_do() {
        let temp_dir = TempDir::new().unwrap();
        let active = temp_dir.path().join("product-2.0.0.ext");
        fs::write(&active, b"a").unwrap();

        assert_eq!(prune_stale(temp_dir.path(), &pattern(), &active).unwrap(), 0);
        assert!(active.exists());
    }

    #[test]
    fn test_prune_stops_at_first_failure() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("product-1.0.0.ext");
        let locked = temp_dir.path().join("product-1.1.0.ext");
        let last = temp_dir.path().join("product-1.2.0.ext");
        let active = temp_dir.path().join("product-2.0.0.ext");
        for path in [&first, &locked, &last, &active] {
            fs::write(path, b"x").unwrap();
        }

        let mut attempted = Vec::new();
        let err = prune_stale_with(temp_dir.path(), &pattern(), &active, |path| {
            attempted.push(path.to_path_buf());
            if path == locked {
                Err(std::io::ErrorKind::PermissionDenied.into())
            } else {
                fs::remove_file(path)
            }
        })
        .unwrap_err();

        match err.downcast_ref::<UpdaterError>() {
            Some(UpdaterError::FileSystem {
                operation, path, ..
            }) => {
                assert_eq!(operation, "delete");
                assert_eq!(path, &locked.display().to_string());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(attempted, vec![first.clone(), locked.clone()]);
        assert!(!first.exists());
        assert!(locked.exists());
        assert!(last.exists());
        assert!(active.exists());
    }
}

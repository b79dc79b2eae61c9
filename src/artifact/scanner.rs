//! Discovery of artifact candidates in a directory tree.

use super::{ArtifactCandidate, ArtifactPattern};
use crate::core::UpdaterError;
use anyhow::Result;
use std::cmp::Ordering;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Recursively collect every file under `root` whose name matches `pattern`.
///
/// The result is sorted by path so repeated scans of the same tree return the
/// same list. No match is an empty list, not an error; an unreadable root (or
/// subdirectory) is a [`UpdaterError::FileSystem`] error.
pub fn scan(root: &Path, pattern: &ArtifactPattern) -> Result<Vec<ArtifactCandidate>> {
    let mut candidates = Vec::new();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            let reason = e.to_string();
            UpdaterError::FileSystem {
                operation: "scan".to_string(),
                path: path.display().to_string(),
                reason,
            }
        })?;

        if entry.file_type().is_dir() {
            continue;
        }

        if let Some(candidate) = ArtifactCandidate::from_path(entry.path(), pattern) {
            debug!("Found artifact candidate: {}", candidate.path.display());
            candidates.push(candidate);
        }
    }

    candidates.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(candidates)
}

/// The candidate with the highest version.
///
/// Among candidates with equal versions (e.g. `komga-1.2.jar` and
/// `komga-1.2.0.jar`, or the same name in two subdirectories) the one with the
/// lexicographically smallest path wins, regardless of input order.
pub fn latest(candidates: &[ArtifactCandidate]) -> Option<&ArtifactCandidate> {
    candidates.iter().reduce(|best, candidate| match candidate.version.cmp(&best.version) {
        Ordering::Greater => candidate,
        Ordering::Equal if candidate.path < best.path => candidate,
        _ => best,
    })
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
    fn test_scan_filters_and_picks_latest() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("product-1.0.0.ext"), b"a").unwrap();
        fs::write(temp_dir.path().join("product-2.3.1.ext"), b"b").unwrap();
        fs::write(temp_dir.path().join("readme.txt"), b"c").unwrap();

        let candidates = scan(temp_dir.path(), &pattern()).unwrap();
        assert_eq!(candidates.len(), 2);

        let best = latest(&candidates).unwrap();
        assert_eq!(best.path, temp_dir.path().join("product-2.3.1.ext"));
        assert_eq!(best.version.as_str(), "2.3.1");
    }

    #[test]
    fn test_scan_is_recursive_and_skips_directories() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("old");
        fs::create_dir(&nested).unwrap();
        fs::create_dir(temp_dir.path().join("product-9.9.ext")).unwrap();
        fs::write(nested.join("product-0.9.ext"), b"a").unwrap();

        let candidates = scan(temp_dir.path(), &pattern()).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].path, nested.join("product-0.9.ext"));
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(scan(temp_dir.path(), &pattern()).unwrap().is_empty());
        assert!(latest(&[]).is_none());
    }

    #[test]
    fn test_scan_missing_root_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = scan(&temp_dir.path().join("missing"), &pattern()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<UpdaterError>(),
            Some(UpdaterError::FileSystem { .. })
        ));
    }

    #[test]
    fn test_scan_is_deterministic() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["product-3.ext", "product-1.ext", "product-2.ext"] {
            fs::write(temp_dir.path().join(name), b"x").unwrap();
        }
        let first = scan(temp_dir.path(), &pattern()).unwrap();
        let second = scan(temp_dir.path(), &pattern()).unwrap();
        assert_eq!(first, second);
        assert!(first.windows(2).all(|w| w[0].path < w[1].path));
    }

    #[test]
    fn test_latest_tie_prefers_smallest_path() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("product-1.2.ext"), b"a").unwrap();
        fs::write(temp_dir.path().join("product-1.2.0.ext"), b"b").unwrap();

        let mut candidates = scan(temp_dir.path(), &pattern()).unwrap();
        let expected = temp_dir.path().join("product-1.2.0.ext");
        assert_eq!(latest(&candidates).unwrap().path, expected);

        candidates.reverse();
        assert_eq!(latest(&candidates).unwrap().path, expected);
    }
}

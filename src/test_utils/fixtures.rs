//! On-disk layout of a jar-based service.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary service file plus artifact directory.
///
/// ```text
/// <tmp>/komga.service
/// <tmp>/artifacts/komga-<version>.jar ...
/// ```
pub struct ServiceFixture {
    _temp_dir: TempDir,
    root: PathBuf,
    service_file: PathBuf,
    artifact_dir: PathBuf,
}

impl ServiceFixture {
    /// Unit file whose `ExecStart=` references `komga-<current>.jar`, with
    /// an (empty) artifact for every version in `artifacts`.
    pub fn komga(current: &str, artifacts: &[&str]) -> Self {
        let temp_dir = TempDir::new().unwrap();
        // Rewritten units hold canonical paths.
        let root = std::fs::canonicalize(temp_dir.path()).unwrap();
        let artifact_dir = root.join("artifacts");
        std::fs::create_dir_all(&artifact_dir).unwrap();

        let service_file = root.join("komga.service");
        std::fs::write(&service_file, Self::unit_text(&artifact_dir, current)).unwrap();

        let fixture = Self {
            _temp_dir: temp_dir,
            root,
            service_file,
            artifact_dir,
        };
        for version in artifacts {
            fixture.add_artifact(version);
        }
        fixture
    }

    /// Expected unit file text when the unit starts `komga-<version>.jar`.
    pub fn unit_text(artifact_dir: &Path, version: &str) -> String {
        format!(
            "[Unit]\n\
             Description=Komga media server\n\
             After=network.target\n\
             \n\
             [Service]\n\
             User=komga\n\
             WorkingDirectory={dir}\n\
             ExecStart=/usr/bin/java -Xmx1g -jar {dir}/komga-{version}.jar\n\
             Restart=on-failure\n\
             \n\
             [Install]\n\
             WantedBy=multi-user.target\n",
            dir = artifact_dir.display()
        )
    }

    /// Create an empty `komga-<version>.jar`.
    pub fn add_artifact(&self, version: &str) -> PathBuf {
        let path = self.artifact_dir.join(format!("komga-{version}.jar"));
        std::fs::write(&path, b"").unwrap();
        path
    }

    /// Root of the fixture.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the unit file.
    pub fn service_file(&self) -> &Path {
        &self.service_file
    }

    /// Path of the artifact directory.
    pub fn artifact_dir(&self) -> &Path {
        &self.artifact_dir
    }

    /// Current unit file text.
    pub fn service_text(&self) -> String {
        std::fs::read_to_string(&self.service_file).unwrap()
    }

    /// Sorted artifact file names present.
    pub fn artifact_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.artifact_dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

//! Reading and rewriting the systemd unit that runs an artifact.
//!
//! The unit file is kept as an ordered list of raw lines, terminators
//! included, so writing it back reproduces every byte that was not
//! deliberately changed. Only one line matters: the first one whose content
//! (after leading whitespace) starts with `ExecStart=`. Rewrites are confined
//! to that line.
//!
//! ```text
//! [Service]
//! ExecStart=/usr/bin/java -jar /opt/komga/komga-1.10.4.jar   <- directive line
//! ```

use crate::artifact::ArtifactPattern;
use crate::core::UpdaterError;
use crate::utils::fs::atomic_write;
use crate::version::DottedVersion;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directive whose command line embeds the artifact filename.
pub const START_DIRECTIVE: &str = "ExecStart=";

/// An in-memory systemd unit file.
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    path: PathBuf,
    lines: Vec<String>,
    directive: Option<usize>,
    pattern: ArtifactPattern,
}

impl ServiceDescriptor {
    /// Read and parse the unit file at `path`.
    pub async fn load(path: &Path, pattern: ArtifactPattern) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| UpdaterError::file_system("read", path, &e))?;
        Ok(Self::parse(path, &content, pattern))
    }

    /// Parse unit file text that was read from `path`.
    pub fn parse(path: &Path, content: &str, pattern: ArtifactPattern) -> Self {
        let lines: Vec<String> = content.split_inclusive('\n').map(str::to_string).collect();
        let directive = lines.iter().position(|line| line.trim_start().starts_with(START_DIRECTIVE));

        if let Some(index) = directive {
            debug!("{} directive at line {} of {}", START_DIRECTIVE, index + 1, path.display());
        }

        Self {
            path: path.to_path_buf(),
            lines,
            directive,
            pattern,
        }
    }

    /// Path of the unit file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The directive line without its terminator, if present.
    pub fn directive_line(&self) -> Option<&str> {
        self.directive.map(|i| self.lines[i].trim_end_matches(['\n', '\r']))
    }

    /// Version of the artifact the unit currently starts.
    ///
    /// # Errors
    ///
    /// [`UpdaterError::NotFound`] when there is no `ExecStart=` line, or when
    /// that line does not reference an artifact filename.
    pub fn current_version(&self) -> Result<DottedVersion> {
        let line = self.require_directive()?;
        let version = self.pattern.find_version(line).ok_or_else(|| UpdaterError::NotFound {
            what: format!("{}<version>{} reference", self.pattern.prefix(), self.pattern.extension()),
            location: format!("{} line of {}", START_DIRECTIVE, self.path.display()),
        })?;
        Ok(DottedVersion::parse(version))
    }

    /// Point the directive line at the artifact file `active`.
    ///
    /// Every artifact path token on the line, directory included, becomes the
    /// canonical form of `active`. The line is left untouched unless `active`
    /// is an existing file and each rewritten token names it.
    ///
    /// # Errors
    ///
    /// [`UpdaterError::NotFound`] when the line has no artifact reference or
    /// the rewritten path is not the active file.
    pub fn set_artifact_path(&mut self, active: &Path) -> Result<()> {
        self.current_version()?;
        let not_found = || UpdaterError::NotFound {
            what: active.display().to_string(),
            location: format!("{} line of {}", START_DIRECTIVE, self.path.display()),
        };

        let target = std::fs::canonicalize(active).map_err(|_| not_found())?;
        if !target.is_file() {
            return Err(not_found().into());
        }
        let replacement = target.to_str().ok_or_else(|| UpdaterError::Configuration {
            message: format!("artifact path is not valid UTF-8: {}", target.display()),
        })?;

        let Some(index) = self.directive else {
            return Ok(());
        };
        let rewritten = self.pattern.replace_paths(&self.lines[index], replacement).into_owned();
        let points_at_active = self
            .pattern
            .find_paths(&rewritten)
            .all(|token| Path::new(token) == target.as_path() && Path::new(token).is_file());
        if !points_at_active {
            return Err(not_found().into());
        }

        debug!("{} now starts {}", START_DIRECTIVE, target.display());
        self.lines[index] = rewritten;
        Ok(())
    }

    /// Unit name for `systemctl`: the file stem without `.service`.
    pub fn unit_name(&self) -> Result<String> {
        let name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| UpdaterError::Configuration {
                message: format!("invalid service file path: {}", self.path.display()),
            })?;
        Ok(name.strip_suffix(".service").unwrap_or(name).to_string())
    }

    /// Full file content as it would be written.
    pub fn content(&self) -> String {
        self.lines.concat()
    }

    /// Write the unit file back in place, atomically.
    pub async fn save(&self) -> Result<()> {
        let path = self.path.clone();
        let content = self.content();
        tokio::task::spawn_blocking(move || atomic_write(&path, content.as_bytes()))
            .await
            .context("Failed to join descriptor write task")?
            .with_context(|| format!("Failed to write service file {}", self.path.display()))
    }

    fn require_directive(&self) -> Result<&str> {
        self.directive_line().ok_or_else(|| {
            UpdaterError::NotFound {
                what: format!("{START_DIRECTIVE} line"),
                location: self.path.display().to_string(),
            }
            .into()
        })
    }
}

//! The update state machine for artifact-based services.
//!
//! ```text
//! ReadingCurrent -> Resolving -> Comparing -> Staging -> RewritingDescriptor
//!     -> ReloadingDaemon -> RestartingUnit -> Pruning
//! ```
//!
//! Every failing stage ends the run with an [`UpdateFailure`] that names the
//! stage. Nothing is rolled back: a failure after the descriptor was rewritten
//! leaves the host in a partial state, which [`UpdateFailure::is_partial`]
//! reports. Pruning is the exception; its failure is recorded in the
//! [`UpdateOutcome::Updated`] result instead of failing the run.

use crate::artifact::{self, ArtifactPattern};
use crate::descriptor::ServiceDescriptor;
use crate::release::{Downloader, GitHubReleaseFeed, HttpDownloader, ReleaseFeed, ReleaseResolver};
use crate::service::{ServiceManager, Systemctl};
use crate::version::DottedVersion;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A step of the update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStage {
    ReadingCurrent,
    Resolving,
    Staging,
    RewritingDescriptor,
    ReloadingDaemon,
    RestartingUnit,
}

impl fmt::Display for UpdateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ReadingCurrent => "reading the current version",
            Self::Resolving => "resolving the latest version",
            Self::Staging => "staging the new artifact",
            Self::RewritingDescriptor => "rewriting the service file",
            Self::ReloadingDaemon => "reloading the service manager",
            Self::RestartingUnit => "restarting the service",
        };
        f.write_str(text)
    }
}

/// Result of pruning stale artifacts after a successful switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PruneResult {
    /// This many files were deleted.
    Deleted(usize),
    /// Pruning stopped at an error; the update itself succeeded.
    Failed(String),
}

/// How a completed run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The latest version is not newer than the installed one.
    NoUpdateNeeded {
        current: DottedVersion,
        latest: DottedVersion,
    },
    /// The service now runs `current`.
    Updated {
        previous: DottedVersion,
        current: DottedVersion,
        active: PathBuf,
        pruned: PruneResult,
    },
}

/// A run that stopped at `stage`.
#[derive(Debug)]
pub struct UpdateFailure {
    /// Stage that failed.
    pub stage: UpdateStage,
    /// Target version, once known.
    pub target: Option<DottedVersion>,
    /// Unit name, once known.
    pub unit: Option<String>,
    /// Underlying error.
    pub source: anyhow::Error,
}

impl UpdateFailure {
    /// Whether the host was modified before the failure.
    ///
    /// The descriptor is only written at [`UpdateStage::RewritingDescriptor`],
    /// and a failed write leaves the original file in place.
    pub const fn is_partial(&self) -> bool {
        matches!(self.stage, UpdateStage::ReloadingDaemon | UpdateStage::RestartingUnit)
    }
}

impl fmt::Display for UpdateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Update failed while {}", self.stage)?;
        if let Some(target) = &self.target {
            write!(f, " (target version {target})")?;
        }
        match self.stage {
            UpdateStage::ReloadingDaemon => {
                write!(f, "; the service file already points at the new artifact")
            }
            UpdateStage::RestartingUnit => {
                let unit = self.unit.as_deref().unwrap_or("the service");
                write!(f, "; configuration was reloaded but {unit} was not restarted cleanly")
            }
            _ => Ok(()),
        }
    }
}

impl std::error::Error for UpdateFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Updates one jar-style service whose unit file embeds the artifact name.
pub struct ArtifactUpdater<F = GitHubReleaseFeed, D = HttpDownloader, S = Systemctl> {
    service_file: PathBuf,
    pattern: ArtifactPattern,
    resolver: ReleaseResolver<F, D>,
    services: S,
    remove_file: fn(&Path) -> std::io::Result<()>,
}

impl<F: ReleaseFeed, D: Downloader, S: ServiceManager> ArtifactUpdater<F, D, S> {
    /// Updater for the unit at `service_file`.
    pub fn new(
        service_file: impl Into<PathBuf>,
        pattern: ArtifactPattern,
        resolver: ReleaseResolver<F, D>,
        services: S,
    ) -> Self {
        Self {
            service_file: service_file.into(),
            pattern,
            resolver,
            services,
            remove_file: |path| std::fs::remove_file(path),
        }
    }

    /// Use `remove_file` to delete stale artifacts instead of the filesystem call.
    pub fn with_remove_file(mut self, remove_file: fn(&Path) -> std::io::Result<()>) -> Self {
        self.remove_file = remove_file;
        self
    }

    /// Unit file being managed.
    pub fn service_file(&self) -> &Path {
        &self.service_file
    }

    /// Run the update to completion or to the first failing stage.
    pub async fn run(&self) -> Result<UpdateOutcome, UpdateFailure> {
        let mut run = Progress::default();

        let mut descriptor = run
            .step(
                UpdateStage::ReadingCurrent,
                ServiceDescriptor::load(&self.service_file, self.pattern.clone()),
            )
            .await?;
        let (current, unit) = run.check(UpdateStage::ReadingCurrent, || {
            Ok((descriptor.current_version()?, descriptor.unit_name()?))
        })?;
        run.unit = Some(unit.clone());
        info!("Current version in service: {}", current);

        let latest = run.step(UpdateStage::Resolving, self.resolver.resolve()).await?;
        info!("Latest available version: {}", latest.version);

        if latest.version <= current {
            info!("{} is up to date", unit);
            return Ok(UpdateOutcome::NoUpdateNeeded {
                current,
                latest: latest.version,
            });
        }
        run.target = Some(latest.version.clone());

        let active = run.step(UpdateStage::Staging, self.resolver.stage(&latest)).await?;
        debug!("Staged {}", active.display());

        run.check(UpdateStage::RewritingDescriptor, || descriptor.set_artifact_path(&active))?;
        run.step(UpdateStage::RewritingDescriptor, descriptor.save()).await?;
        info!("Updated {} to start {}", self.service_file.display(), latest.file_name());

        run.step(UpdateStage::ReloadingDaemon, self.services.reload()).await?;
        run.step(UpdateStage::RestartingUnit, self.services.restart(&unit)).await?;

        let pruned = match artifact::prune_stale_with(
            self.resolver.artifact_dir(),
            &self.pattern,
            &active,
            self.remove_file,
        ) {
            Ok(count) => PruneResult::Deleted(count),
            Err(e) => {
                warn!("Failed to delete stale artifacts: {:#}", e);
                PruneResult::Failed(format!("{e:#}"))
            }
        };

        Ok(UpdateOutcome::Updated {
            previous: current,
            current: latest.version,
            active,
            pruned,
        })
    }
}

/// What is known about the run so far, attached to any failure.
#[derive(Default)]
struct Progress {
    target: Option<DottedVersion>,
    unit: Option<String>,
}

impl Progress {
    async fn step<T>(
        &self,
        stage: UpdateStage,
        future: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T, UpdateFailure> {
        debug!("Update stage: {:?}", stage);
        future.await.map_err(|source| self.fail(stage, source))
    }

    fn check<T>(
        &self,
        stage: UpdateStage,
        action: impl FnOnce() -> anyhow::Result<T>,
    ) -> Result<T, UpdateFailure> {
        action().map_err(|source| self.fail(stage, source))
    }

    fn fail(&self, stage: UpdateStage, source: anyhow::Error) -> UpdateFailure {
        UpdateFailure {
            stage,
            target: self.target.clone(),
            unit: self.unit.clone(),
            source,
        }
    }
}

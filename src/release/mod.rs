//! Determining and staging the newest available artifact.
//!
//! Two strategies exist:
//!
//! - **Remote**: ask a [`ReleaseFeed`] for the latest release, pick the asset
//!   whose name matches the [`ArtifactPattern`], and download it into the
//!   artifact directory when it is not already there.
//! - **Local**: scan the artifact directory and take the highest version
//!   present. Nothing is fetched.
//!
//! Resolution and staging are separate steps so that callers can compare the
//! resolved version against the installed one before anything is downloaded.

mod download;
mod feed;
mod http;

pub use download::{Downloader, HttpDownloader};
pub use feed::{GitHubReleaseFeed, ReleaseAsset, ReleaseFeed, ReleaseInfo};

use crate::artifact::{self, ArtifactPattern};
use crate::core::UpdaterError;
use crate::version::DottedVersion;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// How the latest available artifact is determined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseStrategy {
    /// Query the upstream release feed.
    #[default]
    Remote,
    /// Use whatever is already in the artifact directory.
    Local,
}

impl fmt::Display for ReleaseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote => write!(f, "remote"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// Where a resolved artifact comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSource {
    /// Already present in the artifact directory.
    OnDisk,
    /// Must be fetched from `url` unless a file of the same name exists.
    Download {
        url: String,
    },
}

/// The newest artifact known to a [`ReleaseResolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    /// Version parsed from the artifact file name.
    pub version: DottedVersion,
    /// Final location inside the artifact directory.
    pub path: PathBuf,
    /// How to obtain the file.
    pub source: ArtifactSource,
    /// Upstream release tag, when resolved remotely.
    pub release_tag: Option<String>,
}

impl ResolvedArtifact {
    /// File name of the artifact.
    pub fn file_name(&self) -> &str {
        self.path.file_name().and_then(|name| name.to_str()).unwrap_or_default()
    }
}

enum Strategy<F, D> {
    Remote {
        feed: F,
        downloader: D,
    },
    Local,
}

/// Resolves and stages the latest artifact for one service.
pub struct ReleaseResolver<F = GitHubReleaseFeed, D = HttpDownloader> {
    artifact_dir: PathBuf,
    pattern: ArtifactPattern,
    strategy: Strategy<F, D>,
}

impl ReleaseResolver {
    /// Resolver that only looks at files already in `artifact_dir`.
    pub fn local(artifact_dir: impl Into<PathBuf>, pattern: ArtifactPattern) -> Self {
        Self {
            artifact_dir: artifact_dir.into(),
            pattern,
            strategy: Strategy::Local,
        }
    }
}

impl<F: ReleaseFeed, D: Downloader> ReleaseResolver<F, D> {
    /// Resolver that asks `feed` for the latest release and fetches it with
    /// `downloader`.
    pub fn remote(
        artifact_dir: impl Into<PathBuf>,
        pattern: ArtifactPattern,
        feed: F,
        downloader: D,
    ) -> Self {
        Self {
            artifact_dir: artifact_dir.into(),
            pattern,
            strategy: Strategy::Remote {
                feed,
                downloader,
            },
        }
    }

    /// Strategy in use.
    pub const fn strategy(&self) -> ReleaseStrategy {
        match self.strategy {
            Strategy::Remote {
                ..
            } => ReleaseStrategy::Remote,
            Strategy::Local => ReleaseStrategy::Local,
        }
    }

    /// Directory artifacts are staged into.
    pub fn artifact_dir(&self) -> &Path {
        &self.artifact_dir
    }

    /// Determine the newest available artifact without modifying anything.
    pub async fn resolve(&self) -> Result<ResolvedArtifact> {
        match &self.strategy {
            Strategy::Remote {
                feed,
                ..
            } => self.resolve_remote(feed).await,
            Strategy::Local => self.resolve_local(),
        }
    }

    /// Make `artifact` present on disk and return its path.
    ///
    /// Remote artifacts are downloaded only when no file with the same name
    /// exists yet.
    pub async fn stage(&self, artifact: &ResolvedArtifact) -> Result<PathBuf> {
        match (&artifact.source, &self.strategy) {
            (
                ArtifactSource::Download {
                    url,
                },
                Strategy::Remote {
                    downloader,
                    ..
                },
            ) => {
                if tokio::fs::try_exists(&artifact.path).await.unwrap_or(false) {
                    info!("{} already exists locally, skipping download", artifact.file_name());
                    return Ok(artifact.path.clone());
                }

                info!("Downloading {}", artifact.file_name());
                downloader
                    .download(url, &artifact.path)
                    .await
                    .with_context(|| format!("Failed to stage {}", artifact.file_name()))?;
                Ok(artifact.path.clone())
            }
            (ArtifactSource::Download { .. }, Strategy::Local) => Err(UpdaterError::Configuration {
                message: format!(
                    "{} must be downloaded but the local release strategy cannot fetch files",
                    artifact.file_name()
                ),
            }
            .into()),
            (ArtifactSource::OnDisk, _) => {
                if !artifact.path.is_file() {
                    return Err(UpdaterError::NotFound {
                        what: artifact.file_name().to_string(),
                        location: self.artifact_dir.display().to_string(),
                    }
                    .into());
                }
                Ok(artifact.path.clone())
            }
        }
    }

    async fn resolve_remote(&self, feed: &F) -> Result<ResolvedArtifact> {
        let release = feed.latest_release().await?;

        let asset = release
            .assets
            .iter()
            .find(|asset| self.pattern.matches_asset(&asset.name))
            .ok_or_else(|| UpdaterError::NotFound {
                what: format!(
                    "{}<version>{} asset",
                    self.pattern.prefix(),
                    self.pattern.extension()
                ),
                location: format!("release {}", release.tag_name),
            })?;

        let version = self.pattern.version_of(&asset.name).ok_or_else(|| UpdaterError::NotFound {
            what: format!("version in asset name {}", asset.name),
            location: format!("release {}", release.tag_name),
        })?;
        let version = DottedVersion::parse(version);

        if release.tag_version() != version.as_str() {
            warn!(
                "Release tag {} does not match asset version {}, using the asset version",
                release.tag_name, version
            );
        }
        debug!("Selected asset {} from release {}", asset.name, release.tag_name);

        Ok(ResolvedArtifact {
            version,
            path: self.artifact_dir.join(&asset.name),
            source: ArtifactSource::Download {
                url: asset.browser_download_url.clone(),
            },
            release_tag: Some(release.tag_name.clone()),
        })
    }

    fn resolve_local(&self) -> Result<ResolvedArtifact> {
        let candidates = artifact::scan(&self.artifact_dir, &self.pattern)?;
        debug!("Found {} candidate artifacts in {}", candidates.len(), self.artifact_dir.display());

        let newest = artifact::latest(&candidates).ok_or_else(|| UpdaterError::NotFound {
            what: format!(
                "{}<version>{} artifact",
                self.pattern.prefix(),
                self.pattern.extension()
            ),
            location: self.artifact_dir.display().to_string(),
        })?;

        Ok(ResolvedArtifact {
            version: newest.version.clone(),
            path: newest.path.clone(),
            source: ArtifactSource::OnDisk,
            release_tag: None,
        })
    }
}

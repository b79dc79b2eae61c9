//! Release metadata from GitHub.

use super::http::{self, RequestError};
use crate::config::NetworkConfig;
use crate::constants::GITHUB_API_BASE;
use anyhow::{Context, Result};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::debug;

/// The parts of a GitHub release the updater cares about.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ReleaseInfo {
    /// Release tag, usually `v1.2.3` or `1.2.3`
    pub tag_name: String,
    /// Downloadable files attached to the release
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// One downloadable file of a release.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ReleaseAsset {
    /// File name, e.g. `komga-1.2.3.jar`
    pub name: String,
    /// Direct download URL
    pub browser_download_url: String,
}

impl ReleaseInfo {
    /// Tag with a leading `v` removed.
    pub fn tag_version(&self) -> &str {
        self.tag_name.strip_prefix('v').unwrap_or(&self.tag_name)
    }
}

/// Source of "latest release" information.
#[allow(async_fn_in_trait)]
pub trait ReleaseFeed {
    /// Fetch the newest published release.
    async fn latest_release(&self) -> Result<ReleaseInfo>;
}

/// [`ReleaseFeed`] backed by `GET /repos/<owner>/<name>/releases/latest`.
#[derive(Debug, Clone)]
pub struct GitHubReleaseFeed {
    client: reqwest::Client,
    url: String,
    retries: usize,
}

impl GitHubReleaseFeed {
    /// Feed for `repository` (`owner/name`) on api.github.com.
    pub fn new(repository: &str, network: &NetworkConfig) -> Result<Self> {
        Self::with_api_base(GITHUB_API_BASE, repository, network)
    }

    /// Feed against a different API root (GitHub Enterprise, test servers).
    pub fn with_api_base(api_base: &str, repository: &str, network: &NetworkConfig) -> Result<Self> {
        Ok(Self {
            client: http::client(network, network.timeout())?,
            url: format!("{}/repos/{}/releases/latest", api_base.trim_end_matches('/'), repository),
            retries: network.retries,
        })
    }

    /// The endpoint queried.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<ReleaseInfo, RequestError> {
        let response =
            self.client.get(&self.url).header(ACCEPT, "application/vnd.github+json").send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::Status(status));
        }

        Ok(response.json::<ReleaseInfo>().await?)
    }
}

impl ReleaseFeed for GitHubReleaseFeed {
    async fn latest_release(&self) -> Result<ReleaseInfo> {
        debug!("Fetching latest release from {}", self.url);
        let release = http::with_retry(self.retries, "release lookup", || self.fetch())
            .await
            .with_context(|| format!("Failed to fetch latest release from {}", self.url))?;
        debug!("Latest release tag: {} ({} assets)", release.tag_name, release.assets.len());
        Ok(release)
    }
}

//! Downloading release assets to disk.

use super::http::{self, RequestError};
use crate::config::NetworkConfig;
use crate::core::UpdaterError;
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Persists a remote resource at a local path.
#[allow(async_fn_in_trait)]
pub trait Downloader {
    /// Download `url` to `destination`, returning the number of bytes written.
    ///
    /// `destination` must only appear once the download completed with a
    /// success status.
    async fn download(&self, url: &str, destination: &Path) -> Result<u64>;
}

/// [`Downloader`] over HTTP(S) with `reqwest`.
///
/// The body is streamed into `<destination>.part`, which is renamed into
/// place only after the whole body was written and synced.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: reqwest::Client,
    retries: usize,
}

impl HttpDownloader {
    /// Downloader using the configured user agent, timeout, and retries.
    pub fn new(network: &NetworkConfig) -> Result<Self> {
        Ok(Self {
            client: http::client(network, network.download_timeout())?,
            retries: network.retries,
        })
    }

    async fn fetch_to(&self, url: &str, path: &Path) -> Result<u64, RequestError> {
        let mut response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::Status(status));
        }

        let io_error = |source| RequestError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut file = tokio::fs::File::create(path).await.map_err(io_error)?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await.map_err(io_error)?;
            written += chunk.len() as u64;
        }
        file.sync_all().await.map_err(io_error)?;

        Ok(written)
    }
}

impl Downloader for HttpDownloader {
    async fn download(&self, url: &str, destination: &Path) -> Result<u64> {
        let partial = partial_path(destination);
        debug!("Downloading {} to {}", url, partial.display());

        let result = http::with_retry(self.retries, "artifact download", || {
            self.fetch_to(url, &partial)
        })
        .await;

        let written = match result {
            Ok(written) => written,
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                return Err(e).with_context(|| format!("Failed to download {url}"));
            }
        };

        tokio::fs::rename(&partial, destination)
            .await
            .map_err(|e| UpdaterError::file_system("rename", &partial, &e))?;

        info!("Downloaded {} bytes to {}", written, destination.display());
        Ok(written)
    }
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}

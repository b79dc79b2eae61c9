//! In-memory stand-ins for network and init-system access.

use crate::release::{Downloader, ReleaseAsset, ReleaseFeed, ReleaseInfo};
use crate::service::ServiceManager;
use anyhow::{Result, anyhow};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// [`ReleaseFeed`] returning a canned release (or error).
#[derive(Debug, Clone)]
pub struct FakeReleaseFeed {
    release: Result<ReleaseInfo, String>,
    calls: Arc<AtomicUsize>,
}

impl FakeReleaseFeed {
    /// Feed whose latest release is `release`.
    pub fn new(release: ReleaseInfo) -> Self {
        Self {
            release: Ok(release),
            calls: Arc::default(),
        }
    }

    /// Feed whose latest release has the given tag and asset names. Download
    /// URLs point at `https://downloads.invalid/<name>`.
    pub fn with_assets(tag: &str, names: &[&str]) -> Self {
        Self::new(ReleaseInfo {
            tag_name: tag.to_string(),
            assets: names
                .iter()
                .map(|name| ReleaseAsset {
                    name: (*name).to_string(),
                    browser_download_url: format!("https://downloads.invalid/{name}"),
                })
                .collect(),
        })
    }

    /// Feed that fails every lookup with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            release: Err(message.to_string()),
            calls: Arc::default(),
        }
    }

    /// Number of lookups so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ReleaseFeed for FakeReleaseFeed {
    async fn latest_release(&self) -> Result<ReleaseInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.release.clone().map_err(|message| anyhow!(message))
    }
}

/// [`Downloader`] that writes a small placeholder file and records requests.
///
/// Clones share their record.
#[derive(Debug, Clone, Default)]
pub struct FakeDownloader {
    downloads: Arc<Mutex<Vec<(String, PathBuf)>>>,
    failure: Option<String>,
}

impl FakeDownloader {
    /// Downloader that fails every request with `message` without writing.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// `(url, destination)` pairs requested so far.
    pub fn downloads(&self) -> Vec<(String, PathBuf)> {
        self.downloads.lock().unwrap().clone()
    }
}

impl Downloader for FakeDownloader {
    async fn download(&self, url: &str, destination: &Path) -> Result<u64> {
        self.downloads.lock().unwrap().push((url.to_string(), destination.to_path_buf()));
        if let Some(message) = &self.failure {
            return Err(anyhow!(message.clone()));
        }
        let content = format!("downloaded from {url}");
        tokio::fs::write(destination, &content).await?;
        Ok(content.len() as u64)
    }
}

/// [`ServiceManager`] that records calls instead of touching systemd.
///
/// Calls are recorded as `"daemon-reload"` and `"restart <unit>"`. Clones
/// share their record.
#[derive(Debug, Clone, Default)]
pub struct RecordingServiceManager {
    calls: Arc<Mutex<Vec<String>>>,
    fail_reload: bool,
    fail_restart: bool,
}

impl RecordingServiceManager {
    /// Manager whose reload fails.
    pub fn failing_reload() -> Self {
        Self {
            fail_reload: true,
            ..Self::default()
        }
    }

    /// Manager whose restart fails.
    pub fn failing_restart() -> Self {
        Self {
            fail_restart: true,
            ..Self::default()
        }
    }

    /// Calls recorded so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ServiceManager for RecordingServiceManager {
    async fn reload(&self) -> Result<()> {
        self.calls.lock().unwrap().push("daemon-reload".to_string());
        if self.fail_reload {
            return Err(anyhow!("daemon-reload refused"));
        }
        Ok(())
    }

    async fn restart(&self, unit: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("restart {unit}"));
        if self.fail_restart {
            return Err(anyhow!("unit {unit} failed to start"));
        }
        Ok(())
    }
}

//! Per-service and network configuration sections.

use crate::constants::{
    DEFAULT_API_TIMEOUT_SECS, DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_NETWORK_RETRIES,
};
use crate::release::ReleaseStrategy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Komga: a standalone jar started by a systemd unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct KomgaConfig {
    /// Unit file whose `ExecStart=` line references the jar.
    #[serde(default = "default_komga_service_file")]
    pub service_file: PathBuf,

    /// Directory holding `komga-<version>.jar` files.
    #[serde(default = "default_komga_dir")]
    pub artifact_dir: PathBuf,

    /// Where the latest version comes from.
    #[serde(default)]
    pub strategy: ReleaseStrategy,

    /// GitHub `owner/name` queried by the remote strategy.
    #[serde(default = "default_komga_repository")]
    pub repository: String,

    /// Literal artifact filename prefix.
    #[serde(default = "default_komga_prefix")]
    pub artifact_prefix: String,

    /// Literal artifact filename extension, with the dot.
    #[serde(default = "default_komga_extension")]
    pub artifact_extension: String,
}

impl Default for KomgaConfig {
    fn default() -> Self {
        Self {
            service_file: default_komga_service_file(),
            artifact_dir: default_komga_dir(),
            strategy: ReleaseStrategy::default(),
            repository: default_komga_repository(),
            artifact_prefix: default_komga_prefix(),
            artifact_extension: default_komga_extension(),
        }
    }
}

fn default_komga_service_file() -> PathBuf {
    PathBuf::from("/etc/systemd/system/komga.service")
}

fn default_komga_dir() -> PathBuf {
    PathBuf::from("/opt/komga")
}

fn default_komga_repository() -> String {
    "gotson/komga".to_string()
}

fn default_komga_prefix() -> String {
    "komga-".to_string()
}

fn default_komga_extension() -> String {
    ".jar".to_string()
}

/// Immich: a docker compose stack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ImmichConfig {
    /// Directory containing the compose file.
    #[serde(default = "default_immich_dir")]
    pub compose_dir: PathBuf,
}

impl Default for ImmichConfig {
    fn default() -> Self {
        Self {
            compose_dir: default_immich_dir(),
        }
    }
}

fn default_immich_dir() -> PathBuf {
    PathBuf::from("/opt/immich")
}

/// Jellyfin: an apt package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct JellyfinConfig {
    /// Package name passed to `apt install --only-upgrade`.
    #[serde(default = "default_jellyfin_package")]
    pub package: String,
}

impl Default for JellyfinConfig {
    fn default() -> Self {
        Self {
            package: default_jellyfin_package(),
        }
    }
}

fn default_jellyfin_package() -> String {
    "jellyfin".to_string()
}

/// HTTP behaviour of the remote release strategy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    /// `User-Agent` header; GitHub rejects requests without one.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for release metadata requests, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Timeout for a whole artifact download, in seconds.
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,

    /// Extra attempts after a transient failure (connect error, timeout, 5xx).
    #[serde(default = "default_retries")]
    pub retries: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            download_timeout_secs: default_download_timeout_secs(),
            retries: default_retries(),
        }
    }
}

impl NetworkConfig {
    /// Metadata request timeout.
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Download timeout.
    pub const fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_API_TIMEOUT_SECS
}

const fn default_download_timeout_secs() -> u64 {
    DEFAULT_DOWNLOAD_TIMEOUT_SECS
}

const fn default_retries() -> usize {
    DEFAULT_NETWORK_RETRIES
}

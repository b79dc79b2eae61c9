//! Global constants used throughout media-updater.
//!
//! Built-in defaults for paths and network behaviour live here so the
//! configuration module and the help output agree on them.

/// Configuration file read when neither `--config` nor the environment names one.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/media-updater/config.toml";

/// Environment variable naming an alternative configuration file.
pub const CONFIG_PATH_ENV: &str = "MEDIA_UPDATER_CONFIG";

/// Default single-instance lock file.
pub const DEFAULT_LOCK_FILE: &str = "/run/lock/media-updater.lock";

/// GitHub REST API root.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Default timeout for release metadata requests, in seconds.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

/// Default timeout for a whole artifact download, in seconds.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 600;

/// Retries after the first attempt for transient network failures.
pub const DEFAULT_NETWORK_RETRIES: usize = 1;

/// Initial delay before a network retry, in milliseconds; doubles per attempt.
pub const STARTING_RETRY_DELAY_MS: u64 = 500;

/// Cap on the delay between network retries, in milliseconds.
pub const MAX_RETRY_DELAY_MS: u64 = 5_000;

//! Command-line interface.
//!
//! ```text
//! media-updater --service <komga|immich|jellyfin> [--config <PATH>] [--verbose | --quiet]
//! media-updater -h | --help
//! media-updater -v | --version
//! ```
//!
//! Help and version exit with status 0. Every other parse failure prints
//! `Error: ...` and exits with status 1; clap's own usage-error status of 2 is
//! not used. The root check happens after help and version handling so that
//! both work for unprivileged users. `--version` falls back to the built-in
//! configuration, with a warning, when the configuration cannot be loaded.

pub mod banner;

use crate::config::UpdaterConfig;
use crate::constants::CONFIG_PATH_ENV;
use crate::core::UpdaterError;
use crate::lock::UpdateLock;
use crate::services::{self, Service};
use crate::utils::require_root;
use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;
use colored::Colorize;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Update self-hosted media servers to their latest versions.
#[derive(Parser, Debug)]
#[command(
    name = "media-updater",
    about = "Update self-hosted media servers to their latest versions and clean up old artifacts",
    disable_version_flag = true,
    before_help = banner::logo(),
    after_help = banner::help_footer()
)]
pub struct Cli {
    /// Service to update
    #[arg(short, long, value_enum, value_name = "NAME", required_unless_present = "version")]
    service: Option<Service>,

    /// Configuration file (default: /etc/media-updater/config.toml)
    #[arg(long, value_name = "PATH", env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// Show debug output
    #[arg(long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show errors
    #[arg(short, long)]
    quiet: bool,

    /// Show version info and the active configuration
    #[arg(short = 'v', long)]
    version: bool,
}

impl Cli {
    /// Parse the process arguments, exiting on help, version, or error.
    pub fn parse_or_exit() -> Self {
        match Self::try_parse() {
            Ok(cli) => cli,
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                e.exit()
            }
            Err(e) => {
                let rendered = e.to_string();
                let message = rendered.strip_prefix("error: ").unwrap_or(&rendered);
                eprintln!("{}: {}", "Error".red().bold(), message.trim_end());
                std::process::exit(1);
            }
        }
    }

    /// Log level implied by `--verbose` / `--quiet`.
    pub const fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }

    /// Filter used when `RUST_LOG` is unset: this crate plus the `process`
    /// targets that external command logging is emitted under.
    pub fn default_directives(&self) -> String {
        let level = self.log_level();
        format!("{}={level},process={level}", env!("CARGO_CRATE_NAME"))
    }

    /// Install the global `tracing` subscriber. `RUST_LOG` takes precedence.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directives()));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .try_init();
    }

    /// Run the selected action.
    pub async fn execute(self) -> Result<()> {
        if self.version {
            let config = match UpdaterConfig::load(self.config.as_deref()).await {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("{} {:#}; showing built-in defaults", "Warning:".yellow(), e);
                    UpdaterConfig::default()
                }
            };
            println!("{}", banner::logo());
            print!("{}", banner::configuration(&config));
            return Ok(());
        }

        let service = self.service.ok_or_else(|| UpdaterError::Configuration {
            message: "--service is required".to_string(),
        })?;

        require_root()?;

        let config = UpdaterConfig::load(self.config.as_deref()).await?;
        debug!("Using configuration from {}", config.source_description());

        let _lock = UpdateLock::try_acquire(&config.lock_file).await?;
        services::update(service, &config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_service() {
        let cli = Cli::try_parse_from(["media-updater", "-s", "jellyfin"]).unwrap();
        assert_eq!(cli.service, Some(Service::Jellyfin));
        assert_eq!(cli.log_level(), "info");
    }

    #[test]
    fn test_version_does_not_need_service() {
        let cli = Cli::try_parse_from(["media-updater", "-v"]).unwrap();
        assert!(cli.version);
        assert!(cli.service.is_none());
    }

    #[test]
    fn test_rejects_unknown_service_and_missing_service() {
        let err = Cli::try_parse_from(["media-updater", "--service", "plex"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);

        let err = Cli::try_parse_from(["media-updater"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        let err =
            Cli::try_parse_from(["media-updater", "-s", "komga", "--verbose", "--quiet"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);

        let cli = Cli::try_parse_from(["media-updater", "-s", "komga", "--verbose"]).unwrap();
        assert_eq!(cli.log_level(), "debug");
    }

    #[test]
    fn test_default_directives_include_process_targets() {
        let cli = Cli::try_parse_from(["media-updater", "-s", "komga", "--verbose"]).unwrap();
        assert_eq!(cli.default_directives(), "media_updater=debug,process=debug");

        let cli = Cli::try_parse_from(["media-updater", "-s", "komga", "-q"]).unwrap();
        assert_eq!(cli.default_directives(), "media_updater=error,process=error");
    }

    #[tokio::test]
    async fn test_version_with_missing_config_succeeds() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let missing = temp_dir.path().join("absent.toml");
        let missing = missing.to_str().unwrap();
        let cli = Cli::try_parse_from(["media-updater", "--version", "--config", missing]).unwrap();

        assert!(cli.execute().await.is_ok());
    }
}

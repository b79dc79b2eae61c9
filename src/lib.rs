//! media-updater - keep self-hosted media servers current
//!
//! A small CLI, run as root on the host, that updates one media server per
//! invocation and removes what the update superseded.
//!
//! | Service    | Mechanism                                                   |
//! |------------|-------------------------------------------------------------|
//! | `komga`    | `komga-<version>.jar` started by a systemd unit             |
//! | `immich`   | `docker compose` stack                                      |
//! | `jellyfin` | apt package                                                 |
//!
//! # Artifact updates
//!
//! The jar-based path is the interesting one. [`update::ArtifactUpdater`]
//! runs it as a sequence of named stages:
//!
//! 1. read the running version from the unit's `ExecStart=` line
//!    ([`descriptor`])
//! 2. find the newest release, remotely on GitHub or among the files already
//!    on disk ([`release`])
//! 3. compare dotted versions segment by segment ([`version`])
//! 4. download the new jar if needed, repoint the unit, reload systemd and
//!    restart the unit ([`service`])
//! 5. delete every other matching jar ([`artifact`])
//!
//! # Modules
//!
//! - [`cli`] - argument parsing, logging setup, banner
//! - [`config`] - `/etc/media-updater/config.toml`
//! - [`core`] - error types and user-facing error rendering
//! - [`process`] - external command execution
//! - [`services`] - per-service update procedures
//! - [`lock`] - single-instance guard
//! - [`utils`] - atomic writes, privilege checks

pub mod artifact;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod descriptor;
pub mod lock;
pub mod process;
pub mod release;
pub mod service;
pub mod services;
pub mod update;
pub mod utils;
pub mod version;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

//! Configuration for media-updater.
//!
//! All paths and behaviour switches live in one [`UpdaterConfig`] value that
//! `main` builds once and passes down by reference. It is read from a TOML
//! file; every key is optional and falls back to the built-in defaults.
//!
//! # Lookup
//!
//! 1. `--config <PATH>` (or the `MEDIA_UPDATER_CONFIG` environment variable,
//!    which clap maps onto the same flag). The file must exist.
//! 2. `/etc/media-updater/config.toml`, if present.
//! 3. Built-in defaults.
//!
//! # Example
//!
//! ```toml
//! [komga]
//! service_file = "/etc/systemd/system/komga.service"
//! artifact_dir = "/opt/komga"
//! strategy = "remote"
//!
//! [immich]
//! compose_dir = "/srv/immich"
//! ```

mod global;
mod sections;

pub use global::UpdaterConfig;
pub use sections::{ImmichConfig, JellyfinConfig, KomgaConfig, NetworkConfig};

//! Test utilities for media-updater
//!
//! Fakes for the three seams of the update path ([`ReleaseFeed`],
//! [`Downloader`], [`ServiceManager`]), a throwaway HTTP server for exercising
//! the real `reqwest` clients, and a fixture that lays out a service file and
//! artifact directory in a temporary directory.
//!
//! [`ReleaseFeed`]: crate::release::ReleaseFeed
//! [`Downloader`]: crate::release::Downloader
//! [`ServiceManager`]: crate::service::ServiceManager

pub mod fakes;
pub mod fixtures;
pub mod http;

pub use fakes::{FakeDownloader, FakeReleaseFeed, RecordingServiceManager};
pub use fixtures::ServiceFixture;
pub use http::StubServer;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With `level` set, that level is used;
/// otherwise `RUST_LOG` is honoured, and without either nothing is logged.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

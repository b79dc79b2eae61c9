//! Shared HTTP plumbing: client construction, error classification, retries.

use crate::config::NetworkConfig;
use crate::constants::{MAX_RETRY_DELAY_MS, STARTING_RETRY_DELAY_MS};
use crate::core::UpdaterError;
use anyhow::Result;
use reqwest::StatusCode;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::warn;

/// Failure of a single HTTP attempt.
#[derive(Debug, Error)]
pub(crate) enum RequestError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("server returned HTTP {0}")]
    Status(StatusCode),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RequestError {
    /// Whether another attempt could succeed.
    fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Status(status) => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Self::Io {
                ..
            } => false,
        }
    }

    fn into_updater_error(self, operation: &str) -> UpdaterError {
        match self {
            Self::Io {
                path,
                source,
            } => UpdaterError::file_system("write", &path, &source),
            other => UpdaterError::Network {
                operation: operation.to_string(),
                reason: describe(&other),
            },
        }
    }
}

// reqwest's Display stops at the outermost layer ("error sending request").
fn describe(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Build a client with the configured `User-Agent` and the given total timeout.
pub(crate) fn client(network: &NetworkConfig, timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(network.user_agent.as_str())
        .connect_timeout(network.timeout())
        .timeout(timeout)
        .build()
        .map_err(|e| {
            UpdaterError::Network {
                operation: "HTTP client setup".to_string(),
                reason: describe(&e),
            }
            .into()
        })
}

/// Run `action`, retrying transient failures up to `retries` more times.
///
/// Delays double from [`STARTING_RETRY_DELAY_MS`] and are capped at
/// [`MAX_RETRY_DELAY_MS`]. The final failure becomes
/// [`UpdaterError::Network`] (or [`UpdaterError::FileSystem`] for local
/// write errors).
pub(crate) async fn with_retry<T, A, Fut>(retries: usize, operation: &str, action: A) -> Result<T>
where
    A: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RequestError>>,
{
    // 2^n * (start / 2): start, 2 * start, 4 * start, ...
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(STARTING_RETRY_DELAY_MS / 2)
        .max_delay(Duration::from_millis(MAX_RETRY_DELAY_MS))
        .take(retries);

    RetryIf::spawn(strategy, action, |e: &RequestError| {
        let transient = e.is_transient();
        if transient {
            warn!("{} failed with a transient error: {}", operation, e);
        }
        transient
    })
    .await
    .map_err(|e| e.into_updater_error(operation).into())
}

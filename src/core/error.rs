//! Error handling for media-updater
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`UpdaterError`]) classify every fatal failure
//!    so callers can match on the category.
//! 2. **User-friendly output** ([`ErrorContext`]) renders any `anyhow::Error`
//!    chain as a single `Error: <context>: <detail>` line with an optional
//!    suggestion for the operator.
//!
//! # Error Categories
//!
//! - [`UpdaterError::Configuration`] - bad CLI input or configuration file
//! - [`UpdaterError::PrivilegesRequired`] - not running as root
//! - [`UpdaterError::NotFound`] - missing artifact, version token, or release asset
//! - [`UpdaterError::ExternalCommand`] - a shelled-out process exited non-zero
//! - [`UpdaterError::Network`] - release feed or download failure
//! - [`UpdaterError::FileSystem`] - read/write/delete failure
//!
//! Fallible code returns `anyhow::Result` and adds `.context(..)` layers; the
//! typed error sits somewhere in the chain and [`user_friendly_error`] finds it.
//!
//! # Examples
//!
//! ```rust,no_run
//! use media_updater::core::{UpdaterError, user_friendly_error};
//! use anyhow::Context;
//!
//! let result: anyhow::Result<()> = Err(UpdaterError::NotFound {
//!     what: "ExecStart line".to_string(),
//!     location: "/etc/systemd/system/komga.service".to_string(),
//! })
//! .context("Failed to get current Komga version");
//!
//! if let Err(e) = result {
//!     user_friendly_error(e).display();
//! }
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for media-updater operations.
///
/// Every fatal condition maps onto one of these variants. Most variants carry
/// strings rather than source errors so the type stays `Clone` and can be
/// attached to an [`ErrorContext`] after the fact.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpdaterError {
    /// Missing or invalid CLI input or configuration.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the problem
        message: String,
    },

    /// The process is not running with superuser privileges.
    #[error("This application requires root privileges")]
    PrivilegesRequired,

    /// A required artifact, version token, or release asset does not exist.
    #[error("{what} not found in {location}")]
    NotFound {
        /// What was being looked for (e.g. "version token")
        what: String,
        /// Where it was looked for (a path, URL, or release tag)
        location: String,
    },

    /// An external command exited unsuccessfully or could not be spawned.
    #[error("Command `{command}` failed: {reason}")]
    ExternalCommand {
        /// The full command line as executed
        command: String,
        /// Exit status or spawn error, verbatim
        reason: String,
    },

    /// Release feed query or asset download failed.
    #[error("Network error during {operation}: {reason}")]
    Network {
        /// The operation that failed (e.g. "release lookup")
        operation: String,
        /// Transport error or HTTP status
        reason: String,
    },

    /// Filesystem read/write/delete failure.
    #[error("Failed to {operation} {path}: {reason}")]
    FileSystem {
        /// The operation (e.g. "delete", "write")
        operation: String,
        /// Path involved
        path: String,
        /// Underlying I/O error text
        reason: String,
    },

    /// Anything that was not classified.
    #[error("{message}")]
    Other {
        /// Rendered error chain
        message: String,
    },
}

impl UpdaterError {
    /// Build a [`UpdaterError::FileSystem`] from an I/O error.
    pub fn file_system(
        operation: impl Into<String>,
        path: &std::path::Path,
        error: &std::io::Error,
    ) -> Self {
        Self::FileSystem {
            operation: operation.into(),
            path: path.display().to_string(),
            reason: error.to_string(),
        }
    }
}

/// An error ready to be shown to the operator.
///
/// `message` holds the whole context chain rendered as
/// `<context>: <detail>`; `error` is the classified cause used to pick a
/// suggestion.
#[derive(Debug)]
pub struct ErrorContext {
    /// The classified error found in the chain
    pub error: UpdaterError,
    /// Full `<context>: <detail>` rendering of the chain
    pub message: String,
    /// Optional remediation hint
    pub suggestion: Option<String>,
    /// Optional extra explanation
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wrap a classified error; the message defaults to its `Display`.
    pub fn new(error: UpdaterError) -> Self {
        let message = error.to_string();
        Self {
            error,
            message,
            suggestion: None,
            details: None,
        }
    }

    /// Replace the rendered message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach a remediation hint.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach extra explanation.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "Error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

/// Convert any error chain into an [`ErrorContext`].
///
/// The first [`UpdaterError`] found in the chain decides the suggestion. The
/// message is the whole chain joined with `": "`, so context added with
/// `anyhow::Context` reads as `Failed to get current Komga version: ...`.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let message = format!("{error:#}");

    if let Some(updater_error) = error.chain().find_map(|e| e.downcast_ref::<UpdaterError>()) {
        return create_error_context(updater_error.clone()).with_message(message);
    }

    if let Some(io_error) = error.chain().find_map(|e| e.downcast_ref::<std::io::Error>())
        && io_error.kind() == std::io::ErrorKind::PermissionDenied
    {
        return ErrorContext::new(UpdaterError::Other {
            message: message.clone(),
        })
        .with_message(message)
        .with_suggestion("Run the updater as root (sudo) and check file ownership");
    }

    ErrorContext::new(UpdaterError::Other {
        message,
    })
}

fn create_error_context(error: UpdaterError) -> ErrorContext {
    match &error {
        UpdaterError::Configuration {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Run with --help to see usage and --version to see the active configuration"),
        UpdaterError::PrivilegesRequired => ErrorContext::new(error).with_suggestion(format!(
            "Please run with sudo:\n  sudo {} --service <name>",
            env!("CARGO_PKG_NAME")
        )),
        UpdaterError::NotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check the service file and artifact directory in the configuration"),
        UpdaterError::ExternalCommand {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Run the command manually to see the full output"),
        UpdaterError::Network {
            ..
        } => ErrorContext::new(error)
            .with_details("Unauthenticated GitHub API clients are limited to 60 requests per hour")
            .with_suggestion("Check network connectivity, or set komga.strategy = \"local\" to skip the lookup"),
        UpdaterError::FileSystem {
            ..
        }
        | UpdaterError::Other {
            ..
        } => ErrorContext::new(error),
    }
}

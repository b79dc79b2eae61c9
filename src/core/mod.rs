//! Core error types shared across the crate.

pub mod error;

pub use error::{ErrorContext, UpdaterError, user_friendly_error};

//! OS service control.
//!
//! The update path needs exactly two operations from the service manager:
//! re-read unit definitions after the unit file changed, then restart one
//! unit. They are modelled as a trait so the orchestrator can be driven by a
//! recording fake in tests.

use crate::process::SystemCommand;
use anyhow::{Context, Result};
use tracing::info;

/// Reload and restart operations of an init system.
#[allow(async_fn_in_trait)]
pub trait ServiceManager {
    /// Re-read all unit definitions (`systemctl daemon-reload`).
    async fn reload(&self) -> Result<()>;

    /// Restart the named unit (`systemctl restart <unit>`).
    async fn restart(&self, unit: &str) -> Result<()>;
}

/// [`ServiceManager`] backed by the `systemctl` binary.
#[derive(Debug, Clone, Default)]
pub struct Systemctl;

impl ServiceManager for Systemctl {
    async fn reload(&self) -> Result<()> {
        info!("Reloading systemd unit definitions");
        SystemCommand::new("systemctl")
            .arg("daemon-reload")
            .with_context("service")
            .execute_success()
            .await
            .context("Failed to reload systemd configuration")
    }

    async fn restart(&self, unit: &str) -> Result<()> {
        info!("Restarting {}", unit);
        SystemCommand::new("systemctl")
            .args(["restart", unit])
            .with_context("service")
            .execute_success()
            .await
            .with_context(|| format!("Failed to restart {unit}"))
    }
}

//! Immich: pull new images and recreate the compose stack.

use crate::config::ImmichConfig;
use crate::process::SystemCommand;
use anyhow::{Context, Result};
use colored::Colorize;

const STEPS: [&[&str]; 4] = [
    &["compose", "down"],
    &["compose", "pull"],
    &["compose", "up", "-d"],
    &["image", "prune", "-f"],
];

/// The `docker` invocations run, in order, inside the compose directory.
pub fn commands(config: &ImmichConfig) -> Vec<SystemCommand> {
    STEPS
        .iter()
        .map(|args| {
            SystemCommand::new("docker")
                .args(args.iter().copied())
                .current_dir(&config.compose_dir)
                .with_context("immich")
        })
        .collect()
}

/// Stop the stack, pull images, start it again, and drop dangling images.
///
/// Output of every command is streamed to the terminal. The first failing
/// command aborts the update.
pub async fn update(config: &ImmichConfig) -> Result<()> {
    println!("{}", "Updating Immich...".cyan());

    for command in commands(config) {
        command.execute_success().await.context("Immich update aborted")?;
    }

    println!("{}", "Immich update completed successfully.".green());
    Ok(())
}

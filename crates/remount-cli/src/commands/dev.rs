//! `remount <TARGET>`: serve and remount until interrupted.
//!
//! 1. Load configuration (defaults, remount.toml, REMOUNT_*, flags)
//! 2. Resolve the target to an entry module
//! 3. Run the dev loop with Ctrl-C as the shutdown signal

use crate::cli::Cli;
use crate::config::RemountConfig;
use crate::dev::{DevController, TargetSpec};
use crate::error::Result;
use crate::ui;
use tokio::signal;

/// Execute the dev loop.
///
/// Returns `Ok(())` after Ctrl-C. Errors are fatal: a missing target, bad
/// configuration, or no port to listen on.
pub async fn execute(args: Cli) -> Result<()> {
    let search_dir = TargetSpec::search_dir(&args.target);
    let config = RemountConfig::load(args.config.as_deref(), &search_dir, &args.overrides())?;
    tracing::debug!(?config, "configuration loaded");

    let target = TargetSpec::resolve(&args.target, &config.index_file)?;
    tracing::debug!(
        module = %target.resolved_absolute_path.display(),
        dir = %target.containing_directory.display(),
        "target resolved"
    );

    let controller = DevController::new(&config, target)?;
    controller.run(shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl-C");
        ui::warning("Ctrl-C handling is unavailable; stop remount by terminating the process");
        std::future::pending::<()>().await;
    }
}

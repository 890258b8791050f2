//! remount CLI - hot-reloading dev server for router modules.
//!
//! Parses arguments, sets up logging and colors, and runs the dev loop.
//! Fatal errors are reported through miette and exit with status 1.

use clap::Parser;
use miette::Result;
use remount_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    commands::dev_execute(args)
        .await
        .map_err(error::cli_error_to_miette)
}

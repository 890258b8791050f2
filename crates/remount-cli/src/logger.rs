//! Logging infrastructure for the remount CLI.
//!
//! Diagnostics go through `tracing` to stderr. The route listing and reload
//! lines are part of the console protocol and are printed by [`crate::ui`]
//! instead, so they survive `--quiet`.
//!
//! # Example
//!
//! ```rust,no_run
//! use remount_cli::logger::init_logger;
//! use tracing::{debug, info};
//!
//! init_logger(false, false, false);
//!
//! info!("Starting dev server");
//! debug!(port = 5000, "probing port");
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str =
    "remount=debug,remount_cli=debug,remount_graph=debug,remount_routes=debug,tower_http=debug";
const QUIET_FILTER: &str = "remount=error,remount_cli=error,remount_graph=error";
const DEFAULT_FILTER: &str = "remount=info,remount_cli=info,remount_graph=info,remount_routes=info";

/// Initialize the tracing subscriber.
///
/// The filter is chosen in this order:
/// 1. `--verbose`: debug for remount crates and request traces
/// 2. `--quiet`: errors only
/// 3. `RUST_LOG`
/// 4. info for remount crates
///
/// Call once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Initialize logger with a custom environment filter.
///
/// ```rust,no_run
/// use remount_cli::logger::init_logger_with_filter;
/// use tracing_subscriber::EnvFilter;
///
/// init_logger_with_filter(EnvFilter::new("remount_cli=trace,hyper=off"), false);
/// ```
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    // try_init: a second call (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_wins_over_quiet() {
        let filter = filter_for(true, true).to_string();
        assert!(filter.contains("remount_cli=debug"));
    }

    #[test]
    fn test_quiet_filter() {
        let filter = filter_for(false, true).to_string();
        assert!(filter.contains("remount_cli=error"));
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logger(false, true, true);
        init_logger(false, true, true);
    }
}

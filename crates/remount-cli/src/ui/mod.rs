//! Terminal output for the dev loop.
//!
//! [`routes`] renders the console protocol (mount banners, route listings,
//! reload lines) on stdout. [`messages`] prints status lines on stderr.
//!
//! # Examples
//!
//! ```no_run
//! use remount_cli::ui;
//!
//! ui::init_colors(false);
//! ui::warning("cannot watch /srv/shared, it does not exist");
//! ```

mod messages;
pub mod routes;

pub use messages::{error, warning};
pub use routes::{print_failure, print_listing, print_reload, print_watching};

/// Check if color output should be enabled.
///
/// Respects NO_COLOR and FORCE_COLOR, then falls back to terminal detection
/// on stdout, where the route listing goes.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }

    console::Term::stdout().features().colors_supported()
}

/// Initialize color support.
///
/// `--no-color` and a negative [`should_use_color`] turn styling off for
/// every line printed through this module.
pub fn init_colors(no_color: bool) {
    if no_color || !should_use_color() {
        owo_colors::set_override(false);
    }
}

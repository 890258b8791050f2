//! Status lines on stderr; the console protocol in [`super::routes`] owns stdout.

use owo_colors::{OwoColorize, Stream::Stderr};

/// Print a warning the user should act on, such as a directory that
/// cannot be watched.
pub fn warning(message: &str) {
    eprintln!(
        "{} {}",
        "⚠".if_supports_color(Stderr, |t| t.yellow()),
        message.if_supports_color(Stderr, |t| t.yellow())
    );
}

/// Print an error to stderr.
///
/// Multi-line messages keep their line breaks, indented under the marker.
pub fn error(message: &str) {
    eprintln!(
        "{} {}",
        "✗".if_supports_color(Stderr, |t| t.red()),
        indent(message).if_supports_color(Stderr, |t| t.red())
    );
}

fn indent(message: &str) -> String {
    message.replace('\n', "\n  ")
}

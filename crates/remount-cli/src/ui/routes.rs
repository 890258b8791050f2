//! Console protocol: mount banners, route listings and reload lines.
//!
//! ```text
//! > Mounted on http://localhost:5000 with CORS support
//! * GET  http://localhost:5000/users
//! * POST http://localhost:5000/users
//! + 14:02:11 reload due to /srv/mocks/routes.toml
//! + GET  http://localhost:5000/users/:id
//! * GET  http://localhost:5000/users
//! - POST http://localhost:5000/users
//! ```
//!
//! The `line` functions build plain text and are what the tests check; the
//! `print` functions add color and write to stdout.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, TimeZone};
use owo_colors::{OwoColorize, Stream::Stdout};
use remount_routes::{Listing, RouteSnapshot};

/// Marker in front of a listed route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Present and unchanged, or part of a full listing
    Current,
    Added,
    Removed,
}

impl Marker {
    pub fn symbol(self) -> char {
        match self {
            Marker::Current => '*',
            Marker::Added => '+',
            Marker::Removed => '-',
        }
    }
}

/// One route line of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingLine {
    pub marker: Marker,
    /// `METHOD` padded to four columns, then the full URL
    pub route: String,
}

impl fmt::Display for ListingLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.marker.symbol(), self.route)
    }
}

/// Banner printed before a full listing.
pub fn mounted_line(base_url: &str, cors: bool) -> String {
    if cors {
        format!("> Mounted on {base_url} with CORS support")
    } else {
        format!("> Mounted on {base_url}")
    }
}

/// Route lines for a freshly mounted snapshot.
///
/// A full listing marks every route `*`. A delta lists the current routes
/// (added ones `+`) followed by removed ones `-`, and is empty when nothing
/// changed.
pub fn listing_lines(snapshot: &RouteSnapshot, listing: &Listing, base_url: &str) -> Vec<ListingLine> {
    match listing {
        Listing::Full => snapshot
            .iter()
            .map(|entry| ListingLine {
                marker: Marker::Current,
                route: entry.to_string(),
            })
            .collect(),
        Listing::Delta(delta) if delta.is_empty() => Vec::new(),
        Listing::Delta(delta) => {
            let current = snapshot.iter().map(|entry| ListingLine {
                marker: if delta.is_added(&entry.key()) {
                    Marker::Added
                } else {
                    Marker::Current
                },
                route: entry.to_string(),
            });
            let removed = delta.removed.iter().map(|key| ListingLine {
                marker: Marker::Removed,
                route: route_for_key(key, base_url),
            });
            current.chain(removed).collect()
        }
    }
}

/// Render a `METHOD PATH` key the way [`RouteEntry`](remount_routes::RouteEntry)
/// displays itself.
fn route_for_key(key: &str, base_url: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    match key.split_once(' ') {
        Some((method, path)) => format!("{method:<4} {base_url}{path}"),
        None => key.to_string(),
    }
}

pub fn failure_line(target: &Path) -> String {
    format!("> Failed to mount \"{}\", waiting for change", target.display())
}

pub fn reload_line<Tz>(at: &DateTime<Tz>, path: &Path) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    format!("+ {} reload due to {}", at.format("%H:%M:%S"), path.display())
}

pub fn watching_line(dir: &Path) -> String {
    format!("+ watching {}/*", dir.display())
}

/// Print a mount result: banner and full listing, or the non-empty delta.
pub fn print_listing(snapshot: &RouteSnapshot, listing: &Listing, base_url: &str, cors: bool) {
    if matches!(listing, Listing::Full) {
        println!(
            "\n{}",
            mounted_line(base_url, cors).if_supports_color(Stdout, |t| t.cyan())
        );
    }

    for line in listing_lines(snapshot, listing, base_url) {
        let marker = line.marker.symbol();
        let marker = match line.marker {
            Marker::Added => marker.if_supports_color(Stdout, |t| t.green()).to_string(),
            Marker::Removed => marker.if_supports_color(Stdout, |t| t.red()).to_string(),
            Marker::Current => marker.if_supports_color(Stdout, |t| t.dimmed()).to_string(),
        };
        println!("{} {}", marker, line.route);
    }
}

/// Print the mount failure banner and the error below it.
pub fn print_failure(target: &Path, error: &dyn std::error::Error) {
    println!(
        "{}",
        failure_line(target).if_supports_color(Stdout, |t| t.yellow())
    );
    super::error(&error.to_string());
}

pub fn print_reload(path: &Path) {
    let line = reload_line(&chrono::Local::now(), path);
    println!("{}", line.if_supports_color(Stdout, |t| t.dimmed()));
}

pub fn print_watching(dir: &Path) {
    let line = watching_line(dir);
    println!("{}", line.if_supports_color(Stdout, |t| t.dimmed()));
}

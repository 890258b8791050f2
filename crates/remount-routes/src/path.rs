//! Path canonicalization and matching.
//!
//! Mount prefixes may be written as plain paths (`/api`, `api/`) or in the
//! anchored pattern form routers generate for prefix matching
//! (`^\/api\/?(?=\/|$)`, optionally as a `/.../i` literal).
//! [`canonicalize_prefix`] maps all of them to the same literal fragment:
//!
//! 1. a `/^.../flags` literal loses its delimiters and flags,
//! 2. a leading `^` and a trailing `$` are dropped,
//! 3. the `(?=\/|$)` boundary lookahead is dropped,
//! 4. optional trailing slash groups (`\/?`, `/?`) are dropped,
//! 5. `\/` becomes `/`,
//! 6. empty segments are removed; the result is `/seg/seg` or `""` for root.
//!
//! Route paths are matched segment-wise and case-insensitively. A trailing
//! slash is not significant. `:name` matches one segment, `:name?` matches
//! zero or one, and `*` matches the rest of the path.

const LOOKAHEADS: [&str; 2] = ["(?=\\/|$)", "(?=/|$)"];
const OPTIONAL_SLASHES: [&str; 2] = ["\\/?", "/?"];

/// Normalize a mount prefix pattern into a literal path fragment.
pub fn canonicalize_prefix(pattern: &str) -> String {
    let mut s = pattern.trim();

    if s.starts_with("/^")
        && let Some(end) = s.rfind('/')
        && end > 0
        && s[end + 1..].chars().all(|c| c.is_ascii_alphabetic())
    {
        s = &s[1..end];
    }

    s = s.strip_prefix('^').unwrap_or(s);

    let mut owned = s.to_string();
    for lookahead in LOOKAHEADS {
        owned = owned.replace(lookahead, "");
    }

    loop {
        let before = owned.len();
        if owned.ends_with('$') && !owned.ends_with("\\$") {
            owned.pop();
        }
        for optional in OPTIONAL_SLASHES {
            if let Some(stripped) = owned.strip_suffix(optional) {
                owned = stripped.to_string();
            }
        }
        if owned.len() == before {
            break;
        }
    }

    let unescaped = owned.replace("\\/", "/");
    normalize_segments(&unescaped)
}

/// Join a canonical prefix and a route path.
///
/// `join_paths("/api", "/users") == "/api/users"`, and the root route of a
/// mounted router shows as the prefix itself.
pub fn join_paths(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    match (prefix.is_empty(), path.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{path}"),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}/{path}"),
    }
}

/// Match a request path against a route path pattern.
pub fn match_route(pattern: &str, path: &str) -> bool {
    if pattern == "*" {
        return true;
    }

    let mut request = segments(path);

    for declared in segments(pattern) {
        if declared == "*" {
            return true;
        }

        if let Some(param) = declared.strip_prefix(':') {
            if param.ends_with('?') {
                request.next();
                continue;
            }
            if request.next().is_none() {
                return false;
            }
            continue;
        }

        match request.next() {
            Some(actual) if actual.eq_ignore_ascii_case(declared) => {}
            _ => return false,
        }
    }

    request.next().is_none()
}

/// Strip a canonical mount prefix from a request path.
///
/// Returns the remainder (always starting with `/`) when `path` is inside the
/// prefix on a segment boundary.
pub fn strip_mount<'a>(prefix: &str, path: &'a str) -> Option<&'a str> {
    if prefix.is_empty() {
        return Some(path);
    }

    let head = path.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }

    let rest = &path[prefix.len()..];
    if rest.is_empty() {
        Some("/")
    } else if rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn normalize_segments(path: &str) -> String {
    let joined: Vec<&str> = segments(path).collect();
    if joined.is_empty() {
        String::new()
    } else {
        format!("/{}", joined.join("/"))
    }
}

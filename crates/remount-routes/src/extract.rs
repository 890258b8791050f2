//! Route table extraction.

use std::fmt;

use crate::method::Method;
use crate::path::join_paths;
use crate::tree::{Layer, RoutingTree};

/// One exposed `METHOD PATH` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteEntry {
    pub method: Method,
    pub path: String,
    pub full_url: String,
}

impl RouteEntry {
    /// Identity used when comparing snapshots, e.g. `GET /users/:id`.
    pub fn key(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

impl fmt::Display for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<4} {}", self.method, self.full_url)
    }
}

/// Ordered route table of one generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteSnapshot {
    entries: Vec<RouteEntry>,
}

impl RouteSnapshot {
    pub fn new(entries: Vec<RouteEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RouteEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.entries.iter().map(RouteEntry::key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|entry| entry.key() == key)
    }
}

impl<'a> IntoIterator for &'a RouteSnapshot {
    type Item = &'a RouteEntry;
    type IntoIter = std::slice::Iter<'a, RouteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Flatten a routing tree into its route table.
///
/// Each route node yields one entry per declared method and path alias.
/// Mounted routers are walked in place with their prefix prepended, and
/// middleware layers are skipped. The result follows registration order,
/// which is dispatch precedence.
pub fn extract_routes(tree: &RoutingTree, base_url: &str) -> RouteSnapshot {
    let base_url = base_url.trim_end_matches('/');
    let mut entries = Vec::new();
    collect(tree, "", base_url, &mut entries);
    RouteSnapshot::new(entries)
}

fn collect(tree: &RoutingTree, prefix: &str, base_url: &str, out: &mut Vec<RouteEntry>) {
    for layer in tree.layers() {
        match layer {
            Layer::Route(route) => {
                for method in &route.methods {
                    for path in &route.paths {
                        let path = join_paths(prefix, path);
                        out.push(RouteEntry {
                            method: *method,
                            full_url: format!("{base_url}{path}"),
                            path,
                        });
                    }
                }
            }
            Layer::Mount(mount) => {
                let nested = join_paths(prefix, &mount.prefix());
                // join_paths renders the root as "/", prefixes carry no trailing slash
                let nested = if nested == "/" { "" } else { nested.as_str() };
                collect(&mount.router, nested, base_url, out);
            }
            Layer::Middleware(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Middleware, ResponseSpec};
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    const BASE: &str = "http://localhost:5000";

    fn ok() -> ResponseSpec {
        ResponseSpec::text("ok")
    }

    #[test]
    fn test_extract_registration_order() {
        let tree = RoutingTree::new()
            .route([Method::Get], ["/users"], ok())
            .route([Method::Post], ["/users"], ok())
            .route([Method::Get], ["/users/:id"], ok());

        let snapshot = extract_routes(&tree, BASE);
        let keys: Vec<String> = snapshot.keys().collect();
        assert_eq!(keys, ["GET /users", "POST /users", "GET /users/:id"]);
        assert_eq!(snapshot.entries()[2].full_url, "http://localhost:5000/users/:id");
    }

    #[test]
    fn test_extract_expands_methods_and_aliases() {
        let tree = RoutingTree::new().route(
            [Method::Get, Method::Put],
            ["/a", "/b"],
            ok(),
        );

        let keys: Vec<String> = extract_routes(&tree, BASE).keys().collect();
        assert_eq!(keys, ["GET /a", "GET /b", "PUT /a", "PUT /b"]);
    }

    #[test]
    fn test_extract_nested_mounts_with_patterns() {
        let v1 = RoutingTree::new().route([Method::Get], ["/items"], ok());
        let api = RoutingTree::new()
            .route([Method::Get], ["/"], ok())
            .mount("^\\/v1\\/?(?=\\/|$)", v1);
        let tree = RoutingTree::new()
            .route([Method::Get], ["/health"], ok())
            .mount("/^\\/api\\/?(?=\\/|$)/i", api)
            .route([Method::Delete], ["/last"], ok());

        let keys: Vec<String> = extract_routes(&tree, BASE).keys().collect();
        assert_eq!(
            keys,
            ["GET /health", "GET /api", "GET /api/v1/items", "DELETE /last"]
        );
    }

    #[test]
    fn test_extract_root_mount_and_middleware() {
        let mut headers = IndexMap::new();
        headers.insert("x-test".to_string(), "1".to_string());

        let inner = RoutingTree::new().route([Method::Get], ["/inner"], ok());
        let tree = RoutingTree::new()
            .middleware(Middleware::Headers(headers))
            .mount("/", inner)
            .route([Method::Get], ["/outer"], ok());

        let keys: Vec<String> = extract_routes(&tree, BASE).keys().collect();
        assert_eq!(keys, ["GET /inner", "GET /outer"]);
    }

    #[test]
    fn test_display_pads_method() {
        let tree = RoutingTree::new().route([Method::Get], ["/x"], ok());
        let snapshot = extract_routes(&tree, "http://localhost:5000/");
        assert_eq!(
            snapshot.entries()[0].to_string(),
            "GET  http://localhost:5000/x"
        );
    }

    #[test]
    fn test_empty_tree() {
        assert!(extract_routes(&RoutingTree::new(), BASE).is_empty());
    }
}

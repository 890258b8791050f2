//! Multi-generation scenarios across extraction, diffing and resolution.

use crate::{
    compare, extract_routes, resolve, Delta, Listing, Method, ResponseSpec, RouteSnapshot,
    RoutingTree,
};
use pretty_assertions::assert_eq;

const BASE: &str = "http://localhost:5000";

fn users(extra: Option<&str>) -> RoutingTree {
    let tree = RoutingTree::new()
        .route([Method::Get], ["/users"], ResponseSpec::text("list"))
        .route([Method::Post], ["/users"], ResponseSpec::text("create"));
    match extra {
        Some(path) => tree.route([Method::Get], [path], ResponseSpec::text("extra")),
        None => tree,
    }
}

#[test]
fn test_three_generations() {
    let first = extract_routes(&users(None), BASE);
    assert_eq!(compare(None, &first), Listing::Full);

    let second = extract_routes(&users(Some("/users/:id")), BASE);
    let Listing::Delta(delta) = compare(Some(&first), &second) else {
        panic!("expected a delta listing");
    };
    assert!(delta.is_added("GET /users/:id"));
    assert!(delta.removed.is_empty());

    // Saving without changes reports an empty delta, not a full listing
    let third = extract_routes(&users(Some("/users/:id")), BASE);
    assert_eq!(compare(Some(&second), &third), Listing::Delta(Delta::default()));
}

#[test]
fn test_failed_generation_keeps_previous_snapshot() {
    let mut last: Option<RouteSnapshot> = None;

    let first = extract_routes(&users(None), BASE);
    assert_eq!(compare(last.as_ref(), &first), Listing::Full);
    last = Some(first);

    // A generation that fails to mount never produces a snapshot, so the
    // next success is compared against the last good one.
    let recovered = extract_routes(&users(Some("/health")), BASE);
    let Listing::Delta(delta) = compare(last.as_ref(), &recovered) else {
        panic!("expected a delta listing");
    };
    assert_eq!(delta.added.len(), 1);
    assert!(delta.is_added("GET /health"));
}

#[test]
fn test_resolution_agrees_with_listing() {
    let api = RoutingTree::new()
        .route([Method::Get], ["/", "/index"], ResponseSpec::text("api root"))
        .route([Method::Delete], ["/items/:id"], ResponseSpec::text("deleted"));
    let tree = RoutingTree::new().mount("^\\/api\\/?(?=\\/|$)", api);

    let snapshot = extract_routes(&tree, BASE);
    for entry in &snapshot {
        let resolution = resolve(&tree, entry.method, &entry.path.replace(":id", "7"));
        assert!(
            resolution.response.is_some(),
            "{} should resolve",
            entry.key()
        );
    }
    assert_eq!(snapshot.len(), 3);
}

//! Property-based tests for remount-routes using proptest.
//!
//! Run with: cargo test --features proptest --package remount-routes property_tests

#![cfg(feature = "proptest")]

use crate::{
    canonicalize_prefix, diff, extract_routes, join_paths, Method, ResponseSpec, RoutingTree,
};
use proptest::prelude::*;

fn segment_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,7}"
}

fn path_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(segment_strategy(), 0..=4).prop_map(|parts| format!("/{}", parts.join("/")))
}

fn method_strategy() -> impl Strategy<Value = Method> {
    prop::sample::select(Method::ALL.to_vec())
}

fn tree_strategy() -> impl Strategy<Value = RoutingTree> {
    prop::collection::vec((method_strategy(), path_strategy()), 0..=12).prop_map(|routes| {
        routes
            .into_iter()
            .fold(RoutingTree::new(), |tree, (method, path)| {
                tree.route([method], [path], ResponseSpec::text("ok"))
            })
    })
}

/// Render a literal prefix in the anchored form routers generate.
fn anchored(prefix: &str) -> String {
    format!("^{}\\/?(?=\\/|$)", prefix.replace('/', "\\/"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: canonicalization is idempotent
    #[test]
    fn prop_canonicalize_idempotent(path in path_strategy()) {
        let once = canonicalize_prefix(&path);
        prop_assert_eq!(canonicalize_prefix(&once), once);
    }

    /// Property: plain and anchored spellings canonicalize to the same prefix
    #[test]
    fn prop_anchored_matches_plain(path in path_strategy()) {
        let plain = canonicalize_prefix(&path);
        prop_assert_eq!(canonicalize_prefix(&anchored(&plain)), plain.clone());
        prop_assert_eq!(canonicalize_prefix(&format!("/{}/i", anchored(&plain))), plain);
    }

    /// Property: joined paths are absolute and have no empty segments
    #[test]
    fn prop_join_paths_well_formed(prefix in path_strategy(), path in path_strategy()) {
        let joined = join_paths(&canonicalize_prefix(&prefix), &path);
        prop_assert!(joined.starts_with('/'));
        prop_assert!(!joined.contains("//"));
    }

    /// Property: a snapshot never differs from itself
    #[test]
    fn prop_diff_reflexive(tree in tree_strategy()) {
        let snapshot = extract_routes(&tree, "http://localhost:5000");
        prop_assert!(diff(&snapshot, &snapshot).is_empty());
    }

    /// Property: swapping arguments swaps added and removed
    #[test]
    fn prop_diff_antisymmetric(a in tree_strategy(), b in tree_strategy()) {
        let a = extract_routes(&a, "http://localhost:5000");
        let b = extract_routes(&b, "http://localhost:5000");
        let forward = diff(&a, &b);
        let backward = diff(&b, &a);
        prop_assert_eq!(forward.added, backward.removed);
        prop_assert_eq!(forward.removed, backward.added);
    }

    /// Property: every added key is in the new snapshot and absent from the old
    #[test]
    fn prop_diff_added_sound(a in tree_strategy(), b in tree_strategy()) {
        let a = extract_routes(&a, "http://localhost:5000");
        let b = extract_routes(&b, "http://localhost:5000");
        for key in diff(&a, &b).added {
            prop_assert!(b.contains_key(&key));
            prop_assert!(!a.contains_key(&key));
        }
    }
}

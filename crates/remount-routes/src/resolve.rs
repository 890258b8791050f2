//! Request resolution against a routing tree.

use std::time::Duration;

use crate::method::Method;
use crate::path::{match_route, strip_mount};
use crate::tree::{Layer, Middleware, ResponseSpec, RoutingTree};

/// Outcome of walking a tree for one request.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Resolution<'a> {
    /// First matching route response, if any.
    pub response: Option<&'a ResponseSpec>,
    /// Headers added by middleware passed on the way.
    pub headers: Vec<(&'a str, &'a str)>,
    /// Total middleware delay passed on the way.
    pub delay: Duration,
}

/// Walk `tree` the way the router dispatches `method path`.
///
/// Middleware applies to everything after it in the same stack, including
/// mounted routers whose prefix matched. A non-matching mount is skipped.
pub fn resolve<'a>(tree: &'a RoutingTree, method: Method, path: &str) -> Resolution<'a> {
    let mut resolution = Resolution::default();
    walk(tree, method, path, &mut resolution);
    resolution
}

fn walk<'a>(tree: &'a RoutingTree, method: Method, path: &str, out: &mut Resolution<'a>) -> bool {
    for layer in tree.layers() {
        match layer {
            Layer::Middleware(node) => match &node.middleware {
                Middleware::Headers(headers) => out
                    .headers
                    .extend(headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))),
                Middleware::Delay(delay) => out.delay += *delay,
            },
            Layer::Route(route) => {
                let method_ok = route.methods.iter().any(|m| m.accepts(method));
                if method_ok && route.paths.iter().any(|p| match_route(p, path)) {
                    out.response = Some(&route.response);
                    return true;
                }
            }
            Layer::Mount(mount) => {
                if let Some(rest) = strip_mount(&mount.prefix(), path)
                    && walk(&mount.router, method, rest, out)
                {
                    return true;
                }
            }
        }
    }
    false
}

//! # remount-routes
//!
//! Routing tree primitives for the remount dev supervisor.
//!
//! A mounted router is represented as a [`RoutingTree`]: an ordered stack of
//! [`Layer`]s, each one a route, a mounted sub-router, or a middleware. The
//! tree is framework-agnostic; the CLI crate adapts it to the HTTP server and
//! the graph crate builds it from module files.
//!
//! ## Overview
//!
//! - [`extract_routes`] flattens a tree into a [`RouteSnapshot`] of
//!   `METHOD PATH` entries, in registration order.
//! - [`diff`] and [`compare`] compute what changed between two snapshots.
//! - [`canonicalize_prefix`] turns mount prefix patterns back into literal
//!   path fragments.
//! - [`resolve`] finds the response a request would get from a tree.
//!
//! ## Quick Start
//!
//! ```rust
//! use remount_routes::{extract_routes, Method, ResponseSpec, RoutingTree};
//!
//! let tree = RoutingTree::new()
//!     .route([Method::Get], ["/users"], ResponseSpec::text("all users"))
//!     .route([Method::Post], ["/users"], ResponseSpec::text("created"))
//!     .route([Method::Get], ["/users/:id"], ResponseSpec::text("one user"));
//!
//! let snapshot = extract_routes(&tree, "http://localhost:5000");
//! let keys: Vec<String> = snapshot.keys().collect();
//! assert_eq!(keys, ["GET /users", "POST /users", "GET /users/:id"]);
//! ```

mod diff;
mod error;
mod extract;
mod method;
mod path;
mod resolve;
mod tree;

#[cfg(test)]
mod tests;

pub use diff::{compare, diff, Delta, Listing};
pub use error::{Result, RouteError};
pub use extract::{extract_routes, RouteEntry, RouteSnapshot};
pub use method::Method;
pub use path::{canonicalize_prefix, join_paths, match_route, strip_mount};
pub use resolve::{resolve, Resolution};
pub use tree::{Body, Layer, Middleware, MiddlewareNode, MountNode, ResponseSpec, RouteNode, RoutingTree};

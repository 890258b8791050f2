//! The routing tree a mounted module exposes.
//!
//! A tree is an ordered stack of layers. Order is dispatch precedence: the
//! first matching route wins, and middleware only affects requests that reach
//! it while walking the stack.

use std::path::PathBuf;
use std::time::Duration;

use indexmap::IndexMap;

use crate::error::{Result, RouteError};
use crate::method::Method;
use crate::path::canonicalize_prefix;

/// An ordered stack of routing layers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingTree {
    stack: Vec<Layer>,
}

/// One entry of a [`RoutingTree`] stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layer {
    Route(RouteNode),
    Mount(MountNode),
    Middleware(MiddlewareNode),
}

/// A terminal handler declared for one or more methods and path aliases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteNode {
    pub methods: Vec<Method>,
    pub paths: Vec<String>,
    pub response: ResponseSpec,
}

/// A sub-router mounted under a prefix pattern.
///
/// `pattern` is kept as declared; [`MountNode::prefix`] gives the literal
/// path fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountNode {
    pub pattern: String,
    pub router: RoutingTree,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiddlewareNode {
    pub middleware: Middleware,
}

/// Middleware behaviours a module can stack in front of its routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Middleware {
    /// Adds headers to every response that passes through.
    Headers(IndexMap<String, String>),
    /// Pauses before the response is produced.
    Delay(Duration),
}

/// What a route answers with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSpec {
    pub status: u16,
    pub headers: IndexMap<String, String>,
    /// Explicit content type; inferred from the body source when `None`.
    pub content_type: Option<String>,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Empty,
    /// Contents captured when the module was loaded.
    Bytes(Vec<u8>),
    /// File read on every request.
    File(PathBuf),
}

impl RoutingTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, layer: Layer) {
        self.stack.push(layer);
    }

    pub fn layers(&self) -> &[Layer] {
        &self.stack
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Append a route layer without validation.
    pub fn route<M, P, S>(mut self, methods: M, paths: P, response: ResponseSpec) -> Self
    where
        M: IntoIterator<Item = Method>,
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stack.push(Layer::Route(RouteNode {
            methods: methods.into_iter().collect(),
            paths: paths.into_iter().map(Into::into).collect(),
            response,
        }));
        self
    }

    /// Append a sub-router under `pattern`.
    pub fn mount(mut self, pattern: impl Into<String>, router: RoutingTree) -> Self {
        self.stack.push(Layer::Mount(MountNode {
            pattern: pattern.into(),
            router,
        }));
        self
    }

    pub fn middleware(mut self, middleware: Middleware) -> Self {
        self.stack.push(Layer::Middleware(MiddlewareNode { middleware }));
        self
    }

    /// Number of route layers, counting nested routers.
    pub fn route_count(&self) -> usize {
        self.stack
            .iter()
            .map(|layer| match layer {
                Layer::Route(_) => 1,
                Layer::Mount(mount) => mount.router.route_count(),
                Layer::Middleware(_) => 0,
            })
            .sum()
    }
}

impl RouteNode {
    /// Build a validated route node.
    ///
    /// # Errors
    ///
    /// Returns an error when no method or path is declared, or when a path
    /// is not absolute.
    pub fn new(methods: Vec<Method>, paths: Vec<String>, response: ResponseSpec) -> Result<Self> {
        if methods.is_empty() {
            return Err(RouteError::NoMethods);
        }
        if paths.is_empty() {
            return Err(RouteError::NoPaths);
        }
        if let Some(bad) = paths.iter().find(|p| !p.starts_with('/') && p.as_str() != "*") {
            return Err(RouteError::InvalidPath(bad.clone()));
        }

        Ok(Self {
            methods,
            paths,
            response,
        })
    }
}

impl MountNode {
    /// Literal path fragment this node is mounted under ("" for root).
    pub fn prefix(&self) -> String {
        canonicalize_prefix(&self.pattern)
    }
}

impl ResponseSpec {
    pub fn new(body: Body) -> Self {
        Self {
            status: 200,
            headers: IndexMap::new(),
            content_type: None,
            body,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(Body::Bytes(text.into().into_bytes()))
            .with_content_type("text/plain; charset=utf-8")
    }

    pub fn json(json: impl Into<String>) -> Self {
        Self::new(Body::Bytes(json.into().into_bytes())).with_content_type("application/json")
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(Body::File(path.into()))
    }

    /// # Errors
    ///
    /// Returns an error for codes outside `100..=999`.
    pub fn with_status(mut self, status: u16) -> Result<Self> {
        if !(100..=999).contains(&status) {
            return Err(RouteError::InvalidStatus(status));
        }
        self.status = status;
        Ok(self)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_node_requires_methods_and_paths() {
        let response = ResponseSpec::text("ok");
        assert_eq!(
            RouteNode::new(vec![], vec!["/".into()], response.clone()),
            Err(RouteError::NoMethods)
        );
        assert_eq!(
            RouteNode::new(vec![Method::Get], vec![], response.clone()),
            Err(RouteError::NoPaths)
        );
        assert_eq!(
            RouteNode::new(vec![Method::Get], vec!["users".into()], response.clone()),
            Err(RouteError::InvalidPath("users".into()))
        );
        assert!(RouteNode::new(vec![Method::Get], vec!["*".into()], response).is_ok());
    }

    #[test]
    fn test_with_status_bounds() {
        assert!(ResponseSpec::text("x").with_status(204).is_ok());
        assert_eq!(
            ResponseSpec::text("x").with_status(42),
            Err(RouteError::InvalidStatus(42))
        );
    }

    #[test]
    fn test_route_count_includes_nested() {
        let api = RoutingTree::new()
            .route([Method::Get], ["/a"], ResponseSpec::text("a"))
            .route([Method::Get], ["/b"], ResponseSpec::text("b"));
        let tree = RoutingTree::new()
            .middleware(Middleware::Delay(Duration::from_millis(1)))
            .route([Method::Get], ["/"], ResponseSpec::text("root"))
            .mount("/api", api);

        assert_eq!(tree.route_count(), 3);
        assert_eq!(tree.layers().len(), 3);
    }

    #[test]
    fn test_mount_prefix_is_canonical() {
        let node = MountNode {
            pattern: "^\\/api\\/?(?=\\/|$)".to_string(),
            router: RoutingTree::new(),
        };
        assert_eq!(node.prefix(), "/api");
    }
}

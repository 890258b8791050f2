//! Turning module files into routing trees.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use remount_routes::{
    Body, Layer, MiddlewareNode, MountNode, ResponseSpec, RouteNode, RoutingTree,
};

use crate::content_type_for;
use crate::error::{LoadError, Result};
use crate::module::{BodySource, EntryKind, ModuleFile, StackEntry};
use crate::runtime::Runtime;

/// Loads an entry module and everything it mounts.
#[async_trait]
pub trait ModuleLoader: Send + Sync + std::fmt::Debug {
    async fn load(&self, entry: &Path) -> Result<RoutingTree>;
}

type LoadFuture<'a> = Pin<Box<dyn Future<Output = Result<RoutingTree>> + Send + 'a>>;

/// [`ModuleLoader`] for TOML module files.
///
/// All file access goes through the injected runtime, including fixture
/// files embedded with `file = "..."`. Files referenced with `serve` are
/// only resolved here and read when a request arrives.
#[derive(Debug, Clone)]
pub struct TomlModuleLoader {
    runtime: Arc<dyn Runtime>,
}

impl TomlModuleLoader {
    pub fn new(runtime: Arc<dyn Runtime>) -> Self {
        Self { runtime }
    }

    fn load_tree<'a>(&'a self, path: PathBuf, mut chain: Vec<PathBuf>) -> LoadFuture<'a> {
        Box::pin(async move {
            if chain.contains(&path) {
                chain.push(path);
                return Err(LoadError::Cycle { chain });
            }

            let source = self.read_text(&path).await?;
            let module = ModuleFile::parse(&source).map_err(|e| LoadError::Syntax {
                path: path.clone(),
                message: e.to_string().trim_end().to_string(),
            })?;
            tracing::debug!(
                module = %path.display(),
                entries = module.stack.len(),
                "parsed module"
            );

            chain.push(path.clone());
            let mut tree = RoutingTree::new();

            for (index, entry) in module.stack.iter().enumerate() {
                let invalid = |reason: String| LoadError::InvalidEntry {
                    path: path.clone(),
                    entry: index + 1,
                    reason,
                };

                let layer = match entry.kind().map_err(invalid)? {
                    EntryKind::Route => Layer::Route(self.route(&path, entry, index + 1).await?),
                    EntryKind::Mount => {
                        let (pattern, module) = entry.mount_parts().map_err(invalid)?;
                        let module_path = self.resolve(module, &path)?;
                        let router = self.load_tree(module_path, chain.clone()).await?;
                        Layer::Mount(MountNode {
                            pattern: pattern.to_string(),
                            router,
                        })
                    }
                    EntryKind::Middleware => Layer::Middleware(MiddlewareNode {
                        middleware: entry.to_middleware().map_err(invalid)?,
                    }),
                };
                tree.push(layer);
            }

            Ok(tree)
        })
    }

    async fn route(&self, module: &Path, entry: &StackEntry, number: usize) -> Result<RouteNode> {
        let invalid = |reason: String| LoadError::InvalidEntry {
            path: module.to_path_buf(),
            entry: number,
            reason,
        };

        let methods = entry.methods().map_err(invalid)?;
        let mut response = match entry.body_source().map_err(invalid)? {
            BodySource::Empty => ResponseSpec::new(Body::Empty),
            BodySource::Text(text) => ResponseSpec::text(text),
            BodySource::Json(value) => {
                let json = serde_json::to_string(value).map_err(|e| invalid(e.to_string()))?;
                ResponseSpec::json(json)
            }
            BodySource::File(file) => {
                let file = self.resolve(file, module)?;
                let bytes = self.read(&file).await?;
                ResponseSpec::new(Body::Bytes(bytes)).with_content_type(content_type_for(&file))
            }
            BodySource::Serve(file) => ResponseSpec::file(self.resolve(file, module)?),
        };

        if let Some(status) = entry.status {
            response = response
                .with_status(status)
                .map_err(|e| invalid(e.to_string()))?;
        }
        if let Some(content_type) = &entry.content_type {
            response = response.with_content_type(content_type.as_str());
        }
        for (name, value) in &entry.headers {
            response = response.with_header(name.as_str(), value.as_str());
        }

        RouteNode::new(methods, entry.paths(), response).map_err(|e| invalid(e.to_string()))
    }

    fn resolve(&self, specifier: &str, from: &Path) -> Result<PathBuf> {
        self.runtime
            .resolve(specifier, from)
            .map_err(|source| LoadError::Read {
                path: PathBuf::from(specifier),
                source,
            })
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.runtime
            .read_file(path)
            .await
            .map_err(|source| LoadError::Read {
                path: path.to_path_buf(),
                source,
            })
    }

    async fn read_text(&self, path: &Path) -> Result<String> {
        let bytes = self.read(path).await?;
        String::from_utf8(bytes).map_err(|_| LoadError::Syntax {
            path: path.to_path_buf(),
            message: "module is not valid UTF-8".to_string(),
        })
    }
}

#[async_trait]
impl ModuleLoader for TomlModuleLoader {
    async fn load(&self, entry: &Path) -> Result<RoutingTree> {
        self.load_tree(entry.to_path_buf(), Vec::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::test_utils::MemoryRuntime;
    use crate::RuntimeError;
    use pretty_assertions::assert_eq;
    use remount_routes::{extract_routes, Middleware};
    use std::time::Duration;

    fn loader(memory: MemoryRuntime) -> TomlModuleLoader {
        TomlModuleLoader::new(Arc::new(memory))
    }

    fn keys(tree: &RoutingTree) -> Vec<String> {
        extract_routes(tree, "http://localhost:5000").keys().collect()
    }

    #[tokio::test]
    async fn test_load_routes_in_order() {
        let memory = MemoryRuntime::new().with_file(
            "/srv/routes.toml",
            r#"
[[stack]]
method = "get"
path = "/users"
json = [{ id = 1 }]

[[stack]]
method = "post"
path = "/users"
status = 201
text = "created"

[[stack]]
method = "get"
path = "/users/:id"
text = "one"
"#,
        );

        let tree = loader(memory).load(Path::new("/srv/routes.toml")).await.unwrap();
        assert_eq!(keys(&tree), ["GET /users", "POST /users", "GET /users/:id"]);

        let Layer::Route(list) = &tree.layers()[0] else {
            panic!("expected a route");
        };
        assert_eq!(list.response.body, Body::Bytes(br#"[{"id":1}]"#.to_vec()));
        assert_eq!(list.response.content_type.as_deref(), Some("application/json"));

        let Layer::Route(create) = &tree.layers()[1] else {
            panic!("expected a route");
        };
        assert_eq!(create.response.status, 201);
    }

    #[tokio::test]
    async fn test_load_nested_mounts_and_fixtures() {
        let memory = MemoryRuntime::new()
            .with_file(
                "/srv/routes.toml",
                "[[stack]]\nuse = \"delay\"\nms = 10\n\n[[stack]]\nmount = \"/api\"\nmodule = \"api/routes.toml\"\n",
            )
            .with_file(
                "/srv/api/routes.toml",
                "[[stack]]\nmethod = \"get\"\npath = \"/me\"\nfile = \"../fixtures/me.json\"\n\n[[stack]]\nmethod = \"get\"\npath = \"/logo\"\nserve = \"logo.png\"\n",
            )
            .with_file("/srv/fixtures/me.json", "{\"id\":1}");

        let tree = loader(memory).load(Path::new("/srv/routes.toml")).await.unwrap();
        assert_eq!(keys(&tree), ["GET /api/me", "GET /api/logo"]);

        assert_eq!(
            tree.layers()[0],
            Layer::Middleware(MiddlewareNode {
                middleware: Middleware::Delay(Duration::from_millis(10)),
            })
        );

        let Layer::Mount(api) = &tree.layers()[1] else {
            panic!("expected a mount");
        };
        let Layer::Route(me) = &api.router.layers()[0] else {
            panic!("expected a route");
        };
        assert_eq!(me.response.body, Body::Bytes(b"{\"id\":1}".to_vec()));
        assert_eq!(me.response.content_type.as_deref(), Some("application/json"));

        let Layer::Route(logo) = &api.router.layers()[1] else {
            panic!("expected a route");
        };
        assert_eq!(logo.response.body, Body::File(PathBuf::from("/srv/api/logo.png")));
    }

    #[tokio::test]
    async fn test_missing_mounted_module() {
        let memory = MemoryRuntime::new().with_file(
            "/srv/routes.toml",
            "[[stack]]\nmount = \"/api\"\nmodule = \"api.toml\"\n",
        );

        let err = loader(memory).load(Path::new("/srv/routes.toml")).await.unwrap_err();
        match err {
            LoadError::Read { path, source } => {
                assert_eq!(path, PathBuf::from("/srv/api.toml"));
                assert_eq!(source, RuntimeError::FileNotFound(PathBuf::from("/srv/api.toml")));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_syntax_error_names_the_file() {
        let memory = MemoryRuntime::new().with_file("/srv/routes.toml", "[[stack]\nmethod =");
        let err = loader(memory).load(Path::new("/srv/routes.toml")).await.unwrap_err();
        assert!(matches!(err, LoadError::Syntax { .. }));
        assert_eq!(err.path(), Some(Path::new("/srv/routes.toml")));
    }

    #[tokio::test]
    async fn test_invalid_entry_is_numbered() {
        let memory = MemoryRuntime::new().with_file(
            "/srv/routes.toml",
            "[[stack]]\nmethod = \"get\"\npath = \"/ok\"\n\n[[stack]]\nmethod = \"get\"\npath = \"relative\"\n",
        );
        let err = loader(memory).load(Path::new("/srv/routes.toml")).await.unwrap_err();
        match err {
            LoadError::InvalidEntry { entry, .. } => assert_eq!(entry, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_mount_cycle_is_detected() {
        let memory = MemoryRuntime::new()
            .with_file("/srv/a.toml", "[[stack]]\nmount = \"/b\"\nmodule = \"b.toml\"\n")
            .with_file("/srv/b.toml", "[[stack]]\nmount = \"/a\"\nmodule = \"a.toml\"\n");

        let err = loader(memory).load(Path::new("/srv/a.toml")).await.unwrap_err();
        match err {
            LoadError::Cycle { chain } => assert_eq!(
                chain,
                vec![
                    PathBuf::from("/srv/a.toml"),
                    PathBuf::from("/srv/b.toml"),
                    PathBuf::from("/srv/a.toml"),
                ]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_same_module_mounted_twice_is_not_a_cycle() {
        let memory = MemoryRuntime::new()
            .with_file(
                "/srv/routes.toml",
                "[[stack]]\nmount = \"/v1\"\nmodule = \"shared.toml\"\n\n[[stack]]\nmount = \"/v2\"\nmodule = \"shared.toml\"\n",
            )
            .with_file("/srv/shared.toml", "[[stack]]\nmethod = \"all\"\npath = \"/ping\"\n");

        let tree = loader(memory).load(Path::new("/srv/routes.toml")).await.unwrap();
        assert_eq!(keys(&tree), ["ALL /v1/ping", "ALL /v2/ping"]);
        assert_eq!(tree.route_count(), 2);
    }
}

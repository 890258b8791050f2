//! HTTP server for one generation.
//!
//! The server owns its accept loop so every connection can be registered
//! and force-closed on teardown. Requests are dispatched against whatever
//! routing tree the generation state holds at that moment.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method as HttpMethod, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use remount_routes::{resolve, Body as RouteBody, Method, ResponseSpec};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::Service;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::dev::registry::ConnectionRegistry;
use crate::dev::state::{SharedState, FALLBACK_TEXT};
use crate::error::{CliError, Result};

/// A listening server instance and its live connections.
#[derive(Debug)]
pub struct GenerationServer {
    addr: SocketAddr,
    state: SharedState,
    registry: ConnectionRegistry,
    accept: Option<JoinHandle<()>>,
}

impl GenerationServer {
    /// Bind `addr` and start accepting.
    ///
    /// Requests are answered from the moment this returns; until a router
    /// is mounted into `state` they get the fallback text.
    ///
    /// # Errors
    ///
    /// [`CliError::PortUnavailable`] if the address cannot be bound.
    pub async fn bind(addr: SocketAddr, state: SharedState, cors: bool) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| CliError::PortUnavailable {
                port: addr.port(),
                source,
            })?;
        let addr = listener.local_addr()?;

        let registry = ConnectionRegistry::new();
        let app = build_router(state.clone(), cors);
        let accept = tokio::spawn(accept_loop(listener, app, registry.clone()));
        tracing::debug!(%addr, generation = state.id(), "listening");

        Ok(Self {
            addr,
            state,
            registry,
            accept: Some(accept),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Stop accepting, force-close every open connection and release the port.
    ///
    /// Returns how many connections were closed.
    pub async fn destroy(mut self) -> usize {
        if let Some(accept) = self.accept.take() {
            accept.abort();
            // the listener is dropped with the task
            let _ = accept.await;
        }
        let closed = self.registry.drain().await;
        tracing::debug!(
            addr = %self.addr,
            generation = self.state.id(),
            closed,
            "server destroyed"
        );
        closed
    }
}

impl Drop for GenerationServer {
    fn drop(&mut self) {
        if let Some(accept) = self.accept.take() {
            accept.abort();
        }
    }
}

async fn accept_loop(listener: TcpListener, app: Router, registry: ConnectionRegistry) {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(connection) => connection,
            Err(e) => {
                tracing::warn!(error = %e, "failed to accept connection");
                tokio::time::sleep(Duration::from_millis(10)).await;
                continue;
            }
        };

        let app = app.clone();
        registry.spawn(peer, async move {
            let service = hyper::service::service_fn(move |request| {
                let mut app = app.clone();
                async move { app.call(request).await }
            });

            if let Err(e) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                tracing::debug!(%peer, error = %e, "connection ended with error");
            }
        });
    }
}

/// Build the axum router. Every request goes through [`dispatch`].
fn build_router(state: SharedState, cors: bool) -> Router {
    let router = Router::new()
        .fallback(dispatch)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}

async fn dispatch(State(state): State<SharedState>, method: HttpMethod, uri: Uri) -> Response {
    let Some(tree) = state.tree() else {
        return fallback();
    };
    let method = match method.as_str().parse::<Method>() {
        Ok(Method::All) | Err(_) => return fallback(),
        Ok(method) => method,
    };

    let resolution = resolve(&tree, method, uri.path());
    if !resolution.delay.is_zero() {
        tokio::time::sleep(resolution.delay).await;
    }
    let Some(spec) = resolution.response else {
        return fallback();
    };

    let (body, inferred_type) = match &spec.body {
        RouteBody::Empty => (Body::empty(), None),
        RouteBody::Bytes(bytes) => (Body::from(bytes.clone()), None),
        RouteBody::File(path) => match tokio::fs::read(path).await {
            Ok(bytes) => (Body::from(bytes), Some(remount_graph::content_type_for(path))),
            Err(e) => {
                state.report_failure(path.clone(), e.to_string());
                return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
            }
        },
    };

    let headers = response_headers(&resolution.headers, spec, inferred_type);
    let status = StatusCode::from_u16(spec.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, headers, body).into_response()
}

/// Middleware headers first, then the content type, then route headers;
/// later entries replace earlier ones with the same name.
fn response_headers(
    middleware: &[(&str, &str)],
    spec: &ResponseSpec,
    inferred_type: Option<String>,
) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in middleware {
        insert_header(&mut headers, name, value);
    }
    if let Some(content_type) = spec.content_type.clone().or(inferred_type) {
        insert_header(&mut headers, header::CONTENT_TYPE.as_str(), &content_type);
    }
    for (name, value) in &spec.headers {
        insert_header(&mut headers, name, value);
    }
    headers
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) {
    match (
        HeaderName::from_bytes(name.as_bytes()),
        HeaderValue::from_str(value),
    ) {
        (Ok(name), Ok(value)) => {
            headers.insert(name, value);
        }
        _ => tracing::warn!(header = name, "skipping invalid response header"),
    }
}

fn fallback() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        FALLBACK_TEXT,
    )
        .into_response()
}

//! Error types for routing tree construction.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RouteError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("unknown HTTP method '{0}'")]
    UnknownMethod(String),

    #[error("route declares no methods")]
    NoMethods,

    #[error("route declares no paths")]
    NoPaths,

    #[error("invalid route path '{0}': paths must start with '/' or be '*'")]
    InvalidPath(String),

    #[error("invalid status code {0}")]
    InvalidStatus(u16),
}

//! On-disk router module format.
//!
//! ```toml
//! [[stack]]
//! use = "headers"
//! headers = { "x-powered-by" = "remount" }
//!
//! [[stack]]
//! method = ["get", "post"]
//! path = "/users"
//! json = [{ id = 1 }]
//!
//! [[stack]]
//! mount = "/api"
//! module = "api/routes.toml"
//! ```
//!
//! Entries are parsed into a flat [`StackEntry`] and classified afterwards,
//! so a stray key produces an error naming the key instead of a generic
//! "no variant matched".

use std::str::FromStr;
use std::time::Duration;

use indexmap::IndexMap;
use remount_routes::{Method, Middleware};
use serde::Deserialize;

/// A parsed module file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleFile {
    #[serde(default)]
    pub stack: Vec<StackEntry>,
}

impl ModuleFile {
    pub fn parse(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}

/// One `[[stack]]` table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StackEntry {
    pub method: Option<OneOrMany>,
    pub path: Option<OneOrMany>,
    pub status: Option<u16>,
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    pub content_type: Option<String>,
    pub text: Option<String>,
    pub json: Option<toml::Value>,
    pub file: Option<String>,
    pub serve: Option<String>,

    pub mount: Option<String>,
    pub module: Option<String>,

    #[serde(rename = "use")]
    pub middleware: Option<String>,
    pub ms: Option<u64>,
}

/// A string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value.clone()],
            OneOrMany::Many(values) => values.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryKind {
    Route,
    Mount,
    Middleware,
}

/// Where a route's body comes from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BodySource<'a> {
    Empty,
    Text(&'a str),
    Json(&'a toml::Value),
    File(&'a str),
    Serve(&'a str),
}

const ROUTE_KEYS: &[&str] = &[
    "method",
    "path",
    "status",
    "content_type",
    "text",
    "json",
    "file",
    "serve",
    "headers",
];
const MOUNT_KEYS: &[&str] = &["mount", "module"];
const MIDDLEWARE_KEYS: &[&str] = &["use", "headers", "ms"];

impl StackEntry {
    /// Keys present in this entry, in declaration order of the struct.
    fn present_keys(&self) -> Vec<&'static str> {
        let flags = [
            ("method", self.method.is_some()),
            ("path", self.path.is_some()),
            ("status", self.status.is_some()),
            ("headers", !self.headers.is_empty()),
            ("content_type", self.content_type.is_some()),
            ("text", self.text.is_some()),
            ("json", self.json.is_some()),
            ("file", self.file.is_some()),
            ("serve", self.serve.is_some()),
            ("mount", self.mount.is_some()),
            ("module", self.module.is_some()),
            ("use", self.middleware.is_some()),
            ("ms", self.ms.is_some()),
        ];
        flags
            .into_iter()
            .filter_map(|(key, present)| present.then_some(key))
            .collect()
    }

    /// Classify the entry by its one discriminating key.
    pub(crate) fn kind(&self) -> Result<EntryKind, String> {
        let kinds: Vec<(EntryKind, &[&str])> = [
            (EntryKind::Route, self.method.is_some(), ROUTE_KEYS),
            (EntryKind::Mount, self.mount.is_some(), MOUNT_KEYS),
            (EntryKind::Middleware, self.middleware.is_some(), MIDDLEWARE_KEYS),
        ]
        .into_iter()
        .filter_map(|(kind, present, keys)| present.then_some((kind, keys)))
        .collect();

        let (kind, allowed) = match kinds.as_slice() {
            [] => {
                return Err("entry needs one of `method`, `mount` or `use`".to_string());
            }
            [single] => *single,
            _ => {
                return Err("entry mixes `method`, `mount` and `use`; pick one".to_string());
            }
        };

        if let Some(stray) = self
            .present_keys()
            .into_iter()
            .find(|key| !allowed.contains(key))
        {
            return Err(format!("`{stray}` is not valid here"));
        }

        Ok(kind)
    }

    pub(crate) fn methods(&self) -> Result<Vec<Method>, String> {
        self.method
            .as_ref()
            .map(OneOrMany::to_vec)
            .unwrap_or_default()
            .iter()
            .map(|m| Method::from_str(m).map_err(|e| e.to_string()))
            .collect()
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.path.as_ref().map(OneOrMany::to_vec).unwrap_or_default()
    }

    pub(crate) fn body_source(&self) -> Result<BodySource<'_>, String> {
        let mut sources = Vec::new();
        if let Some(text) = &self.text {
            sources.push(BodySource::Text(text));
        }
        if let Some(json) = &self.json {
            sources.push(BodySource::Json(json));
        }
        if let Some(file) = &self.file {
            sources.push(BodySource::File(file));
        }
        if let Some(serve) = &self.serve {
            sources.push(BodySource::Serve(serve));
        }

        match sources.len() {
            0 => Ok(BodySource::Empty),
            1 => Ok(sources.remove(0)),
            _ => Err("only one of `text`, `json`, `file` or `serve` may be set".to_string()),
        }
    }

    pub(crate) fn mount_parts(&self) -> Result<(&str, &str), String> {
        let pattern = self.mount.as_deref().unwrap_or_default();
        let module = self
            .module
            .as_deref()
            .ok_or_else(|| "`mount` needs a `module` path".to_string())?;
        Ok((pattern, module))
    }

    pub(crate) fn to_middleware(&self) -> Result<Middleware, String> {
        match self.middleware.as_deref().map(str::trim) {
            Some("headers") => {
                if self.ms.is_some() {
                    return Err("`ms` is only valid with `use = \"delay\"`".to_string());
                }
                Ok(Middleware::Headers(self.headers.clone()))
            }
            Some("delay") => {
                if !self.headers.is_empty() {
                    return Err("`headers` is only valid with `use = \"headers\"`".to_string());
                }
                let ms = self
                    .ms
                    .ok_or_else(|| "`use = \"delay\"` needs `ms`".to_string())?;
                Ok(Middleware::Delay(Duration::from_millis(ms)))
            }
            Some(other) => Err(format!(
                "unknown middleware '{other}', expected \"headers\" or \"delay\""
            )),
            None => Err("missing `use`".to_string()),
        }
    }
}

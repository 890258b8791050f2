use std::fmt;
use std::str::FromStr;

use crate::error::RouteError;

/// HTTP verbs a route node can declare.
///
/// `All` matches every request method, like a catch-all handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    All,
}

impl Method {
    pub const ALL: [Method; 8] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Delete,
        Method::Head,
        Method::Options,
        Method::All,
    ];

    /// Uppercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::All => "ALL",
        }
    }

    /// Whether a route declared with `self` answers a `request` method.
    ///
    /// HEAD requests fall through to GET routes.
    pub fn accepts(&self, request: Method) -> bool {
        match self {
            Method::All => true,
            Method::Get => matches!(request, Method::Get | Method::Head),
            declared => *declared == request,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `pad` keeps width/alignment flags working for listings
        f.pad(self.as_str())
    }
}

impl FromStr for Method {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| RouteError::UnknownMethod(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("get".parse::<Method>(), Ok(Method::Get));
        assert_eq!("Post".parse::<Method>(), Ok(Method::Post));
        assert_eq!(" DELETE ".parse::<Method>(), Ok(Method::Delete));
        assert_eq!("all".parse::<Method>(), Ok(Method::All));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            "fetch".parse::<Method>(),
            Err(RouteError::UnknownMethod("fetch".to_string()))
        );
    }

    #[test]
    fn test_display_padding() {
        assert_eq!(format!("{:<4}|", Method::Get), "GET |");
        assert_eq!(format!("{:<4}|", Method::Delete), "DELETE|");
    }

    #[test]
    fn test_accepts() {
        assert!(Method::Get.accepts(Method::Get));
        assert!(Method::Get.accepts(Method::Head));
        assert!(!Method::Get.accepts(Method::Post));
        assert!(!Method::Head.accepts(Method::Get));
        assert!(Method::All.accepts(Method::Options));
    }
}

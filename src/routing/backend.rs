//! Backend handle abstraction.
//!
//! # Responsibilities
//! - Validate a route target as a forwardable base URL
//! - Pre-compute the scheme and authority used for every forwarded request
//! - Rewrite an inbound request URI onto the backend (single-host semantics)

use axum::http::Uri;
use thiserror::Error;
use url::Url;

/// A route target that cannot be used as a backend base URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid route target {target:?}: {reason}")]
pub struct InvalidTargetError {
    pub target: String,
    pub reason: String,
}

impl InvalidTargetError {
    fn new(target: &str, reason: impl ToString) -> Self {
        Self {
            target: target.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// A resolved backend, built once per route and shared across requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendHandle {
    /// Parsed base URL of the backend.
    base_url: Url,
    /// `host[:port]` taken from the base URL.
    authority: String,
}

impl BackendHandle {
    /// Parse a target string into a backend handle.
    ///
    /// The target must be an absolute `http` or `https` URL with a host.
    pub fn parse(target: &str) -> Result<Self, InvalidTargetError> {
        let base_url = Url::parse(target).map_err(|e| InvalidTargetError::new(target, e))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(InvalidTargetError::new(
                target,
                format!("unsupported scheme {:?}", base_url.scheme()),
            ));
        }

        let host = base_url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| InvalidTargetError::new(target, "missing host"))?;

        let authority = match base_url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        Ok(Self { base_url, authority })
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Rewrite an inbound URI so it targets this backend.
    ///
    /// Scheme and authority come from the base URL. The base path and the
    /// request path are joined with exactly one slash, and the base query is
    /// placed before the request query.
    pub fn rewrite_uri(&self, uri: &Uri) -> Result<Uri, axum::http::Error> {
        let path = join_paths(self.base_url.path(), uri.path());

        let query = [self.base_url.query(), uri.query()]
            .into_iter()
            .flatten()
            .filter(|q| !q.is_empty())
            .collect::<Vec<_>>()
            .join("&");

        let path_and_query = if query.is_empty() {
            path
        } else {
            format!("{}?{}", path, query)
        };

        Uri::builder()
            .scheme(self.base_url.scheme())
            .authority(self.authority.as_str())
            .path_and_query(path_and_query)
            .build()
    }
}

fn join_paths(base: &str, request: &str) -> String {
    match (base.ends_with('/'), request.starts_with('/')) {
        (true, true) => format!("{}{}", base, &request[1..]),
        (false, false) => format!("{}/{}", base, request),
        _ => format!("{}{}", base, request),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(target: &str, uri: &str) -> String {
        let handle = BackendHandle::parse(target).unwrap();
        handle.rewrite_uri(&uri.parse().unwrap()).unwrap().to_string()
    }

    #[test]
    fn test_parse_valid_targets() {
        let handle = BackendHandle::parse("http://127.0.0.1:8080").unwrap();
        assert_eq!(handle.base_url().as_str(), "http://127.0.0.1:8080/");

        assert!(BackendHandle::parse("https://backend.internal").is_ok());
        assert!(BackendHandle::parse("http://[::1]:9000/base").is_ok());
    }

    #[test]
    fn test_parse_invalid_targets() {
        let err = BackendHandle::parse("not a url").unwrap_err();
        assert_eq!(err.target, "not a url");

        assert!(BackendHandle::parse("").is_err());
        assert!(BackendHandle::parse("/relative/path").is_err());
        assert!(BackendHandle::parse("ftp://files.example.com").is_err());
        assert!(BackendHandle::parse("unix:/var/run/app.sock").is_err());
    }

    #[test]
    fn test_rewrite_keeps_request_path() {
        assert_eq!(
            rewrite("http://127.0.0.1:8080", "/api/v1/users"),
            "http://127.0.0.1:8080/api/v1/users"
        );
        assert_eq!(rewrite("https://backend.internal", "/"), "https://backend.internal/");
    }

    #[test]
    fn test_rewrite_joins_base_path() {
        assert_eq!(rewrite("http://localhost:3000/base", "/api"), "http://localhost:3000/base/api");
        assert_eq!(rewrite("http://localhost:3000/base/", "/api"), "http://localhost:3000/base/api");
    }

    #[test]
    fn test_rewrite_merges_queries() {
        assert_eq!(rewrite("http://localhost:3000", "/api?a=1"), "http://localhost:3000/api?a=1");
        assert_eq!(
            rewrite("http://localhost:3000/?key=x", "/api?a=1"),
            "http://localhost:3000/api?key=x&a=1"
        );
        assert_eq!(rewrite("http://localhost:3000/?key=x", "/api"), "http://localhost:3000/api?key=x");
    }

    #[test]
    fn test_rewrite_ignores_inbound_authority() {
        assert_eq!(
            rewrite("http://10.0.0.5:9000", "http://gateway.local/static/app.js"),
            "http://10.0.0.5:9000/static/app.js"
        );
    }

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("/", "/a"), "/a");
        assert_eq!(join_paths("/base", "a"), "/base/a");
        assert_eq!(join_paths("/base/", "/a"), "/base/a");
        assert_eq!(join_paths("/base", "/a"), "/base/a");
    }
}

//! Traefik router introspection API client.

use crate::error::{Result, SyncError};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Router layer exposed by the Traefik API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterKind {
    /// `/api/http/routers`, rules use `Host(...)`.
    Http,
    /// `/api/tcp/routers`, rules use `HostSNI(...)`.
    Tcp,
}

impl RouterKind {
    /// Both kinds, in the order they are fetched.
    pub const ALL: [Self; 2] = [Self::Http, Self::Tcp];

    /// API path below the endpoint base URL.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Http => "/api/http/routers",
            Self::Tcp => "/api/tcp/routers",
        }
    }

    /// Full routers URL for `endpoint`. Any path prefix on the endpoint is kept.
    #[must_use]
    pub fn url(self, endpoint: &Url) -> String {
        format!("{}{}", endpoint.as_str().trim_end_matches('/'), self.path())
    }
}

/// One router entry. Only the rule is of interest; other fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Router {
    /// Routing predicate, e.g. ``Host(`app.lan`)``.
    pub rule: String,
}

/// Source of router rules for an endpoint.
pub trait RouterSource {
    /// Returns the routers of `kind` configured on `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns a recoverable error when the routers cannot be fetched.
    fn routers(&self, endpoint: &Url, kind: RouterKind) -> Result<Vec<Router>>;
}

/// Blocking HTTP client for the Traefik API.
#[derive(Debug, Clone)]
pub struct RouterClient {
    http: reqwest::blocking::Client,
}

impl RouterClient {
    /// Creates a client with an optional per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidConfig`] if the TLS backend cannot be
    /// initialised.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("traefik-unbound/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self { http })
    }

    /// Wraps a preconfigured client, e.g. one with custom proxy settings.
    #[must_use]
    pub const fn with_client(http: reqwest::blocking::Client) -> Self {
        Self { http }
    }
}

impl RouterSource for RouterClient {
    fn routers(&self, endpoint: &Url, kind: RouterKind) -> Result<Vec<Router>> {
        let url = kind.url(endpoint);
        tracing::debug!(url = %url, "Fetching routers");

        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|source| SyncError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status { url, status });
        }

        let body = response.bytes().map_err(|source| SyncError::Request {
            url: url.clone(),
            source,
        })?;
        let routers = parse_routers(&body).map_err(|source| SyncError::Decode { url, source })?;

        tracing::debug!(count = routers.len(), kind = ?kind, "Fetched routers");
        Ok(routers)
    }
}

fn parse_routers(body: &[u8]) -> serde_json::Result<Vec<Router>> {
    serde_json::from_slice(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_per_kind() {
        let endpoint = Url::parse("https://traefik.lan:8080").unwrap();
        assert_eq!(
            RouterKind::Http.url(&endpoint),
            "https://traefik.lan:8080/api/http/routers"
        );
        assert_eq!(
            RouterKind::Tcp.url(&endpoint),
            "https://traefik.lan:8080/api/tcp/routers"
        );
    }

    #[test]
    fn url_keeps_path_prefix() {
        let endpoint = Url::parse("https://gw.lan/traefik/").unwrap();
        assert_eq!(
            RouterKind::Http.url(&endpoint),
            "https://gw.lan/traefik/api/http/routers"
        );
    }

    #[test]
    fn parses_rules_and_ignores_other_fields() {
        let body = br#"[
            {"rule": "Host(`a.lan`)", "service": "a@docker", "status": "enabled"},
            {"rule": "HostSNI(`b.lan`)", "tls": {"passthrough": true}}
        ]"#;
        let routers = parse_routers(body).unwrap();
        assert_eq!(routers.len(), 2);
        assert_eq!(routers[0].rule, "Host(`a.lan`)");
        assert_eq!(routers[1].rule, "HostSNI(`b.lan`)");
    }

    #[test]
    fn rejects_malformed_payloads() {
        assert!(parse_routers(b"{}").is_err());
        assert!(parse_routers(b"[{\"name\": \"no-rule\"}]").is_err());
        assert!(parse_routers(b"not json").is_err());
        assert!(parse_routers(b"[]").unwrap().is_empty());
    }
}

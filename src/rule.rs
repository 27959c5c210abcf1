//! Hostname extraction from Traefik router rules.

use regex::Regex;
use std::sync::LazyLock;

/// Matches ``Host(`name`)`` (HTTP routers) and ``HostSNI(`name`)`` (TCP
/// routers). The name is backtick-delimited and must not contain `/`.
static HOST_RULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Host(SNI)?\(`(?P<host>[^/`]+)`").expect("host rule pattern is valid")
});

/// Returns the hostname of the first host predicate in `rule`, if any.
///
/// ```
/// use traefik_unbound::extract_host;
///
/// assert_eq!(extract_host("Host(`app.lan`) && PathPrefix(`/api`)"), Some("app.lan"));
/// assert_eq!(extract_host("HostSNI(`db.lan`)"), Some("db.lan"));
/// assert_eq!(extract_host("PathPrefix(`/`)"), None);
/// ```
#[must_use]
pub fn extract_host(rule: &str) -> Option<&str> {
    HOST_RULE
        .captures(rule)
        .and_then(|caps| caps.name("host"))
        .map(|m| m.as_str())
}

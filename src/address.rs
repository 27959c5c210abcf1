//! Endpoint address resolution.

use crate::error::{Result, SyncError};
use std::net::{IpAddr, Ipv4Addr, ToSocketAddrs};
use url::{Host, Url};

/// Resolves an endpoint to the IPv4 address its hostnames should point at.
pub trait AddressLookup {
    /// Returns the IPv4 address of `endpoint`.
    ///
    /// # Errors
    ///
    /// Any error is fatal for the run: an endpoint that cannot be resolved
    /// is a configuration problem.
    fn lookup(&self, endpoint: &Url) -> Result<Ipv4Addr>;
}

/// Looks endpoints up through the system resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLookup;

impl AddressLookup for SystemLookup {
    fn lookup(&self, endpoint: &Url) -> Result<Ipv4Addr> {
        let host = endpoint.host().ok_or_else(|| SyncError::MissingHost {
            url: endpoint.to_string(),
        })?;

        let first = match host {
            Host::Ipv4(ip) => IpAddr::V4(ip),
            Host::Ipv6(ip) => IpAddr::V6(ip),
            Host::Domain(name) => first_address(name)?,
        };

        let ip = to_ipv4(first).ok_or_else(|| SyncError::NotIpv4 {
            host: host.to_string(),
            addr: first,
        })?;
        tracing::debug!(host = %host, ip = %ip, "Resolved endpoint");
        Ok(ip)
    }
}

/// First address the resolver returns for `name`, in resolver order.
fn first_address(name: &str) -> Result<IpAddr> {
    let mut addrs = (name, 0).to_socket_addrs().map_err(|source| SyncError::Lookup {
        host: name.to_string(),
        source,
    })?;
    addrs
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| SyncError::NoAddress {
            host: name.to_string(),
        })
}

/// Four-octet form of `ip`. IPv6 only converts when it is IPv4-mapped.
#[must_use]
pub fn to_ipv4(ip: IpAddr) -> Option<Ipv4Addr> {
    match ip {
        IpAddr::V4(v4) => Some(v4),
        IpAddr::V6(v6) => v6.to_ipv4_mapped(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    #[test]
    fn ipv4_literal_needs_no_lookup() {
        let url = Url::parse("http://10.0.0.5:8080").unwrap();
        assert_eq!(
            SystemLookup.lookup(&url).unwrap(),
            Ipv4Addr::new(10, 0, 0, 5)
        );
    }

    #[test]
    fn mapped_ipv6_literal_is_converted() {
        let url = Url::parse("http://[::ffff:192.168.1.2]").unwrap();
        assert_eq!(
            SystemLookup.lookup(&url).unwrap(),
            Ipv4Addr::new(192, 168, 1, 2)
        );
    }

    #[test]
    fn plain_ipv6_literal_is_fatal() {
        let url = Url::parse("http://[2001:db8::1]").unwrap();
        let err = SystemLookup.lookup(&url).unwrap_err();
        assert!(matches!(err, SyncError::NotIpv4 { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn unresolvable_host_is_fatal() {
        let url = Url::parse("http://does-not-exist.invalid").unwrap();
        let err = SystemLookup.lookup(&url).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn to_ipv4_conversions() {
        assert_eq!(
            to_ipv4(IpAddr::V4(Ipv4Addr::LOCALHOST)),
            Some(Ipv4Addr::LOCALHOST)
        );
        assert_eq!(to_ipv4(IpAddr::V6(Ipv6Addr::LOCALHOST)), None);
    }
}

//! Per-endpoint hostname collection and merging.

use crate::address::AddressLookup;
use crate::error::Result;
use crate::routers::{Router, RouterKind, RouterSource};
use crate::rule::extract_host;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use url::Url;

/// Hostname to address mapping, kept sorted by hostname.
pub type HostMap = BTreeMap<String, Ipv4Addr>;

/// Collects the hostnames routed by one endpoint.
///
/// The endpoint is resolved first; a lookup failure is returned and must
/// abort the run. A router kind that cannot be fetched is logged and
/// contributes nothing.
///
/// # Errors
///
/// Returns the error from [`AddressLookup::lookup`].
pub fn collect_endpoint(
    endpoint: &Url,
    routers: &impl RouterSource,
    lookup: &impl AddressLookup,
) -> Result<HostMap> {
    let ip = lookup.lookup(endpoint)?;

    let mut rules: Vec<Router> = Vec::new();
    for kind in RouterKind::ALL {
        match routers.routers(endpoint, kind) {
            Ok(mut batch) => rules.append(&mut batch),
            Err(e) => tracing::warn!(
                endpoint = %endpoint,
                kind = ?kind,
                error = %e,
                "Skipping routers"
            ),
        }
    }

    let hosts = hosts_for(&rules, ip);
    tracing::info!(
        endpoint = %endpoint,
        ip = %ip,
        rules = rules.len(),
        hosts = hosts.len(),
        "Collected endpoint hosts"
    );
    Ok(hosts)
}

/// Maps every hostname found in `rules` to `ip`. Rules without a host
/// predicate are skipped.
#[must_use]
pub fn hosts_for(rules: &[Router], ip: Ipv4Addr) -> HostMap {
    rules
        .iter()
        .filter_map(|router| extract_host(&router.rule))
        .map(|host| (host.to_string(), ip))
        .collect()
}

/// Collects every endpoint in order. A hostname exposed by several endpoints
/// maps to the address of the last one.
///
/// # Errors
///
/// Stops at the first endpoint whose address cannot be resolved.
pub fn collect_all(
    endpoints: &[Url],
    routers: &impl RouterSource,
    lookup: &impl AddressLookup,
) -> Result<HostMap> {
    let mut merged = HostMap::new();
    for endpoint in endpoints {
        merged.extend(collect_endpoint(endpoint, routers, lookup)?);
    }
    Ok(merged)
}

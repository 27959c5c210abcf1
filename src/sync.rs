//! One fetch, render and apply cycle.

use crate::address::{AddressLookup, SystemLookup};
use crate::collector::{HostMap, collect_all};
use crate::config::SyncConfig;
use crate::error::Result;
use crate::render::render;
use crate::routers::{RouterClient, RouterSource};
use crate::service::{ServiceControl, SystemService};
use crate::updater::{Outcome, SafeFileUpdater};

/// Ties the collaborators of a cycle to one [`SyncConfig`].
///
/// # Example
///
/// ```rust,ignore
/// use traefik_unbound::{SyncConfig, Synchronizer};
///
/// let config = SyncConfig::new(["https://traefik.lan"])?
///     .with_target("/etc/unbound/unbound.conf.d/traefik.conf");
/// let outcome = Synchronizer::system(config)?.run()?;
/// ```
#[derive(Debug)]
pub struct Synchronizer<R, A, S> {
    config: SyncConfig,
    routers: R,
    lookup: A,
    service: S,
}

impl Synchronizer<RouterClient, SystemLookup, SystemService> {
    /// Uses the HTTP API, the system resolver and the configured commands.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn system(config: SyncConfig) -> Result<Self> {
        let routers = RouterClient::new(config.timeout)?;
        let service = SystemService::from_config(&config);
        Ok(Self::new(config, routers, SystemLookup, service))
    }
}

impl<R, A, S> Synchronizer<R, A, S>
where
    R: RouterSource,
    A: AddressLookup,
    S: ServiceControl,
{
    /// Creates a synchronizer from explicit collaborators.
    pub const fn new(config: SyncConfig, routers: R, lookup: A, service: S) -> Self {
        Self {
            config,
            routers,
            lookup,
            service,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns the service collaborator.
    #[must_use]
    pub const fn service(&self) -> &S {
        &self.service
    }

    /// Collects and merges the hostnames of every endpoint.
    ///
    /// # Errors
    ///
    /// Returns a fatal error if an endpoint cannot be resolved.
    pub fn collect(&self) -> Result<HostMap> {
        collect_all(&self.config.endpoints, &self.routers, &self.lookup)
    }

    /// Runs a full cycle.
    ///
    /// # Errors
    ///
    /// Every error returned here is fatal for the process.
    pub fn run(&self) -> Result<Outcome> {
        let hosts = self.collect()?;
        let rendered = render(&hosts);
        tracing::debug!(
            hosts = hosts.len(),
            fingerprint = rendered.fingerprint(),
            "Rendered overrides"
        );

        SafeFileUpdater::new(&self.config.target).apply(&rendered, &self.service)
    }
}

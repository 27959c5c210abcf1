//! Sync run configuration.

use crate::error::{Result, SyncError};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Default override file, relative to the working directory.
pub const DEFAULT_TARGET: &str = "traefik-services.conf";

/// Default configuration checker, looked up through `PATH`.
pub const DEFAULT_CHECKCONF: &str = "unbound-checkconf";

/// Default service manager used to restart the resolver.
pub const DEFAULT_SERVICE_MANAGER: &str = "systemctl";

/// Default resolver service name.
pub const DEFAULT_SERVICE: &str = "unbound";

/// Suffix appended to the override file path for its single backup.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Everything one sync cycle needs, built once at startup.
///
/// # Example
///
/// ```
/// use traefik_unbound::SyncConfig;
///
/// let config = SyncConfig::new(["https://traefik.lan"])
///     .unwrap()
///     .with_target("/etc/unbound/traefik.conf");
///
/// assert_eq!(config.endpoints.len(), 1);
/// assert_eq!(config.backup_path().to_str(), Some("/etc/unbound/traefik.conf.bak"));
/// ```
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Traefik base URLs, processed in this order.
    pub endpoints: Vec<Url>,

    /// Unbound include file holding the `local-data` overrides.
    pub target: PathBuf,

    /// Executable validating the Unbound configuration, run without arguments.
    pub checkconf: PathBuf,

    /// Service manager executable (`<manager> restart <service>`).
    pub service_manager: String,

    /// Resolver service to restart after a validated write.
    pub service: String,

    /// Bound on each routers request. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl SyncConfig {
    /// Parses the endpoint list and fills the remaining fields with defaults.
    ///
    /// Blank entries are skipped, so `"a,,b"` split on commas is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidConfig`] if an endpoint is not an absolute
    /// URL with a host.
    pub fn new<I, S>(endpoints: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let endpoints = endpoints
            .into_iter()
            .filter(|raw| !raw.as_ref().trim().is_empty())
            .map(|raw| parse_endpoint(raw.as_ref().trim()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            endpoints,
            target: PathBuf::from(DEFAULT_TARGET),
            checkconf: PathBuf::from(DEFAULT_CHECKCONF),
            service_manager: DEFAULT_SERVICE_MANAGER.to_string(),
            service: DEFAULT_SERVICE.to_string(),
            timeout: Some(Duration::from_secs(30)),
        })
    }

    /// Overrides the override file path.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<PathBuf>) -> Self {
        self.target = target.into();
        self
    }

    /// Overrides the checker executable.
    #[must_use]
    pub fn with_checkconf(mut self, checkconf: impl Into<PathBuf>) -> Self {
        self.checkconf = checkconf.into();
        self
    }

    /// Overrides how the resolver is restarted.
    #[must_use]
    pub fn with_service(mut self, manager: impl Into<String>, service: impl Into<String>) -> Self {
        self.service_manager = manager.into();
        self.service = service.into();
        self
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Path of the single backup generation kept next to the target.
    #[must_use]
    pub fn backup_path(&self) -> PathBuf {
        backup_path_for(&self.target)
    }
}

pub(crate) fn backup_path_for(target: &Path) -> PathBuf {
    let mut raw = target.as_os_str().to_owned();
    raw.push(BACKUP_SUFFIX);
    PathBuf::from(raw)
}

fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| SyncError::InvalidConfig(format!("endpoint {raw:?}: {e}")))?;
    if url.host_str().is_none() {
        return Err(SyncError::InvalidConfig(format!(
            "endpoint {raw:?} has no host"
        )));
    }
    Ok(url)
}

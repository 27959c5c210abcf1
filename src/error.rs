//! Error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors returned while collecting hosts and applying the override file.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The routers request could not be sent or its body could not be read.
    #[error("request to {url} failed: {source}")]
    Request {
        /// Routers URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The routers API answered with a non-success status.
    #[error("response from {url} not successful: {status}")]
    Status {
        /// Routers URL.
        url: String,
        /// Status returned by the proxy.
        status: reqwest::StatusCode,
    },

    /// The routers API body was not a JSON array of routers.
    #[error("malformed routers payload from {url}: {source}")]
    Decode {
        /// Routers URL.
        url: String,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The endpoint URL has no host part to look up.
    #[error("endpoint {url} has no host")]
    MissingHost {
        /// Endpoint URL.
        url: String,
    },

    /// Forward lookup of the endpoint host failed.
    #[error("could not resolve {host}: {source}")]
    Lookup {
        /// Host that was looked up.
        host: String,
        /// Underlying resolver error.
        #[source]
        source: std::io::Error,
    },

    /// Forward lookup succeeded but returned nothing.
    #[error("no IPs found for host {host}")]
    NoAddress {
        /// Host that was looked up.
        host: String,
    },

    /// The first address of the endpoint has no IPv4 representation.
    #[error("could not convert {addr} to IPv4 representation from host {host}")]
    NotIpv4 {
        /// Host that was looked up.
        host: String,
        /// Offending address.
        addr: std::net::IpAddr,
    },

    /// Filesystem operation on the override file or its backup failed.
    #[error("{op} {path} failed: {source}")]
    File {
        /// Short description of the operation.
        op: &'static str,
        /// Path involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration checker rejected the new file or could not run.
    #[error("configuration check with {program} failed: {detail}")]
    Check {
        /// Checker executable.
        program: String,
        /// Exit status or spawn error.
        detail: String,
    },

    /// Restarting the resolver service failed.
    #[error("restarting {service} failed: {detail}")]
    Reload {
        /// Service name.
        service: String,
        /// Exit status and captured output, or spawn error.
        detail: String,
    },

    /// Invalid configuration values.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl SyncError {
    pub(crate) fn file(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            op,
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if the error must abort the whole run.
    ///
    /// Router fetch failures and a rejected configuration are logged and
    /// skipped; everything else leaves the resolver in a state an operator
    /// has to look at.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::Request { .. } | Self::Status { .. } | Self::Decode { .. } | Self::Check { .. }
        )
    }
}

//! # traefik-unbound
//!
//! Keep Unbound `local-data` overrides in step with the hostnames that one
//! or more Traefik instances route.
//!
//! Each run asks every Traefik endpoint for its HTTP and TCP routers, pulls
//! the hostname out of each ``Host(`...`)`` / ``HostSNI(`...`)`` rule, and
//! points that hostname at the endpoint's own IPv4 address:
//!
//! ```text
//! # The contents of this file will be overriden to add traefik endpoints dynamically
//! # Endpoints extracted from 10.0.0.5
//! local-data: "app.example.com A 10.0.0.5"
//! ```
//!
//! The file is only touched when its SHA-256 differs from the rendered
//! content. A changed file is backed up, rewritten and checked with
//! `unbound-checkconf`; Unbound is restarted if the check passes and the
//! backup restored if it does not.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use traefik_unbound::{Outcome, SyncConfig, Synchronizer};
//!
//! let config = SyncConfig::new(["http://traefik.lan:8080"])?
//!     .with_target("/etc/unbound/unbound.conf.d/traefik.conf");
//!
//! match Synchronizer::system(config)?.run()? {
//!     Outcome::Unchanged => {}
//!     Outcome::Applied => println!("unbound restarted"),
//!     Outcome::RolledBack => println!("new overrides rejected"),
//! }
//! ```
//!
//! ## Scheduling
//!
//! A run performs exactly one cycle and exits. Run it from a systemd timer
//! or cron, and do not let runs overlap: the target file is not locked.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod address;
pub mod collector;
pub mod config;
pub mod error;
pub mod render;
pub mod routers;
pub mod rule;
pub mod service;
pub mod sync;
pub mod updater;

pub use address::{AddressLookup, SystemLookup};
pub use collector::{HostMap, collect_all, collect_endpoint};
pub use config::SyncConfig;
pub use error::{Result, SyncError};
pub use render::{RenderedConfig, render};
pub use routers::{Router, RouterClient, RouterKind, RouterSource};
pub use rule::extract_host;
pub use service::{ServiceControl, SystemService};
pub use sync::Synchronizer;
pub use updater::{Outcome, SafeFileUpdater};

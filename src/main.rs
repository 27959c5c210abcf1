//! # traefik-unbound
//!
//! Rewrites an Unbound include file with one `local-data` record per
//! hostname routed by the given Traefik instances, then validates it and
//! restarts Unbound.
//!
//! ```bash
//! traefik-unbound -u http://traefik.lan:8080,http://edge.lan:8080 \
//!     -p /etc/unbound/unbound.conf.d/traefik.conf
//! ```
//!
//! Exits non-zero if an endpoint cannot be resolved, the file cannot be
//! backed up, written or restored, or Unbound fails to restart.

mod logging;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use traefik_unbound::config::{
    DEFAULT_CHECKCONF, DEFAULT_SERVICE, DEFAULT_SERVICE_MANAGER, DEFAULT_TARGET,
};
use traefik_unbound::{Outcome, SyncConfig, Synchronizer};

/// Sync Unbound local-data overrides with Traefik routers.
#[derive(Parser, Debug)]
#[command(name = "traefik-unbound")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Comma separated Traefik URLs, e.g. "https://traefik.io,https://localhost"
    #[arg(short = 'u', long = "urls", env = "TRAEFIK_URLS", value_delimiter = ',')]
    urls: Vec<String>,

    /// File receiving the local-data records
    #[arg(short = 'p', long = "path", env = "TRAEFIK_SERVICES_PATH", default_value = DEFAULT_TARGET)]
    path: PathBuf,

    /// unbound-checkconf executable
    #[arg(short = 'c', long = "checkconf", env = "UNBOUND_CHECKCONF", default_value = DEFAULT_CHECKCONF)]
    checkconf: PathBuf,

    /// Service manager used to restart the resolver
    #[arg(long, default_value = DEFAULT_SERVICE_MANAGER)]
    service_manager: String,

    /// Resolver service name
    #[arg(long, default_value = DEFAULT_SERVICE)]
    service: String,

    /// Timeout in seconds for each routers request (0 waits forever)
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t)]
    log_format: logging::LogFormat,
}

impl Args {
    fn into_config(self) -> traefik_unbound::Result<SyncConfig> {
        let timeout = (self.timeout > 0).then(|| Duration::from_secs(self.timeout));
        Ok(SyncConfig::new(&self.urls)?
            .with_target(self.path)
            .with_checkconf(self.checkconf)
            .with_service(self.service_manager, self.service)
            .with_timeout(timeout))
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = logging::level_for(args.verbose, args.quiet);
    if let Err(e) = logging::init_logging(level, args.log_format) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid arguments");
            return ExitCode::FAILURE;
        }
    };
    info!(
        version = env!("CARGO_PKG_VERSION"),
        endpoints = config.endpoints.len(),
        path = %config.target.display(),
        "Starting sync"
    );

    let result = Synchronizer::system(config).and_then(|sync| sync.run());
    match result {
        Ok(outcome) => {
            match outcome {
                Outcome::Unchanged => info!("No changes"),
                Outcome::Applied => info!("Overrides updated"),
                Outcome::RolledBack => info!("Overrides rejected by checker, previous file kept"),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Sync failed");
            ExitCode::FAILURE
        }
    }
}

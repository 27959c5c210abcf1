//! Resolver configuration check and restart.

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use std::path::PathBuf;
use std::process::{Command, Output};

/// External collaborators that validate and apply the written file.
pub trait ServiceControl {
    /// Validates the resolver configuration as currently on disk.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Check`] if the configuration is rejected or the
    /// checker cannot be run.
    fn check_config(&self) -> Result<()>;

    /// Restarts the resolver so it picks up the new file.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Reload`] if the restart fails.
    fn reload(&self) -> Result<()>;
}

/// Runs `unbound-checkconf` and `systemctl restart unbound`, or whatever
/// the configuration names instead.
#[derive(Debug, Clone)]
pub struct SystemService {
    checkconf: PathBuf,
    manager: String,
    service: String,
}

impl SystemService {
    /// Creates the commands described by `config`.
    #[must_use]
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            checkconf: config.checkconf.clone(),
            manager: config.service_manager.clone(),
            service: config.service.clone(),
        }
    }
}

impl ServiceControl for SystemService {
    fn check_config(&self) -> Result<()> {
        let program = self.checkconf.display().to_string();
        let output = Command::new(&self.checkconf)
            .output()
            .map_err(|e| SyncError::Check {
                program: program.clone(),
                detail: e.to_string(),
            })?;

        if output.status.success() {
            tracing::debug!(program = %program, "Configuration check passed");
            Ok(())
        } else {
            Err(SyncError::Check {
                program,
                detail: describe(&output),
            })
        }
    }

    fn reload(&self) -> Result<()> {
        let output = Command::new(&self.manager)
            .arg("restart")
            .arg(&self.service)
            .output()
            .map_err(|e| SyncError::Reload {
                service: self.service.clone(),
                detail: e.to_string(),
            })?;

        if output.status.success() {
            tracing::info!(service = %self.service, "Restarted resolver service");
            Ok(())
        } else {
            Err(SyncError::Reload {
                service: self.service.clone(),
                detail: describe(&output),
            })
        }
    }
}

/// Exit status followed by whatever the command printed.
fn describe(output: &Output) -> String {
    let mut detail = output.status.to_string();
    for stream in [&output.stdout, &output.stderr] {
        let text = String::from_utf8_lossy(stream);
        let text = text.trim();
        if !text.is_empty() {
            detail.push_str(", ");
            detail.push_str(text);
        }
    }
    detail
}

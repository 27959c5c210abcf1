//! Backup, write, validate and roll back the Unbound include file.
//!
//! One call to [`SafeFileUpdater::apply`] walks a fixed sequence:
//!
//! 1. make sure the target exists (created `0o664` if absent),
//! 2. stop if its SHA-256 matches the rendered content,
//! 3. copy it to `<target>.bak`,
//! 4. truncate and write the new content,
//! 5. run the configuration checker,
//! 6. restart the resolver if the check passed, or restore the backup if not.
//!
//! A failed write restores the backup before the error is returned, so the
//! target only ever holds the previous or the new content.

use crate::config::backup_path_for;
use crate::error::{Result, SyncError};
use crate::render::{RenderedConfig, fingerprint_reader};
use crate::service::ServiceControl;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Permission bits for a freshly created target.
#[cfg(unix)]
const CREATE_MODE: u32 = 0o664;

/// Terminal state of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The file already held the rendered content.
    Unchanged,
    /// New content written, validated and the service restarted.
    Applied,
    /// New content failed validation and the previous content was restored.
    RolledBack,
}

/// What the target held before this cycle touched it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prior {
    /// Created empty by this cycle; there is nothing to back up.
    Created,
    /// Existing content, copied to the backup path before writing.
    Existing,
}

/// Applies rendered content to one target file.
#[derive(Debug, Clone)]
pub struct SafeFileUpdater {
    target: PathBuf,
    backup: PathBuf,
}

impl SafeFileUpdater {
    /// Creates an updater for `target`, backing up to `<target>.bak`.
    #[must_use]
    pub fn new(target: impl Into<PathBuf>) -> Self {
        let target = target.into();
        let backup = backup_path_for(&target);
        Self { target, backup }
    }

    /// Returns the target path.
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Returns the backup path.
    #[must_use]
    pub fn backup(&self) -> &Path {
        &self.backup
    }

    /// Brings the target up to date with `rendered`.
    ///
    /// A rejected configuration is not an error: the previous content is
    /// restored and [`Outcome::RolledBack`] returned without restarting.
    ///
    /// # Errors
    ///
    /// Every returned error is fatal: the target could not be created,
    /// read, backed up, written or restored, or the restart failed after a
    /// validated write.
    pub fn apply(
        &self,
        rendered: &RenderedConfig,
        service: &impl ServiceControl,
    ) -> Result<Outcome> {
        self.apply_with(rendered, service, Self::write)
    }

    /// [`apply`](Self::apply) with the truncate-and-write step supplied.
    fn apply_with(
        &self,
        rendered: &RenderedConfig,
        service: &impl ServiceControl,
        write: impl FnOnce(&Self, &str) -> Result<()>,
    ) -> Result<Outcome> {
        let prior = self.ensure_exists()?;

        if self.is_current(rendered)? {
            tracing::info!(path = %self.target.display(), "Overrides unchanged, nothing to do");
            return Ok(Outcome::Unchanged);
        }

        if prior == Prior::Existing {
            self.save_backup()?;
        }

        if let Err(e) = write(self, rendered.content()) {
            tracing::error!(path = %self.target.display(), error = %e, "Write failed, restoring backup");
            self.restore(prior)?;
            return Err(e);
        }

        match service.check_config() {
            Ok(()) => {
                service.reload()?;
                tracing::info!(
                    path = %self.target.display(),
                    fingerprint = rendered.fingerprint(),
                    "Applied new overrides"
                );
                Ok(Outcome::Applied)
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.target.display(),
                    error = %e,
                    "New overrides rejected, rolling back"
                );
                self.restore(prior)?;
                Ok(Outcome::RolledBack)
            }
        }
    }

    fn ensure_exists(&self) -> Result<Prior> {
        match fs::metadata(&self.target) {
            Ok(_) => Ok(Prior::Existing),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                File::create(&self.target)
                    .map_err(|e| SyncError::file("creating", &self.target, e))?;
                set_create_mode(&self.target)?;
                tracing::info!(path = %self.target.display(), "Created overrides file");
                Ok(Prior::Created)
            }
            Err(e) => Err(SyncError::file("inspecting", &self.target, e)),
        }
    }

    fn is_current(&self, rendered: &RenderedConfig) -> Result<bool> {
        let file = File::open(&self.target).map_err(|e| SyncError::file("opening", &self.target, e))?;
        let on_disk =
            fingerprint_reader(file).map_err(|e| SyncError::file("hashing", &self.target, e))?;
        tracing::debug!(on_disk = %on_disk, rendered = rendered.fingerprint(), "Compared fingerprints");
        Ok(on_disk == rendered.fingerprint())
    }

    fn save_backup(&self) -> Result<()> {
        fs::copy(&self.target, &self.backup)
            .map_err(|e| SyncError::file("backing up to", &self.backup, e))?;
        tracing::debug!(backup = %self.backup.display(), "Saved backup");
        Ok(())
    }

    fn write(&self, content: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&self.target)
            .map_err(|e| SyncError::file("opening for write", &self.target, e))?;
        file.write_all(content.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| SyncError::file("writing", &self.target, e))
    }

    fn restore(&self, prior: Prior) -> Result<()> {
        match prior {
            Prior::Existing => {
                fs::copy(&self.backup, &self.target)
                    .map_err(|e| SyncError::file("restoring backup", &self.backup, e))?;
            }
            Prior::Created => {
                File::create(&self.target)
                    .map_err(|e| SyncError::file("truncating", &self.target, e))?;
            }
        }
        tracing::info!(path = %self.target.display(), "Restored previous overrides");
        Ok(())
    }
}

#[cfg(unix)]
fn set_create_mode(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(CREATE_MODE))
        .map_err(|e| SyncError::file("setting permissions on", path, e))
}

#[cfg(not(unix))]
fn set_create_mode(_path: &Path) -> Result<()> {
    Ok(())
}

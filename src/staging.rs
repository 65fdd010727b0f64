//! Per-description staging directories.
//!
//! A [`StagingDirectory`] lives at `<workspace>/<base name>` for exactly one
//! iteration of the driver. [`StagingDirectory::teardown`] removes it on the
//! happy path; if the iteration fails first, dropping the value removes it.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::error::{BundleError, Result};

#[derive(Debug)]
pub struct StagingDirectory {
    path: PathBuf,
    removed: bool,
}

impl StagingDirectory {
    /// Creates an empty `<workspace>/<base_name>`, wiping any leftover first.
    pub fn prepare(workspace: &Path, base_name: &str) -> Result<Self> {
        let path = workspace.join(base_name);

        if path.is_dir() {
            println!("Removing pre-existing directory {}", path.display());
            fs::remove_dir_all(&path).map_err(|e| {
                error!(error = ?e, path = %path.display(), "Failed to remove pre-existing staging directory");
                BundleError::io("failed to remove pre-existing directory", &path, e)
            })?;
            debug!(path = %path.display(), "Removed pre-existing staging directory");
        }

        fs::create_dir(&path).map_err(|e| {
            error!(error = ?e, path = %path.display(), "Failed to create staging directory");
            BundleError::io("failed to create staging directory", &path, e)
        })?;
        info!(path = %path.display(), "Created staging directory");

        Ok(Self {
            path,
            removed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copies `files` into the directory under their own file names.
    /// Same-named files are overwritten; the first failure aborts.
    pub fn populate<P: AsRef<Path>>(&self, files: &[P]) -> Result<()> {
        for file in files {
            let file = file.as_ref();
            let Some(name) = file.file_name() else {
                continue;
            };
            let target = self.path.join(name);
            fs::copy(file, &target).map_err(|e| {
                error!(error = ?e, from = %file.display(), to = %target.display(), "Failed to stage file");
                BundleError::io("failed to copy", file, e)
            })?;
            debug!(from = %file.display(), to = %target.display(), "Staged file");
        }
        info!(path = %self.path.display(), count = files.len(), "Populated staging directory");
        Ok(())
    }

    /// Copies `archive_name` out of the staging directory into `destination`.
    pub fn publish(&self, archive_name: &str, destination: &Path) -> Result<PathBuf> {
        let source = self.path.join(archive_name);
        if !source.is_file() {
            error!(path = %source.display(), "Archive missing from staging directory");
            return Err(BundleError::ArchiveNotProduced { path: source });
        }

        let target = destination.join(archive_name);
        fs::copy(&source, &target).map_err(|e| {
            error!(error = ?e, from = %source.display(), to = %target.display(), "Failed to publish archive");
            BundleError::io("failed to copy", &source, e)
        })?;
        info!(archive = %target.display(), "Published archive");
        Ok(target)
    }

    /// Removes the directory and everything in it.
    pub fn teardown(mut self) -> Result<()> {
        self.removed = true;
        fs::remove_dir_all(&self.path).map_err(|e| {
            error!(error = ?e, path = %self.path.display(), "Failed to remove staging directory");
            BundleError::io("failed to remove staging directory", &self.path, e)
        })?;
        info!(path = %self.path.display(), "Removed staging directory");
        Ok(())
    }
}

impl Drop for StagingDirectory {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        match fs::remove_dir_all(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed abandoned staging directory"),
            Err(e) => warn!(
                error = ?e,
                path = %self.path.display(),
                "Failed to remove abandoned staging directory"
            ),
        }
    }
}

//! High-level pipeline: turns every description file in a workspace into an
//! encrypted archive.
//!
//! For each description file found at the start of the run, strictly one at
//! a time:
//!   - extract the `Model=` label that names the archive
//!   - delete a stale archive of that name from the workspace
//!   - create the staging directory `<workspace>/<base name>` and copy the
//!     description file plus the auxiliary files into it
//!   - run the [`Archiver`] inside the staging directory
//!   - copy the archive back to the workspace and delete the staging directory
//!
//! # Error Handling
//! The first error aborts the whole run and is returned unchanged. The
//! staging directory of the failing iteration is removed regardless, so no
//! staging directory outlives its iteration.
//!
//! # Navigation
//! - Main entrypoint: [`bundle_workspace`]
//! - Dry run: [`plan_workspace`]
//! - Supporting types: [`BundleReport`], [`OutputArchive`], [`PlannedBundle`]

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error, info, info_span};

use crate::archive::Archiver;
use crate::config::BundleConfig;
use crate::error::{BundleError, Result};
use crate::label::extract_label;
use crate::scan::{collect_file_set, list_description_files, DescriptionFile, FileSet};
use crate::staging::StagingDirectory;

/// The archive a description file turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArchive {
    pub label: String,
    pub extension: String,
}

impl OutputArchive {
    pub fn new(label: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            extension: extension.into(),
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.label, self.extension)
    }

    /// Deletes an existing archive of this name from `dir`, so the new one
    /// always replaces it. Returns whether a file was removed.
    pub fn remove_stale(&self, dir: &Path) -> Result<bool> {
        let path = dir.join(self.file_name());
        if !path.is_file() {
            return Ok(false);
        }
        println!("Removing pre-existing file {}", path.display());
        fs::remove_file(&path).map_err(|e| {
            error!(error = ?e, path = %path.display(), "Failed to remove pre-existing archive");
            BundleError::io("failed to remove pre-existing file", &path, e)
        })?;
        debug!(path = %path.display(), "Removed pre-existing archive");
        Ok(true)
    }
}

#[derive(Debug, Serialize)]
pub struct BundleReport {
    pub archives: Vec<ArchiveReport>,
}

#[derive(Debug, Serialize)]
pub struct ArchiveReport {
    pub description: PathBuf,
    pub label: String,
    pub archive: PathBuf,
    pub staged_files: Vec<String>,
}

/// A description file as the pipeline would process it, without side effects.
#[derive(Debug)]
pub struct PlannedBundle {
    pub description: DescriptionFile,
    /// The archive file name, or the reason the label is unusable.
    pub archive: std::result::Result<String, BundleError>,
    pub files: FileSet,
}

/// Runs the whole pipeline over `config.workspace`.
pub fn bundle_workspace<A>(config: &BundleConfig, archiver: &A) -> Result<BundleReport>
where
    A: Archiver + ?Sized,
{
    let workspace = &config.workspace;
    info!(workspace = %workspace.display(), "[BUNDLE] Starting bundling run");

    // Fixed for the run: files created while processing are not picked up.
    let descriptions =
        list_description_files(workspace, &config.extensions.description_extension)?;
    info!(count = descriptions.len(), "[BUNDLE] Found description files");

    let mut archives = Vec::with_capacity(descriptions.len());
    for description in &descriptions {
        let span = info_span!("description", file = %description.file_name());
        let _entered = span.enter();

        match bundle_one(config, archiver, description) {
            Ok(report) => {
                println!(
                    "Created {} from {}",
                    report.archive.display(),
                    description.file_name()
                );
                archives.push(report);
            }
            Err(e) => {
                error!(error = %e, "[BUNDLE][ERROR] Aborting run");
                return Err(e);
            }
        }
    }

    let report = BundleReport { archives };
    match serde_json::to_string_pretty(&report) {
        Ok(json) => debug!(json = %json, "[BUNDLE] Run report"),
        Err(e) => error!(error = ?e, "[BUNDLE] Failed to serialize run report"),
    }
    info!(archives = report.archives.len(), "[BUNDLE] Bundling run complete");
    Ok(report)
}

fn bundle_one<A>(
    config: &BundleConfig,
    archiver: &A,
    description: &DescriptionFile,
) -> Result<ArchiveReport>
where
    A: Archiver + ?Sized,
{
    let workspace = &config.workspace;

    let label = extract_label(&description.path)?;
    let output = OutputArchive::new(label, &config.extensions.archive_extension);
    let archive_name = output.file_name();
    info!(label = %output.label, archive = %archive_name, "[BUNDLE] Extracted label");
    output.remove_stale(workspace)?;

    let staging = StagingDirectory::prepare(workspace, &description.base_name)?;

    let file_set = collect_file_set(
        workspace,
        description,
        &config.extensions.exclusions(),
        skip_list(config).as_slice(),
    )?;
    staging.populate(&file_set.files)?;

    archiver.archive(staging.path(), &archive_name)?;

    let published = staging.publish(&archive_name, workspace)?;
    staging.teardown()?;

    Ok(ArchiveReport {
        description: description.path.clone(),
        label: output.label,
        archive: published,
        staged_files: file_set.file_names(),
    })
}

/// Scans the workspace and reports what a run would do, touching nothing.
pub fn plan_workspace(config: &BundleConfig) -> Result<Vec<PlannedBundle>> {
    let workspace = &config.workspace;
    let exclusions = config.extensions.exclusions();
    let skip = skip_list(config);

    list_description_files(workspace, &config.extensions.description_extension)?
        .into_iter()
        .map(|description| -> Result<PlannedBundle> {
            let archive = extract_label(&description.path).map(|label| {
                OutputArchive::new(label, &config.extensions.archive_extension).file_name()
            });
            let files = collect_file_set(workspace, &description, &exclusions, &skip)?;
            Ok(PlannedBundle {
                description,
                archive,
                files,
            })
        })
        .collect()
}

fn skip_list(config: &BundleConfig) -> Vec<PathBuf> {
    config
        .config_file
        .iter()
        .cloned()
        .chain(std::env::current_exe().ok())
        .collect()
}

//! Workspace scanning: finds description files and the auxiliary files that
//! get staged next to them.
//!
//! Only the top level of the workspace is inspected. Results are sorted by
//! file name so runs are deterministic.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::error::{BundleError, Result};

/// One unit of work: a model description file found at scan time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionFile {
    pub path: PathBuf,
    /// File name without extension; names the staging directory.
    pub base_name: String,
}

impl DescriptionFile {
    pub fn file_name(&self) -> String {
        file_name_of(&self.path)
    }
}

/// Files copied into one staging directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    pub files: Vec<PathBuf>,
}

impl FileSet {
    pub fn file_names(&self) -> Vec<String> {
        self.files.iter().map(|p| file_name_of(p)).collect()
    }
}

/// Lists every regular file directly inside `dir`.
pub fn list_all_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        error!(error = ?e, path = %dir.display(), "Failed to read workspace directory");
        BundleError::io("failed to read directory", dir, e)
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BundleError::io("failed to read directory", dir, e))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| BundleError::io("failed to inspect", &path, e))?;
        // Symlinks count when they resolve to a file.
        if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
            files.push(path);
        }
    }
    files.sort();
    debug!(path = %dir.display(), count = files.len(), "Listed workspace files");
    Ok(files)
}

/// Lists the description files directly inside `dir`.
pub fn list_description_files(dir: &Path, extension: &str) -> Result<Vec<DescriptionFile>> {
    let descriptions: Vec<DescriptionFile> = list_all_files(dir)?
        .into_iter()
        .filter(|path| has_extension(path, extension))
        .filter_map(|path| {
            let base_name = path.file_stem()?.to_str()?.to_string();
            Some(DescriptionFile { path, base_name })
        })
        .collect();
    debug!(
        path = %dir.display(),
        extension,
        count = descriptions.len(),
        "Listed description files"
    );
    Ok(descriptions)
}

/// Computes the files to stage for `current`, fresh from disk.
///
/// `current` is always included. Any other file is skipped when it has no
/// extension, when its extension is in `exclusions` (lower-case), when it is
/// hidden, or when it is one of `skip` (e.g. the config file or the running
/// binary).
pub fn collect_file_set(
    dir: &Path,
    current: &DescriptionFile,
    exclusions: &[String],
    skip: &[PathBuf],
) -> Result<FileSet> {
    let files = list_all_files(dir)?
        .into_iter()
        .filter(|path| {
            if path == &current.path {
                return true;
            }
            if is_hidden(path) || skip.iter().any(|s| same_file(s, path)) {
                return false;
            }
            match extension_of(path) {
                Some(ext) => !exclusions.contains(&ext.to_ascii_lowercase()),
                // Auxiliary files need an extension, like a `*.*` glob.
                None => false,
            }
        })
        .collect();
    Ok(FileSet { files })
}

pub fn has_extension(path: &Path, extension: &str) -> bool {
    extension_of(path).is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

fn extension_of(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

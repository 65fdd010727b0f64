//! Error taxonomy for the bundling pipeline.
//!
//! Every failure is fatal for the run: components return a [`BundleError`]
//! and the driver propagates it unchanged. Nothing is retried.

use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BundleError>;

#[derive(Error, Debug)]
pub enum BundleError {
    /// A filesystem operation failed (listing, copying, creating, deleting).
    #[error("{context} {}: {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The description file has no `Model=` line.
    #[error("no Model= label found in {}", .path.display())]
    MissingLabel { path: PathBuf },

    /// The label cannot be used as an archive file name.
    #[error("label {label:?} in {} is not a valid archive name", .path.display())]
    InvalidLabel { path: PathBuf, label: String },

    /// The compression utility could not be started at all.
    #[error("failed to launch compression utility {}: {source}", .utility.display())]
    UtilityLaunch {
        utility: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The compression utility ran and reported failure.
    #[error("compression failed ({}): {stderr}", describe_exit(.code))]
    CompressionFailed { code: Option<i32>, stderr: String },

    /// The expected archive is not in the staging directory.
    #[error("archive {} was not produced", .path.display())]
    ArchiveNotProduced { path: PathBuf },

    #[error("invalid configuration: {0}")]
    Config(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

impl BundleError {
    pub(crate) fn io(context: &'static str, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        BundleError::Io {
            context,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

//! # archive: the external compression step
//!
//! The pipeline never compresses or encrypts anything itself. It hands a
//! staging directory to an [`Archiver`], which must leave a single archive
//! named `output_name` inside that directory.
//!
//! [`SevenZip`] is the production implementation: it runs the 7-Zip command
//! line tool with the staging directory as the subprocess working directory,
//! so the process-wide current directory is never touched. Tests use the
//! generated `MockArchiver` or point [`SevenZip`] at a stand-in script.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use tracing::{debug, error, info};

use crate::config::{SevenZipConfig, ADD_COMMAND};
use crate::error::{BundleError, Result};

/// Produces an encrypted archive from the contents of a working directory.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait Archiver {
    /// Archive everything in `working_dir` into `working_dir/<output_name>`.
    fn archive(&self, working_dir: &Path, output_name: &str) -> Result<()>;
}

/// What happened when the utility was run.
#[derive(Debug)]
pub enum ArchiveOutcome {
    Success,
    /// The utility ran and exited unsuccessfully.
    NonZeroExit { code: Option<i32>, stderr: String },
    /// The utility could not be started (missing, not executable).
    LaunchFailed(std::io::Error),
}

impl ArchiveOutcome {
    fn from_output(result: std::io::Result<Output>) -> Self {
        match result {
            Ok(output) if output.status.success() => ArchiveOutcome::Success,
            Ok(output) => ArchiveOutcome::NonZeroExit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            },
            Err(e) => ArchiveOutcome::LaunchFailed(e),
        }
    }

    pub fn into_result(self, utility: &Path) -> Result<()> {
        match self {
            ArchiveOutcome::Success => Ok(()),
            ArchiveOutcome::NonZeroExit { code, stderr } => {
                Err(BundleError::CompressionFailed { code, stderr })
            }
            ArchiveOutcome::LaunchFailed(source) => Err(BundleError::UtilityLaunch {
                utility: utility.to_path_buf(),
                source,
            }),
        }
    }
}

/// 7-Zip command line archiver (LZMA, AES-256).
#[derive(Debug, Clone)]
pub struct SevenZip {
    config: SevenZipConfig,
}

impl SevenZip {
    pub fn new(config: SevenZipConfig) -> Self {
        Self { config }
    }

    pub fn utility(&self) -> &Path {
        &self.config.utility
    }

    /// Arguments after the utility path:
    /// `a -p<password> [-mhe] -mmt=<threads> -mx=<level> <output_name>`.
    pub fn arguments(&self, output_name: &str) -> Vec<OsString> {
        let password = self.config.password.as_deref().unwrap_or_default();
        let mut args: Vec<OsString> = vec![ADD_COMMAND.into(), format!("-p{password}").into()];
        if self.config.hide_contents {
            args.push("-mhe".into());
        }
        args.push(format!("-mmt={}", self.config.threads).into());
        args.push(format!("-mx={}", self.config.compression_level).into());
        args.push(output_name.into());
        args
    }

    /// The command line as it is safe to log, with the password masked.
    pub fn redacted_command_line(&self, output_name: &str) -> String {
        std::iter::once(self.config.utility.display().to_string())
            .chain(self.arguments(output_name).into_iter().map(|arg| {
                let arg = arg.to_string_lossy().into_owned();
                if arg.starts_with("-p") {
                    "-p***".to_string()
                } else {
                    arg
                }
            }))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn run(&self, working_dir: &Path, output_name: &str) -> ArchiveOutcome {
        let command_line = self.redacted_command_line(output_name);
        info!(
            working_dir = %working_dir.display(),
            command = %command_line,
            "Invoking compression utility"
        );

        let result = Command::new(&self.config.utility)
            .args(self.arguments(output_name))
            .current_dir(working_dir)
            .output();

        if let Ok(output) = &result {
            debug!(
                status = ?output.status,
                stdout = %String::from_utf8_lossy(&output.stdout),
                "Compression utility finished"
            );
        }
        let outcome = ArchiveOutcome::from_output(result);
        match &outcome {
            ArchiveOutcome::Success => {
                info!(output = output_name, "Compression utility succeeded")
            }
            ArchiveOutcome::NonZeroExit { code, stderr } => error!(
                code = ?code,
                stderr = %stderr,
                command = %command_line,
                "Compression utility exited with non-zero code"
            ),
            ArchiveOutcome::LaunchFailed(e) => error!(
                error = ?e,
                utility = %self.config.utility.display(),
                "Failed to launch compression utility"
            ),
        }
        outcome
    }
}

impl Archiver for SevenZip {
    fn archive(&self, working_dir: &Path, output_name: &str) -> Result<()> {
        self.run(working_dir, output_name)
            .into_result(&self.config.utility)?;

        let produced: PathBuf = working_dir.join(output_name);
        if !produced.is_file() {
            error!(path = %produced.display(), "Utility reported success but wrote no archive");
            return Err(BundleError::ArchiveNotProduced { path: produced });
        }
        Ok(())
    }
}

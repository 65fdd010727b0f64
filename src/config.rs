use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::{BundleError, Result};

/// Field marker whose value names the output archive.
pub const LABEL_MARKER: &str = "Model=";

/// 7-Zip command for adding files to an archive.
pub const ADD_COMMAND: &str = "a";

/// Everything a bundling run needs, constructed once and validated at startup.
#[derive(Debug, Clone)]
pub struct BundleConfig {
    /// Directory holding the description files; archives are published here.
    pub workspace: PathBuf,
    pub extensions: ExtensionConfig,
    pub seven_zip: SevenZipConfig,
    /// Config file path, never staged when it lives inside the workspace.
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionConfig {
    pub description_extension: String,
    pub archive_extension: String,
    /// Extra extensions never copied into a staging directory, e.g. the
    /// extension of the tool itself.
    pub excluded_extensions: Vec<String>,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        let program_extension = std::env::consts::EXE_EXTENSION;
        Self {
            description_extension: "tsp".to_string(),
            archive_extension: "TSW".to_string(),
            excluded_extensions: if program_extension.is_empty() {
                Vec::new()
            } else {
                vec![program_extension.to_string()]
            },
        }
    }
}

impl ExtensionConfig {
    /// The full exclusion set: description, archive and program extensions,
    /// lower-cased for case-insensitive comparison.
    pub fn exclusions(&self) -> Vec<String> {
        let mut set: Vec<String> = [&self.description_extension, &self.archive_extension]
            .into_iter()
            .chain(self.excluded_extensions.iter())
            .map(|e| e.to_ascii_lowercase())
            .collect();
        set.sort();
        set.dedup();
        set
    }
}

/// Typed replacement for the 7-Zip command and switch tables.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SevenZipConfig {
    pub utility: PathBuf,
    pub password: Option<String>,
    pub threads: u32,
    pub compression_level: u8,
    /// Hide the archive listing until unlocked (`-mhe`).
    pub hide_contents: bool,
}

impl Default for SevenZipConfig {
    fn default() -> Self {
        Self {
            utility: default_utility(),
            password: None,
            threads: 2,
            compression_level: 5,
            hide_contents: true,
        }
    }
}

// Keeps the credential out of debug logs.
impl std::fmt::Debug for SevenZipConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SevenZipConfig")
            .field("utility", &self.utility)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("threads", &self.threads)
            .field("compression_level", &self.compression_level)
            .field("hide_contents", &self.hide_contents)
            .finish()
    }
}

#[cfg(windows)]
fn default_utility() -> PathBuf {
    PathBuf::from(r"C:\Program Files\7-Zip\7z.exe")
}

#[cfg(not(windows))]
fn default_utility() -> PathBuf {
    PathBuf::from("7z")
}

impl BundleConfig {
    pub fn new(workspace: PathBuf, password: impl Into<String>) -> Self {
        Self {
            workspace,
            extensions: ExtensionConfig::default(),
            seven_zip: SevenZipConfig {
                password: Some(password.into()),
                ..SevenZipConfig::default()
            },
            config_file: None,
        }
    }

    /// Rejects configurations that would only fail later, mid-run.
    pub fn validate(&self) -> Result<()> {
        let ext = &self.extensions;
        for (name, value) in [
            ("description_extension", &ext.description_extension),
            ("archive_extension", &ext.archive_extension),
        ] {
            check_extension(name, value)?;
        }
        for value in &ext.excluded_extensions {
            check_extension("excluded_extensions", value)?;
        }
        if ext
            .description_extension
            .eq_ignore_ascii_case(&ext.archive_extension)
        {
            return Err(BundleError::Config(
                "description_extension and archive_extension must differ".into(),
            ));
        }

        let zip = &self.seven_zip;
        match zip.password.as_deref() {
            None | Some("") => {
                return Err(BundleError::Config(
                    "archive password is not set (seven_zip.password or TSW_BUNDLE_PASSWORD)"
                        .into(),
                ))
            }
            Some(_) => {}
        }
        if zip.threads == 0 {
            return Err(BundleError::Config("seven_zip.threads must be at least 1".into()));
        }
        if zip.compression_level > 9 {
            return Err(BundleError::Config(format!(
                "seven_zip.compression_level must be 0..=9, got {}",
                zip.compression_level
            )));
        }
        if zip.utility.as_os_str().is_empty() {
            return Err(BundleError::Config("seven_zip.utility must not be empty".into()));
        }
        Ok(())
    }

    pub fn trace_loaded(&self) {
        info!(
            workspace = %self.workspace.display(),
            description_extension = %self.extensions.description_extension,
            archive_extension = %self.extensions.archive_extension,
            utility = %self.seven_zip.utility.display(),
            "Loaded BundleConfig"
        );
        debug!(?self, "BundleConfig loaded (full debug)");
    }
}

fn check_extension(name: &str, value: &str) -> Result<()> {
    if value.is_empty() || value.contains('.') || value.contains(['/', '\\']) {
        return Err(BundleError::Config(format!(
            "{name} must be a bare extension without dots, got {value:?}"
        )));
    }
    Ok(())
}

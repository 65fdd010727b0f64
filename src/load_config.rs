/// `load_config` module: turns an optional YAML file plus the environment into a
/// validated [`BundleConfig`].
///
/// This is the only place where user-supplied YAML is parsed.
///
/// # Responsibilities
/// - Parse the optional config file into the typed sections of [`BundleConfig`]
/// - Inject the archive password from `TSW_BUNDLE_PASSWORD` when set
/// - Validate once, so a bad config fails before any file is touched
///
/// # Errors
/// All errors use `anyhow::Error` with context and are surfaced at the CLI boundary.
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::config::{BundleConfig, ExtensionConfig, SevenZipConfig};

/// Environment variable holding the archive password.
pub const PASSWORD_ENV: &str = "TSW_BUNDLE_PASSWORD";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    extensions: ExtensionConfig,
    seven_zip: SevenZipConfig,
}

/// Builds the run configuration for `workspace`.
///
/// `path` is the optional YAML config file; without it every setting takes
/// its default and the password must come from the environment.
pub fn load_config(path: Option<&Path>, workspace: PathBuf) -> Result<BundleConfig> {
    let raw = match path {
        Some(path) => read_config_file(path)?,
        None => {
            info!("No config file given, using defaults");
            RawConfig::default()
        }
    };

    let mut seven_zip = raw.seven_zip;
    match std::env::var(PASSWORD_ENV) {
        Ok(password) if !password.is_empty() => {
            info!("{PASSWORD_ENV} found in env");
            seven_zip.password = Some(password);
        }
        _ => info!("{PASSWORD_ENV} not set, using password from config file if any"),
    }

    let config = BundleConfig {
        workspace,
        extensions: raw.extensions,
        seven_zip,
        config_file: path.map(Path::to_path_buf),
    };

    if let Err(e) = config.validate() {
        error!(error = %e, "Configuration rejected");
        return Err(e).context("Invalid configuration");
    }
    config.trace_loaded();
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<RawConfig> {
    info!(config_path = ?path, "Loading configuration from file");

    let content = fs::read_to_string(path).map_err(|e| {
        error!(error = ?e, config_path = ?path, "Failed to read config file");
        anyhow::anyhow!("Failed to read config file {:?}: {}", path, e)
    })?;

    // An empty file means "all defaults".
    if content.trim().is_empty() {
        return Ok(RawConfig::default());
    }

    match serde_yaml::from_str(&content) {
        Ok(raw) => {
            info!(config_path = ?path, "Parsed config YAML successfully");
            Ok(raw)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

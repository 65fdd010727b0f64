#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tsw_bundle::config::{BundleConfig, ExtensionConfig};

/// A scratch workspace using the `desc`/`ARCH` extensions.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp workspace"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path().join(name);
        fs::write(&path, content).expect("write workspace file");
        path
    }

    pub fn config(&self) -> BundleConfig {
        let mut config = BundleConfig::new(self.path().to_path_buf(), "test-password");
        config.extensions = ExtensionConfig {
            description_extension: "desc".to_string(),
            archive_extension: "ARCH".to_string(),
            excluded_extensions: vec!["py".to_string()],
        };
        config
    }

    /// Sorted names of everything directly in the workspace.
    pub fn entries(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.path())
            .expect("read workspace")
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Writes the directory listing of `dir` into `dir/name`, standing in for
/// a real archive so tests can see what was staged.
pub fn write_listing_archive(dir: &Path, name: &str) {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    fs::write(dir.join(name), names.join("\n")).unwrap();
}

/// Reads back a listing written by [`write_listing_archive`] or the fake utility.
pub fn read_listing(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.is_empty() && !l.starts_with("args:"))
        .map(str::to_string)
        .collect()
}

/// Installs an executable shell script posing as 7-Zip in `dir`.
#[cfg(unix)]
pub fn install_fake_utility(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-7z");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// Fake 7-Zip that writes the working directory listing and its arguments
/// into the output file (its last argument).
#[cfg(unix)]
pub const LISTING_UTILITY: &str = r#"for out; do :; done
listing=$(ls -1)
printf '%s\n' "$listing" > "$out"
printf 'args: %s\n' "$*" >> "$out""#;

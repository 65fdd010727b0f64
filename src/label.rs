//! Reads the `Model=` label that names a description file's archive.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, error};

use crate::config::LABEL_MARKER;
use crate::error::{BundleError, Result};

/// Returns the text after the first `Model=` marker, up to the end of its line,
/// with surrounding whitespace trimmed.
///
/// Lines are scanned in order and only the first line holding the marker is
/// used. `Ok(None)` means no line carries the marker. Bytes that are not
/// UTF-8 are replaced rather than rejected.
pub fn find_label<R: BufRead>(reader: R) -> std::io::Result<Option<String>> {
    for line in reader.split(b'\n') {
        let line = line?;
        let line = String::from_utf8_lossy(&line);
        if let Some(idx) = line.find(LABEL_MARKER) {
            let value = &line[idx + LABEL_MARKER.len()..];
            return Ok(Some(value.trim_end_matches('\r').trim().to_string()));
        }
    }
    Ok(None)
}

/// Extracts the archive label from the description file at `path`.
pub fn extract_label(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| {
        error!(error = ?e, path = %path.display(), "Failed to open description file");
        BundleError::io("failed to open description file", path, e)
    })?;

    let label = find_label(BufReader::new(file))
        .map_err(|e| BundleError::io("failed to read description file", path, e))?
        .ok_or_else(|| {
            error!(path = %path.display(), "Description file has no Model= label");
            BundleError::MissingLabel {
                path: path.to_path_buf(),
            }
        })?;

    if !is_valid_archive_stem(&label) {
        error!(path = %path.display(), label = %label, "Label cannot name an archive");
        return Err(BundleError::InvalidLabel {
            path: path.to_path_buf(),
            label,
        });
    }

    debug!(path = %path.display(), label = %label, "Extracted label");
    Ok(label)
}

fn is_valid_archive_stem(label: &str) -> bool {
    !label.is_empty()
        && label != "."
        && label != ".."
        && !label.starts_with('-')
        && !label.contains(['/', '\\', '\0'])
}

//! Build-output scanning for upload.
//!
//! Recursively walks the output directory and produces the relative paths
//! to upload, normalized to forward slashes.

use std::path::Path;

use crate::error::DeployError;

/// Version-control metadata directories pruned from the walk.
const EXCLUDED_DIRS: &[&str] = &[".git", ".svn", ".hg"];

/// Scans the build output directory and returns relative file paths.
///
/// Dotfile-prefixed entries are included (e.g.
/// `.well-known/apple-app-site-association`); directories themselves are
/// never listed. Paths use `/` as separator even on Windows and the result
/// is sorted so one enumeration serves both upload and stale-key decisions
/// deterministically.
pub fn scan_output_dir(root: &Path) -> Result<Vec<String>, DeployError> {
    let mut files = Vec::new();
    walk_dir(root, root, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk_dir(root: &Path, current: &Path, files: &mut Vec<String>) -> Result<(), DeployError> {
    let entries = std::fs::read_dir(current)?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let metadata = entry.metadata()?;

        if metadata.is_dir() {
            let name = entry.file_name();
            if EXCLUDED_DIRS.contains(&name.to_string_lossy().as_ref()) {
                continue;
            }
            walk_dir(root, &path, files)?;
        } else if metadata.is_file() {
            let rel_path = path.strip_prefix(root).map_err(std::io::Error::other)?;

            // Normalize to forward slashes.
            files.push(rel_path.to_string_lossy().replace('\\', "/"));
        }
    }

    Ok(())
}

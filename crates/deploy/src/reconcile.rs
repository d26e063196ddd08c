//! Local-to-remote key mapping and stale-key reconciliation.
//!
//! Pure functions: the orchestrator feeds them the file set enumerated in
//! preflight and the remote listing, nothing here touches the network.

use std::collections::HashSet;

/// Computes the remote object key for a local relative path.
///
/// Deterministic in `(sub_folder, relative_path)`: the optional subfolder
/// is prepended with a `/`, and separators are normalized to forward
/// slashes regardless of the local platform convention.
pub fn remote_key(sub_folder: Option<&str>, relative_path: &str) -> String {
    let rel = relative_path.replace('\\', "/");
    match sub_folder {
        Some(sub) if !sub.is_empty() => format!("{sub}/{rel}"),
        _ => rel,
    }
}

/// Maps the local file set to `(relative_path, remote_key)` upload pairs.
pub fn files_to_upload(files: &[String], sub_folder: Option<&str>) -> Vec<(String, String)> {
    files
        .iter()
        .map(|rel| (rel.clone(), remote_key(sub_folder, rel)))
        .collect()
}

/// The set of remote keys the local file set is expected to occupy.
pub fn expected_keys(files: &[String], sub_folder: Option<&str>) -> HashSet<String> {
    files
        .iter()
        .map(|rel| remote_key(sub_folder, rel))
        .collect()
}

/// Returns every remote key not represented in the local file set.
///
/// Set difference by exact string equality, preserving the remote listing
/// order. Anything present remotely but absent from the just-uploaded local
/// set is orphaned and deletable.
pub fn stale_keys(
    remote_keys: &[String],
    files: &[String],
    sub_folder: Option<&str>,
) -> Vec<String> {
    let expected = expected_keys(files, sub_folder);
    remote_keys
        .iter()
        .filter(|key| !expected.contains(*key))
        .cloned()
        .collect()
}

//! Glob-matched per-file upload parameter overrides.
//!
//! Each file starts with default put parameters (content type inferred from
//! the file extension) and every override whose pattern matches the
//! relative path is folded on top in list order, field by field. A later
//! match wins on field collisions.

use globset::GlobBuilder;
use sitedrop_store::UploadParams;
use tracing::warn;

use crate::types::GlobUploadOverride;

/// Override field that replaces the inferred content type instead of
/// landing in the extra parameter map.
pub const CONTENT_TYPE_FIELD: &str = "content_type";

/// Tests a forward-slash-normalized relative path against a glob pattern.
///
/// `*` and `?` stay within one path component, `**` crosses components.
/// A pattern that fails to compile matches nothing.
pub fn matches(relative_path: &str, glob: &str) -> bool {
    let matcher = match GlobBuilder::new(glob).literal_separator(true).build() {
        Ok(compiled) => compiled.compile_matcher(),
        Err(e) => {
            warn!(pattern = glob, error = %e, "invalid upload override pattern");
            return false;
        }
    };
    matcher.is_match(relative_path)
}

/// Computes the put parameters for one file.
///
/// With zero matching overrides the result is the defaults only: the
/// content type inferred from the file name, and no extra fields.
pub fn params_for_file(relative_path: &str, overrides: &[GlobUploadOverride]) -> UploadParams {
    let file_name = relative_path.rsplit('/').next().unwrap_or(relative_path);

    let mut params = UploadParams {
        content_type: mime_guess::from_path(file_name)
            .first_raw()
            .map(str::to_owned),
        extra: serde_json::Map::new(),
    };

    for entry in overrides
        .iter()
        .filter(|entry| matches(relative_path, &entry.glob))
    {
        for (field, value) in &entry.params {
            if field == CONTENT_TYPE_FIELD {
                match value.as_str() {
                    Some(content_type) => params.content_type = Some(content_type.to_owned()),
                    None => warn!(
                        path = relative_path,
                        pattern = %entry.glob,
                        "non-string content_type override, keeping inferred value"
                    ),
                }
            } else {
                params.extra.insert(field.clone(), value.clone());
            }
        }
    }

    params
}

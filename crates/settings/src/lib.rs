//! Deployment settings resolution.
//!
//! Resolves the immutable inputs for one deployment run from a config
//! object and the process environment, once at process start. Precedence
//! per value: deploy-scoped `SITEDROP_*` variable, then the generic
//! provider variable where one exists, then the config object. An empty
//! environment value counts as unset.

use serde::{Deserialize, Serialize};
use tracing::warn;

use sitedrop_deploy::types::{Credentials, DeployTarget, GlobUploadOverride};

/// Deploy-scoped environment variables.
pub const ENV_ACCESS_KEY_ID: &str = "SITEDROP_ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "SITEDROP_SECRET_ACCESS_KEY";
pub const ENV_SESSION_TOKEN: &str = "SITEDROP_SESSION_TOKEN";
pub const ENV_BUCKET: &str = "SITEDROP_BUCKET";
pub const ENV_REGION: &str = "SITEDROP_REGION";
pub const ENV_SUB_FOLDER: &str = "SITEDROP_SUB_FOLDER";
pub const ENV_CDN_DISTRIBUTION_ID: &str = "SITEDROP_CDN_DISTRIBUTION_ID";
/// JSON-encoded override list; wins over the config object's list.
pub const ENV_UPLOAD_OVERRIDES: &str = "SITEDROP_UPLOAD_OVERRIDES";

/// Generic provider fallbacks, honored below the deploy-scoped variables.
pub const ENV_PROVIDER_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const ENV_PROVIDER_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const ENV_PROVIDER_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
pub const ENV_PROVIDER_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";

/// Deploy configuration as provided by the project's config object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployFileConfig {
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub sub_folder: Option<String>,
    pub cdn_distribution_id: Option<String>,
    pub upload_overrides: Vec<GlobUploadOverride>,
    pub delete_before_upload: bool,
    pub delete_after_upload: bool,
}

/// Fully resolved inputs for one deployment run.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub target: DeployTarget,
    pub credentials: Credentials,
    pub overrides: Vec<GlobUploadOverride>,
    pub delete_before_upload: bool,
    pub delete_after_upload: bool,
}

/// Resolves settings from the process environment.
pub fn resolve(config: &DeployFileConfig) -> ResolvedSettings {
    resolve_from(config, |key| std::env::var(key).ok())
}

/// Inner resolution with an injectable environment lookup, for tests.
pub fn resolve_from(
    config: &DeployFileConfig,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedSettings {
    let env = |key: &str| env(key).filter(|value| !value.is_empty());

    let target = DeployTarget {
        bucket: env(ENV_BUCKET)
            .or_else(|| config.bucket.clone())
            .unwrap_or_default(),
        region: env(ENV_REGION)
            .or_else(|| env(ENV_PROVIDER_DEFAULT_REGION))
            .or_else(|| config.region.clone())
            .unwrap_or_default(),
        sub_folder: env(ENV_SUB_FOLDER)
            .or_else(|| config.sub_folder.clone())
            .filter(|value| !value.is_empty()),
        cdn_distribution_id: env(ENV_CDN_DISTRIBUTION_ID)
            .or_else(|| config.cdn_distribution_id.clone())
            .filter(|value| !value.is_empty()),
    };

    let credentials = Credentials {
        access_key_id: env(ENV_ACCESS_KEY_ID)
            .or_else(|| env(ENV_PROVIDER_ACCESS_KEY_ID))
            .unwrap_or_default(),
        secret_access_key: env(ENV_SECRET_ACCESS_KEY)
            .or_else(|| env(ENV_PROVIDER_SECRET_ACCESS_KEY))
            .unwrap_or_default(),
        session_token: env(ENV_SESSION_TOKEN).or_else(|| env(ENV_PROVIDER_SESSION_TOKEN)),
    };

    ResolvedSettings {
        target,
        credentials,
        overrides: resolve_overrides(config, &env),
        delete_before_upload: config.delete_before_upload,
        delete_after_upload: config.delete_after_upload,
    }
}

/// Resolves the upload override list.
///
/// The env JSON wins over the config object's list. A malformed list —
/// invalid JSON, or any entry without a glob pattern — discards the whole
/// list and deploys with defaults instead of failing the run.
fn resolve_overrides(
    config: &DeployFileConfig,
    env: &dyn Fn(&str) -> Option<String>,
) -> Vec<GlobUploadOverride> {
    let list = match env(ENV_UPLOAD_OVERRIDES) {
        Some(raw) => match serde_json::from_str::<Vec<GlobUploadOverride>>(&raw) {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, "invalid JSON in {ENV_UPLOAD_OVERRIDES}, ignoring override list");
                return Vec::new();
            }
        },
        None => config.upload_overrides.clone(),
    };

    if list.iter().any(|entry| entry.glob.is_empty()) {
        warn!("upload override entry without a glob pattern, ignoring override list");
        return Vec::new();
    }
    list
}

//! Data types for the deploy pipeline.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Remote deployment target. Immutable for the duration of one run.
///
/// `sub_folder`, when present, is prepended to every remote key as
/// `sub_folder/relative_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployTarget {
    pub bucket: String,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdn_distribution_id: Option<String>,
}

impl DeployTarget {
    /// The configured subfolder, treating an empty string as unset.
    pub fn sub_folder(&self) -> Option<&str> {
        self.sub_folder.as_deref().filter(|s| !s.is_empty())
    }

    /// The listing prefix for this target (empty = whole bucket).
    pub fn prefix(&self) -> &str {
        self.sub_folder().unwrap_or("")
    }
}

/// Object-store credentials resolved once at process start.
///
/// `session_token` carries temporary (STS-style) credentials through to
/// the store adapter; it plays no part in the preflight gate.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    /// Preflight gate: at least one of the two keys must be present.
    pub fn is_present(&self) -> bool {
        !self.access_key_id.is_empty() || !self.secret_access_key.is_empty()
    }
}

/// A glob pattern plus the put-parameter fields it applies to matching
/// files.
///
/// Entries form an ordered list; several may match the same file and later
/// matches override earlier matches field by field. The flattened `params`
/// map carries every field except `glob` itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobUploadOverride {
    pub glob: String,
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

/// Result reported by the external build collaborator.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub success: bool,
    pub output_dir: PathBuf,
}

/// Full, immutable input to one deployment run.
#[derive(Debug, Clone)]
pub struct DeployPlan {
    pub build: BuildReport,
    pub target: DeployTarget,
    pub credentials: Credentials,
    pub overrides: Vec<GlobUploadOverride>,
    pub delete_before_upload: bool,
    pub delete_after_upload: bool,
}

/// Pipeline phase, used in events and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployPhase {
    Preflight,
    ClearAll,
    Upload,
    CleanupStale,
    Invalidate,
}

impl fmt::Display for DeployPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeployPhase::Preflight => "preflight",
            DeployPhase::ClearAll => "pre-upload clear",
            DeployPhase::Upload => "upload",
            DeployPhase::CleanupStale => "stale cleanup",
            DeployPhase::Invalidate => "cache invalidation",
        };
        f.write_str(name)
    }
}

/// Progress event emitted during a run.
#[derive(Debug, Clone)]
pub enum DeployEvent {
    /// A phase is about to execute.
    PhaseStarted { phase: DeployPhase },
    /// A phase finished successfully.
    PhaseCompleted { phase: DeployPhase },
    /// One file landed in the bucket.
    FileUploaded { key: String },
    /// No CDN distribution configured; invalidation skipped.
    InvalidationSkipped,
    /// Invalidation submitted; carries the provider's status string.
    InvalidationSubmitted { status: String },
    /// The run failed in the named phase.
    Failed { phase: DeployPhase, error: String },
    /// The run completed successfully.
    Completed,
}

/// Terminal result of a deployment run.
///
/// Nothing errors or panics past the orchestrator boundary; every internal
/// failure is captured here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOutcome {
    pub success: bool,
    pub error: Option<String>,
}

impl DeployOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

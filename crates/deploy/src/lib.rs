//! Static build-output deployment pipeline.
//!
//! This crate implements the **business logic** for synchronizing a local
//! build output directory to a remote object store and invalidating a CDN
//! cache afterwards. It is a library crate with no SDK dependencies — the
//! app provides [`RemoteStore`](sitedrop_store::RemoteStore) and
//! [`CacheInvalidator`](sitedrop_store::CacheInvalidator) implementations
//! that bridge to the actual provider clients.
//!
//! # Pipeline
//!
//! 1. **Preflight** — build result, output scan, credential presence
//! 2. **ClearAll** (optional) — delete everything under the prefix
//! 3. **UploadAll** — concurrent per-file uploads with glob overrides
//! 4. **CleanupStale** (optional) — delete remote keys absent locally
//! 5. **Invalidate** — one CDN invalidation at subfolder granularity

pub mod deploy;
pub mod error;
pub mod overrides;
pub mod reconcile;
pub mod scanner;
pub mod types;

// Re-export primary types for convenience.
pub use deploy::DeployOrchestrator;
pub use error::DeployError;
pub use overrides::params_for_file;
pub use reconcile::{expected_keys, files_to_upload, remote_key, stale_keys};
pub use scanner::scan_output_dir;
pub use types::{
    BuildReport, Credentials, DeployEvent, DeployOutcome, DeployPhase, DeployPlan, DeployTarget,
    GlobUploadOverride,
};

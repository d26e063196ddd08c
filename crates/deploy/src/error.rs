//! Deploy error types.

use sitedrop_store::StoreError;

/// Errors produced during a deployment run.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("build step failed: {0}")]
    Build(String),

    #[error("missing object-store credentials (no access key or secret key resolvable)")]
    MissingCredentials,

    #[error(transparent)]
    Store(#[from] StoreError),
}

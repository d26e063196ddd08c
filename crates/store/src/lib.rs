//! Object-store and CDN capability traits.
//!
//! The deploy pipeline talks to the remote side exclusively through the
//! [`RemoteStore`] and [`CacheInvalidator`] traits defined here. The app
//! provides implementations that bridge to the actual provider SDK; the
//! pipeline stays decoupled from any one vendor and testable with mocks.

mod cdn;
mod remote;

pub use cdn::{CacheInvalidator, InvalidationStatus, caller_reference, invalidation_path};
pub use remote::{RemoteStore, UploadParams};

/// Errors produced by remote-store and CDN operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Unreachable(String),

    #[error("listing objects failed: {0}")]
    List(String),

    #[error("upload of '{key}' failed: {reason}")]
    Put { key: String, reason: String },

    #[error("batch delete failed: {0}")]
    Delete(String),

    #[error("cache invalidation failed: {0}")]
    Invalidation(String),
}

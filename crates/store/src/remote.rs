//! Remote object-store capability trait.
//!
//! `RemoteStore` is implemented by the app on top of a concrete provider
//! SDK (S3, GCS, any S3-compatible endpoint). Using a trait keeps the
//! pipeline decoupled from the SDK and testable with mocks.

use std::future::Future;
use std::pin::Pin;

use crate::StoreError;

/// Per-object put parameters.
///
/// `content_type` starts as the value inferred from the file extension and
/// may be overridden by a glob upload override. `extra` carries
/// adapter-interpreted fields (cache-control, ACL, ...) verbatim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadParams {
    pub content_type: Option<String>,
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Abstract remote object store.
///
/// Implementations must clone borrowed arguments into the returned future;
/// the future is only tied to `&self`.
pub trait RemoteStore: Send + Sync {
    /// Fail-fast reachability check for the bucket (head request).
    fn check_reachable(
        &self,
        bucket: &str,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>>;

    /// Returns every object key under `prefix` (empty prefix = whole
    /// bucket). Pagination, if the provider has any, is the adapter's
    /// concern — the caller always sees the complete listing.
    fn list_keys(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<String>, StoreError>> + Send + '_>>;

    /// Writes one object.
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        params: &UploadParams,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>>;

    /// Deletes a batch of objects.
    ///
    /// An empty batch is a no-op that reports success without touching the
    /// network. The orchestrator already short-circuits empty batches;
    /// adapters should guard the same way rather than issue an empty
    /// provider request.
    fn delete_objects(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>>;
}

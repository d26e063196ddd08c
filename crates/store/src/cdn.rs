//! CDN cache invalidation capability trait and path helpers.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::StoreError;

/// Status reported by the provider for a submitted invalidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationStatus {
    pub status: String,
}

/// Abstract CDN invalidation client.
///
/// One call per deployment run, at subfolder granularity. Implementations
/// must clone borrowed arguments into the returned future.
pub trait CacheInvalidator: Send + Sync {
    /// Submits an invalidation for `path_pattern` on the distribution.
    ///
    /// `caller_reference` is the idempotency key required by typical CDN
    /// invalidation APIs; the orchestrator generates a fresh one per call.
    fn invalidate(
        &self,
        distribution_id: &str,
        path_pattern: &str,
        caller_reference: &str,
    ) -> Pin<Box<dyn Future<Output = Result<InvalidationStatus, StoreError>> + Send + '_>>;
}

/// Computes the invalidation path pattern for a run.
///
/// Invalidation is always at subfolder granularity, never per file:
/// `/{sub_folder}/*` when a subfolder is configured, else `/*`.
pub fn invalidation_path(sub_folder: Option<&str>) -> String {
    match sub_folder {
        Some(sub) if !sub.is_empty() => format!("/{sub}/*"),
        _ => "/*".to_string(),
    }
}

/// Generates a caller reference unique within this process.
///
/// Timestamp alone can repeat for calls within the same millisecond, so a
/// process-wide counter is appended.
pub fn caller_reference() -> String {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    format!("sitedrop-{}-{seq}", chrono::Utc::now().timestamp_millis())
}

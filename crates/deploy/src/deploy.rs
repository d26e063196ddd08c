//! Deploy orchestrator: sequences clear, upload, stale cleanup and CDN
//! invalidation.
//!
//! Phases run strictly one after another; within the upload phase all
//! files transfer concurrently. Every failure is caught at this boundary
//! and converted into a [`DeployOutcome`] naming the failing phase.

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use sitedrop_store::{CacheInvalidator, RemoteStore, caller_reference, invalidation_path};

use crate::error::DeployError;
use crate::types::{DeployEvent, DeployOutcome, DeployPhase, DeployPlan};
use crate::{overrides, reconcile, scanner};

/// Orchestrates one deployment run against a remote store and CDN.
pub struct DeployOrchestrator {
    events_tx: mpsc::Sender<DeployEvent>,
    events_rx: Option<mpsc::Receiver<DeployEvent>>,
}

impl Default for DeployOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl DeployOrchestrator {
    /// Creates a new orchestrator.
    pub fn new() -> Self {
        let (events_tx, events_rx) = mpsc::channel(256);
        Self {
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    /// Takes the event receiver. Can only be called once.
    ///
    /// Events are an observability hook, not part of the result contract:
    /// when the receiver is never taken or lags behind, newer events are
    /// dropped instead of stalling the pipeline.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<DeployEvent>> {
        self.events_rx.take()
    }

    /// Emits a progress event without blocking; dropped when the channel
    /// is full.
    fn emit(&self, event: DeployEvent) {
        let _ = self.events_tx.try_send(event);
    }

    /// Runs the full pipeline and returns its terminal outcome.
    ///
    /// No failure escapes this call: a failed phase produces
    /// `DeployOutcome { success: false, error }` with the phase name in the
    /// error message. Uploads that landed before the failure are not
    /// rolled back.
    pub async fn deploy(
        &self,
        plan: &DeployPlan,
        store: &dyn RemoteStore,
        cdn: &dyn CacheInvalidator,
    ) -> DeployOutcome {
        match self.run(plan, store, cdn).await {
            Ok(()) => {
                self.emit(DeployEvent::Completed);
                info!(bucket = %plan.target.bucket, "deploy completed");
                DeployOutcome::ok()
            }
            Err((phase, e)) => {
                let msg = format!("{phase} failed: {e}");
                self.emit(DeployEvent::Failed {
                    phase,
                    error: msg.clone(),
                });
                error!(phase = %phase, error = %e, "deploy failed");
                DeployOutcome::failed(msg)
            }
        }
    }

    async fn run(
        &self,
        plan: &DeployPlan,
        store: &dyn RemoteStore,
        cdn: &dyn CacheInvalidator,
    ) -> Result<(), (DeployPhase, DeployError)> {
        use DeployPhase::*;

        self.phase_started(Preflight);
        let files = self.preflight(plan).await.map_err(|e| (Preflight, e))?;
        self.phase_completed(Preflight);

        if plan.delete_before_upload {
            self.phase_started(ClearAll);
            self.clear_all(plan, store)
                .await
                .map_err(|e| (ClearAll, e))?;
            self.phase_completed(ClearAll);
        }

        self.phase_started(Upload);
        self.upload_all(plan, store, &files)
            .await
            .map_err(|e| (Upload, e))?;
        self.phase_completed(Upload);

        if plan.delete_after_upload {
            self.phase_started(CleanupStale);
            // Reconcile against the preflight enumeration, not a re-scan.
            self.cleanup_stale(plan, store, &files)
                .await
                .map_err(|e| (CleanupStale, e))?;
            self.phase_completed(CleanupStale);
        }

        self.phase_started(Invalidate);
        self.invalidate(plan, cdn)
            .await
            .map_err(|e| (Invalidate, e))?;
        self.phase_completed(Invalidate);

        Ok(())
    }

    /// Verifies the build result, enumerates the output directory and
    /// checks credential presence. Runs before any network call.
    async fn preflight(&self, plan: &DeployPlan) -> Result<Vec<String>, DeployError> {
        if !plan.build.success {
            return Err(DeployError::Build("application build failed".into()));
        }

        let files = scanner::scan_output_dir(&plan.build.output_dir)?;
        if files.is_empty() {
            return Err(DeployError::Build(
                "build produced no files, or the output path is incorrect".into(),
            ));
        }

        if !plan.credentials.is_present() {
            return Err(DeployError::MissingCredentials);
        }

        debug!(files = files.len(), "preflight complete");
        Ok(files)
    }

    /// Deletes every remote object under the configured prefix.
    async fn clear_all(&self, plan: &DeployPlan, store: &dyn RemoteStore) -> Result<(), DeployError> {
        let keys = store
            .list_keys(&plan.target.bucket, plan.target.prefix())
            .await?;
        self.delete_batch(store, &plan.target.bucket, &keys).await
    }

    /// Uploads every file from the preflight enumeration.
    ///
    /// The reachability check runs first; its failure fails the phase with
    /// no transfer attempted. Uploads then run concurrently with no bound
    /// and no inter-file ordering; one failure fails the phase and already
    /// landed objects stay in the bucket.
    async fn upload_all(
        &self,
        plan: &DeployPlan,
        store: &dyn RemoteStore,
        files: &[String],
    ) -> Result<(), DeployError> {
        store.check_reachable(&plan.target.bucket).await?;

        let pairs = reconcile::files_to_upload(files, plan.target.sub_folder());
        let uploads = pairs
            .iter()
            .map(|(rel, key)| self.upload_one(plan, store, rel, key));
        futures_util::future::try_join_all(uploads).await?;

        info!(files = files.len(), bucket = %plan.target.bucket, "all files uploaded");
        Ok(())
    }

    async fn upload_one(
        &self,
        plan: &DeployPlan,
        store: &dyn RemoteStore,
        relative_path: &str,
        key: &str,
    ) -> Result<(), DeployError> {
        let params = overrides::params_for_file(relative_path, &plan.overrides);

        let local_path = plan.build.output_dir.join(relative_path);
        let body = tokio::fs::read(&local_path).await?;

        store
            .put_object(&plan.target.bucket, key, body, &params)
            .await?;

        info!(key = %key, bucket = %plan.target.bucket, "uploaded file");
        self.emit(DeployEvent::FileUploaded {
            key: key.to_string(),
        });
        Ok(())
    }

    /// Deletes remote keys no longer represented in the local file set.
    async fn cleanup_stale(
        &self,
        plan: &DeployPlan,
        store: &dyn RemoteStore,
        files: &[String],
    ) -> Result<(), DeployError> {
        let remote = store
            .list_keys(&plan.target.bucket, plan.target.prefix())
            .await?;
        let stale = reconcile::stale_keys(&remote, files, plan.target.sub_folder());
        self.delete_batch(store, &plan.target.bucket, &stale).await
    }

    /// Deletes a batch of keys. An empty batch reports success without a
    /// network call.
    async fn delete_batch(
        &self,
        store: &dyn RemoteStore,
        bucket: &str,
        keys: &[String],
    ) -> Result<(), DeployError> {
        if keys.is_empty() {
            info!("no objects to delete");
            return Ok(());
        }
        store.delete_objects(bucket, keys).await?;
        info!(deleted = keys.len(), bucket = %bucket, "deleted remote objects");
        Ok(())
    }

    /// Invalidates the CDN cache at subfolder granularity, or skips as
    /// success when no distribution is configured.
    async fn invalidate(
        &self,
        plan: &DeployPlan,
        cdn: &dyn CacheInvalidator,
    ) -> Result<(), DeployError> {
        let distribution_id = plan.target.cdn_distribution_id.as_deref().unwrap_or("");
        if distribution_id.is_empty() {
            info!("no CDN distribution configured, skipping invalidation");
            self.emit(DeployEvent::InvalidationSkipped);
            return Ok(());
        }

        let path = invalidation_path(plan.target.sub_folder());
        let reference = caller_reference();

        info!(path = %path, distribution = distribution_id, "triggering cache invalidation");
        let status = cdn.invalidate(distribution_id, &path, &reference).await?;
        info!(status = %status.status, "invalidation submitted");

        self.emit(DeployEvent::InvalidationSubmitted {
            status: status.status,
        });
        Ok(())
    }

    fn phase_started(&self, phase: DeployPhase) {
        info!(phase = %phase, "phase started");
        self.emit(DeployEvent::PhaseStarted { phase });
    }

    fn phase_completed(&self, phase: DeployPhase) {
        info!(phase = %phase, "phase completed");
        self.emit(DeployEvent::PhaseCompleted { phase });
    }
}

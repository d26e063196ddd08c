fn main() {
    println!("Run `cargo test -p deploy-flow` to execute end-to-end deploy pipeline tests.");
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    use sitedrop_deploy::{
        BuildReport, DeployOrchestrator, DeployPlan,
    };
    use sitedrop_settings::{DeployFileConfig, ResolvedSettings, resolve_from};
    use sitedrop_store::{
        CacheInvalidator, InvalidationStatus, RemoteStore, StoreError, UploadParams,
    };
    use tempfile::TempDir;

    /// In-memory bucket: the store mutates its key set like a real one.
    #[derive(Default)]
    struct InMemoryStore {
        objects: Mutex<HashMap<String, Vec<u8>>>,
        invalidations: Mutex<Vec<(String, String, String)>>,
    }

    impl InMemoryStore {
        fn with_objects(keys: &[&str]) -> Self {
            let store = Self::default();
            {
                let mut objects = store.objects.lock().unwrap();
                for key in keys {
                    objects.insert(key.to_string(), b"stale".to_vec());
                }
            }
            store
        }

        fn keys(&self) -> Vec<String> {
            let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
            keys.sort();
            keys
        }
    }

    impl RemoteStore for InMemoryStore {
        fn check_reachable(
            &self,
            _bucket: &str,
        ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
            Box::pin(async { Ok(()) })
        }

        fn list_keys(
            &self,
            _bucket: &str,
            prefix: &str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<String>, StoreError>> + Send + '_>> {
            let prefix = prefix.to_string();
            Box::pin(async move {
                let mut keys: Vec<String> = self
                    .objects
                    .lock()
                    .unwrap()
                    .keys()
                    .filter(|key| key.starts_with(&prefix))
                    .cloned()
                    .collect();
                keys.sort();
                Ok(keys)
            })
        }

        fn put_object(
            &self,
            _bucket: &str,
            key: &str,
            body: Vec<u8>,
            _params: &UploadParams,
        ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
            let key = key.to_string();
            Box::pin(async move {
                self.objects.lock().unwrap().insert(key, body);
                Ok(())
            })
        }

        fn delete_objects(
            &self,
            _bucket: &str,
            keys: &[String],
        ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
            let keys = keys.to_vec();
            Box::pin(async move {
                assert!(!keys.is_empty(), "delete_objects must never see an empty batch");
                let mut objects = self.objects.lock().unwrap();
                for key in &keys {
                    objects.remove(key);
                }
                Ok(())
            })
        }
    }

    impl CacheInvalidator for InMemoryStore {
        fn invalidate(
            &self,
            distribution_id: &str,
            path_pattern: &str,
            caller_reference: &str,
        ) -> Pin<Box<dyn Future<Output = Result<InvalidationStatus, StoreError>> + Send + '_>>
        {
            let call = (
                distribution_id.to_string(),
                path_pattern.to_string(),
                caller_reference.to_string(),
            );
            Box::pin(async move {
                self.invalidations.lock().unwrap().push(call);
                Ok(InvalidationStatus {
                    status: "InProgress".into(),
                })
            })
        }
    }

    fn output_dir(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for file in files {
            let path = dir.path().join(file);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&path, format!("content of {file}")).unwrap();
        }
        dir
    }

    /// Builds a run input the way the app does: config object + env map
    /// through settings resolution, then the build report on top.
    fn plan_from(
        dir: &TempDir,
        config: &DeployFileConfig,
        env: &[(&str, &str)],
    ) -> DeployPlan {
        let env_map: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let ResolvedSettings {
            target,
            credentials,
            overrides,
            delete_before_upload,
            delete_after_upload,
        } = resolve_from(config, move |key| env_map.get(key).cloned());

        DeployPlan {
            build: BuildReport {
                success: true,
                output_dir: dir.path().to_path_buf(),
            },
            target,
            credentials,
            overrides,
            delete_before_upload,
            delete_after_upload,
        }
    }

    fn base_config() -> DeployFileConfig {
        DeployFileConfig {
            bucket: Some("site-bucket".into()),
            region: Some("eu-west-1".into()),
            ..Default::default()
        }
    }

    const CREDS: &[(&str, &str)] = &[
        ("SITEDROP_ACCESS_KEY_ID", "AK"),
        ("SITEDROP_SECRET_ACCESS_KEY", "SK"),
    ];

    #[tokio::test]
    async fn deploy_with_stale_cleanup() {
        // Two files under subfolder "app", delete-after enabled, a
        // leftover app/old.txt in the bucket.
        let dir = output_dir(&["a.txt", "sub/b.txt"]);
        let mut config = base_config();
        config.sub_folder = Some("app".into());
        config.delete_after_upload = true;
        let plan = plan_from(&dir, &config, CREDS);

        let store = InMemoryStore::with_objects(&["app/old.txt"]);
        let outcome = DeployOrchestrator::new().deploy(&plan, &store, &store).await;

        assert!(outcome.success, "{:?}", outcome.error);
        assert_eq!(store.keys(), vec!["app/a.txt", "app/sub/b.txt"]);
        // No CDN configured, so no invalidation was submitted.
        assert!(store.invalidations.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn deploy_with_clear_and_invalidation() {
        let dir = output_dir(&["index.html", ".well-known/apple-app-site-association"]);
        let mut config = base_config();
        config.delete_before_upload = true;
        config.cdn_distribution_id = Some("EDFDVBD6EXAMPLE".into());
        let plan = plan_from(&dir, &config, CREDS);

        let store = InMemoryStore::with_objects(&["ancient.html", "ancient.css"]);
        let outcome = DeployOrchestrator::new().deploy(&plan, &store, &store).await;

        assert!(outcome.success, "{:?}", outcome.error);
        // Pre-run listing fully cleared, dotfile path uploaded.
        assert_eq!(
            store.keys(),
            vec![".well-known/apple-app-site-association", "index.html"]
        );

        let invalidations = store.invalidations.lock().unwrap();
        assert_eq!(invalidations.len(), 1);
        let (dist, path, reference) = &invalidations[0];
        assert_eq!(dist, "EDFDVBD6EXAMPLE");
        assert_eq!(path, "/*");
        assert!(reference.starts_with("sitedrop-"));
    }

    #[tokio::test]
    async fn rerun_is_idempotent() {
        let dir = output_dir(&["a.txt"]);
        let mut config = base_config();
        config.delete_after_upload = true;
        let plan = plan_from(&dir, &config, CREDS);

        let store = InMemoryStore::with_objects(&["old.txt"]);
        let orch = DeployOrchestrator::new();
        assert!(orch.deploy(&plan, &store, &store).await.success);
        // Second run against the already reconciled bucket: nothing stale,
        // same terminal state.
        assert!(orch.deploy(&plan, &store, &store).await.success);
        assert_eq!(store.keys(), vec!["a.txt"]);
    }

    #[tokio::test]
    async fn env_resolved_overrides_reach_the_store() {
        let dir = output_dir(&["index.html"]);
        let config = base_config();

        let mut env = CREDS.to_vec();
        env.push((
            "SITEDROP_UPLOAD_OVERRIDES",
            r#"[{"glob":"*.html","cache_control":"no-cache"}]"#,
        ));
        let plan = plan_from(&dir, &config, &env);
        assert_eq!(plan.overrides.len(), 1);

        let store = InMemoryStore::default();
        let outcome = DeployOrchestrator::new().deploy(&plan, &store, &store).await;
        assert!(outcome.success);
        assert_eq!(store.keys(), vec!["index.html"]);
    }

    #[tokio::test]
    async fn missing_credentials_leave_bucket_untouched() {
        let dir = output_dir(&["index.html"]);
        let plan = plan_from(&dir, &base_config(), &[]);

        let store = InMemoryStore::with_objects(&["existing.txt"]);
        let outcome = DeployOrchestrator::new().deploy(&plan, &store, &store).await;

        assert!(!outcome.success);
        assert!(outcome.error.as_deref().unwrap().contains("credentials"));
        assert_eq!(store.keys(), vec!["existing.txt"]);
    }
}

//! Apply cycle: synthesize, write, restart

use std::sync::Arc;

use log::{error, info, warn};

use crate::service::ServiceManager;
use crate::store::{Store, StoreError};

use super::document::{synthesize, HysteriaConfig};
use super::writer::{ConfigWriter, SynthesisError};

/// Result of one apply cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Config written and service restarted
    Applied,
    /// Config not (fully) written; restart skipped
    WriteFailed(String),
    /// Config written but the restart failed; the live server runs the old config
    RestartFailed(String),
}

impl ApplyOutcome {
    /// Whether the new document reached disk
    pub fn config_written(&self) -> bool {
        !matches!(self, ApplyOutcome::WriteFailed(_))
    }
}

/// Failure of [`ApplyController::regenerate`]
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}

/// Drives synthesize → write → restart
#[derive(Clone)]
pub struct ApplyController {
    writer: ConfigWriter,
    service: Arc<dyn ServiceManager>,
}

impl ApplyController {
    pub fn new(writer: ConfigWriter, service: Arc<dyn ServiceManager>) -> Self {
        Self { writer, service }
    }

    pub fn service(&self) -> &Arc<dyn ServiceManager> {
        &self.service
    }

    /// Build the document from current store contents.
    pub async fn render(&self, store: &Store) -> Result<HysteriaConfig, StoreError> {
        let settings = store.load_settings().await?;
        let users = store.active_users().await?;
        Ok(synthesize(&settings, &users))
    }

    /// Render and write the document without touching the service.
    pub async fn regenerate(&self, store: &Store) -> Result<(), ApplyError> {
        let config = self.render(store).await?;
        self.writer.write(&config).await?;
        Ok(())
    }

    /// [`regenerate`](Self::regenerate) for process startup.
    ///
    /// An unwritable config path is logged and reported as `false`; the
    /// console still has to come up so the operator can fix it. Store
    /// failures propagate.
    pub async fn regenerate_on_startup(&self, store: &Store) -> Result<bool, StoreError> {
        match self.regenerate(store).await {
            Ok(()) => Ok(true),
            Err(ApplyError::Store(e)) => Err(e),
            Err(ApplyError::Synthesis(e)) => {
                error!("Startup config write failed, serving anyway: {}", e);
                Ok(false)
            }
        }
    }

    /// Run the full cycle.
    ///
    /// Store errors are returned as errors. Write and restart failures are
    /// reported through the outcome; the restart is only attempted after a
    /// successful write. Nothing is retried or rolled back.
    pub async fn apply(&self, store: &Store) -> Result<ApplyOutcome, StoreError> {
        match self.regenerate(store).await {
            Ok(()) => {}
            Err(ApplyError::Store(e)) => return Err(e),
            Err(ApplyError::Synthesis(e)) => {
                error!("Config synthesis failed, skipping restart: {}", e);
                return Ok(ApplyOutcome::WriteFailed(e.to_string()));
            }
        }

        match self.service.restart().await {
            Ok(()) => {
                info!("Hysteria service restarted with new configuration");
                Ok(ApplyOutcome::Applied)
            }
            Err(e) => {
                warn!("Config written but restart failed: {}", e);
                Ok(ApplyOutcome::RestartFailed(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{MockServiceManager, ServiceError};
    use crate::store::{NewUser, UserUpdate};
    use tempfile::tempdir;

    fn read_password(path: &std::path::Path) -> serde_yaml::Value {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        yaml["auth"]["password"].clone()
    }

    fn restarting_service(times: usize) -> Arc<dyn ServiceManager> {
        let mut service = MockServiceManager::new();
        service.expect_restart().times(times).returning(|| Ok(()));
        Arc::new(service)
    }

    #[tokio::test]
    async fn test_apply_cycle_end_to_end() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let store = Store::open_in_memory().await.unwrap();
        let controller = ApplyController::new(ConfigWriter::new(&path), restarting_service(3));

        store.create_user(&NewUser::new("alice", "pw1")).await.unwrap();
        let bob = store.create_user(&NewUser::new("bob", "pw2")).await.unwrap();
        let mut deactivate = UserUpdate {
            username: "bob".to_string(),
            password: None,
            upload_mbps: 100,
            download_mbps: 100,
            total_traffic_gb: 0,
            expiry_date: None,
            is_active: false,
        };
        store.update_user(bob.id, &deactivate).await.unwrap();

        assert_eq!(controller.apply(&store).await.unwrap(), ApplyOutcome::Applied);
        assert_eq!(read_password(&path), serde_yaml::Value::from("pw1"));

        deactivate.is_active = true;
        store.update_user(bob.id, &deactivate).await.unwrap();
        assert_eq!(controller.apply(&store).await.unwrap(), ApplyOutcome::Applied);
        let list: Vec<String> = serde_yaml::from_value(read_password(&path)).unwrap();
        assert_eq!(list, vec!["pw1", "pw2"]);

        for user in store.list_users().await.unwrap() {
            store.delete_user(user.id).await.unwrap();
        }
        assert_eq!(controller.apply(&store).await.unwrap(), ApplyOutcome::Applied);
        assert_eq!(read_password(&path), serde_yaml::Value::from("changeme"));
    }

    #[tokio::test]
    async fn test_deleted_user_is_not_rendered() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let store = Store::open_in_memory().await.unwrap();
        let controller = ApplyController::new(ConfigWriter::new(&path), restarting_service(1));

        store.create_user(&NewUser::new("alice", "pw1")).await.unwrap();
        let bob = store.create_user(&NewUser::new("bob", "secret-bob")).await.unwrap();
        store.create_user(&NewUser::new("carol", "pw3")).await.unwrap();
        assert!(store.delete_user(bob.id).await.unwrap());

        controller.apply(&store).await.unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("secret-bob"));
        let list: Vec<String> = serde_yaml::from_value(read_password(&path)).unwrap();
        assert_eq!(list, vec!["pw1", "pw3"]);
    }

    #[tokio::test]
    async fn test_write_failure_skips_restart() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let mut service = MockServiceManager::new();
        service.expect_restart().never();

        let store = Store::open_in_memory().await.unwrap();
        let controller =
            ApplyController::new(ConfigWriter::new(blocker.join("config.yaml")), Arc::new(service));

        let outcome = controller.apply(&store).await.unwrap();
        assert!(matches!(outcome, ApplyOutcome::WriteFailed(_)));
        assert!(!outcome.config_written());
    }

    #[tokio::test]
    async fn test_restart_failure_is_non_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut service = MockServiceManager::new();
        service.expect_restart().times(1).returning(|| {
            Err(ServiceError::Failed {
                command: "systemctl restart hysteria".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "Unit hysteria.service not found.".to_string(),
            })
        });

        let store = Store::open_in_memory().await.unwrap();
        let controller = ApplyController::new(ConfigWriter::new(&path), Arc::new(service));

        let outcome = controller.apply(&store).await.unwrap();
        match &outcome {
            ApplyOutcome::RestartFailed(reason) => assert!(reason.contains("not found")),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(outcome.config_written());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_regenerate_does_not_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut service = MockServiceManager::new();
        service.expect_restart().never();

        let store = Store::open_in_memory().await.unwrap();
        let controller = ApplyController::new(ConfigWriter::new(&path), Arc::new(service));
        controller.regenerate(&store).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_startup_write_failure_is_not_an_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let mut service = MockServiceManager::new();
        service.expect_restart().never();

        let store = Store::open_in_memory().await.unwrap();
        let controller =
            ApplyController::new(ConfigWriter::new(blocker.join("config.yaml")), Arc::new(service));

        assert!(matches!(
            controller.regenerate(&store).await,
            Err(ApplyError::Synthesis(SynthesisError::Write { .. }))
        ));
        assert!(!controller.regenerate_on_startup(&store).await.unwrap());
    }

    #[tokio::test]
    async fn test_startup_write_success() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut service = MockServiceManager::new();
        service.expect_restart().never();

        let store = Store::open_in_memory().await.unwrap();
        let controller = ApplyController::new(ConfigWriter::new(&path), Arc::new(service));
        assert!(controller.regenerate_on_startup(&store).await.unwrap());
        assert!(path.exists());
    }
}

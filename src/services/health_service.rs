use crate::adapters::storage::SubmissionStore;
use crate::config::HealthConfig;
use crate::services::relay::MailRelay;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

#[derive(Clone, Debug)]
pub struct HealthService {
    store: Option<Arc<dyn SubmissionStore>>,
    relay: Arc<dyn MailRelay>,
    config: HealthConfig,
}

impl HealthService {
    #[must_use]
    pub fn new(store: Option<Arc<dyn SubmissionStore>>, relay: Arc<dyn MailRelay>, config: HealthConfig) -> Self {
        Self { store, relay, config }
    }

    /// Checks the submission store, if this deployment has one.
    ///
    /// Returns `None` when running without storage.
    pub async fn check_storage(&self) -> Option<Result<(), String>> {
        let store = self.store.as_ref()?;
        let storage_timeout = Duration::from_millis(self.config.storage_timeout_ms);

        Some(match timeout(storage_timeout, store.check()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(format!("Storage check failed: {e}")),
            Err(_) => Err("Storage check timed out".to_string()),
        })
    }

    /// Checks that the mail provider accepts our credentials.
    ///
    /// # Errors
    /// Returns a string describing the failure if the relay is unreachable or rejects us.
    pub async fn check_mail(&self) -> Result<(), String> {
        let mail_timeout = Duration::from_millis(self.config.mail_timeout_ms);

        match timeout(mail_timeout, self.relay.verify()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(format!("Mail relay check failed: {e}")),
            Err(_) => Err("Mail relay check timed out".to_string()),
        }
    }
}

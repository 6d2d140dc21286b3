use crate::adapters::storage::SubmissionStore;
use crate::domain::submission::ContactForm;
use crate::error::Result;
use crate::domain::mail::OutgoingMail;
use crate::services::relay::{MailRelay, RelayError};
use crate::services::render::render;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;

/// Runs the contact pipeline: validate, persist, render, relay.
///
/// With a store, the submission is durable before the relay is tried, so relay failures are
/// logged and dropped. Without a store, the relay is the only record and its failures are
/// returned to the caller. Either way the relay gets at most `relay_budget`.
#[derive(Clone, Debug)]
pub struct ContactService {
    store: Option<Arc<dyn SubmissionStore>>,
    relay: Arc<dyn MailRelay>,
    relay_budget: Duration,
}

impl ContactService {
    #[must_use]
    pub fn new(store: Option<Arc<dyn SubmissionStore>>, relay: Arc<dyn MailRelay>, relay_budget: Duration) -> Self {
        Self { store, relay, relay_budget }
    }

    #[must_use]
    pub const fn persists(&self) -> bool {
        self.store.is_some()
    }

    /// Accepts one contact form submission.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if a field is missing or empty.
    /// Returns `AppError::Persistence` if the store cannot save the submission.
    /// Returns `AppError::Delivery` if there is no store and the relay fails or runs out of time.
    #[tracing::instrument(skip_all, fields(persists = self.persists()))]
    pub async fn submit(&self, form: ContactForm) -> Result<()> {
        let submission = form.validate(OffsetDateTime::now_utc())?;

        if let Some(store) = &self.store {
            let receipt = store.persist(&submission).await?;
            tracing::info!(
                ledger = %receipt.ledger_path.display(),
                snapshot = %receipt.snapshot_path.display(),
                "Submission saved"
            );

            let mail = render(&submission);
            match self.relay_within_budget(&mail, false).await {
                Ok(()) => tracing::info!("Email sent successfully"),
                Err(e) => tracing::error!(error = %e, "Error sending email, submission is still saved"),
            }
            return Ok(());
        }

        let mail = render(&submission);
        self.relay_within_budget(&mail, true).await?;
        tracing::info!("Email sent successfully");
        Ok(())
    }

    async fn relay_within_budget(
        &self,
        mail: &OutgoingMail,
        verify_first: bool,
    ) -> std::result::Result<(), RelayError> {
        let relay = async {
            if verify_first {
                self.relay.verify().await?;
            }
            self.relay.send(mail).await
        };

        tokio::time::timeout(self.relay_budget, relay)
            .await
            .unwrap_or_else(|_| Err(RelayError::TimedOut(self.relay_budget)))
    }
}

use crate::domain::mail::OutgoingMail;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Invalid mailbox address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
    #[error("Mail server did not accept the connection")]
    Unavailable,
    #[error("Mail relay did not finish within {0:?}")]
    TimedOut(std::time::Duration),
    #[error("External service error: {0}")]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait MailRelay: Send + Sync + std::fmt::Debug {
    /// Checks that the provider accepts our credentials.
    ///
    /// # Errors
    /// Returns `RelayError::Unavailable` if the server refuses the session, or the transport
    /// error that prevented the check.
    async fn verify(&self) -> Result<(), RelayError>;

    /// Delivers one message to the configured recipient. Attempted exactly once.
    ///
    /// # Errors
    /// Returns the error that prevented delivery.
    async fn send(&self, mail: &OutgoingMail) -> Result<(), RelayError>;
}

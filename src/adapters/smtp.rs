use crate::config::MailConfig;
use crate::domain::mail::OutgoingMail;
use crate::services::relay::{MailRelay, RelayError};
use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::fmt;
use std::time::Duration;

/// Relays contact notifications through an authenticated SMTP provider.
pub struct SmtpRelay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpRelay {
    /// Builds the transport. No connection is opened until `verify` or `send`.
    ///
    /// # Errors
    /// Returns `RelayError::Address` if the account or recipient address is malformed, or
    /// `RelayError::Transport` if the relay host cannot be used for TLS.
    pub fn new(config: &MailConfig) -> Result<Self, RelayError> {
        let from: Mailbox = config.smtp_user.parse()?;
        let to: Mailbox = config.recipient().parse()?;

        let credentials = Credentials::new(config.smtp_user.clone(), config.smtp_password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
            .credentials(credentials)
            .timeout(Some(Duration::from_secs(config.smtp_timeout_secs)))
            .build();

        Ok(Self { transport, host: config.smtp_host.clone(), from, to })
    }

    fn build_message(&self, mail: &OutgoingMail) -> Result<Message, RelayError> {
        let mut builder = Message::builder().from(self.from.clone()).to(self.to.clone());

        // Submitter addresses are not validated upstream; an unusable one only costs us the
        // Reply-To header.
        match mail.reply_to.parse::<Mailbox>() {
            Ok(reply_to) => builder = builder.reply_to(reply_to),
            Err(e) => tracing::warn!(error = %e, "Submitter email is not a valid mailbox, omitting Reply-To"),
        }

        Ok(builder.subject(mail.subject.as_str()).header(ContentType::TEXT_HTML).body(mail.html.clone())?)
    }
}

impl fmt::Debug for SmtpRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpRelay").field("host", &self.host).field("to", &self.to).finish_non_exhaustive()
    }
}

#[async_trait]
impl MailRelay for SmtpRelay {
    #[tracing::instrument(skip(self), fields(host = %self.host))]
    async fn verify(&self) -> Result<(), RelayError> {
        if self.transport.test_connection().await? {
            Ok(())
        } else {
            Err(RelayError::Unavailable)
        }
    }

    #[tracing::instrument(skip_all, fields(host = %self.host))]
    async fn send(&self, mail: &OutgoingMail) -> Result<(), RelayError> {
        let message = self.build_message(mail)?;
        self.transport.send(message).await?;
        Ok(())
    }
}

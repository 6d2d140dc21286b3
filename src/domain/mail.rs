/// A rendered notification ready for the mail relay.
///
/// Sender and recipient come from the relay's configuration, not from the submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub subject: String,
    pub html: String,
    pub reply_to: String,
}

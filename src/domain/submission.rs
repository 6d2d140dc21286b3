use crate::error::AppError;
use serde::Deserialize;
use time::OffsetDateTime;

/// Contact form body as sent by the browser.
///
/// Every field is optional on the wire so that a missing field surfaces as a validation
/// failure instead of a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
}

impl ContactForm {
    /// Parses a request body. A body that is not a JSON object of strings is treated as an
    /// empty form.
    #[must_use]
    pub fn from_json(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Unreadable contact form body, treating as empty");
            Self::default()
        })
    }

    /// Accepts the form if all four fields are present and non-empty.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if any field is missing or empty.
    pub fn validate(self, received_at: OffsetDateTime) -> Result<Submission, AppError> {
        match (present(self.name), present(self.email), present(self.phone), present(self.message)) {
            (Some(name), Some(email), Some(phone), Some(message)) => {
                Ok(Submission { name, email, phone, message, received_at })
            }
            _ => Err(AppError::Validation),
        }
    }
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.is_empty())
}

/// A validated contact-form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    name: String,
    email: String,
    phone: String,
    message: String,
    received_at: OffsetDateTime,
}

impl Submission {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// ISO-8601 UTC with millisecond precision, e.g. `2024-05-01T10:20:30.123Z`.
    #[must_use]
    pub fn iso_timestamp(&self) -> String {
        let t = self.received_at.to_offset(time::UtcOffset::UTC);
        format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
            t.year(),
            u8::from(t.month()),
            t.day(),
            t.hour(),
            t.minute(),
            t.second(),
            t.millisecond()
        )
    }

    /// Human-readable receipt time used in snapshots and emails.
    #[must_use]
    pub fn display_timestamp(&self) -> String {
        let t = self.received_at.to_offset(time::UtcOffset::UTC);
        format!(
            "{} {}, {} {:02}:{:02}:{:02} UTC",
            t.month(),
            t.day(),
            t.year(),
            t.hour(),
            t.minute(),
            t.second()
        )
    }

    #[must_use]
    pub fn unix_millis(&self) -> i128 {
        self.received_at.unix_timestamp_nanos() / 1_000_000
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use time::macros::datetime;

    pub(crate) fn form(name: &str, email: &str, phone: &str, message: &str) -> ContactForm {
        ContactForm {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            phone: Some(phone.to_string()),
            message: Some(message.to_string()),
        }
    }

    pub(crate) fn submission(message: &str) -> Submission {
        form("Ana", "a@b.com", "123", message)
            .validate(datetime!(2024-05-01 10:20:30.123456 UTC))
            .unwrap()
    }

    #[test]
    fn test_accepts_complete_form() {
        let s = submission("Hi\nthere");
        assert_eq!(s.name(), "Ana");
        assert_eq!(s.email(), "a@b.com");
        assert_eq!(s.phone(), "123");
        assert_eq!(s.message(), "Hi\nthere");
    }

    #[test]
    fn test_rejects_any_missing_or_empty_field() {
        let now = OffsetDateTime::now_utc();
        let cases = [
            ContactForm { name: None, ..form("a", "b", "c", "d") },
            ContactForm { email: None, ..form("a", "b", "c", "d") },
            ContactForm { phone: Some(String::new()), ..form("a", "b", "c", "d") },
            ContactForm { message: Some(String::new()), ..form("a", "b", "c", "d") },
            ContactForm::default(),
        ];

        for case in cases {
            assert!(matches!(case.validate(now), Err(AppError::Validation)));
        }
    }

    #[test]
    fn test_whitespace_counts_as_present() {
        assert!(form(" ", " ", " ", " ").validate(OffsetDateTime::now_utc()).is_ok());
    }

    #[test]
    fn test_from_json_tolerates_garbage() {
        let form = ContactForm::from_json(b"not json at all");
        assert!(form.name.is_none());

        let form = ContactForm::from_json(br#"{"name": 42, "email": "x"}"#);
        assert!(form.email.is_none());

        let form = ContactForm::from_json(br#"{"name": "Ana", "extra": true}"#);
        assert_eq!(form.name.as_deref(), Some("Ana"));
        assert!(form.message.is_none());
    }

    #[test]
    fn test_timestamps() {
        let s = submission("x");
        assert_eq!(s.iso_timestamp(), "2024-05-01T10:20:30.123Z");
        assert_eq!(s.display_timestamp(), "May 1, 2024 10:20:30 UTC");
        assert_eq!(s.unix_millis(), 1_714_558_830_123);
    }
}

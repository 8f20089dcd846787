//! Outbound email. Business code sends through the [`Sender`] capability and
//! never learns which provider is wired in.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod postmark;
pub mod smtp;

pub use postmark::PostmarkClient;
pub use smtp::SmtpMailer;

/// One outbound message. All fields optional at construction; [`Email::validate`]
/// enforces the minimum a provider will accept.
#[derive(Debug, Clone, Default)]
pub struct Email {
    pub from: Option<String>,
    pub to: Option<String>,
    pub subject: Option<String>,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
}

impl Email {
    /// Require a sender, a recipient, and at least one body. Providers call
    /// this before touching the wire.
    pub fn validate(&self) -> Result<(), MailError> {
        if self.from.as_deref().map_or(true, str::is_empty) {
            return Err(MailError::Invalid("from address is required".into()));
        }
        if self.to.as_deref().map_or(true, str::is_empty) {
            return Err(MailError::Invalid("to address is required".into()));
        }
        let has_body = self.html_body.as_deref().map_or(false, |b| !b.is_empty())
            || self.text_body.as_deref().map_or(false, |b| !b.is_empty());
        if !has_body {
            return Err(MailError::Invalid(
                "either an html or a text body is required".into(),
            ));
        }
        Ok(())
    }
}

/// Proof of submission from a provider.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub message_id: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid email: {0}")]
    Invalid(String),

    /// The provider accepted the request but rejected the message.
    #[error("provider rejected message (code {code}): {message}")]
    Provider { code: i64, message: String },

    #[error("smtp delivery failed: {0}")]
    Smtp(String),

    #[error("email request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// The one seam between business logic and a concrete mail provider.
#[async_trait]
pub trait Sender: Send + Sync {
    async fn send_email(&self, email: &Email) -> Result<Receipt, MailError>;
}

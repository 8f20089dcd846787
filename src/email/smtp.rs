//! Direct SMTP provider, used when no HTTP provider token is configured.

use async_trait::async_trait;
use chrono::Utc;
use lettre::message::{header::ContentType, Mailbox, MultiPart, SinglePart};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{Email, MailError, Receipt, Sender};

/// SMTP relays have no message id to hand back, so receipts carry a fixed
/// marker instead.
const LOCAL_MESSAGE_ID: &str = "smtp-local";

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Connect to `host:port` with STARTTLS. Credentials are deliberately not
    /// taken here; the relays this targets authenticate by network origin.
    pub fn new(host: &str, port: u16) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| MailError::Smtp(e.to_string()))?
            .port(port)
            .build();
        Ok(SmtpMailer { transport })
    }

    fn build_message(email: &Email) -> Result<Message, MailError> {
        let from: Mailbox = email
            .from
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(|e| MailError::Invalid(format!("bad from address: {e}")))?;
        let to: Mailbox = email
            .to
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(|e| MailError::Invalid(format!("bad to address: {e}")))?;

        let builder = Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject.as_deref().unwrap_or_default());

        let msg = match (email.text_body.as_deref(), email.html_body.as_deref()) {
            (Some(text), Some(html)) => builder.multipart(MultiPart::alternative_plain_html(
                text.to_string(),
                html.to_string(),
            )),
            (None, Some(html)) => builder.singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_HTML)
                    .body(html.to_string()),
            ),
            (Some(text), None) => builder.singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_PLAIN)
                    .body(text.to_string()),
            ),
            (None, None) => {
                return Err(MailError::Invalid(
                    "either an html or a text body is required".into(),
                ))
            }
        };
        msg.map_err(|e| MailError::Invalid(format!("could not build message: {e}")))
    }
}

#[async_trait]
impl Sender for SmtpMailer {
    async fn send_email(&self, email: &Email) -> Result<Receipt, MailError> {
        email.validate()?;
        let message = Self::build_message(email)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Smtp(e.to_string()))?;

        tracing::debug!(to = email.to.as_deref().unwrap_or_default(), "message relayed over smtp");
        Ok(Receipt {
            message_id: LOCAL_MESSAGE_ID.to_string(),
            submitted_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_builds_with_both_bodies() {
        let email = Email {
            from: Some("ops@example.com".into()),
            to: Some("buyer@example.com".into()),
            subject: Some("Weekly reminder".into()),
            html_body: Some("<p>hi</p>".into()),
            text_body: Some("hi".into()),
        };
        assert!(SmtpMailer::build_message(&email).is_ok());
    }

    #[test]
    fn malformed_address_is_invalid() {
        let email = Email {
            from: Some("not-an-address".into()),
            to: Some("buyer@example.com".into()),
            subject: Some("x".into()),
            text_body: Some("hi".into()),
            ..Default::default()
        };
        assert!(matches!(
            SmtpMailer::build_message(&email),
            Err(MailError::Invalid(_))
        ));
    }
}

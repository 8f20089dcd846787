//! Postmark-style HTTP provider. One POST per message, authenticated with a
//! server token header.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Email, MailError, Receipt, Sender};

const DEFAULT_BASE_URL: &str = "https://api.postmarkapp.com";
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    html_body: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text_body: Option<&'a str>,
    message_stream: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SendResponse {
    #[serde(default, rename = "MessageID")]
    message_id: String,
    #[serde(default)]
    submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    error_code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Clone)]
pub struct PostmarkClient {
    base_url: String,
    server_token: String,
    http: reqwest::Client,
}

impl PostmarkClient {
    pub fn new(server_token: impl Into<String>) -> Result<Self, MailError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(PostmarkClient {
            base_url: DEFAULT_BASE_URL.to_string(),
            server_token: server_token.into(),
            http,
        })
    }

    /// Point the client at a different API host (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Sender for PostmarkClient {
    async fn send_email(&self, email: &Email) -> Result<Receipt, MailError> {
        email.validate()?;

        let req = SendRequest {
            from: email.from.as_deref().unwrap_or_default(),
            to: email.to.as_deref().unwrap_or_default(),
            subject: email.subject.as_deref(),
            html_body: email.html_body.as_deref(),
            text_body: email.text_body.as_deref(),
            message_stream: "outbound",
        };

        let resp = self
            .http
            .post(format!("{}/email", self.base_url))
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header("X-Postmark-Server-Token", &self.server_token)
            .json(&req)
            .send()
            .await?;

        // Both transport-level failures and accepted-but-rejected submissions
        // carry an {ErrorCode, Message} pair.
        let status = resp.status();
        let body: SendResponse = resp.json().await?;
        if !status.is_success() || body.error_code != 0 {
            return Err(MailError::Provider {
                code: body.error_code,
                message: body.message,
            });
        }

        tracing::debug!(message_id = %body.message_id, "message accepted by provider");
        Ok(Receipt {
            message_id: body.message_id,
            submitted_at: body.submitted_at.unwrap_or_else(Utc::now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn email() -> Email {
        Email {
            from: Some("ops@example.com".into()),
            to: Some("buyer@example.com".into()),
            subject: Some("Weekly reminder".into()),
            html_body: Some("<p>hi</p>".into()),
            text_body: Some("hi".into()),
        }
    }

    #[tokio::test]
    async fn accepted_message_yields_a_receipt() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/email")
                .header("X-Postmark-Server-Token", "pm-token")
                .body_includes(r#""From":"ops@example.com""#)
                .body_includes(r#""To":"buyer@example.com""#);
            then.status(200).json_body(serde_json::json!({
                "To": "buyer@example.com",
                "SubmittedAt": "2025-06-06T10:00:12Z",
                "MessageID": "msg-123",
                "ErrorCode": 0,
                "Message": "OK"
            }));
        });

        let client = PostmarkClient::new("pm-token")
            .unwrap()
            .with_base_url(server.url(""));
        let receipt = client.send_email(&email()).await.unwrap();
        assert_eq!(receipt.message_id, "msg-123");
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn provider_error_surfaces_code_and_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/email");
            then.status(422).json_body(serde_json::json!({
                "ErrorCode": 300,
                "Message": "Invalid 'To' address"
            }));
        });

        let client = PostmarkClient::new("pm-token")
            .unwrap()
            .with_base_url(server.url(""));
        let err = client.send_email(&email()).await.unwrap_err();
        match err {
            MailError::Provider { code, message } => {
                assert_eq!(code, 300);
                assert_eq!(message, "Invalid 'To' address");
            }
            other => panic!("expected Provider, got: {other}"),
        }
    }

    #[tokio::test]
    async fn invalid_email_never_reaches_the_wire() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/email");
            then.status(200);
        });

        let client = PostmarkClient::new("pm-token")
            .unwrap()
            .with_base_url(server.url(""));
        let err = client.send_email(&Email::default()).await.unwrap_err();
        assert!(matches!(err, MailError::Invalid(_)));
        assert_eq!(mock.calls(), 0);
    }
}

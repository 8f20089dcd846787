use anyhow::{bail, Context, Result};
use std::env;

/// Which email provider the service is wired to.
#[derive(Debug, Clone)]
pub enum MailProvider {
    /// Postmark-style HTTP API, authenticated with a server token.
    Postmark { server_token: String },
    /// Direct SMTP relay.
    Smtp { host: String, port: u16 },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub orderspace_client_id: String,
    pub orderspace_client_secret: String,
    pub database_url: Option<String>,
    pub mail_provider: MailProvider,
    pub mail_from: String,
    pub preview_recipient: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from the process environment. A `.env` file is
    /// honored if present but never required (containers set variables
    /// directly).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let orderspace_client_id =
            env::var("ORDERSPACE_CLIENT_ID").context("ORDERSPACE_CLIENT_ID is required")?;
        let orderspace_client_secret =
            env::var("ORDERSPACE_CLIENT_SECRET").context("ORDERSPACE_CLIENT_SECRET is required")?;

        let mail_provider = resolve_provider(
            env::var("POSTMARK_SERVER_TOKEN").ok(),
            env::var("SMTP_HOST").ok(),
            env::var("SMTP_PORT").ok(),
        )?;

        let mail_from = env::var("MAIL_FROM").context("MAIL_FROM is required")?;
        let preview_recipient =
            env::var("PREVIEW_RECIPIENT").unwrap_or_else(|_| mail_from.clone());

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        Ok(Config {
            orderspace_client_id,
            orderspace_client_secret,
            database_url: env::var("DATABASE_URL").ok(),
            mail_provider,
            mail_from,
            preview_recipient,
            port,
        })
    }
}

fn resolve_provider(
    postmark_token: Option<String>,
    smtp_host: Option<String>,
    smtp_port: Option<String>,
) -> Result<MailProvider> {
    match (postmark_token, smtp_host) {
        (Some(server_token), _) if !server_token.is_empty() => {
            Ok(MailProvider::Postmark { server_token })
        }
        (_, Some(host)) if !host.is_empty() => {
            let port = match smtp_port {
                Some(p) if !p.is_empty() => p
                    .parse()
                    .with_context(|| format!("invalid SMTP_PORT: {p}"))?,
                _ => 587,
            };
            Ok(MailProvider::Smtp { host, port })
        }
        _ => bail!("either SMTP_HOST or POSTMARK_SERVER_TOKEN is required"),
    }
}

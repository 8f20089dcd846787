//! Orderspace API client: OAuth2 client-credentials token cache backed by the
//! `tokens` table, plus the authenticated request path every typed operation
//! goes through.

use chrono::{Duration, Utc};
use reqwest::Method;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::db::queries;
use crate::error::{Error, Result};

pub mod customer;
pub mod order;
pub mod product;

pub use customer::{CustomerListParams, CustomerPage};
pub use order::{
    OrderLineRequest, OrderListParams, OrderPage, OrderRequest, OrderRequestBody,
};
pub use product::{ProductListParams, ProductPage};

const DEFAULT_BASE_URL: &str = "https://api.orderspace.com/v1";
const DEFAULT_TOKEN_URL: &str = "https://identity.orderspace.com/oauth/token";

/// Provider tokens are valid for 30 minutes; reuse below 25 to keep a safety
/// margin.
const TOKEN_MAX_AGE_MINUTES: i64 = 25;

const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct AuthResponse {
    access_token: String,
    #[serde(default)]
    #[allow(dead_code)]
    token_type: String,
    #[serde(default)]
    #[allow(dead_code)]
    expires_in: i64,
    #[serde(default)]
    #[allow(dead_code)]
    scope: String,
}

/// Authenticated Orderspace client. Cheap to clone; the reqwest client and
/// pool are internally shared.
#[derive(Clone)]
pub struct Client {
    base_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    http: reqwest::Client,
    pool: SqlitePool,
}

impl Client {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        pool: SqlitePool,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Client {
            base_url: DEFAULT_BASE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            http,
            pool,
        })
    }

    /// Point the client at a different API host (tests, staging).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Point the credential exchange at a different identity endpoint.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Return a token that is fresh enough to use, exchanging credentials for
    /// a new one only when the newest stored token has aged out.
    ///
    /// Two callers racing a cache miss may both refresh; the resulting
    /// duplicate rows are harmless since the newest row wins.
    pub async fn valid_token(&self) -> Result<String> {
        if let Some(row) = queries::latest_token(&self.pool).await? {
            if Utc::now() - row.created_at < Duration::minutes(TOKEN_MAX_AGE_MINUTES) {
                return Ok(row.access_token);
            }
        }
        self.refresh_token().await
    }

    /// Exchange client credentials for a new token and persist it. Any
    /// failure here is fatal to the calling operation; there is no inline
    /// retry.
    async fn refresh_token(&self) -> Result<String> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "client_credentials"),
        ];

        let resp = self
            .http
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::Auth(format!("token exchange failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Auth(format!(
                "token endpoint returned status {}",
                status.as_u16()
            )));
        }

        let auth: AuthResponse = resp
            .json()
            .await
            .map_err(|e| Error::Auth(format!("invalid token response: {e}")))?;

        queries::insert_token(&self.pool, &auth.access_token, Utc::now()).await?;
        tracing::debug!("obtained fresh orderspace access token");
        Ok(auth.access_token)
    }

    /// Issue an authenticated request. Attaches the bearer token and JSON
    /// content type; the configured timeout applies.
    pub(crate) async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response> {
        let token = self.valid_token().await?;
        let url = format!("{}{}", self.base_url, path);

        let mut req = self
            .http
            .request(method, &url)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        Ok(req.send().await?)
    }

    /// Like [`Client::request`], but treats any non-2xx as an upstream error
    /// with the status and body surfaced verbatim.
    pub(crate) async fn request_ok(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response> {
        let resp = self.request(method, path, query, body).await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }
}

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::Client;
use crate::error::Result;
use crate::models::{Customer, CustomerStatus};

/// Filters for the customer list endpoint. All fields are optional; the
/// created/updated filters carry full timestamp precision.
#[derive(Debug, Clone, Default)]
pub struct CustomerListParams {
    pub starting_after: Option<String>,
    pub limit: Option<u32>,
    pub created_since: Option<DateTime<Utc>>,
    pub updated_since: Option<DateTime<Utc>>,
    pub status: Option<CustomerStatus>,
}

impl CustomerListParams {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        if let Some(cursor) = &self.starting_after {
            q.push(("starting_after", cursor.clone()));
        }
        if let Some(limit) = self.limit {
            q.push(("limit", limit.to_string()));
        }
        if let Some(ts) = self.created_since {
            q.push(("created_since", ts.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        if let Some(ts) = self.updated_since {
            q.push(("updated_since", ts.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        if let Some(status) = self.status {
            q.push(("status", status.as_str().to_string()));
        }
        q
    }
}

/// One page of customers. `has_more` is advisory: callers wanting the full
/// set must loop with the last customer's id as the next cursor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerPage {
    pub customers: Vec<Customer>,
    pub has_more: bool,
}

impl Client {
    pub async fn list_customers(&self, params: &CustomerListParams) -> Result<CustomerPage> {
        let resp = self
            .request_ok(Method::GET, "/customers", &params.to_query(), None)
            .await?;
        Ok(resp.json().await?)
    }
}

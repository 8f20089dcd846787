use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::Client;
use crate::error::Result;
use crate::models::Product;

/// Filters for the product list endpoint.
#[derive(Debug, Clone, Default)]
pub struct ProductListParams {
    pub starting_after: Option<String>,
    pub limit: Option<u32>,
    pub created_since: Option<DateTime<Utc>>,
    pub updated_since: Option<DateTime<Utc>>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub active: Option<bool>,
    pub category_id: Option<String>,
}

impl ProductListParams {
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
        if let Some(code) = &self.code {
            q.push(("code", code.clone()));
        }
        if let Some(name) = &self.name {
            q.push(("name", name.clone()));
        }
        if let Some(active) = self.active {
            q.push(("active", active.to_string()));
        }
        if let Some(category_id) = &self.category_id {
            q.push(("category_id", category_id.clone()));
        }
        q
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub has_more: bool,
}

impl Client {
    pub async fn list_products(&self, params: &ProductListParams) -> Result<ProductPage> {
        let resp = self
            .request_ok(Method::GET, "/products", &params.to_query(), None)
            .await?;
        Ok(resp.json().await?)
    }
}

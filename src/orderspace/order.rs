use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::Client;
use crate::error::{Error, Result};
use crate::models::{Address, Order, OrderStatus};

/// Filters for the order list endpoint.
///
/// `created_*` bounds are full timestamps; `delivery_date_*` bounds are
/// calendar dates (`YYYY-MM-DD`). The upstream contract distinguishes the two
/// encodings and the types here enforce it.
#[derive(Debug, Clone, Default)]
pub struct OrderListParams {
    pub starting_after: Option<String>,
    pub limit: Option<u32>,
    pub created_since: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub delivery_date_since: Option<NaiveDate>,
    pub delivery_date_before: Option<NaiveDate>,
    pub number: Option<i64>,
    pub status: Option<OrderStatus>,
    pub reference: Option<String>,
    pub customer_id: Option<String>,
    pub standing_order_id: Option<String>,
}

impl OrderListParams {
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
        if let Some(ts) = self.created_before {
            q.push(("created_before", ts.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        if let Some(date) = self.delivery_date_since {
            q.push(("delivery_date_since", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(date) = self.delivery_date_before {
            q.push(("delivery_date_before", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(number) = self.number {
            q.push(("number", number.to_string()));
        }
        if let Some(status) = self.status {
            q.push(("status", status.as_str().to_string()));
        }
        if let Some(reference) = &self.reference {
            q.push(("reference", reference.clone()));
        }
        if let Some(customer_id) = &self.customer_id {
            q.push(("customer_id", customer_id.clone()));
        }
        if let Some(standing_order_id) = &self.standing_order_id {
            q.push(("standing_order_id", standing_order_id.clone()));
        }
        q
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub has_more: bool,
}

/// Envelope for order creation.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    pub order: OrderRequestBody,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderRequestBody {
    pub customer_id: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub delivery_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_po_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_note: Option<String>,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub order_lines: Vec<OrderLineRequest>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderLineRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_rate_id: Option<String>,
}

impl OrderLineRequest {
    /// A product line identified by SKU.
    pub fn product(sku: impl Into<String>, quantity: i64) -> Self {
        OrderLineRequest {
            sku: Some(sku.into()),
            quantity,
            ..Default::default()
        }
    }

    /// A shipping charge line.
    pub fn shipping(name: impl Into<String>, unit_price: f64) -> Self {
        OrderLineRequest {
            name: Some(name.into()),
            quantity: 1,
            unit_price: Some(unit_price),
            shipping: Some(true),
            ..Default::default()
        }
    }

    /// A free-form priced line with an explicit tax rate.
    pub fn custom(
        name: impl Into<String>,
        quantity: i64,
        unit_price: f64,
        tax_rate_id: impl Into<String>,
    ) -> Self {
        OrderLineRequest {
            name: Some(name.into()),
            quantity,
            unit_price: Some(unit_price),
            tax_rate_id: Some(tax_rate_id.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct OrderEnvelope {
    order: Order,
}

#[derive(Debug, Deserialize)]
struct OrderError {
    message: String,
}

impl Client {
    pub async fn list_orders(&self, params: &OrderListParams) -> Result<OrderPage> {
        let resp = self
            .request_ok(Method::GET, "/orders", &params.to_query(), None)
            .await?;
        Ok(resp.json().await?)
    }

    /// Create an order. A structured 422 from upstream is surfaced as
    /// [`Error::OrderRejected`] with the provider's message.
    pub async fn create_order(&self, req: &OrderRequest) -> Result<Order> {
        let body = serde_json::to_value(req)
            .map_err(|e| Error::Validation(format!("invalid order request: {e}")))?;
        let resp = self
            .request(Method::POST, "/orders", &[], Some(&body))
            .await?;

        let status = resp.status();
        match status.as_u16() {
            200 => {
                let envelope: OrderEnvelope = resp.json().await?;
                Ok(envelope.order)
            }
            422 => {
                let err: OrderError = resp.json().await.unwrap_or(OrderError {
                    message: "unprocessable order".to_string(),
                });
                Err(Error::OrderRejected(err.message))
            }
            _ => {
                let body = resp.text().await.unwrap_or_default();
                Err(Error::Upstream {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn delivery_date_filters_use_calendar_dates() {
        let params = OrderListParams {
            created_since: Some(Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()),
            delivery_date_since: Some(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()),
            delivery_date_before: Some(NaiveDate::from_ymd_opt(2025, 1, 13).unwrap()),
            ..Default::default()
        };
        let q = params.to_query();
        assert!(q.contains(&("created_since", "2025-01-02T03:04:05Z".to_string())));
        assert!(q.contains(&("delivery_date_since", "2025-01-06".to_string())));
        assert!(q.contains(&("delivery_date_before", "2025-01-13".to_string())));
    }

    #[test]
    fn status_filter_serializes_snake_case() {
        let params = OrderListParams {
            status: Some(OrderStatus::PartFulfilled),
            ..Default::default()
        };
        assert!(params
            .to_query()
            .contains(&("status", "part_fulfilled".to_string())));
    }

    #[test]
    fn line_helpers_set_expected_fields() {
        let product = OrderLineRequest::product("SKU-1", 3);
        assert_eq!(product.sku.as_deref(), Some("SKU-1"));
        assert_eq!(product.quantity, 3);
        assert!(product.unit_price.is_none());

        let shipping = OrderLineRequest::shipping("Courier", 9.5);
        assert_eq!(shipping.shipping, Some(true));
        assert_eq!(shipping.quantity, 1);

        let custom = OrderLineRequest::custom("Setup fee", 1, 25.0, "tax_std");
        assert_eq!(custom.tax_rate_id.as_deref(), Some("tax_std"));
    }
}

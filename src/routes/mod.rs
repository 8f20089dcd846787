//! Operator HTTP surface. Thin handlers; the work lives in the commerce
//! client and the reminder service.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::error::Result;
use crate::models::{CustomerStatus, OrderStatus};
use crate::orderspace::{Client, CustomerListParams, CustomerPage, OrderListParams, OrderPage};
use crate::services::{AdHocMessage, DispatchReport, ReminderService};

const DEFAULT_PAGE_LIMIT: u32 = 50;

#[derive(Clone)]
pub struct AppState {
    pub client: Client,
    pub service: ReminderService,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/customers", get(list_customers))
        .route("/api/orders", get(list_orders))
        .route("/api/email/send", post(send_email))
        .route("/api/email/preview-reminders", get(preview_reminders))
        .with_state(state)
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Default, Deserialize)]
struct CustomerQuery {
    starting_after: Option<String>,
    limit: Option<u32>,
    created_since: Option<String>,
    updated_since: Option<String>,
    status: Option<CustomerStatus>,
}

async fn list_customers(
    State(state): State<AppState>,
    Query(q): Query<CustomerQuery>,
) -> Result<Json<CustomerPage>> {
    let params = CustomerListParams {
        starting_after: q.starting_after,
        limit: Some(q.limit.unwrap_or(DEFAULT_PAGE_LIMIT)),
        created_since: parse_timestamp(q.created_since.as_deref()),
        updated_since: parse_timestamp(q.updated_since.as_deref()),
        status: q.status,
    };
    Ok(Json(state.client.list_customers(&params).await?))
}

#[derive(Debug, Default, Deserialize)]
struct OrderQuery {
    starting_after: Option<String>,
    limit: Option<u32>,
    created_since: Option<String>,
    created_before: Option<String>,
    delivery_date_since: Option<String>,
    delivery_date_before: Option<String>,
    number: Option<i64>,
    status: Option<OrderStatus>,
    reference: Option<String>,
    customer_id: Option<String>,
    standing_order_id: Option<String>,
}

async fn list_orders(
    State(state): State<AppState>,
    Query(q): Query<OrderQuery>,
) -> Result<Json<OrderPage>> {
    let params = OrderListParams {
        starting_after: q.starting_after,
        limit: Some(q.limit.unwrap_or(DEFAULT_PAGE_LIMIT)),
        created_since: parse_timestamp(q.created_since.as_deref()),
        created_before: parse_timestamp(q.created_before.as_deref()),
        delivery_date_since: parse_date(q.delivery_date_since.as_deref()),
        delivery_date_before: parse_date(q.delivery_date_before.as_deref()),
        number: q.number,
        status: q.status,
        reference: q.reference,
        customer_id: q.customer_id,
        standing_order_id: q.standing_order_id,
    };
    Ok(Json(state.client.list_orders(&params).await?))
}

async fn send_email(
    State(state): State<AppState>,
    Json(message): Json<AdHocMessage>,
) -> Result<Json<DispatchReport>> {
    Ok(Json(state.service.send_ad_hoc(&message).await?))
}

async fn preview_reminders(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    state.service.preview_order_reminders().await?;
    Ok(Json(json!({ "status": "preview sent" })))
}

/// Lenient timestamp filter: a malformed value is dropped rather than
/// rejecting the whole request.
fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_filter_is_lenient() {
        assert!(parse_timestamp(Some("2025-03-14T09:26:53Z")).is_some());
        assert!(parse_timestamp(Some("last tuesday")).is_none());
        assert!(parse_timestamp(None).is_none());
    }

    #[test]
    fn date_filter_takes_calendar_dates_only() {
        assert!(parse_date(Some("2025-03-14")).is_some());
        assert!(parse_date(Some("2025-03-14T09:26:53Z")).is_none());
    }
}

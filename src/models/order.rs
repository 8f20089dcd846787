use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::customer::{Address, EmailAddresses};

/// An order as returned by the Orderspace API.
///
/// `created` is a full timestamp; `delivery_date` is a calendar date. The
/// upstream contract keeps these two precisions distinct and so do we.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub number: i64,
    pub created: DateTime<Utc>,
    pub status: OrderStatus,
    pub customer_id: String,
    pub company_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email_addresses: EmailAddresses,
    #[serde(default)]
    pub created_by: String,
    pub delivery_date: NaiveDate,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub internal_note: String,
    #[serde(default)]
    pub customer_po_number: String,
    #[serde(default)]
    pub customer_note: String,
    #[serde(default)]
    pub standing_order_id: Option<String>,
    #[serde(default)]
    pub shipping_type: String,
    #[serde(default)]
    pub shipping_address: Address,
    #[serde(default)]
    pub billing_address: Address,
    #[serde(default)]
    pub order_lines: Vec<OrderLine>,
    pub currency: String,
    pub net_total: f64,
    pub gross_total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: String,
    #[serde(default)]
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub options: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grouping_category: Option<GroupingCategory>,
    #[serde(default)]
    pub shipping: bool,
    pub quantity: i64,
    pub unit_price: f64,
    pub sub_total: f64,
    #[serde(default)]
    pub tax_rate_id: String,
    #[serde(default)]
    pub tax_name: String,
    #[serde(default)]
    pub tax_rate: f64,
    #[serde(default)]
    pub tax_amount: f64,
    #[serde(default)]
    pub preorder_window_id: Option<String>,
    #[serde(default)]
    pub on_hold: bool,
    #[serde(default)]
    pub invoiced: i64,
    #[serde(default)]
    pub paid: i64,
    #[serde(default)]
    pub dispatched: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupingCategory {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    Invoiced,
    Released,
    PartFulfilled,
    Preorder,
    Fulfilled,
    StandingOrder,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::Invoiced => "invoiced",
            OrderStatus::Released => "released",
            OrderStatus::PartFulfilled => "part_fulfilled",
            OrderStatus::Preorder => "preorder",
            OrderStatus::Fulfilled => "fulfilled",
            OrderStatus::StandingOrder => "standing_order",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

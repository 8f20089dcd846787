use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A customer as returned by the Orderspace API. The upstream system owns
/// these records; we only pass them through per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub company_name: String,
    pub created_at: DateTime<Utc>,
    pub status: CustomerStatus,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub internal_note: String,
    #[serde(default)]
    pub buyers: Vec<Buyer>,
    #[serde(default)]
    pub phone: String,
    pub email_addresses: EmailAddresses,
    #[serde(default)]
    pub tax_number: String,
    #[serde(default)]
    pub tax_rate_id: Option<String>,
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub minimum_spend: Option<f64>,
    #[serde(default)]
    pub payment_terms_id: Option<String>,
    #[serde(default)]
    pub customer_group_id: Option<String>,
    #[serde(default)]
    pub price_list_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_interval: Option<i32>,
}

/// A user that can log in and place orders on the ordering site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Buyer {
    pub name: String,
    pub email_address: String,
}

/// Per-purpose email addresses for a customer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailAddresses {
    #[serde(default)]
    pub orders: String,
    #[serde(default)]
    pub dispatches: String,
    #[serde(default)]
    pub invoices: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub line2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    New,
    Active,
    Closed,
}

impl CustomerStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CustomerStatus::New => "new",
            CustomerStatus::Active => "active",
            CustomerStatus::Closed => "closed",
        }
    }
}

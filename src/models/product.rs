use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A product as returned by the Orderspace API. Pricing and stock detail
/// lives on the variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(default)]
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tariff_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_of_origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composition: Option<String>,
    #[serde(default)]
    pub variant_options: Vec<String>,
    #[serde(default)]
    pub product_variants: Vec<ProductVariant>,
    #[serde(default)]
    pub categories: Vec<ProductCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grouping_category_id: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// One orderable variant, keyed by SKU.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: String,
    pub sku: String,
    #[serde(default)]
    pub barcode: String,
    #[serde(default)]
    pub options: HashMap<String, String>,
    pub unit_price: f64,
    #[serde(default)]
    pub price_list_prices: Vec<PriceListPrice>,
    #[serde(default)]
    pub rrp: f64,
    #[serde(default)]
    pub backorder: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple: Option<i64>,
    #[serde(default)]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceListPrice {
    pub id: String,
    pub unit_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCategory {
    pub id: String,
    pub name: String,
}

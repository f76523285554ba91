//! Stored catalogue and order records.
//!
//! Records mirror the documents held by the store. Fields the sync core does
//! not interpret are kept in a flattened `attributes` map so schemaless
//! documents survive a round trip unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sellable product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub name_ar: Option<String>,
    pub sku: Option<String>,
    pub price: Option<f64>,
    pub category_id: Option<String>,
    pub product_brand_id: Option<String>,
    #[serde(default)]
    pub car_model_ids: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Product category, optionally nested under a parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub name_ar: Option<String>,
    pub parent_id: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Vehicle manufacturer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarBrand {
    pub id: String,
    pub name: String,
    pub name_ar: Option<String>,
    pub logo: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Vehicle model belonging to a [`CarBrand`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarModel {
    pub id: String,
    pub brand_id: Option<String>,
    pub name: String,
    pub name_ar: Option<String>,
    pub year_start: Option<i32>,
    pub year_end: Option<i32>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Brand of a part (the part manufacturer, not the vehicle brand).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductBrand {
    pub id: String,
    pub name: String,
    pub name_ar: Option<String>,
    pub country_of_origin: Option<String>,
    pub country_of_origin_ar: Option<String>,
    pub logo: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Customer order. Orders are scoped to the owning user when synced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub user_id: String,
    pub status: String,
    pub total: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

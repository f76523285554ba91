//! OpenAPI schema definitions for response and request bodies.
//!
//! Domain types stay free of utoipa derives; these wrappers mirror their
//! wire shape for documentation only.

use utoipa::ToSchema;

/// Single-entity delta. The record array is keyed by the entity plural
/// (`products`, `categories`, `car_brands`, `car_models`, `product_brands`,
/// `orders`); `records` stands in for that key.
#[derive(ToSchema)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct EntityDeltaSchema {
    /// Changed records, keyed by the entity plural in real responses.
    #[schema(value_type = Vec<serde_json::Value>)]
    records: Vec<serde_json::Value>,
    /// Ids soft-deleted since the checkpoint; empty on full sync.
    deleted_ids: Vec<String>,
    /// Checkpoint to send as `last_sync` next time.
    #[schema(example = "2024-05-01T09:30:00Z")]
    server_time: String,
    /// False when no valid checkpoint was applied.
    is_delta: bool,
    /// Number of returned records.
    total: usize,
    /// More changed records exist beyond this page.
    has_more: bool,
}

/// Per-table changes inside a combined delta.
#[derive(ToSchema)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct EntityChangesSchema {
    #[schema(value_type = Vec<serde_json::Value>)]
    items: Vec<serde_json::Value>,
    deleted_ids: Vec<String>,
    has_more: bool,
}

/// Combined delta across several tables.
#[derive(ToSchema)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct CombinedDeltaSchema {
    #[schema(example = "2024-05-01T09:30:00Z")]
    server_time: String,
    is_delta: bool,
    /// Changes keyed by table name.
    data: std::collections::BTreeMap<String, EntityChangesSchema>,
    /// Tables whose pass failed; keep the previous checkpoint for these.
    failed_tables: Vec<String>,
}

/// Request body for a promotional broadcast.
#[derive(ToSchema)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct PromotionalBroadcastSchema {
    #[schema(example = "Weekend sale")]
    title: String,
    title_ar: String,
    message: String,
    message_ar: String,
    image_url: Option<String>,
    target_url: Option<String>,
    promotion_id: Option<String>,
    bundle_id: Option<String>,
}

/// Request body for an order status change.
#[derive(ToSchema)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct OrderStatusChangedSchema {
    user_id: String,
    #[schema(example = "ORD-1042")]
    order_number: String,
    /// `pending`, `confirmed`, `preparing`, `shipped`, `out_for_delivery`,
    /// `delivered`, `completed`, `cancelled`, or any other status string.
    #[schema(example = "shipped")]
    status: String,
    order_id: Option<String>,
    /// Language tag for the copy; Arabic when absent.
    locale: Option<String>,
}

/// Request body for an admin activity report.
///
/// `activity` selects the kind: `new_user` (`email`, `name`),
/// `product_changed` (`action`, `product_id`, `product_name`, `actor`),
/// `order_cancelled` (`order_id`, `order_number`, `customer_name`,
/// `cancelled_by`), or `custom` (`activity_type` plus English and Arabic
/// `title` and `message`, and optional `extra`).
#[derive(ToSchema)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct AdminActivityReportSchema {
    #[schema(example = "custom")]
    activity: String,
    email: Option<String>,
    name: Option<String>,
    /// `created`, `updated`, or `deleted`.
    action: Option<String>,
    product_id: Option<String>,
    product_name: Option<String>,
    actor: Option<String>,
    order_id: Option<String>,
    order_number: Option<String>,
    customer_name: Option<String>,
    cancelled_by: Option<String>,
    #[schema(example = "stock_low")]
    activity_type: Option<String>,
    title: Option<String>,
    title_ar: Option<String>,
    message: Option<String>,
    message_ar: Option<String>,
    #[schema(value_type = Object)]
    extra: Option<serde_json::Value>,
}

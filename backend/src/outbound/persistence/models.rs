//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain records live here
//! so repositories stay thin.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::notifications::{Notification, Recipient, UserRole};
use crate::domain::{CarBrand, CarModel, Category, Order, Product, ProductBrand};

use super::schema::{
    car_brands, car_models, categories, notifications, orders, product_brands, products, users,
};

/// Unpack a JSONB attributes column. Non-object values are discarded.
fn attributes(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductRow {
    pub id: String,
    pub name: String,
    pub name_ar: Option<String>,
    pub sku: Option<String>,
    pub price: Option<f64>,
    pub category_id: Option<String>,
    pub product_brand_id: Option<String>,
    pub car_model_ids: Vec<String>,
    pub attributes: Value,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            name_ar: row.name_ar,
            sku: row.sku,
            price: row.price,
            category_id: row.category_id,
            product_brand_id: row.product_brand_id,
            car_model_ids: row.car_model_ids,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
            attributes: attributes(row.attributes),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CategoryRow {
    pub id: String,
    pub name: String,
    pub name_ar: Option<String>,
    pub parent_id: Option<String>,
    pub sort_order: i32,
    pub attributes: Value,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            name_ar: row.name_ar,
            parent_id: row.parent_id,
            sort_order: row.sort_order,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
            attributes: attributes(row.attributes),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = car_brands)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CarBrandRow {
    pub id: String,
    pub name: String,
    pub name_ar: Option<String>,
    pub logo: Option<String>,
    pub attributes: Value,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<CarBrandRow> for CarBrand {
    fn from(row: CarBrandRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            name_ar: row.name_ar,
            logo: row.logo,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
            attributes: attributes(row.attributes),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = car_models)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CarModelRow {
    pub id: String,
    pub brand_id: Option<String>,
    pub name: String,
    pub name_ar: Option<String>,
    pub year_start: Option<i32>,
    pub year_end: Option<i32>,
    pub attributes: Value,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<CarModelRow> for CarModel {
    fn from(row: CarModelRow) -> Self {
        Self {
            id: row.id,
            brand_id: row.brand_id,
            name: row.name,
            name_ar: row.name_ar,
            year_start: row.year_start,
            year_end: row.year_end,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
            attributes: attributes(row.attributes),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = product_brands)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductBrandRow {
    pub id: String,
    pub name: String,
    pub name_ar: Option<String>,
    pub country_of_origin: Option<String>,
    pub country_of_origin_ar: Option<String>,
    pub logo: Option<String>,
    pub attributes: Value,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<ProductBrandRow> for ProductBrand {
    fn from(row: ProductBrandRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            name_ar: row.name_ar,
            country_of_origin: row.country_of_origin,
            country_of_origin_ar: row.country_of_origin_ar,
            logo: row.logo,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
            attributes: attributes(row.attributes),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderRow {
    pub id: String,
    pub order_number: String,
    pub user_id: String,
    pub status: String,
    pub total: Option<f64>,
    pub attributes: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            order_number: row.order_number,
            user_id: row.user_id,
            status: row.status,
            total: row.total,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
            attributes: attributes(row.attributes),
        }
    }
}

/// Recipient columns of the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RecipientRow {
    pub id: String,
    pub role: String,
    pub preferred_language: Option<String>,
}

impl From<RecipientRow> for Recipient {
    fn from(row: RecipientRow) -> Self {
        Self {
            id: row.id,
            role: UserRole::from(row.role),
            preferred_language: row.preferred_language,
        }
    }
}

/// Insertable struct for new notifications.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub(crate) struct NewNotificationRow<'a> {
    pub id: Uuid,
    pub user_id: &'a str,
    pub title: &'a str,
    pub message: &'a str,
    pub notification_type: &'a str,
    pub notification_category: &'a str,
    pub read: bool,
    pub extra: Value,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a Notification> for NewNotificationRow<'a> {
    fn from(notification: &'a Notification) -> Self {
        Self {
            id: notification.id,
            user_id: notification.user_id.as_str(),
            title: notification.title.as_str(),
            message: notification.message.as_str(),
            notification_type: notification.severity.as_str(),
            notification_category: notification.category.as_str(),
            read: notification.read,
            extra: Value::Object(notification.extra.clone()),
            created_at: notification.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notifications::{NotificationCategory, NotificationSeverity};
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn non_object_attributes_are_dropped() {
        assert!(attributes(json!(["a"])).is_empty());
        assert_eq!(attributes(json!({ "k": 1 }))["k"], json!(1));
    }

    #[rstest]
    fn notification_row_uses_wire_names() {
        let notification = Notification {
            id: Uuid::nil(),
            user_id: "u1".to_owned(),
            title: "t".to_owned(),
            message: "m".to_owned(),
            severity: NotificationSeverity::Promo,
            category: NotificationCategory::Promotion,
            read: false,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            extra: Map::new(),
        };
        let row = NewNotificationRow::from(&notification);
        assert_eq!(row.notification_type, "promo");
        assert_eq!(row.notification_category, "promotion");
        assert_eq!(row.extra, json!({}));
    }

    #[rstest]
    fn recipient_row_parses_role() {
        let recipient = Recipient::from(RecipientRow {
            id: "u1".to_owned(),
            role: "partner".to_owned(),
            preferred_language: None,
        });
        assert!(recipient.role.is_admin());
    }
}

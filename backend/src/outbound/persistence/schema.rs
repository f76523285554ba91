//! Diesel table definitions for the PostgreSQL schema.
//!
//! Catalogue tables share the soft-delete columns `updated_at` and
//! `deleted_at`. Attributes the sync core does not interpret live in the
//! `attributes` JSONB column.

diesel::table! {
    /// Sellable products.
    products (id) {
        id -> Text,
        name -> Text,
        name_ar -> Nullable<Text>,
        sku -> Nullable<Text>,
        price -> Nullable<Float8>,
        category_id -> Nullable<Text>,
        product_brand_id -> Nullable<Text>,
        /// Compatible car models; the first entry drives enrichment.
        car_model_ids -> Array<Text>,
        attributes -> Jsonb,
        created_at -> Nullable<Timestamptz>,
        updated_at -> Timestamptz,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    categories (id) {
        id -> Text,
        name -> Text,
        name_ar -> Nullable<Text>,
        parent_id -> Nullable<Text>,
        sort_order -> Int4,
        attributes -> Jsonb,
        updated_at -> Timestamptz,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    car_brands (id) {
        id -> Text,
        name -> Text,
        name_ar -> Nullable<Text>,
        logo -> Nullable<Text>,
        attributes -> Jsonb,
        updated_at -> Timestamptz,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    car_models (id) {
        id -> Text,
        brand_id -> Nullable<Text>,
        name -> Text,
        name_ar -> Nullable<Text>,
        year_start -> Nullable<Int4>,
        year_end -> Nullable<Int4>,
        attributes -> Jsonb,
        updated_at -> Timestamptz,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    product_brands (id) {
        id -> Text,
        name -> Text,
        name_ar -> Nullable<Text>,
        country_of_origin -> Nullable<Text>,
        country_of_origin_ar -> Nullable<Text>,
        logo -> Nullable<Text>,
        attributes -> Jsonb,
        updated_at -> Timestamptz,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Customer orders, synced per owning user.
    orders (id) {
        id -> Text,
        order_number -> Text,
        user_id -> Text,
        status -> Text,
        total -> Nullable<Float8>,
        attributes -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// User accounts, read for notification recipients.
    users (id) {
        id -> Text,
        role -> Text,
        preferred_language -> Nullable<Text>,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Append-only per-recipient notifications.
    notifications (id) {
        id -> Uuid,
        user_id -> Text,
        title -> Text,
        message -> Text,
        /// Severity (`info`, `success`, `warning`, `promo`, `admin`).
        notification_type -> Text,
        notification_category -> Text,
        read -> Bool,
        extra -> Jsonb,
        created_at -> Timestamptz,
    }
}

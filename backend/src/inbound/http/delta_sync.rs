//! Delta sync read endpoints.
//!
//! ```text
//! GET /api/v1/delta-sync/products?last_sync=&limit=
//! GET /api/v1/delta-sync/categories?last_sync=&limit=
//! GET /api/v1/delta-sync/orders?last_sync=&limit=&user_id=
//! GET /api/v1/delta-sync/car-brands?last_sync=&limit=
//! GET /api/v1/delta-sync/car-models?last_sync=&limit=
//! GET /api/v1/delta-sync/product-brands?last_sync=&limit=
//! GET /api/v1/delta-sync/full?last_sync=&tables=&limit=&user_id=
//! ```
//!
//! Single-entity responses key the records by the entity's plural name, for
//! example `{"products": [...], "deleted_ids": [...], ...}`.

use actix_web::{HttpResponse, get, web};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::domain::Error;
use crate::domain::ports::{CombinedDeltaRequest, EntityDelta, EntityDeltaRequest};
use crate::domain::sync::EntityKind;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{CombinedDeltaSchema, EntityDeltaSchema};
use crate::inbound::http::state::HttpState;

/// Query parameters shared by the single-entity endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct DeltaSyncQuery {
    /// Checkpoint from the previous response's `server_time`.
    pub last_sync: Option<String>,
    pub limit: Option<usize>,
}

/// Query parameters for the orders endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersDeltaQuery {
    pub last_sync: Option<String>,
    pub limit: Option<usize>,
    pub user_id: Option<String>,
}

/// Query parameters for the combined endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct FullDeltaQuery {
    pub last_sync: Option<String>,
    /// Comma-separated table names.
    pub tables: Option<String>,
    pub limit: Option<usize>,
    pub user_id: Option<String>,
}

/// Single-entity response body.
#[derive(Debug)]
pub struct EntityDeltaResponse(EntityDelta);

impl From<EntityDelta> for EntityDeltaResponse {
    fn from(delta: EntityDelta) -> Self {
        Self(delta)
    }
}

impl Serialize for EntityDeltaResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let delta = &self.0;
        let mut map = serializer.serialize_map(Some(6))?;
        map.serialize_entry(delta.kind.table_name(), &delta.changes.items)?;
        map.serialize_entry("deleted_ids", &delta.changes.deleted_ids)?;
        map.serialize_entry("server_time", &delta.server_time)?;
        map.serialize_entry("is_delta", &delta.is_delta)?;
        map.serialize_entry("total", &delta.changes.total())?;
        map.serialize_entry("has_more", &delta.changes.has_more)?;
        map.end()
    }
}

/// Empty user ids mean "no owner filter".
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn entity_delta(
    state: &HttpState,
    kind: EntityKind,
    last_sync: Option<String>,
    limit: Option<usize>,
    owner: Option<String>,
) -> ApiResult<HttpResponse> {
    let request = EntityDeltaRequest {
        kind,
        last_sync,
        limit,
        owner: non_blank(owner),
    };
    let delta = state.delta_sync.entity_delta(request).await?;
    Ok(HttpResponse::Ok().json(EntityDeltaResponse::from(delta)))
}

macro_rules! entity_endpoint {
    ($name:ident, $route:tt, $kind:expr, $tag_path:tt, $operation:tt) => {
        #[doc = concat!("Changed and deleted ", $route, " since `last_sync`.")]
        #[utoipa::path(
            get,
            path = $tag_path,
            params(
                ("last_sync" = Option<String>, Query, description = "ISO-8601 checkpoint; absent or unparseable means full sync"),
                ("limit" = Option<usize>, Query, description = "Page size, clamped to the entity ceiling")
            ),
            responses(
                (status = 200, description = "Entity delta", body = EntityDeltaSchema),
                (status = 503, description = "Sync store unavailable", body = Error),
                (status = 500, description = "Internal server error", body = Error)
            ),
            tags = ["delta-sync"],
            operation_id = $operation
        )]
        #[get($route)]
        pub async fn $name(
            state: web::Data<HttpState>,
            query: web::Query<DeltaSyncQuery>,
        ) -> ApiResult<HttpResponse> {
            let query = query.into_inner();
            entity_delta(&state, $kind, query.last_sync, query.limit, None).await
        }
    };
}

entity_endpoint!(
    products_delta,
    "/delta-sync/products",
    EntityKind::Products,
    "/api/v1/delta-sync/products",
    "getProductsDelta"
);
entity_endpoint!(
    categories_delta,
    "/delta-sync/categories",
    EntityKind::Categories,
    "/api/v1/delta-sync/categories",
    "getCategoriesDelta"
);
entity_endpoint!(
    car_brands_delta,
    "/delta-sync/car-brands",
    EntityKind::CarBrands,
    "/api/v1/delta-sync/car-brands",
    "getCarBrandsDelta"
);
entity_endpoint!(
    car_models_delta,
    "/delta-sync/car-models",
    EntityKind::CarModels,
    "/api/v1/delta-sync/car-models",
    "getCarModelsDelta"
);
entity_endpoint!(
    product_brands_delta,
    "/delta-sync/product-brands",
    EntityKind::ProductBrands,
    "/api/v1/delta-sync/product-brands",
    "getProductBrandsDelta"
);

/// Changed and deleted orders since `last_sync`, optionally for one user.
#[utoipa::path(
    get,
    path = "/api/v1/delta-sync/orders",
    params(
        ("last_sync" = Option<String>, Query, description = "ISO-8601 checkpoint"),
        ("limit" = Option<usize>, Query, description = "Page size, clamped to 1000"),
        ("user_id" = Option<String>, Query, description = "Restrict to this user's orders")
    ),
    responses(
        (status = 200, description = "Order delta", body = EntityDeltaSchema),
        (status = 503, description = "Sync store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["delta-sync"],
    operation_id = "getOrdersDelta"
)]
#[get("/delta-sync/orders")]
pub async fn orders_delta(
    state: web::Data<HttpState>,
    query: web::Query<OrdersDeltaQuery>,
) -> ApiResult<HttpResponse> {
    let query = query.into_inner();
    entity_delta(
        &state,
        EntityKind::Orders,
        query.last_sync,
        query.limit,
        query.user_id,
    )
    .await
}

/// Changes for several entity types in one response.
///
/// A type whose pass fails is listed in `failed_tables` instead of failing
/// the request; only an unreachable store yields 503.
#[utoipa::path(
    get,
    path = "/api/v1/delta-sync/full",
    params(
        ("last_sync" = Option<String>, Query, description = "ISO-8601 checkpoint"),
        ("tables" = Option<String>, Query, description = "Comma-separated table names; unknown names are ignored"),
        ("limit" = Option<usize>, Query, description = "Page size applied to every table"),
        ("user_id" = Option<String>, Query, description = "Owner filter for orders")
    ),
    responses(
        (status = 200, description = "Combined delta", body = CombinedDeltaSchema),
        (status = 503, description = "Sync store unavailable", body = Error)
    ),
    tags = ["delta-sync"],
    operation_id = "getFullDelta"
)]
#[get("/delta-sync/full")]
pub async fn full_delta(
    state: web::Data<HttpState>,
    query: web::Query<FullDeltaQuery>,
) -> ApiResult<HttpResponse> {
    let query = query.into_inner();
    let request = CombinedDeltaRequest {
        last_sync: query.last_sync,
        tables: query.tables,
        limit: query.limit,
        owner: non_blank(query.user_id),
    };
    let delta = state.delta_sync.combined_delta(request).await?;
    Ok(HttpResponse::Ok().json(delta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test as actix_test};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::domain::ports::{
        EntityChanges, FixtureNotificationCommand, MockDeltaSyncQuery,
    };

    fn state_with(query: MockDeltaSyncQuery) -> HttpState {
        HttpState::new(Arc::new(query), Arc::new(FixtureNotificationCommand))
    }

    fn empty_delta(kind: EntityKind, is_delta: bool) -> EntityDelta {
        EntityDelta {
            kind,
            changes: EntityChanges {
                items: Vec::new(),
                deleted_ids: vec!["gone".to_owned()],
                has_more: false,
            },
            server_time: Utc
                .with_ymd_and_hms(2024, 5, 1, 9, 30, 0)
                .single()
                .expect("valid timestamp"),
            is_delta,
        }
    }

    async fn get_json(state: HttpState, uri: &str) -> (StatusCode, Value) {
        let app = actix_test::init_service(
            App::new().app_data(web::Data::new(state)).service(
                web::scope("/api/v1")
                    .service(products_delta)
                    .service(categories_delta)
                    .service(car_brands_delta)
                    .service(car_models_delta)
                    .service(product_brands_delta)
                    .service(orders_delta)
                    .service(full_delta),
            ),
        )
        .await;
        let request = actix_test::TestRequest::get().uri(uri).to_request();
        let response = actix_test::call_service(&app, request).await;
        let status = response.status();
        let body = actix_test::read_body(response).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[rstest]
    #[case("/api/v1/delta-sync/products", EntityKind::Products, "products")]
    #[case("/api/v1/delta-sync/categories", EntityKind::Categories, "categories")]
    #[case("/api/v1/delta-sync/car-brands", EntityKind::CarBrands, "car_brands")]
    #[case("/api/v1/delta-sync/car-models", EntityKind::CarModels, "car_models")]
    #[case(
        "/api/v1/delta-sync/product-brands",
        EntityKind::ProductBrands,
        "product_brands"
    )]
    #[actix_web::test]
    async fn entity_endpoints_key_records_by_plural(
        #[case] uri: &str,
        #[case] kind: EntityKind,
        #[case] key: &str,
    ) {
        let mut query = MockDeltaSyncQuery::new();
        query
            .expect_entity_delta()
            .withf(move |request| request.kind == kind && request.owner.is_none())
            .times(1)
            .returning(|request| Ok(empty_delta(request.kind, false)));

        let (status, body) = get_json(state_with(query), uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[key], json!([]));
        assert_eq!(body["deleted_ids"], json!(["gone"]));
        assert_eq!(body["server_time"], json!("2024-05-01T09:30:00Z"));
        assert_eq!(body["is_delta"], json!(false));
        assert_eq!(body["total"], json!(0));
        assert_eq!(body["has_more"], json!(false));
    }

    #[actix_web::test]
    async fn orders_forward_checkpoint_limit_and_user() {
        let mut query = MockDeltaSyncQuery::new();
        query
            .expect_entity_delta()
            .withf(|request| {
                request.kind == EntityKind::Orders
                    && request.last_sync.as_deref() == Some("2024-05-01T00:00:00Z")
                    && request.limit == Some(20)
                    && request.owner.as_deref() == Some("u1")
            })
            .returning(|request| Ok(empty_delta(request.kind, true)));

        let (status, body) = get_json(
            state_with(query),
            "/api/v1/delta-sync/orders?last_sync=2024-05-01T00:00:00Z&limit=20&user_id=u1",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_delta"], json!(true));
        assert!(body.get("orders").is_some());
    }

    #[actix_web::test]
    async fn blank_user_id_is_no_filter() {
        let mut query = MockDeltaSyncQuery::new();
        query
            .expect_entity_delta()
            .withf(|request| request.owner.is_none())
            .returning(|request| Ok(empty_delta(request.kind, false)));

        let (status, _) =
            get_json(state_with(query), "/api/v1/delta-sync/orders?user_id=%20").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[actix_web::test]
    async fn store_outage_maps_to_503() {
        let mut query = MockDeltaSyncQuery::new();
        query
            .expect_entity_delta()
            .returning(|_| Err(Error::service_unavailable("sync store unavailable")));

        let (status, body) = get_json(state_with(query), "/api/v1/delta-sync/products").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], json!("service_unavailable"));
    }

    #[actix_web::test]
    async fn full_forwards_tables() {
        let mut query = MockDeltaSyncQuery::new();
        query
            .expect_combined_delta()
            .withf(|request| request.tables.as_deref() == Some("products,widgets"))
            .returning(|_| {
                Ok(crate::domain::ports::CombinedDelta {
                    server_time: Utc
                        .with_ymd_and_hms(2024, 5, 1, 9, 30, 0)
                        .single()
                        .expect("valid timestamp"),
                    is_delta: false,
                    data: Default::default(),
                    failed_tables: vec![EntityKind::Categories],
                })
            });

        let (status, body) = get_json(
            state_with(query),
            "/api/v1/delta-sync/full?tables=products,widgets",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!({}));
        assert_eq!(body["failed_tables"], json!(["categories"]));
    }
}

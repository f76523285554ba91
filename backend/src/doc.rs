//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the delta sync, notification, and health endpoints
//! plus the documentation-only body schemas from
//! [`crate::inbound::http::schemas`]. Swagger UI serves it in debug builds.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::notifications::DispatchAccepted;
use crate::inbound::http::schemas::{
    AdminActivityReportSchema, CombinedDeltaSchema, EntityChangesSchema, EntityDeltaSchema,
    OrderStatusChangedSchema, PromotionalBroadcastSchema,
};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog backend API",
        description = "Delta sync for catalogue and order data, and notification triggers."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::delta_sync::products_delta,
        crate::inbound::http::delta_sync::categories_delta,
        crate::inbound::http::delta_sync::car_brands_delta,
        crate::inbound::http::delta_sync::car_models_delta,
        crate::inbound::http::delta_sync::product_brands_delta,
        crate::inbound::http::delta_sync::orders_delta,
        crate::inbound::http::delta_sync::full_delta,
        crate::inbound::http::notifications::send_promotion,
        crate::inbound::http::notifications::notify_order_status,
        crate::inbound::http::notifications::report_admin_activity,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        EntityDeltaSchema,
        EntityChangesSchema,
        CombinedDeltaSchema,
        PromotionalBroadcastSchema,
        OrderStatusChangedSchema,
        AdminActivityReportSchema,
        DispatchAccepted
    )),
    tags(
        (name = "delta-sync", description = "Incremental catalogue and order sync"),
        (name = "notifications", description = "Notification triggers"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

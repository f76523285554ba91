//! Notification trigger endpoints.
//!
//! ```text
//! POST /api/v1/notifications/promotions
//! POST /api/v1/notifications/order-status
//! POST /api/v1/notifications/admin-activity
//! ```
//!
//! All answer 202 once the trigger is accepted; fanout runs in the
//! background and its outcome is only logged.

use actix_web::{HttpResponse, post, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::notifications::{
    AdminActivity, AdminActivityReport, NotificationTrigger, OrderStatusChanged,
    PromotionalBroadcast, spawn_dispatch,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    AdminActivityReportSchema, OrderStatusChangedSchema, PromotionalBroadcastSchema,
};
use crate::inbound::http::state::HttpState;

/// Acknowledgement for an accepted trigger.
#[derive(Debug, Serialize, ToSchema)]
pub struct DispatchAccepted {
    /// Trigger name, for example `promotion`.
    #[schema(example = "promotion")]
    pub trigger: String,
}

fn require(field: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::invalid_request(format!("{field} must not be empty"))
            .with_details(serde_json::json!({ "field": field })));
    }
    Ok(())
}

fn accept(state: &HttpState, trigger: NotificationTrigger) -> HttpResponse {
    let body = DispatchAccepted {
        trigger: trigger.name().to_owned(),
    };
    spawn_dispatch(state.notifications.clone(), trigger);
    HttpResponse::Accepted().json(body)
}

/// Broadcast a promotion to every active user.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/promotions",
    request_body = PromotionalBroadcastSchema,
    responses(
        (status = 202, description = "Broadcast accepted", body = DispatchAccepted),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "sendPromotion"
)]
#[post("/notifications/promotions")]
pub async fn send_promotion(
    state: web::Data<HttpState>,
    payload: web::Json<PromotionalBroadcast>,
) -> ApiResult<HttpResponse> {
    let promotion = payload.into_inner();
    require("title", &promotion.title)?;
    require("message", &promotion.message)?;
    Ok(accept(&state, promotion.into()))
}

/// Notify an order's owner about a status change.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/order-status",
    request_body = OrderStatusChangedSchema,
    responses(
        (status = 202, description = "Notification accepted", body = DispatchAccepted),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "notifyOrderStatus"
)]
#[post("/notifications/order-status")]
pub async fn notify_order_status(
    state: web::Data<HttpState>,
    payload: web::Json<OrderStatusChanged>,
) -> ApiResult<HttpResponse> {
    let event = payload.into_inner();
    require("user_id", &event.user_id)?;
    require("order_number", &event.order_number)?;
    Ok(accept(&state, event.into()))
}

/// Tell admins about activity elsewhere in the shop.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/admin-activity",
    request_body = AdminActivityReportSchema,
    responses(
        (status = 202, description = "Notification accepted", body = DispatchAccepted),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "reportAdminActivity"
)]
#[post("/notifications/admin-activity")]
pub async fn report_admin_activity(
    state: web::Data<HttpState>,
    payload: web::Json<AdminActivityReport>,
) -> ApiResult<HttpResponse> {
    let report = payload.into_inner();
    for (field, value) in report.required_fields() {
        require(field, value)?;
    }
    Ok(accept(&state, AdminActivity::from(report).into()))
}

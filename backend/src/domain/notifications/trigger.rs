//! Business events that produce notifications.

use super::admin_activity::{AdminActivity, PromotionalBroadcast};
use super::order_status::OrderStatusChanged;

/// Event handed to the fanout engine.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationTrigger {
    /// Notify the order owner.
    OrderStatusChanged(OrderStatusChanged),
    /// Notify every active user.
    Promotion(PromotionalBroadcast),
    /// Notify users holding an admin role.
    AdminActivity(AdminActivity),
}

impl NotificationTrigger {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OrderStatusChanged(_) => "order_status_changed",
            Self::Promotion(_) => "promotion",
            Self::AdminActivity(_) => "admin_activity",
        }
    }
}

impl From<OrderStatusChanged> for NotificationTrigger {
    fn from(event: OrderStatusChanged) -> Self {
        Self::OrderStatusChanged(event)
    }
}

impl From<PromotionalBroadcast> for NotificationTrigger {
    fn from(promotion: PromotionalBroadcast) -> Self {
        Self::Promotion(promotion)
    }
}

impl From<AdminActivity> for NotificationTrigger {
    fn from(activity: AdminActivity) -> Self {
        Self::AdminActivity(activity)
    }
}

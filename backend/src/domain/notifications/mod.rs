//! Per-recipient notifications generated from business events.
//!
//! Order status changes notify the order owner, promotions notify every
//! active user, and admin activity notifies users holding an admin role.
//! Copy is rendered in each recipient's preferred locale.

mod admin_activity;
mod fanout;
mod model;
mod order_status;
mod trigger;

pub use admin_activity::{
    AdminActivity, AdminActivityReport, ProductChangeAction, PromotionalBroadcast,
};
pub use fanout::{FanoutConfig, NotificationFanoutService, spawn_dispatch};
pub use model::{
    DeliveryOutcome, DispatchFailure, DispatchReport, Notification, NotificationCategory,
    NotificationSeverity, Recipient, UserRole,
};
pub use order_status::{OrderStatus, OrderStatusChanged, RenderedOrderUpdate};
pub use trigger::NotificationTrigger;
